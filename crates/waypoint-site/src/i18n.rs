//! Locales and label translation.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::LabelKey;

/// BCP 47 style locale tag, normalized to `-` separators (`de_AT` → `de-AT`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Create a locale from a tag.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().replace('_', "-"))
    }

    /// Full tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language part of the tag (`de-AT` → `de`), lowercased.
    #[must_use]
    pub fn language(&self) -> String {
        self.0
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Message translation backend.
pub trait Translate: Send + Sync {
    /// Label for `key` in `locale`.
    fn translate(&self, key: &LabelKey, locale: &Locale) -> String;

    /// Label for `key` with `{name}` placeholders substituted from `args`.
    fn translate_with(&self, key: &LabelKey, locale: &Locale, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.translate(key, locale), |label, (name, value)| {
                label.replace(&format!("{{{name}}}"), value)
            })
    }
}

/// [`Translate`] backed by in-memory catalogs.
///
/// Lookup order: the full locale, its language, the default locale, and
/// finally the key itself with underscores turned into spaces.
#[derive(Clone, Debug, Default)]
pub struct CatalogTranslator {
    default_locale: Locale,
    catalogs: HashMap<Locale, HashMap<String, String>>,
}

impl CatalogTranslator {
    /// Create a translator with no catalogs.
    #[must_use]
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            catalogs: HashMap::new(),
        }
    }

    /// Add or extend the catalog for `locale`.
    pub fn add_catalog<I, K, V>(&mut self, locale: Locale, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.catalogs
            .entry(locale)
            .or_default()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Fallback locale.
    #[must_use]
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    fn lookup(&self, locale: &Locale, key: &str) -> Option<&str> {
        self.catalogs
            .get(locale)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

impl Translate for CatalogTranslator {
    fn translate(&self, key: &LabelKey, locale: &Locale) -> String {
        let language = Locale::new(locale.language());
        [locale, &language, &self.default_locale]
            .into_iter()
            .find_map(|candidate| self.lookup(candidate, key.as_str()))
            .map_or_else(|| humanize(key.as_str()), str::to_owned)
    }
}

fn humanize(key: &str) -> String {
    key.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> CatalogTranslator {
        let mut translator = CatalogTranslator::new(Locale::new("en"));
        translator.add_catalog(Locale::new("en"), [("Log_In", "Log in"), ("Home", "Home")]);
        translator.add_catalog(Locale::new("de"), [("Log_In", "Anmelden")]);
        translator.add_catalog(Locale::new("de-AT"), [("Home", "Startseite")]);
        translator
    }

    #[test]
    fn test_locale_normalizes_separator() {
        let locale = Locale::new("de_AT");

        assert_eq!(locale.as_str(), "de-AT");
        assert_eq!(locale.language(), "de");
    }

    #[test]
    fn test_translate_exact_locale() {
        let label = translator().translate(&"Home".into(), &Locale::new("de-AT"));

        assert_eq!(label, "Startseite");
    }

    #[test]
    fn test_translate_falls_back_to_language() {
        let label = translator().translate(&"Log_In".into(), &Locale::new("de-AT"));

        assert_eq!(label, "Anmelden");
    }

    #[test]
    fn test_translate_falls_back_to_default_locale() {
        let label = translator().translate(&"Home".into(), &Locale::new("fr"));

        assert_eq!(label, "Home");
    }

    #[test]
    fn test_translate_humanizes_unknown_key() {
        let label = translator().translate(&"Public_Home".into(), &Locale::new("fr"));

        assert_eq!(label, "Public Home");
    }

    #[test]
    fn test_translate_with_arguments() {
        let mut translator = CatalogTranslator::new(Locale::default());
        translator.add_catalog(Locale::default(), [("Welcome", "Welcome, {name}")]);

        let label =
            translator.translate_with(&"Welcome".into(), &Locale::default(), &[("name", "Ada")]);

        assert_eq!(label, "Welcome, Ada");
    }

    #[test]
    fn test_locale_serde_round_trip_normalizes() {
        let locale: Locale = serde_json::from_str("\"sv_FI\"").unwrap();

        assert_eq!(locale, Locale::new("sv-FI"));
    }
}
