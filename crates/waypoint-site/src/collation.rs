//! Locale-aware sort keys for node labels.
//!
//! A [`CollationKey`] compares with plain `Ord`, so labels are collated once
//! when a user sitemap is derived and sorting afterwards is a key comparison.

use std::cmp::Ordering;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::i18n::Locale;

/// Precomputed, comparable sort key.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey(Vec<u32>);

impl CollationKey {
    /// Raw weights.
    #[must_use]
    pub fn weights(&self) -> &[u32] {
        &self.0
    }
}

/// Produces collation keys for one locale.
pub trait Collator: Send + Sync {
    /// Sort key for `text`.
    fn key(&self, text: &str) -> CollationKey;

    /// Compare two strings by their keys.
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
}

/// Provides a [`Collator`] per locale.
pub trait CollatorFactory: Send + Sync {
    /// Collator for `locale`.
    fn collator(&self, locale: &Locale) -> Arc<dyn Collator>;
}

/// Letters sorted after `z`, with their rank and a secondary weight that
/// separates letters sharing a rank.
type Tailoring = &'static [(char, u32, u32)];

const SWEDISH: Tailoring = &[
    ('å', 1, 1),
    ('ä', 2, 1),
    ('æ', 2, 2),
    ('ö', 3, 1),
    ('ø', 3, 2),
];

const DANISH_NORWEGIAN: Tailoring = &[
    ('æ', 1, 1),
    ('ä', 1, 2),
    ('ø', 2, 1),
    ('ö', 2, 2),
    ('å', 3, 1),
];

/// Weight multiplier leaving room for tailored letters between code points.
const PRIMARY_STEP: u32 = 8;

/// Three-level folding collator.
///
/// - primary: decomposed base letters, lowercased, marks removed
/// - secondary: the combining mark attached to each base letter
/// - tertiary: case, lowercase before uppercase
///
/// Swedish, Finnish, Danish and Norwegian sort their extra letters after
/// `z`; German expands `ß` to `ss`.
#[derive(Clone, Debug)]
pub struct FoldingCollator {
    tailoring: Tailoring,
    expand_sharp_s: bool,
}

impl FoldingCollator {
    /// Collator with the tailoring for `locale`.
    #[must_use]
    pub fn for_locale(locale: &Locale) -> Self {
        let language = locale.language();
        let tailoring: Tailoring = match language.as_str() {
            "sv" | "fi" => SWEDISH,
            "da" | "nb" | "nn" | "no" => DANISH_NORWEGIAN,
            _ => &[],
        };
        Self {
            tailoring,
            expand_sharp_s: language == "de",
        }
    }

    fn push(&self, c: char, levels: &mut Levels) {
        let tertiary = if c.is_uppercase() { 2 } else { 1 };
        let lower = c.to_lowercase().next().unwrap_or(c);

        if let Some(&(_, rank, secondary)) = self.tailoring.iter().find(|(t, _, _)| *t == lower) {
            levels.push(u32::from('z') * PRIMARY_STEP + rank, secondary, tertiary);
            return;
        }
        if self.expand_sharp_s && lower == 'ß' {
            let s = u32::from('s') * PRIMARY_STEP;
            levels.push(s, 1, tertiary);
            levels.push(s, 1, tertiary);
            return;
        }

        for d in c.to_string().nfd() {
            if is_combining_mark(d) {
                levels.mark(u32::from(d));
            } else {
                for folded in d.to_lowercase() {
                    levels.push(u32::from(folded) * PRIMARY_STEP, 1, tertiary);
                }
            }
        }
    }
}

impl Collator for FoldingCollator {
    fn key(&self, text: &str) -> CollationKey {
        let mut levels = Levels::default();
        for c in text.chars() {
            self.push(c, &mut levels);
        }
        levels.into_key()
    }
}

/// [`CollatorFactory`] handing out [`FoldingCollator`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldingCollatorFactory;

impl CollatorFactory for FoldingCollatorFactory {
    fn collator(&self, locale: &Locale) -> Arc<dyn Collator> {
        Arc::new(FoldingCollator::for_locale(locale))
    }
}

#[derive(Default)]
struct Levels {
    primary: Vec<u32>,
    secondary: Vec<u32>,
    tertiary: Vec<u32>,
}

impl Levels {
    fn push(&mut self, primary: u32, secondary: u32, tertiary: u32) {
        self.primary.push(primary);
        self.secondary.push(secondary);
        self.tertiary.push(tertiary);
    }

    /// Attach a combining mark to the last base letter.
    fn mark(&mut self, mark: u32) {
        match self.secondary.last_mut() {
            Some(last) if *last == 1 => *last = mark,
            Some(_) => {}
            None => self.push(0, mark, 1),
        }
    }

    fn into_key(self) -> CollationKey {
        let mut weights = Vec::with_capacity(self.primary.len() * 3 + 2);
        weights.extend(self.primary);
        weights.push(0);
        weights.extend(self.secondary);
        weights.push(0);
        weights.extend(self.tertiary);
        CollationKey(weights)
    }
}
