//! Configuration management for Waypoint.
//!
//! Parses `waypoint.toml` with serde and provides auto-discovery of the file
//! in the current directory and its parents. The file carries navigation
//! defaults, build checks, and the declarative sitemap definition: pages,
//! redirects, standard pages and label catalogs.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `navigation.default_locale`
//! - `checks.default_view`

mod expand;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the default locale.
    pub default_locale: Option<String>,
    /// Override the sibling sort.
    pub sort: Option<SortSetting>,
    /// Override the sort direction.
    pub direction: Option<DirectionSetting>,
    /// Override the derivation depth limit.
    pub max_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "waypoint.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Navigation defaults.
    pub navigation: NavigationConfig,
    /// Master sitemap build checks.
    pub checks: ChecksConfig,
    /// Page definitions, in insertion order.
    pub pages: Vec<PageConfig>,
    /// Redirects, source path to target path.
    pub redirects: BTreeMap<String, String>,
    /// Standard page name (`login`, `private_home`, ...) to path.
    pub standard_pages: BTreeMap<String, String>,
    /// Label catalogs: locale to (label key to label).
    pub labels: BTreeMap<String, BTreeMap<String, String>>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Sibling sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortSetting {
    #[default]
    Collated,
    Insertion,
    Position,
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSetting {
    #[default]
    Ascending,
    Descending,
}

/// Navigation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Locale used when none is requested and as translation fallback.
    pub default_locale: String,
    /// Sibling sort.
    pub sort: SortSetting,
    /// Sort direction.
    pub direction: DirectionSetting,
    /// Copy only this many levels into user sitemaps.
    pub max_depth: Option<usize>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_owned(),
            sort: SortSetting::default(),
            direction: DirectionSetting::default(),
            max_depth: None,
        }
    }
}

/// Handling of pages that have neither a view nor a redirect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingViewSetting {
    /// Keep them as structural nodes.
    #[default]
    Allow,
    /// Assign `checks.default_view`.
    Default,
    /// Fail the build.
    Error,
}

/// Master sitemap build checks.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Missing view handling.
    pub missing_view: MissingViewSetting,
    /// View assigned when `missing_view = "default"`.
    pub default_view: Option<String>,
    /// Fail the build when a redirect targets an unknown path.
    pub dangling_redirects: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            missing_view: MissingViewSetting::Allow,
            default_view: None,
            dangling_redirects: true,
        }
    }
}

/// Access classification of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessSetting {
    #[default]
    Public,
    Authenticated,
    Guest,
    Permission,
    Roles,
}

/// One `[[pages]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    /// Full path, e.g. `private/orders`. Missing ancestors are created.
    pub path: String,
    /// View rendered for the page.
    pub view: Option<String>,
    /// Label key; defaults to the last path segment.
    pub label: Option<String>,
    /// Access classification.
    #[serde(default)]
    pub access: AccessSetting,
    /// Roles for `access = "roles"`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Permission for `access = "permission"`.
    pub permission: Option<String>,
    /// Explicit position index.
    pub position: Option<i32>,
}

impl PageConfig {
    /// Label key: the configured label or the last path segment.
    #[must_use]
    pub fn label_key(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| {
            self.path
                .trim_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`navigation.default_locale`").
        field: String,
        /// Error message (e.g., "${`LANG`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `waypoint.toml` in current directory and parents,
    /// falling back to an empty configuration.
    ///
    /// CLI settings are applied after loading and take precedence.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(locale) = &settings.default_locale {
            self.navigation.default_locale.clone_from(locale);
        }
        if let Some(sort) = settings.sort {
            self.navigation.sort = sort;
        }
        if let Some(direction) = settings.direction {
            self.navigation.direction = direction;
        }
        if let Some(max_depth) = settings.max_depth {
            self.navigation.max_depth = Some(max_depth);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_navigation()?;
        self.validate_checks()?;
        self.validate_pages()?;
        Ok(())
    }

    fn validate_navigation(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.navigation.default_locale, "navigation.default_locale")?;
        if self.navigation.max_depth == Some(0) {
            return Err(ConfigError::Validation(
                "navigation.max_depth must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_checks(&self) -> Result<(), ConfigError> {
        if self.checks.missing_view == MissingViewSetting::Default {
            let view = self.checks.default_view.as_deref().ok_or_else(|| {
                ConfigError::Validation(
                    "checks.missing_view = \"default\" requires checks.default_view".to_owned(),
                )
            })?;
            require_non_empty(view, "checks.default_view")?;
        }
        Ok(())
    }

    fn validate_pages(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, page) in self.pages.iter().enumerate() {
            if !seen.insert(path_segments(&page.path)) {
                return Err(ConfigError::Validation(format!(
                    "pages[{index}]: duplicate path \"{}\"",
                    page.path
                )));
            }
            match page.access {
                AccessSetting::Permission
                    if page.permission.as_deref().is_none_or(str::is_empty) =>
                {
                    return Err(ConfigError::Validation(format!(
                        "pages[{index}]: access = \"permission\" requires permission"
                    )));
                }
                AccessSetting::Roles if page.roles.is_empty() => {
                    return Err(ConfigError::Validation(format!(
                        "pages[{index}]: access = \"roles\" requires roles"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.navigation.default_locale =
            expand::expand_env(&self.navigation.default_locale, "navigation.default_locale")?;

        if let Some(ref view) = self.checks.default_view {
            self.checks.default_view = Some(expand::expand_env(view, "checks.default_view")?);
        }

        Ok(())
    }
}

/// Decoded segments of a page path, normalized the way the sitemap's URI
/// handler reads it: a leading `#!` and surrounding slashes are ignored and
/// empty segments are dropped.
fn path_segments(path: &str) -> Vec<String> {
    path.trim_start_matches('#')
        .trim_start_matches('!')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.navigation.default_locale, "en");
        assert_eq!(config.navigation.sort, SortSetting::Collated);
        assert_eq!(config.navigation.direction, DirectionSetting::Ascending);
        assert_eq!(config.checks.missing_view, MissingViewSetting::Allow);
        assert!(config.checks.dangling_redirects);
        assert!(config.pages.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("");
        assert_eq!(config.navigation.default_locale, "en");
        assert!(config.redirects.is_empty());
    }

    #[test]
    fn test_parse_navigation_config() {
        let config = parse(
            r#"
[navigation]
default_locale = "sv-FI"
sort = "position"
direction = "descending"
max_depth = 3
"#,
        );
        assert_eq!(config.navigation.default_locale, "sv-FI");
        assert_eq!(config.navigation.sort, SortSetting::Position);
        assert_eq!(config.navigation.direction, DirectionSetting::Descending);
        assert_eq!(config.navigation.max_depth, Some(3));
    }

    #[test]
    fn test_parse_pages() {
        let config = parse(
            r#"
[[pages]]
path = "public/home"
view = "HomeView"
label = "Public_Home"

[[pages]]
path = "private/orders"
view = "OrdersView"
access = "permission"
permission = "orders:view"
position = 2

[[pages]]
path = "private/admin"
view = "AdminView"
access = "roles"
roles = ["admin", "ops"]
"#,
        );
        assert_eq!(config.pages.len(), 3);
        assert_eq!(config.pages[0].label_key(), "Public_Home");
        assert_eq!(config.pages[0].access, AccessSetting::Public);
        assert_eq!(config.pages[1].permission.as_deref(), Some("orders:view"));
        assert_eq!(config.pages[1].position, Some(2));
        assert_eq!(config.pages[2].roles, vec!["admin", "ops"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_label_defaults_to_last_segment() {
        let config = parse(
            r#"
[[pages]]
path = "/private/orders/"
"#,
        );
        assert_eq!(config.pages[0].label_key(), "orders");
    }

    #[test]
    fn test_parse_unknown_page_field_fails() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[[pages]]
path = "a"
veiw = "Typo"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_redirects_standard_pages_labels() {
        let config = parse(
            r#"
[redirects]
"private" = "private/home"

[standard_pages]
login = "login"
private_home = "private/home"

[labels.en]
Public_Home = "Welcome"

[labels.de]
Public_Home = "Willkommen"
"#,
        );
        assert_eq!(
            config.redirects.get("private").map(String::as_str),
            Some("private/home")
        );
        assert_eq!(config.standard_pages.len(), 2);
        assert_eq!(
            config.labels["de"].get("Public_Home").map(String::as_str),
            Some("Willkommen")
        );
    }

    #[test]
    fn test_validate_default_view_required() {
        let config = parse(
            r#"
[checks]
missing_view = "default"
"#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("checks.default_view"));
    }

    #[test]
    fn test_validate_default_view_present() {
        let config = parse(
            r#"
[checks]
missing_view = "default"
default_view = "NotFoundView"
"#,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_page_path() {
        let config = parse(
            r#"
[[pages]]
path = "a/b"

[[pages]]
path = "/a/b/"
"#,
        );
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: pages[1]: duplicate path \"/a/b/\""
        );
    }

    #[test]
    fn test_validate_duplicate_page_path_after_normalization() {
        for (first, second) in [("a", "#!a"), ("a/b", "a//b"), ("a b", "a%20b")] {
            let config = parse(&format!(
                r#"
[[pages]]
path = "{first}"

[[pages]]
path = "{second}"
"#
            ));
            let err = config.validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Configuration error: pages[1]: duplicate path \"{second}\"")
            );
        }
    }

    #[test]
    fn test_validate_distinct_nested_paths() {
        let config = parse(
            r#"
[[pages]]
path = "a/b"

[[pages]]
path = "a/b/c"
"#,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_permission_required() {
        let config = parse(
            r#"
[[pages]]
path = "a"
access = "permission"
"#,
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_roles_required() {
        let config = parse(
            r#"
[[pages]]
path = "a"
access = "roles"
"#,
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_max_depth_zero() {
        let config = parse(
            r"
[navigation]
max_depth = 0
",
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let settings = CliSettings {
            default_locale: Some("de".to_owned()),
            sort: Some(SortSetting::Insertion),
            direction: None,
            max_depth: Some(2),
        };

        config.apply_cli_settings(&settings);

        assert_eq!(config.navigation.default_locale, "de");
        assert_eq!(config.navigation.sort, SortSetting::Insertion);
        assert_eq!(config.navigation.direction, DirectionSetting::Ascending);
        assert_eq!(config.navigation.max_depth, Some(2));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.navigation.default_locale, "en");
        assert_eq!(config.navigation.max_depth, None);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        std::fs::write(
            &path,
            r#"
[navigation]
default_locale = "${WAYPOINT_LOAD_TEST_LOCALE:-fi}"

[[pages]]
path = "public"
view = "PublicView"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.navigation.default_locale, "fi");
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        std::fs::write(&path, "[navigation\n").unwrap();

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        std::fs::write(&path, "[navigation]\nsort = \"position\"\n").unwrap();
        let settings = CliSettings {
            sort: Some(SortSetting::Collated),
            ..CliSettings::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.navigation.sort, SortSetting::Collated);
    }
}
