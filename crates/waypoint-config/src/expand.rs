//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use std::env::VarError;

use crate::ConfigError;

/// Expand braced environment variable references in `value`.
///
/// Bare `$VAR` is left untouched. An unset variable without a default is an
/// error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| std::env::var(name).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: match e.cause {
                VarError::NotPresent => format!("${{{}}} not set", e.var_name),
                VarError::NotUnicode(_) => format!("${{{}}} is not valid unicode", e.var_name),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_locale_from_env() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("WAYPOINT_TEST_LOCALE", "sv-FI");
        }
        let result = expand_env("${WAYPOINT_TEST_LOCALE}", "navigation.default_locale").unwrap();
        assert_eq!(result, "sv-FI");
        unsafe {
            std::env::remove_var("WAYPOINT_TEST_LOCALE");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WAYPOINT_TEST_UNSET");
        }
        let result = expand_env("${WAYPOINT_TEST_UNSET:-en}", "navigation.default_locale").unwrap();
        assert_eq!(result, "en");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WAYPOINT_TEST_MISSING");
        }
        let err = expand_env("${WAYPOINT_TEST_MISSING}", "checks.default_view").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in checks.default_view: ${WAYPOINT_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("NotFoundView", "f").unwrap(), "NotFoundView");
        assert_eq!(expand_env("$HOME", "f").unwrap(), "$HOME");
    }
}
