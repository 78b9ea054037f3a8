//! Environment variable interpolation for config files.
//!
//! Supports the following syntax:
//! - `${VAR}` - substitute with env var value, error if missing
//! - `${VAR:-default}` - use default if VAR is unset or empty
//! - `${VAR-default}` - use default only if VAR is unset
//! - `$$` - escape sequence for a literal `$`

use std::env;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `$$` and the braced variable forms with optional defaults.
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                           # Escape sequence $$
        |
        \$\{
            ([A-Za-z_][A-Za-z0-9_]*)   # Variable name (capture group 1)
            (?:
                (:?-)                  # :- or - (capture group 2)
                ([^}]*)                # Default value (capture group 3)
            )?
        \}
        ",
    )
    .expect("invalid interpolation pattern")
});

/// Result of environment variable interpolation.
#[derive(Debug)]
pub struct InterpolationResult {
    /// The interpolated text.
    pub text: String,
    /// Any errors encountered during interpolation.
    pub errors: Vec<String>,
}

impl InterpolationResult {
    /// Returns true if there were no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Interpolate environment variables in the given text.
///
/// All errors are accumulated so the user can see every missing variable
/// at once.
pub fn interpolate(input: &str) -> InterpolationResult {
    let mut errors = Vec::new();

    let text = ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            if caps.get(0).map(|m| m.as_str()) == Some("$$") {
                return "$".to_string();
            }

            let var_name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let default_syntax = caps.get(2).map(|m| m.as_str());
            let default_value = caps.get(3).map(|m| m.as_str());

            match env::var(var_name) {
                Ok(value) if value.is_empty() && default_syntax == Some(":-") => {
                    default_value.unwrap_or("").to_string()
                }
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => {
                        errors.push(format!("environment variable '{var_name}' is not set"));
                        String::new()
                    }
                },
            }
        })
        .into_owned();

    InterpolationResult { text, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let result = interpolate("engines:\n  xapi: {}\n");
        assert!(result.is_ok());
        assert_eq!(result.text, "engines:\n  xapi: {}\n");
    }

    #[test]
    fn test_braced_variable() {
        env::set_var("REDRIVE_TEST_QUEUE", "/var/lib/queue");
        let result = interpolate("queue_dir: ${REDRIVE_TEST_QUEUE}");
        assert!(result.is_ok());
        assert_eq!(result.text, "queue_dir: /var/lib/queue");
    }

    #[test]
    fn test_default_when_unset() {
        env::remove_var("REDRIVE_TEST_UNSET");
        let result = interpolate("endpoint: ${REDRIVE_TEST_UNSET:-http://localhost}");
        assert!(result.is_ok());
        assert_eq!(result.text, "endpoint: http://localhost");
    }

    #[test]
    fn test_default_when_empty_requires_colon() {
        env::set_var("REDRIVE_TEST_EMPTY", "");
        let result = interpolate("a: ${REDRIVE_TEST_EMPTY:-fallback} b: ${REDRIVE_TEST_EMPTY-fallback}");
        assert!(result.is_ok());
        assert_eq!(result.text, "a: fallback b: ");
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        env::remove_var("REDRIVE_TEST_MISSING");
        let result = interpolate("endpoint: ${REDRIVE_TEST_MISSING}");
        assert!(!result.is_ok());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("REDRIVE_TEST_MISSING"));
    }

    #[test]
    fn test_escape_sequence() {
        let result = interpolate("password: $$ecret");
        assert!(result.is_ok());
        assert_eq!(result.text, "password: $ecret");
    }

    #[test]
    fn test_errors_accumulate() {
        env::remove_var("REDRIVE_TEST_A");
        env::remove_var("REDRIVE_TEST_B");
        let result = interpolate("${REDRIVE_TEST_A} ${REDRIVE_TEST_B}");
        assert_eq!(result.errors.len(), 2);
    }
}
