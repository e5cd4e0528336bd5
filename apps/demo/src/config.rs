//! Demo configuration loaded from environment variables.

use std::env;

const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub base_url: String,
    /// Enable JSON logging (for production).
    pub json_logs: bool,
}

impl DemoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("QUILL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            json_logs: env::var("QUILL_LOG_FORMAT")
                .map(|v| is_json_format(&v))
                .unwrap_or(false),
        }
    }
}

/// Anything other than `json` (case-insensitive) selects pretty logs.
fn is_json_format(format: &str) -> bool {
    format.eq_ignore_ascii_case("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_format_is_case_insensitive_and_defaults_to_pretty() {
        assert!(is_json_format("json"));
        assert!(is_json_format("JSON"));
        assert!(!is_json_format("pretty"));
        assert!(!is_json_format(""));
    }
}
