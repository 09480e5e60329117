//! Environment variable helpers used by the `*Config::from_env` constructors.
//!
//! Missing or unparsable values fall back to the default.

use std::str::FromStr;

/// Parse a variable, falling back to `default`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a string variable, falling back to `default` when unset or blank.
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a boolean flag (`true`/`1`/`yes`).
pub fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// Read a comma separated list.
pub fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    std::env::var(key)
        .map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| default.iter().map(|s| s.to_string()).collect())
}

/// Check if running in production mode (`ENVIRONMENT=production`).
pub fn is_production() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_parses_and_falls_back() {
        std::env::set_var("VCLUSTER_TEST_PORT", " 9100 ");
        assert_eq!(env_or::<u16>("VCLUSTER_TEST_PORT", 1), 9100);

        std::env::set_var("VCLUSTER_TEST_BAD_PORT", "not-a-port");
        assert_eq!(env_or::<u16>("VCLUSTER_TEST_BAD_PORT", 8000), 8000);

        assert_eq!(env_or::<u64>("VCLUSTER_TEST_UNSET", 30), 30);
    }

    #[test]
    fn test_env_string_ignores_blank() {
        std::env::set_var("VCLUSTER_TEST_BLANK", "   ");
        assert_eq!(env_string("VCLUSTER_TEST_BLANK", "fallback"), "fallback");
    }

    #[test]
    fn test_env_flag() {
        std::env::set_var("VCLUSTER_TEST_FLAG_ON", "1");
        std::env::set_var("VCLUSTER_TEST_FLAG_OFF", "false");
        assert!(env_flag("VCLUSTER_TEST_FLAG_ON", false));
        assert!(!env_flag("VCLUSTER_TEST_FLAG_OFF", true));
        assert!(env_flag("VCLUSTER_TEST_FLAG_UNSET", true));
    }

    #[test]
    fn test_env_list() {
        std::env::set_var("VCLUSTER_TEST_ORIGINS", "http://a, http://b,");
        assert_eq!(
            env_list("VCLUSTER_TEST_ORIGINS", &["*"]),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
        assert_eq!(env_list("VCLUSTER_TEST_ORIGINS_UNSET", &["*"]), vec!["*"]);
    }
}
