//! Environment variable helpers for the configuration layer.

/// Read an environment variable as a trimmed string.
///
/// Blank values are treated the same as unset ones so that `FOO=` in a shell
/// profile does not override a default.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_unset() {
        std::env::set_var("REVIEWS_TEST_BLANK", "   ");
        assert_eq!(env_string("REVIEWS_TEST_BLANK"), None);
        assert_eq!(env_string("REVIEWS_NONEXISTENT_VAR_1"), None);
        std::env::remove_var("REVIEWS_TEST_BLANK");
    }

    #[test]
    fn test_env_string_trims() {
        std::env::set_var("REVIEWS_TEST_STRING", "  https://api.devnet.solana.com ");
        assert_eq!(
            env_string("REVIEWS_TEST_STRING").as_deref(),
            Some("https://api.devnet.solana.com")
        );
        std::env::remove_var("REVIEWS_TEST_STRING");
    }
}
