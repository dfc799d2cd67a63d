use subtle::ConstantTimeEq;

/// Compare an inbound `x-api-key` value with the configured key in constant time.
/// A missing header never matches.
pub fn api_key_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches(Some("secret123"), "secret123"));
        assert!(!api_key_matches(Some("secret124"), "secret123"));
        assert!(!api_key_matches(Some("secret12"), "secret123"));
        assert!(!api_key_matches(Some(""), "secret123"));
        assert!(!api_key_matches(None, "secret123"));
    }
}
