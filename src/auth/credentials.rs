use subtle::ConstantTimeEq;

use crate::config::Config;

/// Compares both fields without short-circuiting.
pub fn credentials_match(config: &Config, username: &str, password: &str) -> bool {
    let user_ok = username.as_bytes().ct_eq(config.auth_username.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(config.auth_password.as_bytes());
    (user_ok & pass_ok).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_configured_pair_matches() {
        let config = Config::for_tests();
        assert!(credentials_match(&config, "admin", "s3cret"));
        assert!(!credentials_match(&config, "admin", "s3cret "));
        assert!(!credentials_match(&config, "Admin", "s3cret"));
        assert!(!credentials_match(&config, "", ""));
    }
}
