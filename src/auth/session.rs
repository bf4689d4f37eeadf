use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SESSION_COOKIE: &str = "wotc_session";

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn sign(secret: &str, payload: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// `{expiresAt}:{nonce}:{signature}` where the nonce is 16 random bytes in
/// hex and the signature is HMAC-SHA256 over `{expiresAt}:{nonce}`.
pub fn create_token(secret: &str, ttl: i64, now: i64) -> Option<String> {
    let expires_at = now + ttl;
    let nonce = hex::encode(rand::random::<[u8; 16]>());
    let payload = format!("{expires_at}:{nonce}");
    let signature = sign(secret, &payload)?;
    Some(format!("{payload}:{signature}"))
}

/// Exactly three parts, an expiry still in the future, and a matching signature.
pub fn verify_token(token: &str, secret: &str, now: i64) -> bool {
    let parts: Vec<&str> = token.split(':').collect();
    let [expires_at, nonce, signature] = parts.as_slice() else {
        return false;
    };

    let Ok(expiry) = expires_at.parse::<i64>() else {
        return false;
    };
    if expiry <= now {
        return false;
    }

    match sign(secret, &format!("{expires_at}:{nonce}")) {
        Some(expected) => expected.as_bytes().ct_eq(signature.as_bytes()).into(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cret";
    const NOW: i64 = 1_750_000_000;

    #[test]
    fn fresh_token_verifies() {
        let token = create_token(SECRET, 8 * 60 * 60, NOW).unwrap();
        let parts: Vec<&str> = token.split(':').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], (NOW + 8 * 60 * 60).to_string());
        assert_eq!(parts[1].len(), 32);
        assert_eq!(parts[2].len(), 64);
        assert!(verify_token(&token, SECRET, NOW));
    }

    #[test]
    fn nonces_differ() {
        let a = create_token(SECRET, 60, NOW).unwrap();
        let b = create_token(SECRET, 60, NOW).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn nonce_is_sixteen_unstructured_bytes() {
        let nonces: Vec<String> = (0..64)
            .map(|_| {
                let token = create_token(SECRET, 60, NOW).unwrap();
                token.split(':').nth(1).unwrap().to_string()
            })
            .collect();

        assert!(nonces
            .iter()
            .all(|n| n.len() == 32 && n.chars().all(|c| c.is_ascii_hexdigit())));
        // a v4 UUID pins the 13th hex digit to '4'
        assert!(nonces.iter().any(|n| n.as_bytes()[12] != b'4'));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(SECRET, 60, NOW).unwrap();
        assert!(verify_token(&token, SECRET, NOW + 59));
        assert!(!verify_token(&token, SECRET, NOW + 60));
    }

    #[test]
    fn wrong_secret_or_tampered_expiry_is_rejected() {
        let token = create_token(SECRET, 60, NOW).unwrap();
        assert!(!verify_token(&token, "other", NOW));

        let tampered = token.replacen(&(NOW + 60).to_string(), &(NOW + 6000).to_string(), 1);
        assert!(!verify_token(&tampered, SECRET, NOW));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(!verify_token("", SECRET, NOW));
        assert!(!verify_token("a:b", SECRET, NOW));
        assert!(!verify_token("a:b:c:d", SECRET, NOW));
        assert!(!verify_token("soon:abcd:ef", SECRET, NOW));
    }
}
