use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hex SHA-256 digest of an API key, the only form that touches the
/// database
pub fn hash_api_key(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex_encode(&digest)
}

/// Generate a fresh API key
///
/// Returned in plaintext exactly once, at account creation.
pub fn generate_api_key() -> String {
    format!(
        "esk_{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Mint a signed session token: `base64(user_id.expiry).base64(hmac)`
pub fn mint_session_token(user_id: i64, ttl_secs: i64, secret: &str, now: DateTime<Utc>) -> String {
    let expiry = now.timestamp() + ttl_secs;
    let payload = format!("{}.{}", user_id, expiry);
    let signature = sign(&payload, secret);

    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Verify a session token; Some(user_id) when the signature matches and
/// the token has not expired
pub fn verify_session_token(token: &str, secret: &str, now: DateTime<Utc>) -> Option<i64> {
    let (payload_b64, signature_b64) = token.split_once('.')?;

    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let payload = String::from_utf8(payload_bytes).ok()?;
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let (user_id, expiry) = payload.split_once('.')?;
    let user_id: i64 = user_id.parse().ok()?;
    let expiry: i64 = expiry.parse().ok()?;

    if expiry < now.timestamp() {
        return None;
    }

    Some(user_id)
}

/// Constant-time comparison for the cron shared secret
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    // Compare digests so length differences leak nothing either
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

fn sign(payload: &str, secret: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_api_key_hash_is_stable_hex() {
        let hash = hash_api_key("esk_abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key("esk_abc"));
        assert_ne!(hash, hash_api_key("esk_abd"));
    }

    #[test]
    fn test_generated_keys_are_unique() {
        assert_ne!(generate_api_key(), generate_api_key());
        assert!(generate_api_key().starts_with("esk_"));
    }

    #[test]
    fn test_session_token_round_trip() {
        let now = Utc::now();
        let token = mint_session_token(42, 3600, SECRET, now);

        assert_eq!(verify_session_token(&token, SECRET, now), Some(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let token = mint_session_token(42, 60, SECRET, now);

        let later = now + Duration::seconds(61);
        assert_eq!(verify_session_token(&token, SECRET, later), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let token = mint_session_token(42, 3600, SECRET, now);

        assert_eq!(verify_session_token(&token, "other", now), None);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = mint_session_token(42, 3600, SECRET, now);

        // Swap the user id inside the payload half
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(format!("1.{}", now.timestamp() + 3600).as_bytes());
        let forged = format!("{}.{}", forged_payload, signature);

        assert_eq!(verify_session_token(&forged, SECRET, now), None);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert_eq!(verify_session_token("not-a-token", SECRET, Utc::now()), None);
        assert_eq!(verify_session_token("", SECRET, Utc::now()), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("secret", "secret"));
        assert!(!constant_time_eq("secret", "secrets"));
        assert!(!constant_time_eq("secret", ""));
    }
}
