//! Session cookie tokens
//!
//! Token format: `<session uuid>.<base64url(HMAC-SHA256(secret, uuid))>`.

use platform::client::ClientFingerprint;
use platform::crypto::{constant_time_eq, from_base64_url, hmac_sha256, to_base64_url};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::error::{AuthError, AuthResult};

pub fn sign(secret: &[u8], session_id: Uuid) -> String {
    let id = session_id.to_string();
    let signature = hmac_sha256(secret, id.as_bytes());
    format!("{id}.{}", to_base64_url(&signature))
}

/// Verify the signature and return the session id
pub fn verify(secret: &[u8], token: &str) -> AuthResult<Uuid> {
    let (id, signature_b64) = token.split_once('.').ok_or(AuthError::SessionInvalid)?;

    let signature = from_base64_url(signature_b64).map_err(|_| AuthError::SessionInvalid)?;
    let expected = hmac_sha256(secret, id.as_bytes());
    if !constant_time_eq(&expected, &signature) {
        return Err(AuthError::SessionInvalid);
    }

    id.parse().map_err(|_| AuthError::SessionInvalid)
}

/// Build a new session for `user` bound to the caller's fingerprint
pub fn new_session(
    config: &AuthConfig,
    user: &User,
    remember_me: bool,
    fingerprint: &ClientFingerprint,
) -> AuthResult<AuthSession> {
    let ttl = chrono::Duration::from_std(config.session_ttl(remember_me))
        .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;

    Ok(AuthSession::new(
        user.user_id,
        user.public_id,
        remember_me,
        fingerprint.hash_vec(),
        fingerprint.ip_string(),
        fingerprint.user_agent.clone(),
        ttl,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = &[7u8; 32];

    #[test]
    fn test_sign_and_verify() {
        let id = Uuid::new_v4();
        let token = sign(SECRET, id);
        assert_eq!(verify(SECRET, &token).unwrap(), id);
    }

    #[test]
    fn test_rejects_tampering() {
        let token = sign(SECRET, Uuid::new_v4());
        let (_, sig) = token.split_once('.').unwrap();

        let swapped = format!("{}.{sig}", Uuid::new_v4());
        assert!(verify(SECRET, &swapped).is_err());
        assert!(verify(&[8u8; 32], &token).is_err());
        assert!(verify(SECRET, "no-dot").is_err());
        assert!(verify(SECRET, "abc.!!!").is_err());
    }
}
