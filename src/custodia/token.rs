//! Signed access tokens (HS256).
//!
//! Tokens are stateless: existence is proven only by a valid HMAC-SHA256
//! signature and an unexpired timestamp. The signing secret is
//! process-wide, injected at construction, and never rotated mid-process.
//!
//! Every token carries a purpose. Verification requires the caller's
//! expected purpose to match exactly, so a password-recovery token can
//! never be replayed against an operation that expects an authentication
//! token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// What a signed token is allowed to be used for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenPurpose {
    #[serde(rename = "authentication")]
    Authentication,
    #[serde(rename = "password-recovery")]
    PasswordRecovery,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
    #[serde(rename = "redirectUri", skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl TokenPayload {
    /// Build a payload expiring `ttl_seconds` after `now`.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        purpose: TokenPurpose,
        redirect_uri: Option<String>,
        now: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            user_id,
            iat: now,
            exp: now + ttl_seconds,
            purpose,
            redirect_uri,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token purpose mismatch")]
    PurposeMismatch,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = URL_SAFE_NO_PAD.decode(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(0))
}

/// Signs and verifies access tokens with a process-wide secret.
pub struct TokenSigner {
    secret: SecretString,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| Error::InvalidKey)
    }

    /// Create an HS256 signed token from the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded or the key is
    /// unusable.
    pub fn sign(&self, payload: &TokenPayload) -> Result<String, Error> {
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(payload)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a signed token and return its decoded payload.
    ///
    /// Checks, in order: token format, header algorithm, signature
    /// (constant time), expiry against `now_unix_seconds`, and exact
    /// purpose match.
    ///
    /// # Errors
    ///
    /// - [`Error::TokenFormat`], [`Error::Base64`], [`Error::Json`] for
    ///   malformed tokens,
    /// - [`Error::UnsupportedAlg`] for a header algorithm other than HS256,
    /// - [`Error::InvalidSignature`] when the signature does not match,
    /// - [`Error::Expired`] when `now_unix_seconds >= exp`,
    /// - [`Error::PurposeMismatch`] when the purpose differs from
    ///   `expected_purpose`.
    pub fn verify(
        &self,
        token: &str,
        expected_purpose: TokenPurpose,
        now_unix_seconds: i64,
    ) -> Result<TokenPayload, Error> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
        if parts.next().is_some() {
            return Err(Error::TokenFormat);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(Error::UnsupportedAlg(header.alg));
        }

        let signature = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| Error::Base64)?;
        let mut mac = self.mac()?;
        mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature)?;

        let payload: TokenPayload = b64d_json(claims_b64)?;
        if now_unix_seconds >= payload.exp {
            return Err(Error::Expired);
        }
        if payload.purpose != expected_purpose {
            return Err(Error::PurposeMismatch);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> TokenSigner {
        TokenSigner::new(SecretString::from(
            "0123456789abcdef0123456789abcdef".to_string(),
        ))
    }

    fn payload(purpose: TokenPurpose, redirect_uri: Option<String>) -> TokenPayload {
        TokenPayload::new(Uuid::nil(), purpose, redirect_uri, NOW, 3600)
    }

    #[test]
    fn sign_and_verify_round_trip() -> Result<(), Error> {
        let signer = signer();
        let original = payload(TokenPurpose::Authentication, None);

        let token = signer.sign(&original)?;
        assert_eq!(token.split('.').count(), 3);

        let verified = signer.verify(&token, TokenPurpose::Authentication, NOW)?;
        assert_eq!(verified, original);
        Ok(())
    }

    #[test]
    fn recovery_token_preserves_redirect() -> Result<(), Error> {
        let signer = signer();
        let original = payload(
            TokenPurpose::PasswordRecovery,
            Some("https://app.example.test/done".to_string()),
        );

        let token = signer.sign(&original)?;
        let verified = signer.verify(&token, TokenPurpose::PasswordRecovery, NOW)?;
        assert_eq!(
            verified.redirect_uri.as_deref(),
            Some("https://app.example.test/done")
        );
        assert_eq!(verified.user_id, original.user_id);
        Ok(())
    }

    #[test]
    fn rejects_at_and_after_expiry() -> Result<(), Error> {
        let signer = signer();
        let token = signer.sign(&payload(TokenPurpose::PasswordRecovery, None))?;

        // One second before expiry is still valid.
        let result = signer.verify(&token, TokenPurpose::PasswordRecovery, NOW + 3599);
        assert!(result.is_ok());

        // The expiry instant itself is rejected.
        let result = signer.verify(&token, TokenPurpose::PasswordRecovery, NOW + 3600);
        assert!(matches!(result, Err(Error::Expired)));

        let result = signer.verify(&token, TokenPurpose::PasswordRecovery, NOW + 9999);
        assert!(matches!(result, Err(Error::Expired)));
        Ok(())
    }

    #[test]
    fn rejects_purpose_mismatch() -> Result<(), Error> {
        let signer = signer();
        let token = signer.sign(&payload(TokenPurpose::PasswordRecovery, None))?;

        let result = signer.verify(&token, TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::PurposeMismatch)));
        Ok(())
    }

    #[test]
    fn rejects_wrong_secret() -> Result<(), Error> {
        let token = signer().sign(&payload(TokenPurpose::Authentication, None))?;

        let other = TokenSigner::new(SecretString::from("another-secret".to_string()));
        let result = other.verify(&token, TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_tampered_claims() -> Result<(), Error> {
        let signer = signer();
        let token = signer.sign(&payload(TokenPurpose::PasswordRecovery, None))?;

        // Swap the claims segment for one with a different purpose.
        let forged_claims = b64e_json(&payload(TokenPurpose::Authentication, None))?;
        let mut parts = token.split('.');
        let header = parts.next().ok_or(Error::TokenFormat)?;
        let _claims = parts.next().ok_or(Error::TokenFormat)?;
        let signature = parts.next().ok_or(Error::TokenFormat)?;
        let forged = format!("{header}.{forged_claims}.{signature}");

        let result = signer.verify(&forged, TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_malformed_tokens() {
        let signer = signer();

        let result = signer.verify("not-a-token", TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::TokenFormat)));

        let result = signer.verify("a.b.c.d", TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::TokenFormat)));

        let result = signer.verify("!!!.???.***", TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::Base64)));
    }

    #[test]
    fn rejects_unsupported_algorithm() -> Result<(), Error> {
        let signer = signer();
        let header = b64e_json(&TokenHeader {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })?;
        let claims = b64e_json(&payload(TokenPurpose::Authentication, None))?;
        let forged = format!("{header}.{claims}.{claims}");

        let result = signer.verify(&forged, TokenPurpose::Authentication, NOW);
        assert!(matches!(result, Err(Error::UnsupportedAlg(alg)) if alg == "none"));
        Ok(())
    }

    #[test]
    fn payload_serializes_conceptual_field_names() -> Result<(), Error> {
        let payload = payload(TokenPurpose::PasswordRecovery, Some("/done".to_string()));
        let value = serde_json::to_value(&payload)?;

        assert!(value.get("userId").is_some());
        assert_eq!(
            value.get("type").and_then(serde_json::Value::as_str),
            Some("password-recovery")
        );
        assert_eq!(
            value.get("redirectUri").and_then(serde_json::Value::as_str),
            Some("/done")
        );

        // No redirect: the field is omitted entirely.
        let bare = super::TokenPayload::new(Uuid::nil(), TokenPurpose::Authentication, None, NOW, 60);
        let value = serde_json::to_value(&bare)?;
        assert!(value.get("redirectUri").is_none());
        assert_eq!(
            value.get("type").and_then(serde_json::Value::as_str),
            Some("authentication")
        );
        Ok(())
    }

    #[test]
    fn unix_now_is_past_2023() {
        assert!(unix_now() > 1_680_000_000);
    }
}
