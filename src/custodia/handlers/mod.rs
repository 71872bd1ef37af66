//! HTTP handlers and shared request utilities.

pub mod auth;
pub mod health;
pub mod logout;
pub mod password;
pub mod recovery;
pub mod token;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

/// Wire shape of a successful operation acknowledgement.
#[derive(Serialize, ToSchema, Debug)]
pub struct SuccessResponse {
    pub code: String,
    pub description: String,
}

impl SuccessResponse {
    #[must_use]
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

/// Lightweight email sanity check used before credential lookups.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Extract the raw Authorization header value, tolerating an optional
/// `Basic`/`Bearer` scheme prefix.
#[must_use]
pub fn authorization_value(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Basic ")
        .or_else(|| trimmed.strip_prefix("Bearer "))
        .unwrap_or(trimmed)
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Decode a base64 `email:password` credential pair.
#[must_use]
pub fn decode_basic_credentials(value: &str) -> Option<(String, String)> {
    let decoded = STANDARD.decode(value.as_bytes()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    if email.is_empty() || password.is_empty() {
        return None;
    }
    Some((email.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn authorization_value_strips_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(authorization_value(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic YWJjOmRlZg=="));
        assert_eq!(
            authorization_value(&headers).as_deref(),
            Some("YWJjOmRlZg==")
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("  raw-token  "));
        assert_eq!(authorization_value(&headers).as_deref(), Some("raw-token"));
    }

    #[test]
    fn authorization_value_none_when_missing_or_empty() {
        let headers = HeaderMap::new();
        assert_eq!(authorization_value(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(authorization_value(&headers), None);
    }

    #[test]
    fn decode_basic_credentials_round_trip() {
        // base64("alice@example.com:secret1")
        let encoded = STANDARD.encode("alice@example.com:secret1");
        let decoded = decode_basic_credentials(&encoded);
        assert_eq!(
            decoded,
            Some(("alice@example.com".to_string(), "secret1".to_string()))
        );
    }

    #[test]
    fn decode_basic_credentials_rejects_bad_input() {
        assert_eq!(decode_basic_credentials("not base64!!"), None);

        let no_colon = STANDARD.encode("alice@example.com");
        assert_eq!(decode_basic_credentials(&no_colon), None);

        let empty_password = STANDARD.encode("alice@example.com:");
        assert_eq!(decode_basic_credentials(&empty_password), None);

        let empty_email = STANDARD.encode(":secret1");
        assert_eq!(decode_basic_credentials(&empty_email), None);
    }

    #[test]
    fn decode_basic_credentials_keeps_colons_in_password() {
        let encoded = STANDARD.encode("alice@example.com:pa:ss:1");
        assert_eq!(
            decode_basic_credentials(&encoded),
            Some(("alice@example.com".to_string(), "pa:ss:1".to_string()))
        );
    }
}
