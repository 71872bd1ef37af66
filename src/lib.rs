//! # Custodia (Authentication & Password Recovery)
//!
//! `custodia` verifies user credentials, issues and revokes bearer tokens,
//! and runs a time-limited, cryptographically signed password-recovery
//! flow.
//!
//! ## Tokens
//!
//! Two token kinds are issued:
//!
//! - **Permanent tokens** are high-entropy opaque strings stored
//!   server-side, one per login (multi-device). They can be exchanged for
//!   access tokens and revoked individually or all at once.
//! - **Signed access tokens** are stateless HMAC-SHA256 signed credentials
//!   with a mandatory expiry and a purpose field. They are never stored;
//!   their validity is proven only by signature and clock.
//!
//! ## Password recovery
//!
//! Recovery is stateless on the server: the emailed link carries a signed
//! token scoped to the `password-recovery` purpose, embedding the target
//! user and an optional post-recovery redirect. Tokens of any other
//! purpose are rejected, so a recovery token can never be replayed as a
//! login credential (and vice versa).

pub mod cli;
pub mod custodia;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
