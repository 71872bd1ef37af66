//! Auth configuration and shared request state.

use crate::custodia::{
    password::{PasswordHasher, PasswordPolicy},
    token::TokenSigner,
};

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_RECOVERY_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_MAIL_FROM: &str = "no-reply@localhost";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    mail_from: String,
    access_token_ttl_seconds: i64,
    recovery_token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            recovery_token_ttl_seconds: DEFAULT_RECOVERY_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_mail_from(mut self, mail_from: String) -> Self {
        self.mail_from = mail_from;
        self
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_recovery_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.recovery_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn mail_from(&self) -> &str {
        &self.mail_from
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn recovery_token_ttl_seconds(&self) -> i64 {
        self.recovery_token_ttl_seconds
    }

    /// Default landing endpoint for emailed recovery links.
    #[must_use]
    pub fn input_recovery_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/auth/input-recovery")
    }
}

/// Immutable per-process auth state shared with every handler.
pub struct AuthState {
    config: AuthConfig,
    signer: TokenSigner,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        signer: TokenSigner,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            config,
            signer,
            hasher,
            policy,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }
}
