//! Password policy checks and password hashing.

use crate::custodia::error::InvalidInputReason;
use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;

const DEFAULT_MIN_LENGTH: usize = 8;
const PHC_ARGON2_PREFIX: &str = "$argon2";

/// Pure strength/format rules for new passwords.
///
/// `validate` never panics and has no side effects; the same input always
/// yields the same verdict.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    require_numeric: bool,
    require_special: bool,
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            require_numeric: true,
            require_special: false,
        }
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn with_require_numeric(mut self, require_numeric: bool) -> Self {
        self.require_numeric = require_numeric;
        self
    }

    #[must_use]
    pub fn with_require_special(mut self, require_special: bool) -> Self {
        self.require_special = require_special;
        self
    }

    /// Check a password against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as an [`InvalidInputReason`].
    pub fn validate(&self, password: &str) -> Result<(), InvalidInputReason> {
        if password.chars().count() < self.min_length {
            return Err(InvalidInputReason::TooShort);
        }
        if self.require_numeric && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(InvalidInputReason::NeedsNumericCharacters);
        }
        if self.require_special && password.chars().all(char::is_alphanumeric) {
            return Err(InvalidInputReason::NeedsSpecialCharacters);
        }
        Ok(())
    }

    /// Boolean form of [`validate`](Self::validate).
    #[must_use]
    pub fn is_valid(&self, password: &str) -> bool {
        self.validate(password).is_ok()
    }

    /// Equality check for two-field (password + verification) forms.
    #[must_use]
    pub fn matches(&self, password: &str, verification: &str) -> bool {
        password.as_bytes().ct_eq(verification.as_bytes()).into()
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes and verifies stored passwords.
///
/// Hashing is controlled by an explicit flag injected from configuration,
/// never by sniffing the environment. With hashing disabled (local
/// development only) passwords are stored verbatim and compared in
/// constant time; a stored Argon2 hash is still verified as a hash, so
/// flipping the flag never silently downgrades verification.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    enabled: bool,
}

impl PasswordHasher {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Produce the string to persist for `password`.
    ///
    /// # Errors
    ///
    /// Returns an error if Argon2 hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        if !self.enabled {
            return Ok(password.to_string());
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;

        Ok(hash.to_string())
    }

    /// Compare `password` against the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value claims to be a PHC hash but
    /// cannot be parsed.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        if stored.starts_with(PHC_ARGON2_PREFIX) {
            let parsed =
                PasswordHash::new(stored).map_err(|err| anyhow!("invalid password hash: {err}"))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok());
        }

        if self.enabled {
            // Hashing is on but the stored value is plaintext; never match.
            return Ok(false);
        }

        Ok(password.as_bytes().ct_eq(stored.as_bytes()).into())
    }
}
