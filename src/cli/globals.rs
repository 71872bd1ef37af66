use secrecy::SecretString;

/// Process-wide immutable settings shared with the server core.
///
/// The signing secret is loaded once at startup and lives until shutdown;
/// rotation requires a restart.
#[derive(Clone)]
pub struct GlobalArgs {
    pub signing_secret: SecretString,
    pub hashing_enabled: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(signing_secret: SecretString, hashing_enabled: bool) -> Self {
        Self {
            signing_secret,
            hashing_enabled,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("signing_secret", &"***")
            .field("hashing_enabled", &self.hashing_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("hunter2".to_string()), true);
        assert_eq!(args.signing_secret.expose_secret(), "hunter2");
        assert!(args.hashing_enabled);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let args = GlobalArgs::new(SecretString::from("hunter2".to_string()), false);
        let debug = format!("{args:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
