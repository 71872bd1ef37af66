use clap::{Arg, Command};

/// Arguments for the authentication and recovery core.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("secret")
                .short('s')
                .long("secret")
                .help("Process-wide secret used to sign access and recovery tokens")
                .env("CUSTODIA_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Public base URL used to build recovery links")
                .default_value("http://localhost:8080")
                .env("CUSTODIA_BASE_URL"),
        )
        .arg(
            Arg::new("mail-from")
                .long("mail-from")
                .help("Sender address for outgoing recovery emails")
                .default_value("no-reply@localhost")
                .env("CUSTODIA_MAIL_FROM"),
        )
        .arg(
            Arg::new("access-ttl")
                .long("access-ttl")
                .help("Signed access token lifetime in seconds")
                .default_value("3600")
                .env("CUSTODIA_ACCESS_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("recovery-ttl")
                .long("recovery-ttl")
                .help("Password recovery token lifetime in seconds")
                .default_value("3600")
                .env("CUSTODIA_RECOVERY_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("hash-passwords")
                .long("hash-passwords")
                .help("Hash passwords with Argon2id; disable only for local development")
                .default_value("true")
                .env("CUSTODIA_HASH_PASSWORDS")
                .value_parser(clap::value_parser!(bool)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn test_auth_defaults() {
        let matches =
            command().get_matches_from(vec!["test", "--secret", "0123456789abcdef0123456789abcdef"]);

        assert_eq!(
            matches.get_one::<String>("base-url").map(String::as_str),
            Some("http://localhost:8080")
        );
        assert_eq!(
            matches.get_one::<String>("mail-from").map(String::as_str),
            Some("no-reply@localhost")
        );
        assert_eq!(matches.get_one::<i64>("access-ttl").copied(), Some(3600));
        assert_eq!(matches.get_one::<i64>("recovery-ttl").copied(), Some(3600));
        assert_eq!(
            matches.get_one::<bool>("hash-passwords").copied(),
            Some(true)
        );
    }

    #[test]
    fn test_hashing_can_be_disabled() {
        let matches = command().get_matches_from(vec![
            "test",
            "--secret",
            "sssht",
            "--hash-passwords",
            "false",
        ]);

        assert_eq!(
            matches.get_one::<bool>("hash-passwords").copied(),
            Some(false)
        );
    }

    #[test]
    fn test_recovery_ttl_override() {
        temp_env::with_vars([("CUSTODIA_RECOVERY_TTL", Some("900"))], || {
            let matches = command().get_matches_from(vec!["test", "--secret", "sssht"]);
            assert_eq!(matches.get_one::<i64>("recovery-ttl").copied(), Some(900));
        });
    }
}
