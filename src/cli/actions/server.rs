use crate::{
    cli::globals::GlobalArgs,
    custodia::{self, email::LogMailer, state::AuthConfig},
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

/// Parsed arguments for the `server` action.
#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub secret: SecretString,
    pub base_url: String,
    pub mail_from: String,
    pub access_ttl: i64,
    pub recovery_ttl: i64,
    pub hash_passwords: bool,
}

/// Handle the server action
pub(crate) async fn handle(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(args.secret, args.hash_passwords);

    let config = AuthConfig::new(args.base_url)
        .with_mail_from(args.mail_from)
        .with_access_token_ttl_seconds(args.access_ttl)
        .with_recovery_token_ttl_seconds(args.recovery_ttl);

    custodia::new(args.port, args.dsn, &globals, config, Arc::new(LogMailer)).await
}
