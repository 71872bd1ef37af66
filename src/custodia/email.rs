//! Email dispatch boundary.
//!
//! Recovery emails are rendered by the caller and handed to a [`Mailer`].
//! The mailer decides how to deliver (SMTP, API, etc.) and returns
//! `Ok`/`Err`; a dispatch failure is surfaced to the requester as
//! `EmailFailedToSend` so the recovery request can be retried.
//!
//! The default sender for local dev is [`LogMailer`], which logs and
//! returns `Ok(())`.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Email delivery abstraction.
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error to mark the dispatch failed.
    ///
    /// # Errors
    ///
    /// Implementations return an error when delivery fails.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "email dispatch stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mailer_always_succeeds() {
        let message = EmailMessage {
            from: "no-reply@localhost".to_string(),
            to: "alice@example.com".to_string(),
            subject: "Password recovery".to_string(),
            text: "hello".to_string(),
            html: None,
        };

        assert!(LogMailer.send(&message).is_ok());
    }
}
