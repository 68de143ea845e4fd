use async_trait::async_trait;

use super::{Email, MailError, MailTransport};

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            body = %email.body,
            "Email (console backend)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
