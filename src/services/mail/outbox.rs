use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Email, MailError, MailTransport};

/// Keeps every sent message in memory.
///
/// Used by tests and by `mail.backend = "memory"` for local development.
#[derive(Debug, Default)]
pub struct OutboxTransport {
    outbox: Mutex<Vec<Email>>,
}

impl OutboxTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, oldest first.
    pub async fn messages(&self) -> Vec<Email> {
        self.outbox.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.outbox.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outbox.lock().await.is_empty()
    }

    /// Drain the outbox.
    pub async fn take(&self) -> Vec<Email> {
        std::mem::take(&mut *self.outbox.lock().await)
    }
}

#[async_trait]
impl MailTransport for OutboxTransport {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.outbox.lock().await.push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
