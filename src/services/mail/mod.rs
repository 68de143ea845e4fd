//! Outgoing email: message construction plus pluggable delivery.

mod console;
mod http_transport;
mod messages;
mod outbox;
mod transport;

pub use console::ConsoleTransport;
pub use http_transport::HttpMailTransport;
pub use messages::{reminder_email, verification_email};
pub use outbox::OutboxTransport;
pub use transport::MailTransport;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::{MailBackend, MailSettings};
use crate::models::{Lesson, User};

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport failed")]
    Transport {
        #[source]
        source: anyhow::Error,
    },

    #[error("Mail API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Builds messages and hands them to the configured transport.
#[derive(Clone)]
pub struct MailService {
    transport: Arc<dyn MailTransport>,
    from: String,
}

impl MailService {
    pub fn new(transport: Arc<dyn MailTransport>, from: impl Into<String>) -> Self {
        Self {
            transport,
            from: from.into(),
        }
    }

    /// Service backed by the transport `mail.backend` selects.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, MailError> {
        let transport: Arc<dyn MailTransport> = match settings.backend {
            MailBackend::Memory => Arc::new(OutboxTransport::new()),
            MailBackend::Console => Arc::new(ConsoleTransport),
            MailBackend::Http => Arc::new(HttpMailTransport::new(
                settings.api_url.clone(),
                Some(settings.api_key.clone()),
                Duration::from_secs(settings.timeout_seconds),
            )?),
        };
        Ok(Self::new(transport, settings.from.clone()))
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub async fn send_reminder_email(&self, user: &User, lesson: &Lesson) -> Result<Email, MailError> {
        let email = reminder_email(&self.from, user, lesson);
        self.deliver(email).await
    }

    pub async fn send_verification_email(
        &self,
        site: &str,
        user: &User,
        token: &str,
    ) -> Result<Email, MailError> {
        let email = verification_email(&self.from, site, user, token);
        self.deliver(email).await
    }

    async fn deliver(&self, email: Email) -> Result<Email, MailError> {
        self.transport.send(&email).await?;
        tracing::debug!(
            transport = self.transport.name(),
            to = ?email.to,
            subject = %email.subject,
            "Email sent"
        );
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 3,
            username: "wombat".to_string(),
            email: "wombat@example.com".to_string(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_reminder_lands_in_outbox() {
        let outbox = Arc::new(OutboxTransport::new());
        let service = MailService::new(outbox.clone(), "school@example.com");
        let lesson = Lesson {
            id: 1,
            name: "L1".to_string(),
            date: Utc::now(),
            course_id: 1,
            lecturer_id: 1,
        };

        let sent = service.send_reminder_email(&user(), &lesson).await.unwrap();

        assert_eq!(sent.from, "school@example.com");
        assert_eq!(outbox.messages().await, vec![sent]);
    }

    #[tokio::test]
    async fn test_verification_lands_in_outbox() {
        let outbox = Arc::new(OutboxTransport::new());
        let service = MailService::new(outbox.clone(), "school@example.com");

        let sent = service
            .send_verification_email("http://localhost:3000", &user(), "tok")
            .await
            .unwrap();

        assert!(sent.to.contains(&"wombat@example.com".to_string()));
        assert!(sent.body.contains("wombat"));
        assert_eq!(outbox.len().await, 1);
    }

    #[test]
    fn test_from_settings_picks_backend() {
        let service = MailService::from_settings(&MailSettings::default()).unwrap();
        assert_eq!(service.transport_name(), "console");

        let settings = MailSettings {
            backend: MailBackend::Memory,
            ..MailSettings::default()
        };
        assert_eq!(MailService::from_settings(&settings).unwrap().transport_name(), "memory");
    }
}
