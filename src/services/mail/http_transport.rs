//! Delivery through an HTTP mail API.
//!
//! The message is POSTed as JSON:
//!
//! ```json
//! {"from": "...", "to": ["..."], "subject": "...", "text": "..."}
//! ```
//!
//! with `Authorization: Bearer <api_key>` when a key is configured. Any 2xx
//! response counts as accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{Email, MailError, MailTransport};

pub struct HttpMailTransport {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpMailTransport {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coursereg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MailError::Transport {
                source: anyhow::Error::from(e),
            })?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.api_url).json(&json!({
            "from": email.from,
            "to": email.to,
            "subject": email.subject,
            "text": email.body,
        }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| MailError::Transport {
            source: anyhow::Error::from(e),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> Email {
        Email {
            from: "school@example.com".to_string(),
            to: vec!["koala@example.com".to_string()],
            subject: "Reminder: L1".to_string(),
            body: "Hi koala".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_json_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header("authorization", "Bearer secret-key"))
            .and(body_partial_json(json!({
                "to": ["koala@example.com"],
                "subject": "Reminder: L1",
                "text": "Hi koala",
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpMailTransport::new(
            format!("{}/v1/send", server.uri()),
            Some("secret-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        transport.send(&email()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad recipient"))
            .mount(&server)
            .await;

        let transport = HttpMailTransport::new(server.uri(), None, Duration::from_secs(5)).unwrap();

        match transport.send(&email()).await {
            Err(MailError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad recipient");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport =
            HttpMailTransport::new("http://127.0.0.1:9/send", None, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            transport.send(&email()).await,
            Err(MailError::Transport { .. })
        ));
    }
}
