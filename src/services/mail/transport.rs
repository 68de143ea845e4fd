//! Mail transport abstraction.
//!
//! A transport only delivers a fully built [`Email`]; message content is the
//! business of [`super::messages`].

use async_trait::async_trait;

use super::{Email, MailError};

/// Something that can deliver an [`Email`].
///
/// Implementations must be `Send + Sync` so one instance can be shared by the
/// request handlers and the reminder worker.
///
/// # Example Implementation
/// ```ignore
/// use async_trait::async_trait;
///
/// pub struct NullTransport;
///
/// #[async_trait]
/// impl MailTransport for NullTransport {
///     async fn send(&self, _email: &Email) -> Result<(), MailError> {
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "null"
///     }
/// }
/// ```
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;

    /// Short identifier used in log lines
    fn name(&self) -> &'static str;
}
