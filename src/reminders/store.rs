//! The delayed-job store seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::ReminderJob;
use crate::reminders::ReminderError;

/// A live job as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub id: i64,
    pub description: String,
    pub fire_at: DateTime<Utc>,
}

impl From<ReminderJob> for ScheduledReminder {
    fn from(job: ReminderJob) -> Self {
        Self {
            id: job.id,
            description: job.description,
            fire_at: job.fire_at,
        }
    }
}

/// Enqueue, list and cancel delayed jobs, plus the claim used at fire time.
///
/// Every method reports an unreachable backend as
/// [`ReminderError::SchedulerUnavailable`].
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Store a job firing at `fire_at` and return its id.
    ///
    /// Implementations may return the id of an existing job with the same
    /// description instead of creating a second one.
    async fn enqueue(&self, fire_at: DateTime<Utc>, description: &str) -> Result<i64, ReminderError>;

    /// All live jobs, in no particular order.
    async fn list_jobs(&self) -> Result<Vec<ScheduledReminder>, ReminderError>;

    /// Cancel a job. Returns `false` if it was already gone.
    async fn cancel(&self, job_id: i64) -> Result<bool, ReminderError>;

    /// Remove and return up to `limit` jobs due at or before `now`, earliest
    /// first. A job is handed to exactly one caller.
    async fn take_due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledReminder>, ReminderError>;
}
