//! Fire-time half of the reminder engine: claim due jobs and send the mail.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Lesson, User};
use crate::reminders::{JobStore, ReminderError, codec};
use crate::services::mail::MailService;

/// Resolves the user and lesson a job refers to.
#[async_trait]
pub trait ReminderTargets: Send + Sync {
    /// `None` when either row no longer exists.
    async fn load(&self, user_id: i32, lesson_id: i32) -> Result<Option<(User, Lesson)>, ReminderError>;
}

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub claimed: usize,
    pub sent: usize,
    pub malformed: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Claims due jobs and sends one reminder per job.
///
/// Claimed jobs are gone from the store whatever happens afterwards, so a
/// reminder is sent at most once. Send failures are logged, not retried.
pub struct ReminderDispatcher {
    store: Arc<dyn JobStore>,
    targets: Arc<dyn ReminderTargets>,
    mail: MailService,
    batch_size: i64,
    send_timeout: Duration,
}

impl ReminderDispatcher {
    pub fn new(
        store: Arc<dyn JobStore>,
        targets: Arc<dyn ReminderTargets>,
        mail: MailService,
        batch_size: i64,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            targets,
            mail,
            batch_size,
            send_timeout,
        }
    }

    /// Process one batch of jobs due at `now`.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchReport, ReminderError> {
        let jobs = self.store.take_due(now, self.batch_size).await?;
        let mut report = DispatchReport {
            claimed: jobs.len(),
            ..DispatchReport::default()
        };

        for job in jobs {
            let key = match codec::decode(&job.description) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(job_id = job.id, error = %e, "Dropping job with malformed description");
                    report.malformed += 1;
                    continue;
                }
            };

            let (user, lesson) = match self.targets.load(key.user_id, key.lesson_id).await {
                Ok(Some(found)) => found,
                Ok(None) => {
                    tracing::warn!(
                        job_id = job.id,
                        user_id = key.user_id,
                        lesson_id = key.lesson_id,
                        "Dropping reminder for deleted user or lesson"
                    );
                    report.missing += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(
                        job_id = job.id,
                        user_id = key.user_id,
                        lesson_id = key.lesson_id,
                        error = ?e,
                        "Could not load reminder recipient, dropping job"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            match tokio::time::timeout(self.send_timeout, self.mail.send_reminder_email(&user, &lesson)).await {
                Ok(Ok(_)) => {
                    tracing::info!(job_id = job.id, user_id = user.id, lesson_id = lesson.id, "Reminder sent");
                    report.sent += 1;
                }
                Ok(Err(e)) => {
                    tracing::error!(job_id = job.id, error = %e, "Reminder send failed");
                    report.failed += 1;
                }
                Err(_) => {
                    tracing::error!(
                        job_id = job.id,
                        timeout_secs = self.send_timeout.as_secs(),
                        "Reminder send timed out"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Keep dispatching until fewer than a full batch is due.
    pub async fn drain(&self, now: DateTime<Utc>) -> Result<DispatchReport, ReminderError> {
        let mut total = DispatchReport::default();
        loop {
            let report = self.dispatch_due(now).await?;
            total.claimed += report.claimed;
            total.sent += report.sent;
            total.malformed += report.malformed;
            total.missing += report.missing;
            total.failed += report.failed;

            if (report.claimed as i64) < self.batch_size {
                return Ok(total);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::InMemoryJobStore;
    use crate::services::mail::{Email, MailError, MailTransport, OutboxTransport};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use dashmap::DashMap;

    #[derive(Default)]
    struct StaticTargets {
        users: DashMap<i32, User>,
        lessons: DashMap<i32, Lesson>,
    }

    #[async_trait]
    impl ReminderTargets for StaticTargets {
        async fn load(&self, user_id: i32, lesson_id: i32) -> Result<Option<(User, Lesson)>, ReminderError> {
            let user = self.users.get(&user_id).map(|u| u.clone());
            let lesson = self.lessons.get(&lesson_id).map(|l| l.clone());
            Ok(user.zip(lesson))
        }
    }

    fn user(id: i32, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn lesson(id: i32, name: &str) -> Lesson {
        Lesson {
            id,
            name: name.to_string(),
            date: Utc.with_ymd_and_hms(2018, 6, 11, 21, 30, 0).unwrap(),
            course_id: 1,
            lecturer_id: 1,
        }
    }

    struct Fixture {
        store: Arc<InMemoryJobStore>,
        outbox: Arc<OutboxTransport>,
        dispatcher: ReminderDispatcher,
    }

    fn fixture(batch_size: i64) -> Fixture {
        let store = Arc::new(InMemoryJobStore::new());
        let outbox = Arc::new(OutboxTransport::new());
        let targets = StaticTargets::default();
        targets.users.insert(1, user(1, "koala"));
        targets.lessons.insert(10, lesson(10, "L1"));
        targets.lessons.insert(11, lesson(11, "L2"));

        let dispatcher = ReminderDispatcher::new(
            store.clone(),
            Arc::new(targets),
            MailService::new(outbox.clone(), "school@example.com"),
            batch_size,
            Duration::from_secs(5),
        );
        Fixture {
            store,
            outbox,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_sends_one_email_per_due_job_and_consumes_it() {
        let f = fixture(100);
        let now = Utc::now();
        f.store.enqueue(now - ChronoDuration::minutes(5), &codec::encode(1, 10)).await.unwrap();
        f.store.enqueue(now - ChronoDuration::minutes(1), &codec::encode(1, 11)).await.unwrap();
        f.store.enqueue(now + ChronoDuration::hours(1), &codec::encode(1, 10)).await.unwrap();

        let report = f.dispatcher.dispatch_due(now).await.unwrap();

        assert_eq!(report.sent, 2);
        let subjects: Vec<String> = f.outbox.messages().await.into_iter().map(|e| e.subject).collect();
        assert!(subjects[0].contains("L1"));
        assert!(subjects[1].contains("L2"));
        assert_eq!(f.store.len(), 1);

        let again = f.dispatcher.dispatch_due(now).await.unwrap();
        assert_eq!(again, DispatchReport::default());
        assert_eq!(f.outbox.len().await, 2);
    }

    #[tokio::test]
    async fn test_malformed_job_is_skipped_and_sweep_continues() {
        let f = fixture(100);
        let now = Utc::now();
        f.store.enqueue(now - ChronoDuration::minutes(2), "{not json").await.unwrap();
        f.store.enqueue(now - ChronoDuration::minutes(1), &codec::encode(1, 10)).await.unwrap();

        let report = f.dispatcher.dispatch_due(now).await.unwrap();

        assert_eq!(report.malformed, 1);
        assert_eq!(report.sent, 1);
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_target_is_dropped() {
        let f = fixture(100);
        let now = Utc::now();
        f.store.enqueue(now, &codec::encode(404, 10)).await.unwrap();

        let report = f.dispatcher.dispatch_due(now).await.unwrap();

        assert_eq!(report.missing, 1);
        assert!(f.outbox.is_empty().await);
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_drain_walks_every_batch() {
        let f = fixture(1);
        let now = Utc::now();
        for lesson_id in [10, 11, 10] {
            f.store.enqueue(now, &codec::encode(1, lesson_id)).await.unwrap();
        }

        let report = f.dispatcher.drain(now).await.unwrap();

        assert_eq!(report.claimed, 3);
        assert_eq!(report.sent, 3);
    }

    struct FailingTransport;

    #[async_trait]
    impl MailTransport for FailingTransport {
        async fn send(&self, _email: &Email) -> Result<(), MailError> {
            Err(MailError::Rejected {
                status: 503,
                body: "down".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_send_failure_is_counted_not_returned() {
        let store = Arc::new(InMemoryJobStore::new());
        let targets = StaticTargets::default();
        targets.users.insert(1, user(1, "koala"));
        targets.lessons.insert(10, lesson(10, "L1"));
        let dispatcher = ReminderDispatcher::new(
            store.clone(),
            Arc::new(targets),
            MailService::new(Arc::new(FailingTransport), "school@example.com"),
            10,
            Duration::from_secs(1),
        );
        store.enqueue(Utc::now(), &codec::encode(1, 10)).await.unwrap();

        let report = dispatcher.dispatch_due(Utc::now()).await.unwrap();

        assert_eq!(report.failed, 1);
        assert!(store.is_empty());
    }

    /// Fails the first lookup, then serves the same rows as `StaticTargets`.
    struct FlakyTargets {
        inner: StaticTargets,
        failed_once: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl ReminderTargets for FlakyTargets {
        async fn load(&self, user_id: i32, lesson_id: i32) -> Result<Option<(User, Lesson)>, ReminderError> {
            if !self.failed_once.swap(true, std::sync::atomic::Ordering::SeqCst) {
                return Err(ReminderError::unavailable(anyhow::anyhow!("connection reset")));
            }
            self.inner.load(user_id, lesson_id).await
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_does_not_abort_the_batch() {
        let store = Arc::new(InMemoryJobStore::new());
        let outbox = Arc::new(OutboxTransport::new());
        let inner = StaticTargets::default();
        inner.users.insert(1, user(1, "koala"));
        inner.lessons.insert(10, lesson(10, "L1"));
        let targets = FlakyTargets {
            inner,
            failed_once: std::sync::atomic::AtomicBool::new(false),
        };
        let dispatcher = ReminderDispatcher::new(
            store.clone(),
            Arc::new(targets),
            MailService::new(outbox.clone(), "school@example.com"),
            100,
            Duration::from_secs(5),
        );

        let now = Utc::now();
        for minutes in 1..=5 {
            store
                .enqueue(now - ChronoDuration::minutes(minutes), &codec::encode(1, 10))
                .await
                .unwrap();
        }

        let report = dispatcher.dispatch_due(now).await.unwrap();

        assert_eq!(report.claimed, 5);
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 4);
        assert_eq!(outbox.len().await, 4);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_surfaces() {
        let f = fixture(10);
        f.store.set_available(false);
        assert!(matches!(
            f.dispatcher.dispatch_due(Utc::now()).await,
            Err(ReminderError::SchedulerUnavailable { .. })
        ));
    }
}
