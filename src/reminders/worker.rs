use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::reminders::ReminderDispatcher;

/// Runs [`ReminderDispatcher::drain`] on a cron schedule.
///
/// A tick that fires while the previous sweep is still running is skipped.
pub struct ReminderWorker {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
    dispatcher: Arc<ReminderDispatcher>,
    sweep_lock: Arc<Mutex<()>>,
}

impl ReminderWorker {
    pub async fn new(dispatcher: Arc<ReminderDispatcher>) -> AppResult<Self> {
        let scheduler = TokioCronScheduler::new().await.map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            dispatcher,
            sweep_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Register the sweep job under `cron` (six fields, seconds first).
    pub async fn schedule(&self, cron: &str) -> AppResult<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let sweep_lock = Arc::clone(&self.sweep_lock);

        let job = Job::new_async(cron, move |_uuid, _lock| {
            let dispatcher = Arc::clone(&dispatcher);
            let sweep_lock = Arc::clone(&sweep_lock);

            Box::pin(async move {
                let Ok(_guard) = sweep_lock.try_lock() else {
                    tracing::debug!("Previous reminder sweep still running, skipping tick");
                    return;
                };

                match dispatcher.drain(Utc::now()).await {
                    Ok(report) if report.claimed > 0 => {
                        tracing::info!(
                            claimed = report.claimed,
                            sent = report.sent,
                            malformed = report.malformed,
                            missing = report.missing,
                            failed = report.failed,
                            "Reminder sweep finished"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = ?e, "Reminder sweep failed"),
                }
            })
        })
        .map_err(|e| AppError::BadRequest {
            message: format!("Invalid cron expression: {}", e),
        })?;

        self.scheduler
            .lock()
            .await
            .add(job)
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?;

        Ok(())
    }

    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })
    }

    pub async fn stop(&self) -> AppResult<()> {
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })
    }

    /// Start the scheduler and stop it once `shutdown` is cancelled.
    pub async fn spawn(self, shutdown: CancellationToken) -> AppResult<JoinHandle<()>> {
        self.start().await?;
        tracing::info!("Reminder worker started");

        Ok(tokio::spawn(async move {
            shutdown.cancelled().await;
            if let Err(e) = self.stop().await {
                tracing::warn!(error = %e, "Reminder worker did not shut down cleanly");
            }
            // let an in-flight sweep finish
            let _ = self.sweep_lock.lock().await;
            tracing::info!("Reminder worker stopped");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::{InMemoryJobStore, JobStore, ReminderError, ReminderTargets, codec};
    use crate::services::mail::{MailService, OutboxTransport};
    use crate::models::{Lesson, User};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoTargets;

    #[async_trait]
    impl ReminderTargets for NoTargets {
        async fn load(&self, _user_id: i32, _lesson_id: i32) -> Result<Option<(User, Lesson)>, ReminderError> {
            Ok(None)
        }
    }

    fn dispatcher(store: Arc<InMemoryJobStore>) -> Arc<ReminderDispatcher> {
        Arc::new(ReminderDispatcher::new(
            store,
            Arc::new(NoTargets),
            MailService::new(Arc::new(OutboxTransport::new()), "school@example.com"),
            10,
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_invalid_cron_is_rejected() {
        let worker = ReminderWorker::new(dispatcher(Arc::new(InMemoryJobStore::new())))
            .await
            .unwrap();
        assert!(matches!(
            worker.schedule("whenever").await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_sweeps_due_jobs_until_cancelled() {
        let store = Arc::new(InMemoryJobStore::new());
        store.enqueue(Utc::now(), &codec::encode(1, 1)).await.unwrap();

        let worker = ReminderWorker::new(dispatcher(store.clone())).await.unwrap();
        worker.schedule("* * * * * *").await.unwrap();
        let token = CancellationToken::new();
        let handle = worker.spawn(token.clone()).await.unwrap();

        let mut waited = 0;
        while !store.is_empty() && waited < 50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            waited += 1;
        }
        assert!(store.is_empty(), "due job should have been claimed");

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker should stop")
            .unwrap();
    }
}
