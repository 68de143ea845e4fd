//! In-process job store.
//!
//! Backs the scheduler and dispatcher in unit tests. Jobs live in a
//! `DashMap` keyed by id; ids are never reused.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::reminders::{JobStore, ReminderError, ScheduledReminder};

#[derive(Debug)]
pub struct InMemoryJobStore {
    jobs: DashMap<i64, ScheduledReminder>,
    next_id: AtomicI64,
    available: AtomicBool,
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self {
            jobs: DashMap::new(),
            next_id: AtomicI64::new(1),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn check_available(&self) -> Result<(), ReminderError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ReminderError::unavailable(anyhow::anyhow!(
                "in-memory job store marked unavailable"
            )))
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn enqueue(&self, fire_at: DateTime<Utc>, description: &str) -> Result<i64, ReminderError> {
        self.check_available()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.jobs.insert(
            id,
            ScheduledReminder {
                id,
                description: description.to_string(),
                fire_at,
            },
        );
        Ok(id)
    }

    async fn list_jobs(&self) -> Result<Vec<ScheduledReminder>, ReminderError> {
        self.check_available()?;
        Ok(self.jobs.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn cancel(&self, job_id: i64) -> Result<bool, ReminderError> {
        self.check_available()?;
        Ok(self.jobs.remove(&job_id).is_some())
    }

    async fn take_due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledReminder>, ReminderError> {
        self.check_available()?;

        let mut due: Vec<(DateTime<Utc>, i64)> = self
            .jobs
            .iter()
            .filter(|entry| entry.fire_at <= now)
            .map(|entry| (entry.fire_at, entry.id))
            .collect();
        due.sort();
        due.truncate(usize::try_from(limit).unwrap_or(0));

        // remove() arbitrates between concurrent sweeps
        Ok(due
            .into_iter()
            .filter_map(|(_, id)| self.jobs.remove(&id).map(|(_, job)| job))
            .collect())
    }
}
