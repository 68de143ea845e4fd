//! Scheduling and clearing of lesson reminders.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::models::{CourseWithLessons, Lesson};
use crate::reminders::codec::{self, ReminderKey};
use crate::reminders::{JobStore, ReminderError, ScheduledReminder};

/// What a call to [`ReminderScheduler::schedule_reminder_messages`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Jobs newly enqueued
    pub scheduled: usize,
    /// Lessons that already had a live job
    pub skipped: usize,
}

/// Keeps exactly one reminder job per (user, lesson) in the job store.
///
/// The scheduler holds no state beyond its configuration. The existing-job
/// check and the enqueue are separate store calls, so two concurrent calls
/// for the same pair may both enqueue unless the store deduplicates.
#[derive(Clone)]
pub struct ReminderScheduler {
    store: Arc<dyn JobStore>,
    lead_time: Duration,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn JobStore>, lead_time: Duration) -> Self {
        Self { store, lead_time }
    }

    /// When the reminder for `lesson` fires: `lead_time` before it starts.
    pub fn fire_time(&self, lesson: &Lesson) -> Result<DateTime<Utc>, ReminderError> {
        lesson
            .date
            .checked_sub_signed(self.lead_time)
            .ok_or(ReminderError::FireTimeOutOfRange { lesson_id: lesson.id })
    }

    /// Ensure every lesson of `course` has a reminder job for `user_id`.
    ///
    /// Idempotent. Jobs are enqueued even when the fire time has passed; the
    /// worker sends those on its next sweep. On a store failure part-way
    /// through, lessons already handled stay scheduled and the rest are not
    /// attempted.
    pub async fn schedule_reminder_messages(
        &self,
        user_id: i32,
        course: &CourseWithLessons,
    ) -> Result<ScheduleOutcome, ReminderError> {
        let mut existing: HashSet<ReminderKey> = decode_all(self.store.list_jobs().await?)
            .map(|(key, _)| key)
            .collect();

        let mut outcome = ScheduleOutcome::default();
        for lesson in &course.lessons {
            let key = ReminderKey::new(user_id, lesson.id);
            if existing.contains(&key) {
                outcome.skipped += 1;
                continue;
            }

            let fire_at = self.fire_time(lesson)?;
            let job_id = self.store.enqueue(fire_at, &key.encode()).await?;
            existing.insert(key);
            outcome.scheduled += 1;

            tracing::debug!(
                job_id,
                user_id,
                lesson_id = lesson.id,
                fire_at = %fire_at,
                "Reminder scheduled"
            );
        }

        tracing::info!(
            user_id,
            course_id = course.id(),
            scheduled = outcome.scheduled,
            skipped = outcome.skipped,
            "Reminders scheduled for course"
        );
        Ok(outcome)
    }

    /// Cancel every reminder job of `user_id` for a lesson of `course`.
    ///
    /// Returns how many jobs were cancelled; having none is not an error.
    pub async fn clear_reminder_messages(
        &self,
        user_id: i32,
        course: &CourseWithLessons,
    ) -> Result<usize, ReminderError> {
        let lesson_ids: HashSet<i32> = course.lessons.iter().map(|l| l.id).collect();
        let jobs = self.store.list_jobs().await?;

        let mut cancelled = 0;
        for (key, job) in decode_all(jobs) {
            if key.user_id != user_id || !lesson_ids.contains(&key.lesson_id) {
                continue;
            }
            if self.store.cancel(job.id).await? {
                cancelled += 1;
            }
        }

        tracing::info!(user_id, course_id = course.id(), cancelled, "Reminders cleared for course");
        Ok(cancelled)
    }
}

/// Decode job descriptions, logging and dropping the ones that do not parse.
fn decode_all(jobs: Vec<ScheduledReminder>) -> impl Iterator<Item = (ReminderKey, ScheduledReminder)> {
    jobs.into_iter().filter_map(|job| match codec::decode(&job.description) {
        Ok(key) => Some((key, job)),
        Err(e) => {
            tracing::warn!(job_id = job.id, error = %e, "Ignoring job with malformed description");
            None
        }
    })
}
