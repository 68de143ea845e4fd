//! PostgreSQL-backed job store for lesson reminders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::{AsyncDbPool, DbConnection};
use crate::models::{Lesson, NewReminderJob, ReminderJob, User};
use crate::reminders::{JobStore, ReminderError, ReminderTargets, ScheduledReminder};
use crate::repositories::{LessonRepository, UserRepository};

/// `reminder_jobs` table as a [`JobStore`].
///
/// `description` is unique, so concurrent enqueues of the same (user, lesson)
/// pair collapse into one row. Any database failure is reported as
/// `SchedulerUnavailable`.
#[derive(Clone)]
pub struct ReminderJobRepository {
    pool: AsyncDbPool,
}

impl ReminderJobRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<DbConnection<'_>, ReminderError> {
        self.pool.get().await.map_err(ReminderError::unavailable)
    }
}

#[async_trait]
impl JobStore for ReminderJobRepository {
    async fn enqueue(&self, at: DateTime<Utc>, desc: &str) -> Result<i64, ReminderError> {
        use crate::schema::reminder_jobs::dsl::*;
        let mut conn = self.conn().await?;

        let inserted: Option<i64> = diesel::insert_into(reminder_jobs)
            .values(&NewReminderJob {
                description: desc.to_string(),
                fire_at: at,
            })
            .on_conflict(description)
            .do_nothing()
            .returning(id)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(ReminderError::unavailable)?;

        match inserted {
            Some(job_id) => Ok(job_id),
            None => reminder_jobs
                .filter(description.eq(desc))
                .select(id)
                .first(&mut conn)
                .await
                .map_err(ReminderError::unavailable),
        }
    }

    async fn list_jobs(&self) -> Result<Vec<ScheduledReminder>, ReminderError> {
        use crate::schema::reminder_jobs::dsl::*;
        let mut conn = self.conn().await?;

        let jobs = reminder_jobs
            .order(fire_at.asc())
            .select(ReminderJob::as_select())
            .load(&mut conn)
            .await
            .map_err(ReminderError::unavailable)?;
        Ok(jobs.into_iter().map(ScheduledReminder::from).collect())
    }

    async fn cancel(&self, job_id: i64) -> Result<bool, ReminderError> {
        use crate::schema::reminder_jobs::dsl::*;
        let mut conn = self.conn().await?;

        let removed = diesel::delete(reminder_jobs.filter(id.eq(job_id)))
            .execute(&mut conn)
            .await
            .map_err(ReminderError::unavailable)?;
        Ok(removed > 0)
    }

    /// Claims rows with `FOR UPDATE SKIP LOCKED` and deletes them in the same
    /// transaction, so concurrent workers never share a job.
    async fn take_due(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledReminder>, ReminderError> {
        use crate::schema::reminder_jobs::dsl::*;
        let mut conn = self.conn().await?;

        let mut claimed = conn
            .transaction::<Vec<ReminderJob>, diesel::result::Error, _>(|conn| {
                async move {
                    let ids: Vec<i64> = reminder_jobs
                        .filter(fire_at.le(now))
                        .order(fire_at.asc())
                        .limit(limit)
                        .select(id)
                        .for_update()
                        .skip_locked()
                        .load(conn)
                        .await?;

                    if ids.is_empty() {
                        return Ok(Vec::new());
                    }

                    diesel::delete(reminder_jobs.filter(id.eq_any(ids)))
                        .returning(ReminderJob::as_returning())
                        .get_results(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(ReminderError::unavailable)?;

        claimed.sort_by_key(|job| (job.fire_at, job.id));
        Ok(claimed.into_iter().map(ScheduledReminder::from).collect())
    }
}

/// Loads reminder recipients and lessons from the database.
#[derive(Clone)]
pub struct DbReminderTargets {
    users: UserRepository,
    lessons: LessonRepository,
}

impl DbReminderTargets {
    pub fn new(users: UserRepository, lessons: LessonRepository) -> Self {
        Self { users, lessons }
    }
}

#[async_trait]
impl ReminderTargets for DbReminderTargets {
    async fn load(&self, user_id: i32, lesson_id: i32) -> Result<Option<(User, Lesson)>, ReminderError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(ReminderError::unavailable)?;
        let lesson = self
            .lessons
            .find_by_id(lesson_id)
            .await
            .map_err(ReminderError::unavailable)?;
        Ok(user.zip(lesson))
    }
}
