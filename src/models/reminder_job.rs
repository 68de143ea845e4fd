use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// A live reminder row. `description` is the encoded (user, lesson) pair.
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::reminder_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReminderJob {
    pub id: i64,
    pub description: String,
    pub fire_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::reminder_jobs)]
pub struct NewReminderJob {
    pub description: String,
    pub fire_at: DateTime<Utc>,
}
