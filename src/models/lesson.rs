use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::models::{Course, Lecturer};

/// A dated session of a course. `date` is the moment the lesson starts.
#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::lessons)]
#[diesel(belongs_to(Course))]
#[diesel(belongs_to(Lecturer))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lesson {
    pub id: i32,
    pub name: String,
    pub date: DateTime<Utc>,
    pub course_id: i32,
    pub lecturer_id: i32,
}
