use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::models::{Lesson, User};

#[derive(Debug, Queryable, Selectable, Identifiable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// A course together with every lesson that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseWithLessons {
    pub course: Course,
    pub lessons: Vec<Lesson>,
}

impl CourseWithLessons {
    pub fn id(&self) -> i32 {
        self.course.id
    }
}

/// Row of the `course_students` join table.
#[derive(Debug, Queryable, Selectable, Identifiable, Associations, Clone)]
#[diesel(table_name = crate::schema::course_students)]
#[diesel(primary_key(course_id, user_id))]
#[diesel(belongs_to(Course))]
#[diesel(belongs_to(User))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseStudent {
    pub course_id: i32,
    pub user_id: i32,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone, Copy)]
#[diesel(table_name = crate::schema::course_students)]
pub struct NewCourseStudent {
    pub course_id: i32,
    pub user_id: i32,
}
