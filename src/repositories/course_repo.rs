//! Course repository and the enrollment store seam.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::{AsyncDbPool, get_connection};
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{Course, CourseWithLessons, Lesson, NewCourseStudent};

/// Course lookups and enrollment bookkeeping used by `CourseService`.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list_with_lessons(&self) -> AppResult<Vec<CourseWithLessons>>;

    async fn find_with_lessons(&self, course_id: i32) -> AppResult<Option<CourseWithLessons>>;

    async fn is_enrolled(&self, course_id: i32, user_id: i32) -> AppResult<bool>;

    /// Record an enrollment. `false` if it already existed.
    async fn enroll(&self, course_id: i32, user_id: i32) -> AppResult<bool>;

    /// Remove an enrollment. `false` if there was none.
    async fn unenroll(&self, course_id: i32, user_id: i32) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct CourseRepository {
    pool: AsyncDbPool,
}

impl CourseRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Load the lessons of `courses` in one query, ordered by start time.
    async fn attach_lessons(
        conn: &mut AsyncPgConnection,
        courses: Vec<Course>,
    ) -> AppResult<Vec<CourseWithLessons>> {
        use crate::schema::lessons;

        let lessons: Vec<Lesson> = Lesson::belonging_to(&courses)
            .select(Lesson::as_select())
            .order((lessons::date.asc(), lessons::id.asc()))
            .load(conn)
            .await?;

        Ok(lessons
            .grouped_by(&courses)
            .into_iter()
            .zip(courses)
            .map(|(lessons, course)| CourseWithLessons { course, lessons })
            .collect())
    }
}

#[async_trait]
impl CourseStore for CourseRepository {
    async fn list_with_lessons(&self) -> AppResult<Vec<CourseWithLessons>> {
        use crate::schema::courses::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        let all = courses
            .order(id.asc())
            .select(Course::as_select())
            .load(&mut conn)
            .await?;
        Self::attach_lessons(&mut conn, all).await
    }

    async fn find_with_lessons(&self, course_id: i32) -> AppResult<Option<CourseWithLessons>> {
        use crate::schema::courses::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        let Some(course) = courses
            .filter(id.eq(course_id))
            .select(Course::as_select())
            .first(&mut conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        Ok(Self::attach_lessons(&mut conn, vec![course]).await?.pop())
    }

    async fn is_enrolled(&self, course: i32, user: i32) -> AppResult<bool> {
        use crate::schema::course_students::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        diesel::select(diesel::dsl::exists(
            course_students.filter(course_id.eq(course).and(user_id.eq(user))),
        ))
        .get_result(&mut conn)
        .await
        .map_err(AppError::from)
    }

    async fn enroll(&self, course_id: i32, user_id: i32) -> AppResult<bool> {
        use crate::schema::course_students;
        let mut conn = get_connection(&self.pool).await?;

        let result = diesel::insert_into(course_students::table)
            .values(&NewCourseStudent { course_id, user_id })
            .execute(&mut conn)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if DatabaseErrorConverter::is_unique_violation(&e) => Ok(false),
            Err(e) => Err(DatabaseErrorConverter::convert_diesel_error(e, "enroll student")),
        }
    }

    async fn unenroll(&self, course: i32, user: i32) -> AppResult<bool> {
        use crate::schema::course_students::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        let removed = diesel::delete(course_students.filter(course_id.eq(course).and(user_id.eq(user))))
            .execute(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}
