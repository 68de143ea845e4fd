//! Lesson repository.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{AsyncDbPool, get_connection};
use crate::error::AppError;
use crate::models::Lesson;

#[derive(Clone)]
pub struct LessonRepository {
    pool: AsyncDbPool,
}

impl LessonRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// All lessons, or only those named exactly `name_filter` when given.
    pub async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Lesson>, AppError> {
        use crate::schema::lessons::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        let mut query = lessons.select(Lesson::as_select()).order(id.asc()).into_boxed();
        if let Some(wanted) = name_filter {
            query = query.filter(name.eq(wanted.to_string()));
        }

        query.load(&mut conn).await.map_err(AppError::from)
    }

    pub async fn find_by_id(&self, lesson_id: i32) -> Result<Option<Lesson>, AppError> {
        use crate::schema::lessons::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        lessons
            .filter(id.eq(lesson_id))
            .select(Lesson::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
