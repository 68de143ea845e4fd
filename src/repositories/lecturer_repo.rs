use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{AsyncDbPool, get_connection};
use crate::error::AppError;
use crate::models::Lecturer;

#[derive(Clone)]
pub struct LecturerRepository {
    pool: AsyncDbPool,
}

impl LecturerRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Lecturer>, AppError> {
        use crate::schema::lecturers::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        lecturers
            .order(id.asc())
            .select(Lecturer::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, lecturer_id: i32) -> Result<Option<Lecturer>, AppError> {
        use crate::schema::lecturers::dsl::*;
        let mut conn = get_connection(&self.pool).await?;

        lecturers
            .filter(id.eq(lecturer_id))
            .select(Lecturer::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
