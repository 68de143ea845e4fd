//! Read-only lookups for lessons and lecturers.

use crate::error::{AppError, AppResult};
use crate::models::{Lecturer, Lesson};
use crate::repositories::{LecturerRepository, LessonRepository};

#[derive(Clone)]
pub struct LessonService {
    repo: LessonRepository,
}

impl LessonService {
    pub fn new(repo: LessonRepository) -> Self {
        Self { repo }
    }

    /// All lessons, or only those whose name equals `name` exactly. An empty
    /// `name` (`?name=`) does not filter.
    pub async fn list_lessons(&self, name: Option<&str>) -> AppResult<Vec<Lesson>> {
        self.repo.list(name.filter(|n| !n.is_empty())).await
    }

    pub async fn get_lesson(&self, id: i32) -> AppResult<Lesson> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("lesson", id))
    }
}

#[derive(Clone)]
pub struct LecturerService {
    repo: LecturerRepository,
}

impl LecturerService {
    pub fn new(repo: LecturerRepository) -> Self {
        Self { repo }
    }

    pub async fn list_lecturers(&self) -> AppResult<Vec<Lecturer>> {
        self.repo.list_all().await
    }

    pub async fn get_lecturer(&self, id: i32) -> AppResult<Lecturer> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("lecturer", id))
    }
}
