//! Repository layer for data access operations.

mod course_repo;
mod lecturer_repo;
mod lesson_repo;
mod reminder_job_repo;
mod user_repo;

pub use course_repo::{CourseRepository, CourseStore};
pub use lecturer_repo::LecturerRepository;
pub use lesson_repo::LessonRepository;
pub use reminder_job_repo::{DbReminderTargets, ReminderJobRepository};
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Every repository clones the same pool handle.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub courses: CourseRepository,
    pub lessons: LessonRepository,
    pub lecturers: LecturerRepository,
    pub reminder_jobs: ReminderJobRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            lessons: LessonRepository::new(pool.clone()),
            lecturers: LecturerRepository::new(pool.clone()),
            reminder_jobs: ReminderJobRepository::new(pool),
        }
    }

    pub fn reminder_targets(&self) -> DbReminderTargets {
        DbReminderTargets::new(self.users.clone(), self.lessons.clone())
    }
}
