//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the reminder scheduler and the mail transport.

mod catalogue_service;
mod course_service;
pub mod mail;
mod user_service;

pub use catalogue_service::{LecturerService, LessonService};
pub use course_service::{CourseService, RegistrationOutcome, UnregistrationOutcome};
pub use mail::MailService;
pub use user_service::UserService;

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::reminders::ReminderScheduler;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap: every member holds pool handles or `Arc`s.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub courses: CourseService,
    pub lessons: LessonService,
    pub lecturers: LecturerService,
    pub mail: MailService,
}

impl Services {
    pub fn new(
        repos: Repositories,
        scheduler: ReminderScheduler,
        mail: MailService,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            users: UserService::new(repos.users, mail.clone(), jwt),
            courses: CourseService::new(Arc::new(repos.courses), scheduler),
            lessons: LessonService::new(repos.lessons),
            lecturers: LecturerService::new(repos.lecturers),
            mail,
        }
    }
}
