mod course;
mod lecturer;
mod lesson;
mod reminder_job;
mod user;

pub use course::{Course, CourseStudent, CourseWithLessons, NewCourseStudent};
pub use lecturer::Lecturer;
pub use lesson::Lesson;
pub use reminder_job::{NewReminderJob, ReminderJob};
pub use user::{NewUser, UpdateUser, User};
