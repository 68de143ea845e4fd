//! Course catalogue and the enrollment flow.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::CourseWithLessons;
use crate::reminders::ReminderScheduler;
use crate::repositories::CourseStore;

/// Result of a registration attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Newly enrolled, reminders scheduled (HTTP 201)
    Created,
    /// Already enrolled, nothing changed (HTTP 200)
    NotModified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregistrationOutcome {
    Deleted,
    NotModified,
}

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn CourseStore>,
    scheduler: ReminderScheduler,
}

impl CourseService {
    pub fn new(store: Arc<dyn CourseStore>, scheduler: ReminderScheduler) -> Self {
        Self { store, scheduler }
    }

    pub async fn list_courses(&self) -> AppResult<Vec<CourseWithLessons>> {
        self.store.list_with_lessons().await
    }

    pub async fn get_course(&self, course_id: i32) -> AppResult<CourseWithLessons> {
        self.store
            .find_with_lessons(course_id)
            .await?
            .ok_or_else(|| AppError::not_found("course", course_id))
    }

    /// Enroll the caller on a course and schedule a reminder per lesson.
    ///
    /// `caller` is the authenticated user id, `None` for anonymous requests.
    ///
    /// # Errors
    /// - `Forbidden` when there is no caller; nothing is scheduled
    /// - `NotFound` when the course does not exist
    /// - `ServiceUnavailable` when the job store fails; the enrollment is
    ///   rolled back so a retry starts from scratch
    pub async fn register_user_on_course(
        &self,
        caller: Option<i32>,
        course_id: i32,
    ) -> AppResult<RegistrationOutcome> {
        let user_id = require_caller(caller)?;
        let course = self.get_course(course_id).await?;

        if self.store.is_enrolled(course_id, user_id).await? {
            tracing::debug!(user_id, course_id, "User already enrolled");
            return Ok(RegistrationOutcome::NotModified);
        }

        // A concurrent identical request may win between the check and here.
        if !self.store.enroll(course_id, user_id).await? {
            return Ok(RegistrationOutcome::NotModified);
        }

        match self.scheduler.schedule_reminder_messages(user_id, &course).await {
            Ok(outcome) => {
                tracing::info!(
                    user_id,
                    course_id,
                    reminders = outcome.scheduled,
                    "User enrolled on course"
                );
                Ok(RegistrationOutcome::Created)
            }
            Err(e) => {
                tracing::warn!(user_id, course_id, error = ?e, "Scheduling failed, rolling back enrollment");
                self.roll_back(user_id, &course).await;
                Err(e.into())
            }
        }
    }

    /// Remove the caller from a course and cancel their reminders for it.
    ///
    /// Reminders are cleared before the enrollment row is removed, so a
    /// failed call can be retried and still finds the enrollment.
    pub async fn unregister_user_from_course(
        &self,
        caller: Option<i32>,
        course_id: i32,
    ) -> AppResult<UnregistrationOutcome> {
        let user_id = require_caller(caller)?;
        let course = self.get_course(course_id).await?;

        if !self.store.is_enrolled(course_id, user_id).await? {
            return Ok(UnregistrationOutcome::NotModified);
        }

        let cancelled = self.scheduler.clear_reminder_messages(user_id, &course).await?;
        if !self.store.unenroll(course_id, user_id).await? {
            return Ok(UnregistrationOutcome::NotModified);
        }

        tracing::info!(user_id, course_id, cancelled, "User left course");
        Ok(UnregistrationOutcome::Deleted)
    }

    async fn roll_back(&self, user_id: i32, course: &CourseWithLessons) {
        if let Err(e) = self.scheduler.clear_reminder_messages(user_id, course).await {
            tracing::warn!(user_id, course_id = course.id(), error = ?e, "Could not clear partial reminders");
        }
        if let Err(e) = self.store.unenroll(course.id(), user_id).await {
            tracing::error!(user_id, course_id = course.id(), error = ?e, "Could not roll back enrollment");
        }
    }
}

fn require_caller(caller: Option<i32>) -> AppResult<i32> {
    caller.ok_or_else(|| AppError::Forbidden {
        message: "Authentication credentials were not provided.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Lesson};
    use crate::reminders::{InMemoryJobStore, JobStore, codec};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use dashmap::{DashMap, DashSet};

    #[derive(Default)]
    struct InMemoryCourses {
        courses: DashMap<i32, CourseWithLessons>,
        students: DashSet<(i32, i32)>,
    }

    #[async_trait]
    impl CourseStore for InMemoryCourses {
        async fn list_with_lessons(&self) -> AppResult<Vec<CourseWithLessons>> {
            let mut all: Vec<_> = self.courses.iter().map(|c| c.value().clone()).collect();
            all.sort_by_key(|c| c.id());
            Ok(all)
        }

        async fn find_with_lessons(&self, course_id: i32) -> AppResult<Option<CourseWithLessons>> {
            Ok(self.courses.get(&course_id).map(|c| c.value().clone()))
        }

        async fn is_enrolled(&self, course_id: i32, user_id: i32) -> AppResult<bool> {
            Ok(self.students.contains(&(course_id, user_id)))
        }

        async fn enroll(&self, course_id: i32, user_id: i32) -> AppResult<bool> {
            Ok(self.students.insert((course_id, user_id)))
        }

        async fn unenroll(&self, course_id: i32, user_id: i32) -> AppResult<bool> {
            Ok(self.students.remove(&(course_id, user_id)).is_some())
        }
    }

    fn course() -> CourseWithLessons {
        let lesson = |id, name: &str, day| Lesson {
            id,
            name: name.to_string(),
            date: Utc.with_ymd_and_hms(2018, 6, day, 21, 30, 0).unwrap(),
            course_id: 1,
            lecturer_id: 1,
        };
        CourseWithLessons {
            course: Course {
                id: 1,
                name: "Rust 101".to_string(),
                description: String::new(),
            },
            lessons: vec![lesson(1, "L1", 11), lesson(2, "L2", 18)],
        }
    }

    fn setup() -> (Arc<InMemoryCourses>, Arc<InMemoryJobStore>, CourseService) {
        let courses = Arc::new(InMemoryCourses::default());
        courses.courses.insert(1, course());
        let jobs = Arc::new(InMemoryJobStore::new());
        let scheduler = ReminderScheduler::new(jobs.clone(), Duration::hours(24));
        let service = CourseService::new(courses.clone(), scheduler);
        (courses, jobs, service)
    }

    #[tokio::test]
    async fn test_register_creates_enrollment_and_jobs() {
        let (courses, jobs, service) = setup();

        let outcome = service.register_user_on_course(Some(7), 1).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::Created);
        assert!(courses.students.contains(&(1, 7)));
        let mut keys: Vec<_> = jobs
            .list_jobs()
            .await
            .unwrap()
            .iter()
            .map(|j| codec::decode(&j.description).unwrap())
            .collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![codec::ReminderKey::new(7, 1), codec::ReminderKey::new(7, 2)]
        );
    }

    #[tokio::test]
    async fn test_register_twice_is_not_modified() {
        let (_, jobs, service) = setup();

        service.register_user_on_course(Some(7), 1).await.unwrap();
        let outcome = service.register_user_on_course(Some(7), 1).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::NotModified);
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_already_enrolled_schedules_nothing() {
        let (courses, jobs, service) = setup();
        courses.students.insert((1, 7));

        let outcome = service.register_user_on_course(Some(7), 1).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::NotModified);
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_is_forbidden() {
        let (courses, jobs, service) = setup();

        let err = service.register_user_on_course(None, 1).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
        assert!(courses.students.is_empty());
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course_is_not_found() {
        let (_, jobs, service) = setup();

        let err = service.register_user_on_course(Some(7), 5).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { ref entity, .. } if entity == "course"));
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_rolls_back_enrollment() {
        let (courses, jobs, service) = setup();
        jobs.set_available(false);

        let err = service.register_user_on_course(Some(7), 1).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable { .. }));
        assert!(!courses.students.contains(&(1, 7)));

        jobs.set_available(true);
        let outcome = service.register_user_on_course(Some(7), 1).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Created);
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_unregister_clears_reminders() {
        let (courses, jobs, service) = setup();
        service.register_user_on_course(Some(7), 1).await.unwrap();
        service.register_user_on_course(Some(8), 1).await.unwrap();

        let outcome = service.unregister_user_from_course(Some(7), 1).await.unwrap();

        assert_eq!(outcome, UnregistrationOutcome::Deleted);
        assert!(!courses.students.contains(&(1, 7)));
        let remaining: Vec<_> = jobs
            .list_jobs()
            .await
            .unwrap()
            .iter()
            .map(|j| codec::decode(&j.description).unwrap().user_id)
            .collect();
        assert_eq!(remaining, vec![8, 8]);
    }

    #[tokio::test]
    async fn test_unregister_when_not_enrolled() {
        let (_, _, service) = setup();
        let outcome = service.unregister_user_from_course(Some(7), 1).await.unwrap();
        assert_eq!(outcome, UnregistrationOutcome::NotModified);
    }

    #[tokio::test]
    async fn test_get_course() {
        let (_, _, service) = setup();
        assert_eq!(service.get_course(1).await.unwrap().lessons.len(), 2);
        assert!(service.get_course(2).await.is_err());
        assert_eq!(service.list_courses().await.unwrap().len(), 1);
    }
}
