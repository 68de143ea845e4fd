//! Courses, lessons and lecturers as the API presents them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{CourseWithLessons, Lecturer, Lesson};

/// Self link of a list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct Links {
    /// Host and path the list was requested from
    #[schema(example = "localhost:8080/api/course/")]
    pub href: String,
}

/// Envelope for every list endpoint: `{"links": {"href": ...}, "objects": [...]}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub links: Links,
    pub objects: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(href: impl Into<String>, objects: Vec<T>) -> Self {
        Self {
            links: Links { href: href.into() },
            objects,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LessonResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "L1")]
    pub name: String,
    pub date: DateTime<Utc>,
    pub course_id: i32,
    pub lecturer_id: i32,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            name: lesson.name,
            date: lesson.date,
            course_id: lesson.course_id,
            lecturer_id: lesson.lecturer_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Rust 101")]
    pub name: String,
    pub description: String,
    /// Ordered by start time
    pub lessons: Vec<LessonResponse>,
}

impl From<CourseWithLessons> for CourseResponse {
    fn from(course: CourseWithLessons) -> Self {
        Self {
            id: course.course.id,
            name: course.course.name,
            description: course.course.description,
            lessons: course.lessons.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LecturerResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub bio: String,
}

impl From<Lecturer> for LecturerResponse {
    fn from(lecturer: Lecturer) -> Self {
        Self {
            id: lecturer.id,
            name: lecturer.name,
            email: lecturer.email,
            bio: lecturer.bio,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LessonFilter {
    /// Exact lesson name
    pub name: Option<String>,
}

/// Body of the course registration endpoints: a single key naming the outcome.
#[derive(Debug, Serialize, ToSchema)]
pub enum RegistrationResponse {
    #[serde(rename = "Success")]
    Success(String),
    #[serde(rename = "Not modified")]
    NotModified(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_registration_response_keys() {
        let body = serde_json::to_value(RegistrationResponse::Success("ok".to_string())).unwrap();
        assert_eq!(body, json!({ "Success": "ok" }));

        let body =
            serde_json::to_value(RegistrationResponse::NotModified("already".to_string())).unwrap();
        assert_eq!(body, json!({ "Not modified": "already" }));
    }

    #[test]
    fn test_list_envelope() {
        let body = serde_json::to_value(ListResponse::new("localhost/api/lecturer/", vec![1, 2]))
            .unwrap();
        assert_eq!(
            body,
            json!({ "links": { "href": "localhost/api/lecturer/" }, "objects": [1, 2] })
        );
    }

    #[test]
    fn test_course_response_nests_lessons() {
        let course = CourseWithLessons {
            course: Course {
                id: 4,
                name: "C".to_string(),
                description: "d".to_string(),
            },
            lessons: vec![Lesson {
                id: 9,
                name: "L1".to_string(),
                date: Utc.with_ymd_and_hms(2018, 6, 11, 21, 30, 0).unwrap(),
                course_id: 4,
                lecturer_id: 2,
            }],
        };

        let body = serde_json::to_value(CourseResponse::from(course)).unwrap();
        assert_eq!(body["lessons"][0]["id"], 9);
        assert_eq!(body["lessons"][0]["date"], "2018-06-11T21:30:00Z");
    }
}
