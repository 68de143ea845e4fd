use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const COURSE_TAG: &str = "Courses";
pub const LESSON_TAG: &str = "Lessons";
pub const LECTURER_TAG: &str = "Lecturers";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "coursereg",
        description = "Course registration with lesson reminder emails",
    ),
    modifiers(&SecurityAddon),
    components(schemas(crate::api::dto::ErrorResponse)),
    tags(
        (name = AUTH_TAG, description = "Account registration, login and email verification"),
        (name = COURSE_TAG, description = "Courses and course enrollment"),
        (name = LESSON_TAG, description = "Lesson catalogue"),
        (name = LECTURER_TAG, description = "Lecturer catalogue"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/login/ or /api/register/"))
                        .build(),
                ),
            )
        }
    }
}
