//! Course catalogue and enrollment endpoints.

use axum::{
    Extension, Json,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, StatusCode},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::COURSE_TAG;
use crate::api::dto::{CourseResponse, ErrorResponse, ListResponse, RegistrationResponse};
use crate::api::handlers::list_href;
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::services::{RegistrationOutcome, UnregistrationOutcome};
use crate::state::AppState;

/// # Routes
/// - `GET /api/course/` - All courses with their lessons
/// - `GET /api/course/{id}/` - One course
/// - `POST /api/course/{id}/register/` - Enroll the caller and schedule reminders
/// - `DELETE /api/course/{id}/register/` - Leave the course and cancel reminders
pub fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_courses))
        .routes(routes!(get_course))
        .routes(routes!(register_on_course, unregister_from_course))
}

#[utoipa::path(
    get,
    path = "/api/course/",
    tag = COURSE_TAG,
    responses((status = 200, description = "All courses", body = ListResponse<CourseResponse>))
)]
async fn list_courses(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> AppResult<Json<ListResponse<CourseResponse>>> {
    let courses = state.services.courses.list_courses().await?;
    Ok(Json(ListResponse::new(
        list_href(&headers, &uri),
        courses.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/course/{id}/",
    tag = COURSE_TAG,
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with lessons", body = CourseResponse),
        (status = 404, description = "No such course", body = ErrorResponse)
    )
)]
async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<CourseResponse>> {
    let course = state.services.courses.get_course(id).await?;
    Ok(Json(course.into()))
}

/// POST /api/course/{id}/register/
///
/// 201 on a new enrollment, 200 when the caller was already enrolled.
#[utoipa::path(
    post,
    path = "/api/course/{id}/register/",
    tag = COURSE_TAG,
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 201, description = "Enrolled, reminders scheduled", body = RegistrationResponse),
        (status = 200, description = "Already enrolled", body = RegistrationResponse),
        (status = 403, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "No such course", body = ErrorResponse),
        (status = 503, description = "Reminder store unavailable", body = ErrorResponse)
    ),
    security((), ("bearerAuth" = []))
)]
async fn register_on_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Option<Extension<AuthUser>>,
) -> AppResult<(StatusCode, Json<RegistrationResponse>)> {
    let caller = caller.map(|Extension(user)| user.user_id);

    let (status, body) = match state.services.courses.register_user_on_course(caller, id).await? {
        RegistrationOutcome::Created => (
            StatusCode::CREATED,
            RegistrationResponse::Success(format!("Registered on course {}", id)),
        ),
        RegistrationOutcome::NotModified => (
            StatusCode::OK,
            RegistrationResponse::NotModified(format!("Already registered on course {}", id)),
        ),
    };

    Ok((status, Json(body)))
}

#[utoipa::path(
    delete,
    path = "/api/course/{id}/register/",
    tag = COURSE_TAG,
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Left the course, or was not enrolled", body = RegistrationResponse),
        (status = 403, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "No such course", body = ErrorResponse)
    ),
    security((), ("bearerAuth" = []))
)]
async fn unregister_from_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Option<Extension<AuthUser>>,
) -> AppResult<Json<RegistrationResponse>> {
    let caller = caller.map(|Extension(user)| user.user_id);

    let body = match state.services.courses.unregister_user_from_course(caller, id).await? {
        UnregistrationOutcome::Deleted => {
            RegistrationResponse::Success(format!("Unregistered from course {}", id))
        }
        UnregistrationOutcome::NotModified => {
            RegistrationResponse::NotModified(format!("Not registered on course {}", id))
        }
    };

    Ok(Json(body))
}
