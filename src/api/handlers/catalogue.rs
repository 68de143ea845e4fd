//! Lesson and lecturer endpoints.

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::HeaderMap,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{LECTURER_TAG, LESSON_TAG};
use crate::api::dto::{ErrorResponse, LecturerResponse, LessonFilter, LessonResponse, ListResponse};
use crate::api::handlers::list_href;
use crate::error::AppResult;
use crate::state::AppState;

pub fn lesson_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_lessons))
        .routes(routes!(get_lesson))
}

pub fn lecturer_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_lecturers))
        .routes(routes!(get_lecturer))
}

/// GET /api/lesson/ - All lessons, optionally filtered by exact `name`
#[utoipa::path(
    get,
    path = "/api/lesson/",
    tag = LESSON_TAG,
    params(LessonFilter),
    responses((status = 200, description = "Lessons", body = ListResponse<LessonResponse>))
)]
async fn list_lessons(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(filter): Query<LessonFilter>,
) -> AppResult<Json<ListResponse<LessonResponse>>> {
    let lessons = state.services.lessons.list_lessons(filter.name.as_deref()).await?;
    Ok(Json(ListResponse::new(
        list_href(&headers, &uri),
        lessons.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/lesson/{id}/",
    tag = LESSON_TAG,
    params(("id" = i32, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson", body = LessonResponse),
        (status = 404, description = "No such lesson", body = ErrorResponse)
    )
)]
async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LessonResponse>> {
    Ok(Json(state.services.lessons.get_lesson(id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/lecturer/",
    tag = LECTURER_TAG,
    responses((status = 200, description = "Lecturers", body = ListResponse<LecturerResponse>))
)]
async fn list_lecturers(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> AppResult<Json<ListResponse<LecturerResponse>>> {
    let lecturers = state.services.lecturers.list_lecturers().await?;
    Ok(Json(ListResponse::new(
        list_href(&headers, &uri),
        lecturers.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/lecturer/{id}/",
    tag = LECTURER_TAG,
    params(("id" = i32, Path, description = "Lecturer id")),
    responses(
        (status = 200, description = "Lecturer", body = LecturerResponse),
        (status = 404, description = "No such lecturer", body = ErrorResponse)
    )
)]
async fn get_lecturer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LecturerResponse>> {
    Ok(Json(state.services.lecturers.get_lecturer(id).await?.into()))
}
