//! Router assembly: every endpoint, the OpenAPI document and the middleware
//! stack.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    global_error_handler, logging_middleware, optional_auth_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Creates the application router.
///
/// # Middleware Order
/// Outermost first:
/// 1. CORS and response compression
/// 2. Request ID - generates or propagates `x-request-id`
/// 3. Logging - one span per request carrying the request id
/// 4. Error normalisation - non-JSON 4xx/5xx bodies become `ErrorResponse`
/// 5. Request timeout - answers 408 once `request_timeout` elapses
/// 6. Optional authentication - attaches the bearer token's user, never rejects
///
/// # Routes
/// - `/api/...` - accounts, courses, lessons, lecturers
/// - `/health`, `/health/ready`, `/health/live`
/// - `/swagger-ui` and `/api-docs/openapi.json`
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::courses::course_routes())
        .merge(handlers::catalogue::lesson_routes())
        .merge(handlers::catalogue::lecturer_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    // last added runs first
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
