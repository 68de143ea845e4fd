//! Account endpoints: registration, login, token refresh and email verification.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    required, AuthResponse, ErrorResponse, LoginRequest, RefreshTokenRequest,
    RefreshTokenResponse, RegisterRequest, UserInfo, VerifyEmailQuery,
};
use crate::api::handlers::site_url;
use crate::error::AppResult;
use crate::models::NewUser;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// # Routes
/// - `POST /api/register/` - Create an account
/// - `POST /api/login/` - Exchange credentials for tokens
/// - `POST /api/token/refresh/` - Rotate a token pair
/// - `GET /api/verify/` - Confirm an email address
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(refresh_token))
        .routes(routes!(verify_email))
}

/// POST /api/register/ - Register new user
///
/// Creates the account, mails a verification link and returns a token pair.
#[utoipa::path(
    post,
    path = "/api/register/",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let new_user = NewUser {
        username: required(payload.username, "username")?,
        email: required(payload.email, "email")?,
        password: required(payload.password, "password")?,
        first_name: payload.first_name.unwrap_or_default(),
        last_name: payload.last_name.unwrap_or_default(),
    };

    let (user, tokens) = state
        .services
        .users
        .register(new_user, &site_url(&headers))
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}

/// POST /api/login/ - Authenticate user
#[utoipa::path(
    post,
    path = "/api/login/",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields or wrong credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = required(payload.username, "username")?;
    let password = required(payload.password, "password")?;

    let (user, tokens) = state.services.users.authenticate(&username, &password).await?;
    Ok(Json(AuthResponse::new(user, tokens)))
}

/// POST /api/token/refresh/ - Refresh access token
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    tag = AUTH_TAG,
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = RefreshTokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<RefreshTokenResponse>> {
    let tokens = state.services.users.refresh(&payload.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// GET /api/verify/?token= - Confirm the email address of an account
#[utoipa::path(
    get,
    path = "/api/verify/",
    tag = AUTH_TAG,
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = UserInfo),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse)
    )
)]
async fn verify_email(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<VerifyEmailQuery>,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.users.verify_email(&query.token).await?;
    Ok(Json(user.into()))
}
