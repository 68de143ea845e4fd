//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, ValidationFieldError};
use crate::models::User;
use crate::utils::jwt::TokenPair;

const REQUIRED: &str = "This field is required.";

/// Register request payload
///
/// Fields are optional at the serde level so a missing field is reported
/// through the `errors` object instead of as a JSON parse failure.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 150, message = "Username must be between 1 and 150 characters.")
    )]
    #[schema(example = "koala", max_length = 150)]
    pub username: Option<String>,
    /// Plain password; JSON numbers are accepted and read as their digits
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "Password cannot be empty.")
    )]
    #[schema(value_type = Option<String>, example = "32768", format = "password")]
    pub password: Option<String>,
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    #[schema(example = "koala@example.com", format = "email")]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "This field is required."))]
    #[schema(example = "koala")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(required(message = "This field is required."))]
    #[schema(value_type = Option<String>, example = "32768", format = "password")]
    pub password: Option<String>,
}

/// Refresh token request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be empty"))]
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
}

/// Query string of the link in the verification email.
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct VerifyEmailQuery {
    #[validate(length(min = 1, message = "Token cannot be empty"))]
    pub token: String,
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "koala")]
    pub username: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "koala@example.com")]
    pub email: String,
    pub email_verified: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            email_verified: user.email_verified,
        }
    }
}

/// Returned by both register and login: the account fields at the top level
/// plus a fresh token pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub access_token: String,
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for RefreshTokenResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

/// Unwraps a field that `#[validate(required)]` has already checked.
pub fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field.ok_or_else(|| AppError::ValidationErrors {
        errors: vec![ValidationFieldError::new(name, REQUIRED)],
    })
}
