//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `auth` - registration, login, token refresh and email verification
//! - `catalogue` - courses, lessons, lecturers and course registration
//! - `health` - health probe bodies
//! - `error` - the common error body

mod auth;
mod catalogue;
mod error;
mod health;

pub use auth::{
    required, AuthResponse, LoginRequest, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, UserInfo, VerifyEmailQuery,
};
pub use catalogue::{
    CourseResponse, LecturerResponse, LessonFilter, LessonResponse, Links, ListResponse,
    RegistrationResponse,
};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
