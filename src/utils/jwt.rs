use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Lifetime of the link mailed after registration.
pub const VERIFICATION_TOKEN_HOURS: i64 = 48;

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token for API authentication (short-lived)
    Access,
    /// Refresh token for obtaining new access tokens (long-lived)
    Refresh,
    /// Single-purpose token embedded in the email verification link
    Verification,
}

/// JWT claims carried by every token this service issues.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub username: String,
    pub token_type: TokenType,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, token_type: TokenType, expiration: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            token_type,
            iat: now.timestamp(),
            exp: (now + expiration).timestamp(),
        }
    }

    /// Parses `sub` back into a user id.
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::Unauthorized {
            message: "Invalid token subject".to_string(),
        })
    }
}

/// Access and refresh token issued together on register, login and refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs a token of the given type for `user`.
pub fn generate_token(
    user: &User,
    token_type: TokenType,
    secret: &str,
    expiration: Duration,
) -> AppResult<String> {
    let claims = Claims::new(user, token_type, expiration);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Generates both access and refresh tokens using the configured lifetimes.
pub fn generate_token_pair(user: &User, config: &JwtConfig) -> AppResult<TokenPair> {
    let access_token = generate_token(
        user,
        TokenType::Access,
        &config.secret,
        Duration::hours(config.access_token_expiration),
    )?;

    let refresh_token = generate_token(
        user,
        TokenType::Refresh,
        &config.secret,
        Duration::hours(config.refresh_token_expiration),
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

pub fn generate_verification_token(user: &User, config: &JwtConfig) -> AppResult<String> {
    generate_token(
        user,
        TokenType::Verification,
        &config.secret,
        Duration::hours(VERIFICATION_TOKEN_HOURS),
    )
}

/// Validates and decodes a JWT token
///
/// # Arguments
/// * `token` - The JWT token string to validate
/// * `secret` - The secret key for verifying the token
/// * `expected_type` - Optional expected token type to validate against
///
/// # Returns
/// The decoded claims if the token is valid
pub fn validate_token(
    token: &str,
    secret: &str,
    expected_type: Option<TokenType>,
) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized {
            message: "Token has expired".to_string(),
        },
        ErrorKind::InvalidToken => AppError::Unauthorized {
            message: "Invalid token".to_string(),
        },
        ErrorKind::InvalidSignature => AppError::Unauthorized {
            message: "Invalid token signature".to_string(),
        },
        _ => AppError::Unauthorized {
            message: format!("Token validation failed: {}", e),
        },
    })?;

    if let Some(expected) = expected_type
        && claims.token_type != expected
    {
        return Err(AppError::Unauthorized {
            message: format!(
                "Invalid token type: expected {:?}, got {:?}",
                expected, claims.token_type
            ),
        });
    }

    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Access))
}

pub fn validate_refresh_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Refresh))
}

pub fn validate_verification_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Verification))
}
