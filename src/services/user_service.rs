//! User service for account operations.
//!
//! Registration, login, token refresh and email verification. Password
//! hashing and token signing happen here so handlers only shape requests and
//! responses.

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult, ValidationFieldError};
use crate::models::{NewUser, UpdateUser, User};
use crate::repositories::UserRepository;
use crate::services::mail::MailService;
use crate::utils::jwt::{
    generate_token_pair, generate_verification_token, validate_refresh_token,
    validate_verification_token, TokenPair,
};
use crate::utils::password::{hash_password, verify_password};

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// User service for handling account business logic.
#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    mail: MailService,
    jwt: JwtConfig,
}

impl UserService {
    pub fn new(repo: UserRepository, mail: MailService, jwt: JwtConfig) -> Self {
        Self { repo, mail, jwt }
    }

    /// Creates an account and issues its first token pair.
    ///
    /// `new_user.password` is the plain password; it is hashed before the
    /// insert. A verification email with a link rooted at `site` is sent
    /// afterwards. Delivery failures are logged and do not undo the
    /// registration.
    pub async fn register(&self, mut new_user: NewUser, site: &str) -> AppResult<(User, TokenPair)> {
        new_user.password = hash_password(&new_user.password)?;

        let user = self.repo.create(new_user).await.map_err(duplicate_as_field_error)?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        let token = generate_verification_token(&user, &self.jwt)?;
        if let Err(e) = self.mail.send_verification_email(site, &user, &token).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to send verification email");
        }

        let tokens = generate_token_pair(&user, &self.jwt)?;
        Ok((user, tokens))
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords produce the same field error so the
    /// response does not reveal which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let user = match self.repo.find_by_username(username).await? {
            Some(user) => user,
            None => return Err(bad_credentials()),
        };

        if !verify_password(password, &user.password)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(bad_credentials());
        }

        let tokens = generate_token_pair(&user, &self.jwt)?;
        Ok((user, tokens))
    }

    /// Exchanges a refresh token for a new pair, provided the user still exists.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = validate_refresh_token(refresh_token, &self.jwt.secret)?;
        let user = self.get_user(claims.user_id()?).await?;
        generate_token_pair(&user, &self.jwt)
    }

    /// Marks the account named by a verification token as verified.
    pub async fn verify_email(&self, token: &str) -> AppResult<User> {
        let claims = validate_verification_token(token, &self.jwt.secret)?;
        let user = self.get_user(claims.user_id()?).await?;
        if user.email_verified {
            return Ok(user);
        }

        let changes = UpdateUser {
            email_verified: Some(true),
            ..UpdateUser::default()
        };
        let user = self.repo.update(user.id, changes).await?;
        tracing::info!(user_id = user.id, "Email verified");
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }
}

fn bad_credentials() -> AppError {
    AppError::ValidationErrors {
        errors: vec![ValidationFieldError::new("credentials", BAD_CREDENTIALS)],
    }
}

/// A taken username is a form error on that field, not a conflict.
fn duplicate_as_field_error(err: AppError) -> AppError {
    match err {
        AppError::Duplicate { entity, field, .. } if entity == "users" => AppError::ValidationErrors {
            errors: vec![ValidationFieldError::new(
                field.clone(),
                format!("A user with that {} already exists.", field),
            )],
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_credentials_is_field_error() {
        match bad_credentials() {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "credentials");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_username_becomes_field_error() {
        let err = duplicate_as_field_error(AppError::Duplicate {
            entity: "users".to_string(),
            field: "username".to_string(),
            value: "koala".to_string(),
        });
        match err {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors[0].field, "username");
                assert_eq!(errors[0].message, "A user with that username already exists.");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = duplicate_as_field_error(AppError::not_found("user", 1));
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
