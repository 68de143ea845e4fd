use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// JSON body that has passed `validator` checks.
///
/// Malformed JSON becomes `AppError::BadRequest`; a body that parses but
/// fails validation becomes `AppError::ValidationErrors` with one entry per
/// failing field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string counterpart of [`ValidatedJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(required(message = "This field is required."))]
        username: Option<String>,
        #[validate(email(message = "Enter a valid email address."))]
        email: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct TokenQuery {
        #[validate(length(min = 1, message = "Token cannot be empty"))]
        token: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json() {
        let req = json_request(r#"{"username":"koala","email":"koala@example.com"}"#);
        let ValidatedJson(body) = ValidatedJson::<Signup>::from_request(req, &()).await.unwrap();
        assert_eq!(body.username.as_deref(), Some("koala"));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_fields() {
        let req = json_request(r#"{"email":"testexample.com"}"#);
        match ValidatedJson::<Signup>::from_request(req, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "username"]);
                assert_eq!(errors[1].message, "This field is required.");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let req = json_request("{not json");
        let err = ValidatedJson::<Signup>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("{}"))
            .unwrap();
        match ValidatedJson::<Signup>::from_request(req, &()).await {
            Err(AppError::BadRequest { message }) => assert!(message.contains("Content-Type")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_validation() {
        let (mut parts, _) = Request::builder()
            .uri("/verify/?token=")
            .body(())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<TokenQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationErrors { .. }));

        let (mut parts, _) = Request::builder()
            .uri("/verify/")
            .body(())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<TokenQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }
}
