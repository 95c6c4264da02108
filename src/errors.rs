// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> list of human-readable problems with that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Validation error: {}", summarize_fields(.0))]
    ValidationError(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("You have already reviewed this place")]
    DuplicateReview,

    #[error("You cannot vote on your own review")]
    SelfVote,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

fn summarize_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, problems)| format!("{}: {}", field, problems.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PlacesError {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        PlacesError::ValidationError(fields)
    }

    fn error_code(&self) -> &'static str {
        match self {
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::DuplicateReview => "DUPLICATE_REVIEW",
            PlacesError::SelfVote => "SELF_VOTE",
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::Unauthorized => "UNAUTHORIZED",
            PlacesError::Forbidden => "FORBIDDEN",
            PlacesError::StorageFailure(_) => "STORAGE_FAILURE",
            PlacesError::DatabaseError(_) => "DATABASE_ERROR",
            PlacesError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

impl From<validator::ValidationErrors> for PlacesError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, problems) in errors.field_errors() {
            let messages = problems
                .iter()
                .map(|problem| match &problem.message {
                    Some(message) => message.to_string(),
                    None => problem.code.to_string(),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        PlacesError::ValidationError(fields)
    }
}

/// Transaction begin/commit failures
impl From<sqlx::Error> for PlacesError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database transaction error: {}", error);
        PlacesError::DatabaseError(error.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let mut error = json!({
            "code": self.error_code(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if let PlacesError::ValidationError(fields) = self {
            error["fields"] = json!(fields);
        }

        let body = json!({
            "success": false,
            "message": self.to_string(),
            "error": error
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::DuplicateReview => StatusCode::CONFLICT,
            PlacesError::SelfVote => StatusCode::CONFLICT,
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::Unauthorized => StatusCode::UNAUTHORIZED,
            PlacesError::Forbidden => StatusCode::FORBIDDEN,
            PlacesError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Submission {
        #[validate(length(min = 10, max = 1000))]
        content: String,
        #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
        value: i32,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PlacesError::DuplicateReview.status_code(), StatusCode::CONFLICT);
        assert_eq!(PlacesError::SelfVote.status_code(), StatusCode::CONFLICT);
        assert_eq!(PlacesError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            PlacesError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::invalid_field("value", "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_errors_keep_field_detail() {
        let submission = Submission {
            content: "short".to_string(),
            value: 9,
        };
        let err: PlacesError = submission.validate().unwrap_err().into();

        match &err {
            PlacesError::ValidationError(fields) => {
                assert_eq!(fields["content"], vec!["length".to_string()]);
                assert_eq!(fields["value"], vec!["must be between 1 and 5".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("value: must be between 1 and 5"));
    }

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let response = PlacesError::invalid_field("value", "out of range").error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["value"][0], "out of range");
    }
}
