use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    // Database errors
    Database(sqlx::Error),

    // Authentication & Authorization
    Unauthorized(String),
    UnauthenticatedAuthor(String),
    Forbidden(String),

    // Resource errors
    NotFound(String),
    NotFoundOrForbidden(String),
    RelationNotFound(String),
    ThreadNotFound(String),

    // Validation errors
    BadRequest(String),
    ValidationError(String),
    InvalidApprovalStatus(String),

    TooManyRequests(String),

    // External service errors
    ExternalService(String),

    // Internal errors
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnauthenticatedAuthor(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            AppError::RelationNotFound(_)
            | AppError::ThreadNotFound(_)
            | AppError::BadRequest(_)
            | AppError::InvalidApprovalStatus(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::UnauthenticatedAuthor(_) => "UNAUTHENTICATED_AUTHOR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) | AppError::NotFoundOrForbidden(_) => "NOT_FOUND",
            AppError::RelationNotFound(_) => "RELATION_NOT_FOUND",
            AppError::ThreadNotFound(_) => "THREAD_NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidApprovalStatus(_) => "INVALID_APPROVAL_STATUS",
            AppError::TooManyRequests(_) => "RATE_LIMITED",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::UnauthenticatedAuthor(msg) => write!(f, "Unauthenticated author: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::NotFoundOrForbidden(msg) => write!(f, "Not found: {}", msg),
            AppError::RelationNotFound(msg) => write!(f, "Relation not found: {}", msg),
            AppError::ThreadNotFound(msg) => write!(f, "Thread not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidApprovalStatus(msg) => write!(f, "Invalid approval status: {}", msg),
            AppError::TooManyRequests(msg) => write!(f, "Too many requests: {}", msg),
            AppError::ExternalService(msg) => write!(f, "External service error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "database error".to_string()
            }
            AppError::ExternalService(msg) => {
                tracing::error!("External service error: {}", msg);
                "Error service".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
            AppError::Unauthorized(msg)
            | AppError::UnauthenticatedAuthor(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::NotFoundOrForbidden(msg)
            | AppError::RelationNotFound(msg)
            | AppError::ThreadNotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::InvalidApprovalStatus(msg)
            | AppError::TooManyRequests(msg) => msg.clone(),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// From implementations for automatic conversion
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Data not found".to_string()),
            _ => AppError::Database(err),
        }
    }
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;
