use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{
    auth_service::AuthServiceError, email_service::EmailError, report_service::ReportServiceError,
    run_service::RunServiceError,
};

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Run not found")]
    RunNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email delivery failed: {0}")]
    Email(#[from] EmailError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<RunServiceError> for AppError {
    fn from(err: RunServiceError) -> Self {
        match err {
            RunServiceError::NotFound => AppError::RunNotFound,
            RunServiceError::Invalid(_) => AppError::Validation("Invalid run form".to_string()),
            RunServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => AppError::AuthenticationFailed,
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<ReportServiceError> for AppError {
    fn from(err: ReportServiceError) -> Self {
        match err {
            ReportServiceError::Email(e) => AppError::Email(e),
            ReportServiceError::Repository(e) => e.into(),
            ReportServiceError::Template(e) => AppError::Template(e),
        }
    }
}

impl From<crate::repositories::RepositoryError> for AppError {
    fn from(err: crate::repositories::RepositoryError) -> Self {
        match err {
            crate::repositories::RepositoryError::Database(e) => AppError::Database(e),
            crate::repositories::RepositoryError::NotFound => AppError::RunNotFound,
            crate::repositories::RepositoryError::AlreadyExists => {
                AppError::Validation("Record already exists".to_string())
            }
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            ),
            AppError::RunNotFound => {
                let page = NotFoundTemplate {
                    message: "Run not found".to_string(),
                };
                return match page.render() {
                    Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                    Err(_) => (StatusCode::NOT_FOUND, "Run not found").into_response(),
                };
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(_)
            | AppError::Email(_)
            | AppError::Template(_)
            | AppError::Session(_) => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, error_message).into_response()
    }
}
