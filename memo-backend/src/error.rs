//! Application error type shared by the stores and the HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("that username is already taken")]
    DuplicateUsername,
    /// Unknown username and wrong password are deliberately the same variant.
    #[error("incorrect username or password")]
    AuthFailure,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Pool(_) => "Something went wrong on our end.".to_string(),
            AppError::NotFound => "The page you were looking for does not exist.".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(views::error_page(status, &self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateUsername.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::AuthFailure.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Database(rusqlite::Error::QueryReturnedNoRows).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Database(rusqlite::Error::InvalidQuery);
        assert!(!err.public_message().contains("Query"));
        assert_eq!(AppError::validation("Title is required").public_message(), "Title is required");
    }
}
