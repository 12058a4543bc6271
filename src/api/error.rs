use crate::models::ErrorDto;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Closed set of error codes surfaced on the wire, serialized by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestErrorCode {
    PageSizeTooLarge,
    MalformedBody,
    MissingPart,
    InvalidVersion,
    NotAuthorized,
    ResourceNotFound,
    UpdateNotFound,
    DuplicateSlug,
    StorageFailure,
    DatabaseFailure,
}

impl RestErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestErrorCode::PageSizeTooLarge => "PAGE_SIZE_TOO_LARGE",
            RestErrorCode::MalformedBody => "MALFORMED_BODY",
            RestErrorCode::MissingPart => "MISSING_PART",
            RestErrorCode::InvalidVersion => "INVALID_VERSION",
            RestErrorCode::NotAuthorized => "NOT_AUTHORIZED",
            RestErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            RestErrorCode::UpdateNotFound => "UPDATE_NOT_FOUND",
            RestErrorCode::DuplicateSlug => "DUPLICATE_SLUG",
            RestErrorCode::StorageFailure => "STORAGE_FAILURE",
            RestErrorCode::DatabaseFailure => "DATABASE_FAILURE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RestErrorCode::PageSizeTooLarge
            | RestErrorCode::MalformedBody
            | RestErrorCode::MissingPart
            | RestErrorCode::InvalidVersion => StatusCode::BAD_REQUEST,
            RestErrorCode::NotAuthorized => StatusCode::FORBIDDEN,
            RestErrorCode::ResourceNotFound | RestErrorCode::UpdateNotFound => {
                StatusCode::NOT_FOUND
            }
            RestErrorCode::DuplicateSlug => StatusCode::CONFLICT,
            RestErrorCode::StorageFailure | RestErrorCode::DatabaseFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Structured error raised by services and mapped to an HTTP status plus an
/// `ErrorDto` body by the handler layer.
#[derive(Debug, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct RestError {
    pub code: RestErrorCode,
    pub message: String,
}

impl RestError {
    pub fn new(code: RestErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn page_size_too_large(requested: u64, cap: u64) -> Self {
        Self::new(
            RestErrorCode::PageSizeTooLarge,
            format!("Page size is too large ({requested} > {cap})"),
        )
    }

    pub fn not_authorized() -> Self {
        Self::new(RestErrorCode::NotAuthorized, "Missing upload permission")
    }

    pub fn resource_not_found(key: impl std::fmt::Display) -> Self {
        Self::new(
            RestErrorCode::ResourceNotFound,
            format!("No resource matches '{key}'"),
        )
    }

    pub fn update_not_found(update_id: i32) -> Self {
        Self::new(
            RestErrorCode::UpdateNotFound,
            format!("No update matches id {update_id}"),
        )
    }

    pub fn malformed_body(err: impl std::fmt::Display) -> Self {
        Self::new(RestErrorCode::MalformedBody, format!("Invalid body: {err}"))
    }
}

impl From<sea_orm::DbErr> for RestError {
    fn from(err: sea_orm::DbErr) -> Self {
        tracing::error!("Database error: {err:?}");
        Self::new(RestErrorCode::DatabaseFailure, "Internal Server Error")
    }
}

impl From<anyhow::Error> for RestError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Storage error: {err:?}");
        Self::new(RestErrorCode::StorageFailure, "Internal Server Error")
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let body = Json(ErrorDto {
            code: self.code.as_str().to_string(),
            message: self.message,
            status: status.as_u16(),
        });
        (status, body).into_response()
    }
}
