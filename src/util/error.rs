use axum::{response::{IntoResponse, Response}, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::repository::repository_error::RepositoryError;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerErrorKind {
    MissingField,
    InvalidEmail,
    InvalidPhone,
    InvalidSelection,
    EmptySelection,
    InvalidValue,
    NotModifiable,
    BadRequest,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    StoreUnavailable,
    Internal,
}

impl HandlerErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            HandlerErrorKind::MissingField
            | HandlerErrorKind::InvalidEmail
            | HandlerErrorKind::InvalidPhone
            | HandlerErrorKind::InvalidSelection
            | HandlerErrorKind::EmptySelection
            | HandlerErrorKind::InvalidValue
            | HandlerErrorKind::NotModifiable
            | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Forbidden => StatusCode::FORBIDDEN,
            HandlerErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error body returned by every handler: `{ "error": message, "kind": kind }`,
/// plus the offending `field` for validation failures.
#[derive(Debug, Serialize)]
pub struct HandlerError {
    #[serde(rename = "error")]
    pub message: String,
    pub kind: HandlerErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl HandlerError {
    pub fn new<T: Into<String>>(kind: HandlerErrorKind, message: T) -> Self {
        HandlerError { message: message.into(), kind, field: None }
    }

    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

impl From<ValidationError> for HandlerError {
    fn from(err: ValidationError) -> Self {
        let kind = match err {
            ValidationError::MissingField(_) => HandlerErrorKind::MissingField,
            ValidationError::InvalidEmail(_) => HandlerErrorKind::InvalidEmail,
            ValidationError::InvalidPhone(_) => HandlerErrorKind::InvalidPhone,
            ValidationError::InvalidSelection { .. } => HandlerErrorKind::InvalidSelection,
            ValidationError::EmptySelection(_) => HandlerErrorKind::EmptySelection,
            ValidationError::InvalidValue { .. } => HandlerErrorKind::InvalidValue,
            ValidationError::NotModifiable(_) => HandlerErrorKind::NotModifiable,
        };
        HandlerError {
            message: err.to_string(),
            kind,
            field: Some(err.field().to_string()),
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => e.into(),
            ServiceError::Conflict(msg) => HandlerError::new(HandlerErrorKind::Conflict, msg),
            ServiceError::NotFound(msg) => HandlerError::new(HandlerErrorKind::NotFound, msg),
            ServiceError::StoreUnavailable(msg) => {
                error!("Entity store unavailable: {}", msg);
                HandlerError::new(
                    HandlerErrorKind::StoreUnavailable,
                    "Service temporarily unavailable, please try again later",
                )
            }
            ServiceError::Internal(msg) => {
                error!("Unexpected failure: {}", msg);
                HandlerError::new(HandlerErrorKind::Internal, "Internal server error")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    Validation(ValidationError),
    Conflict(String),
    NotFound(String),
    /// The store could not be reached or did not answer in time.
    StoreUnavailable(String),
    Internal(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(err) => write!(f, "Invalid Input: {}", err),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::StoreUnavailable(msg) => write!(f, "Store Unavailable: {}", msg),
            ServiceError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::StoreUnavailable(msg),
            RepositoryError::ValidationError(msg)
            | RepositoryError::DatabaseError(msg)
            | RepositoryError::SerializationError(msg) => ServiceError::Internal(msg),
            RepositoryError::Generic(e) => ServiceError::Internal(e.to_string()),
        }
    }
}
