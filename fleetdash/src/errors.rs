//! Request-level errors and their HTTP mapping.
//!
//! Every handler returns [`Result`]. Rejections are rendered as `{"detail": "..."}` with a
//! message that is safe to show in the dashboard; the underlying cause only goes to the logs.

use crate::db::errors::DbError;
use crate::types::{Operation, Permission, Resource};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::Level;

#[derive(ThisError, Debug)]
pub enum Error {
    /// No usable identity on the request
    #[error("Unauthenticated: {}", message.as_deref().unwrap_or("no credentials"))]
    Unauthenticated { message: Option<String> },

    /// Caller is known but may not read this
    #[error("{action:?} on {resource} requires {required:?}")]
    InsufficientPermissions {
        required: Permission,
        action: Operation,
        resource: Resource,
    },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("No {resource} {id}")]
    NotFound { resource: String, id: String },

    /// Failure inside this service, described by what it was doing
    #[error("Failed to {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } | Error::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            Error::Internal { .. } | Error::Database(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Server-side failures are deliberately vague.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication credentials were not provided or are invalid".to_string()),
            Error::InsufficientPermissions { action, resource, .. } => {
                format!("You do not have permission to {action} {resource}")
            }
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} does not exist"),
            Error::Database(DbError::NotFound) => "Not found".to_string(),
            Error::Internal { .. } | Error::Database(_) | Error::Other(_) => {
                "The dashboard could not load this data".to_string()
            }
        }
    }

    fn log_level(&self) -> Level {
        match self {
            Error::Internal { .. } | Error::Database(DbError::SchemaMismatch { .. } | DbError::Other(_)) | Error::Other(_) => {
                Level::ERROR
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => Level::INFO,
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Database(DbError::NotFound) => Level::DEBUG,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match (self.log_level(), &self) {
            (_, Error::Database(DbError::SchemaMismatch { code, .. })) => {
                tracing::error!(sqlstate = %code, "Record store does not match configured capabilities: {}", self);
            }
            (Level::ERROR, _) => tracing::error!("Request failed: {:#}", self),
            (Level::INFO, _) => tracing::info!("Request rejected: {}", self),
            _ => tracing::debug!("Client error: {}", self),
        }

        let status = self.status_code();
        (status, Json(json!({ "detail": self.user_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
