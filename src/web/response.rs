//! JSON response envelope and error-to-status mapping.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Standard wrapper for every JSON body the server returns:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "Indicator created" }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload, `null` on errors
    pub data: T,
    /// Human-readable context
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// A success response carrying `data`.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// An error response with default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

impl Error {
    /// HTTP status a handler reports for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::LookupNotFound { .. } | Self::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::IndicatorNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ParentCycle { .. } => StatusCode::CONFLICT,
            Self::Database(_) if self.is_unique_violation() => StatusCode::CONFLICT,
            Self::Database(_) | Self::Config { .. } | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::Database(_) if self.is_unique_violation() => {
                "An indicator with this code already exists".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ApiResponse::<()>::error(self.public_message()))).into_response()
    }
}
