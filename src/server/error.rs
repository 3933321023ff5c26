//! HTTP error mapping
//!
//! Handlers return `Result<T, ApiError>`; the error converts itself into a
//! JSON `{"error": ...}` body with a status picked from the underlying
//! [`HealthaiError`].

use crate::error::HealthaiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<HealthaiError>() {
            Some(HealthaiError::Validation(m)) => Self::new(StatusCode::BAD_REQUEST, m.clone()),
            Some(HealthaiError::PanelFailed(m)) => Self::new(StatusCode::BAD_GATEWAY, m.clone()),
            Some(HealthaiError::Provider(_))
            | Some(HealthaiError::Authentication(_))
            | Some(HealthaiError::Http(_)) => {
                tracing::error!(error = %err, "provider error");
                Self::new(StatusCode::BAD_GATEWAY, "upstream model error")
            }
            Some(HealthaiError::Busy) => Self::new(StatusCode::CONFLICT, err.to_string()),
            _ => {
                tracing::error!(error = %format!("{:#}", err), "internal server error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError =
            anyhow::Error::from(HealthaiError::Validation("Please describe your symptoms.".into()))
                .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Please describe your symptoms.");
    }

    #[test]
    fn test_panel_failure_maps_to_502() {
        let err: ApiError = anyhow::Error::from(HealthaiError::PanelFailed(
            "Failed to analyze symptoms. Please try again.".into(),
        ))
        .into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_storage_error_is_hidden() {
        let err: ApiError =
            anyhow::Error::from(HealthaiError::Storage("/home/x/history.db locked".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
