use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-scoped error taxonomy. Every failure is translated into a
/// status/message pair at the HTTP boundary; nothing is retried and nothing
/// crashes the process.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not found or failed to load")]
    ModelUnavailable,

    #[error("Training data could not be loaded properly")]
    DataUnavailable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidInput(detail) => {
                error!("Invalid input: {}", detail);
                (StatusCode::BAD_REQUEST, format!("Invalid input: {}", detail))
            }
            ApiError::ModelUnavailable => {
                error!("Model error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Model is not available. Please check the server configuration.".to_string(),
                )
            }
            ApiError::DataUnavailable => {
                error!("Data loading error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Training data could not be loaded. Please check the dataset.".to_string(),
                )
            }
            ApiError::Internal(source) => {
                // Internal detail goes to the log, never to the caller.
                error!("Error during prediction: {:#}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred. Please try again later.".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read dataset: {0}")]
    ReadError(String),

    #[error("Dataset is empty after cleaning")]
    EmptyDataset,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model loading failed: {0}")]
    LoadError(String),

    #[error("Inference failed: {0}")]
    InferenceError(String),
}
