use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::data::TrainingData;
use crate::error::ApiError;
use crate::ml::{run_forecast, AdditiveModel, ForecastOutcome};

pub const WELCOME_MESSAGE: &str = "Welcome to the conversion forecast API!";

/// Process-wide immutable state. Either collaborator may be absent when its
/// artifact failed to load at startup; the service then answers requests
/// with the matching unavailability error instead of crashing.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<AdditiveModel>>,
    training: Option<Arc<TrainingData>>,
}

impl AppState {
    pub fn new(model: Option<AdditiveModel>, training: Option<TrainingData>) -> Self {
        Self {
            model: model.map(Arc::new),
            training: training.map(Arc::new),
        }
    }

    /// Load the model artifact and training dataset named by the config.
    /// A failed load degrades the corresponding capability rather than
    /// aborting startup.
    pub fn load(config: &Config) -> Self {
        let model = match AdditiveModel::load(&config.model.artifact_path) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Model unavailable: {}", e);
                None
            }
        };

        let training = match TrainingData::from_csv(&config.data.training_path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Training data unavailable: {}", e);
                None
            }
        };

        Self::new(model, training)
    }
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(home))
            .route("/predict", post(predict))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn start(&self, host: &str, port: u16) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
        info!("Forecast API listening on http://{}:{}", host, port);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn home() -> &'static str {
    WELCOME_MESSAGE
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    date: String,
}

/// POST /predict: validate the body, check collaborator availability, then
/// run the forecast pipeline. Errors map onto the taxonomy in `error.rs`.
async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ForecastOutcome>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidInput(
            "Request body is empty or not in proper format".to_string(),
        ));
    }

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|_| {
        ApiError::InvalidInput("Request body is empty or not in proper format".to_string())
    })?;

    let request: PredictRequest = serde_json::from_value(payload.clone())
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let model = state.model.as_ref().ok_or(ApiError::ModelUnavailable)?;
    let training = state.training.as_ref().ok_or(ApiError::DataUnavailable)?;

    info!("Incoming payload: {}", payload);
    let outcome = run_forecast(model, training, &request.date)?;
    Ok(Json(outcome))
}
