use chrono::{Duration, NaiveDate};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use tracing::info;

use super::features::FeatureRow;
use crate::error::ModelError;

/// Serialized parameters of a pretrained additive regression model:
/// piecewise-linear trend, Fourier seasonalities and standardized extra
/// regressors, plus the daily training horizon the model was fitted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    /// First date of the training horizon (daily frequency).
    pub history_start: NaiveDate,
    /// Number of daily observations the model was fitted on.
    pub history_len: usize,
    pub trend: TrendParams,
    pub seasonalities: Vec<SeasonalityBlock>,
    pub regressors: Vec<RegressorCoef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendParams {
    /// Base growth rate.
    pub k: f64,
    /// Offset.
    pub m: f64,
    pub changepoints: Vec<Changepoint>,
}

/// A trend changepoint at scaled time `t` with rate adjustment `delta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changepoint {
    pub t: f64,
    pub delta: f64,
}

/// One seasonality component as a truncated Fourier series. `beta` holds
/// interleaved sin/cos coefficients, so its length is `2 * order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityBlock {
    pub name: String,
    pub period_days: f64,
    pub order: usize,
    pub beta: Vec<f64>,
}

/// Coefficient for an extra regressor, applied to the standardized value
/// `(x - mu) / sigma`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorCoef {
    pub name: String,
    pub mu: f64,
    pub sigma: f64,
    pub coef: f64,
}

/// Pretrained additive forecasting model. Immutable after loading; shared
/// read-only across requests.
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    artifact: ModelArtifact,
    t_scale: f64,
}

impl AdditiveModel {
    /// Load the model from a JSON artifact on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ModelError::LoadError(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|e| ModelError::LoadError(e.to_string()))?;

        let model = Self::from_artifact(artifact)?;
        info!(
            "Loaded additive model {} (history of {} days from {})",
            model.artifact.version, model.artifact.history_len, model.artifact.history_start
        );
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.history_len == 0 {
            return Err(ModelError::LoadError(
                "model artifact has an empty training horizon".to_string(),
            ));
        }
        for block in &artifact.seasonalities {
            if block.beta.len() != 2 * block.order {
                return Err(ModelError::LoadError(format!(
                    "seasonality '{}' has {} coefficients, expected {}",
                    block.name,
                    block.beta.len(),
                    2 * block.order
                )));
            }
            if block.period_days <= 0.0 {
                return Err(ModelError::LoadError(format!(
                    "seasonality '{}' has non-positive period",
                    block.name
                )));
            }
        }
        for reg in &artifact.regressors {
            if reg.sigma <= 0.0 {
                return Err(ModelError::LoadError(format!(
                    "regressor '{}' has non-positive sigma",
                    reg.name
                )));
            }
        }

        let t_scale = (artifact.history_len.saturating_sub(1)).max(1) as f64;
        Ok(Self { artifact, t_scale })
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    pub fn history_len(&self) -> usize {
        self.artifact.history_len
    }

    /// The model's training horizon extended by `periods` daily steps,
    /// mirroring the original frame the model was fitted on plus the future.
    pub fn future_dates(&self, periods: usize) -> Vec<NaiveDate> {
        (0..self.artifact.history_len + periods)
            .map(|i| self.artifact.history_start + Duration::days(i as i64))
            .collect()
    }

    /// Evaluate the model on a single feature row.
    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let day = (row.ds - self.artifact.history_start).num_days() as f64;
        let t = day / self.t_scale;

        let mut yhat = self.trend_at(t);
        for block in &self.artifact.seasonalities {
            yhat += self.seasonal_component(block, day);
        }
        for reg in &self.artifact.regressors {
            let value = row.regressor(&reg.name).ok_or_else(|| {
                ModelError::InferenceError(format!("unknown regressor '{}'", reg.name))
            })?;
            yhat += reg.coef * (value - reg.mu) / reg.sigma;
        }
        Ok(yhat)
    }

    fn trend_at(&self, t: f64) -> f64 {
        let mut k = self.artifact.trend.k;
        let mut m = self.artifact.trend.m;
        for cp in &self.artifact.trend.changepoints {
            if t >= cp.t {
                k += cp.delta;
                // Keep the trend continuous across the changepoint.
                m -= cp.t * cp.delta;
            }
        }
        k * t + m
    }

    fn seasonal_component(&self, block: &SeasonalityBlock, day: f64) -> f64 {
        let mut features = Vec::with_capacity(2 * block.order);
        for n in 1..=block.order {
            let x = 2.0 * PI * n as f64 * day / block.period_days;
            features.push(x.sin());
            features.push(x.cos());
        }
        DVector::from_vec(features).dot(&DVector::from_column_slice(&block.beta))
    }
}
