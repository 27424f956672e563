use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::features::build_future_frame;
use super::metrics::{compute_metrics, ModelMetrics};
use super::model::AdditiveModel;
use crate::data::TrainingData;
use crate::error::ApiError;

/// Number of daily predictions returned per request.
pub const FORECAST_HORIZON: usize = 7;

#[derive(Debug, Clone, Serialize)]
pub struct PredictionPoint {
    pub date: String,
    pub conversion_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutcome {
    pub predictions: Vec<PredictionPoint>,
    pub model_metrics: ModelMetrics,
}

/// The forecast request pipeline: validate the date, extend the model's
/// horizon by 7 days, backfill lag and rolling-mean covariates from the
/// training series, run the model, and score the trailing window against
/// recent history.
pub fn run_forecast(
    model: &AdditiveModel,
    training: &TrainingData,
    date_str: &str,
) -> Result<ForecastOutcome, ApiError> {
    // The date must parse; the forecast window itself extends the model's
    // own training horizon rather than anchoring on the requested date.
    let _requested: NaiveDate = date_str
        .parse()
        .with_context(|| format!("failed to parse date '{}'", date_str))?;

    let dates = model.future_dates(FORECAST_HORIZON);
    let frame = build_future_frame(&dates, training);

    let yhat: Vec<f64> = frame
        .iter()
        .map(|row| model.predict_row(row))
        .collect::<Result<_, _>>()
        .context("model inference failed")?;

    // Only the trailing 7 rows of the full forecast are the answer.
    let tail_start = yhat.len().saturating_sub(FORECAST_HORIZON);
    let yhat_tail = &yhat[tail_start..];
    let dates_tail = &dates[tail_start..];

    let y_true = training.last_values(yhat_tail.len());
    let model_metrics = compute_metrics(y_true, yhat_tail);

    let predictions: Vec<PredictionPoint> = dates_tail
        .iter()
        .zip(yhat_tail.iter())
        .map(|(date, &value)| PredictionPoint {
            date: date.to_string(),
            conversion_count: value.round() as i64,
        })
        .collect();

    info!("Prediction result: {:?}", predictions);
    info!("Model metrics: {:?}", model_metrics);

    Ok(ForecastOutcome {
        predictions,
        model_metrics,
    })
}
