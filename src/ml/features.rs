use chrono::{Datelike, NaiveDate};
use statrs::statistics::Statistics;

use crate::data::TrainingData;

/// One row of the future frame handed to the model: calendar features plus
/// lag and rolling-mean covariates backfilled from the training series.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub ds: NaiveDate,
    /// Monday = 0 ... Sunday = 6.
    pub day_of_week: f64,
    /// 1-12.
    pub month: f64,
    pub lag_3: f64,
    pub lag_7: f64,
    pub lag_15: f64,
    pub rolling_mean_7: f64,
    pub rolling_mean_15: f64,
}

impl FeatureRow {
    /// Look up a covariate by the name the model artifact refers to it by.
    pub fn regressor(&self, name: &str) -> Option<f64> {
        match name {
            "day_of_week" => Some(self.day_of_week),
            "month" => Some(self.month),
            "lag_3" => Some(self.lag_3),
            "lag_7" => Some(self.lag_7),
            "lag_15" => Some(self.lag_15),
            "rolling_mean_7" => Some(self.rolling_mean_7),
            "rolling_mean_15" => Some(self.rolling_mean_15),
            _ => None,
        }
    }
}

/// Build the feature frame for the given dates.
///
/// Lag and rolling-mean covariates are indexed *positionally* into the
/// training series by row offset within the frame, not aligned to each
/// row's calendar date. This mirrors the behavior of the system this
/// service replaces and is intentionally preserved. Covariates whose
/// offsets fall before the frame start or beyond the end of the training
/// series are filled with the overall training mean.
pub fn build_future_frame(dates: &[NaiveDate], training: &TrainingData) -> Vec<FeatureRow> {
    let fill = training.mean();
    let series = training.values();

    dates
        .iter()
        .enumerate()
        .map(|(i, &ds)| FeatureRow {
            ds,
            day_of_week: ds.weekday().num_days_from_monday() as f64,
            month: ds.month() as f64,
            lag_3: lag_at(series, i, 3).unwrap_or(fill),
            lag_7: lag_at(series, i, 7).unwrap_or(fill),
            lag_15: lag_at(series, i, 15).unwrap_or(fill),
            rolling_mean_7: rolling_mean_at(series, i, 7).unwrap_or(fill),
            rolling_mean_15: rolling_mean_at(series, i, 15).unwrap_or(fill),
        })
        .collect()
}

/// Training value at row offset `i - lag`, if it exists.
fn lag_at(series: &[f64], i: usize, lag: usize) -> Option<f64> {
    if i < lag {
        return None;
    }
    series.get(i - lag).copied()
}

/// Mean of training values over the half-open window `[i - window, i)`,
/// truncated at the end of the series.
fn rolling_mean_at(series: &[f64], i: usize, window: usize) -> Option<f64> {
    if i < window {
        return None;
    }
    let start = i - window;
    if start >= series.len() {
        return None;
    }
    let end = i.min(series.len());
    Some(series[start..end].mean())
}
