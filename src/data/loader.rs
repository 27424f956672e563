use chrono::NaiveDate;
use serde::Deserialize;
use statrs::statistics::Statistics;
use std::path::Path;
use tracing::info;

use crate::error::DataError;

/// Z-score threshold beyond which a training row is treated as an outlier.
const OUTLIER_Z_THRESHOLD: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: NaiveDate,
    conversion_count: Option<f64>,
}

/// Cleaned historical conversion counts, loaded once at startup and
/// treated as read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct TrainingData {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TrainingData {
    /// Load the training dataset from a CSV file with `date` and
    /// `conversion_count` columns. Missing counts are backfilled with the
    /// series mean, then rows whose |z-score| reaches the outlier threshold
    /// are discarded.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let mut reader = csv::Reader::from_path(path.as_ref())
            .map_err(|e| DataError::ReadError(e.to_string()))?;

        let mut dates = Vec::new();
        let mut raw_values = Vec::new();
        for record in reader.deserialize() {
            let record: RawRecord = record.map_err(|e| DataError::ReadError(e.to_string()))?;
            dates.push(record.date);
            raw_values.push(record.conversion_count);
        }

        let data = Self::from_records(dates, raw_values)?;
        info!(
            "Loaded training data: {} rows after outlier cleaning",
            data.len()
        );
        Ok(data)
    }

    /// Build the cleaned series from already-parsed records.
    pub fn from_records(
        dates: Vec<NaiveDate>,
        raw_values: Vec<Option<f64>>,
    ) -> Result<Self, DataError> {
        let present: Vec<f64> = raw_values.iter().filter_map(|v| *v).collect();
        if present.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        let fill = present.mean();

        let values: Vec<f64> = raw_values.into_iter().map(|v| v.unwrap_or(fill)).collect();
        let (dates, values) = clean_outliers(dates, values);

        if values.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Mean of the cleaned conversion counts.
    pub fn mean(&self) -> f64 {
        self.values.clone().mean()
    }

    /// The trailing `k` observations (fewer if the series is shorter).
    pub fn last_values(&self, k: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(k);
        &self.values[start..]
    }
}

/// Drop rows whose population z-score of the value reaches the threshold.
/// A degenerate series (zero or non-finite spread) is kept as-is.
fn clean_outliers(dates: Vec<NaiveDate>, values: Vec<f64>) -> (Vec<NaiveDate>, Vec<f64>) {
    let mean = values.clone().mean();
    let std_dev = values.clone().population_std_dev();
    if !std_dev.is_finite() || std_dev == 0.0 {
        return (dates, values);
    }

    dates
        .into_iter()
        .zip(values)
        .filter(|(_, v)| ((v - mean) / std_dev).abs() < OUTLIER_Z_THRESHOLD)
        .unzip()
}
