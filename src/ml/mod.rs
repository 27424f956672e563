pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;

pub use model::{AdditiveModel, ModelArtifact};
pub use pipeline::{run_forecast, ForecastOutcome, FORECAST_HORIZON};
