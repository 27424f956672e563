//! HTTP service serving 7-day forecasts of a conversion-count metric from a
//! pretrained additive regression model, with lag/rolling-mean covariates
//! backfilled from historical data and log-transformed accuracy metrics.

pub mod config;
pub mod data;
pub mod error;
pub mod ml;
pub mod web;
