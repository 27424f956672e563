use serde::Serialize;

/// Accuracy metrics computed on log1p-transformed values over the most
/// recent historical window. Each value is `None` when undefined, i.e.
/// when every true value in the window transforms to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetrics {
    pub mape: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    pub msle: Option<f64>,
}

/// Compute MAPE, RMSE, MAE and MSLE between true and predicted values.
///
/// Both sides are transformed by `log1p(max(x, 0))` to tolerate zero and
/// near-zero magnitudes. Pairs whose transformed true value is zero are
/// excluded from every metric. MSLE equals RMSE squared by construction
/// here; both are reported. Results are rounded to 2 decimal places.
pub fn compute_metrics(y_true: &[f64], y_pred: &[f64]) -> ModelMetrics {
    let pairs: Vec<(f64, f64)> = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (log1p_clamped(t), log1p_clamped(p)))
        .filter(|(t, _)| *t != 0.0)
        .collect();

    if pairs.is_empty() {
        return ModelMetrics {
            mape: None,
            rmse: None,
            mae: None,
            msle: None,
        };
    }

    let n = pairs.len() as f64;
    let mape = pairs
        .iter()
        .map(|(t, p)| ((t - p) / t).abs())
        .sum::<f64>()
        / n
        * 100.0;
    let mse = pairs.iter().map(|(t, p)| (t - p).powi(2)).sum::<f64>() / n;
    let mae = pairs.iter().map(|(t, p)| (t - p).abs()).sum::<f64>() / n;

    ModelMetrics {
        mape: Some(round2(mape)),
        rmse: Some(round2(mse.sqrt())),
        mae: Some(round2(mae)),
        msle: Some(round2(mse)),
    }
}

fn log1p_clamped(x: f64) -> f64 {
    x.max(0.0).ln_1p()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
