//! Tests for the HTTP surface: routing, validation, error mapping and the
//! shape of successful forecast responses.

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use chrono::{Duration, NaiveDate};
use tower::ServiceExt;

use conversion_forecast::data::TrainingData;
use conversion_forecast::ml::model::{
    Changepoint, ModelArtifact, RegressorCoef, SeasonalityBlock, TrendParams,
};
use conversion_forecast::ml::AdditiveModel;
use conversion_forecast::web::server::WELCOME_MESSAGE;
use conversion_forecast::web::{ApiServer, AppState};

fn model() -> AdditiveModel {
    let artifact = ModelArtifact {
        version: "test".to_string(),
        history_start: "2025-01-01".parse().unwrap(),
        history_len: 40,
        trend: TrendParams {
            k: 8.0,
            m: 60.0,
            changepoints: vec![Changepoint { t: 0.5, delta: -2.0 }],
        },
        seasonalities: vec![SeasonalityBlock {
            name: "weekly".to_string(),
            period_days: 7.0,
            order: 2,
            beta: vec![3.0, -1.5, 0.5, 0.25],
        }],
        regressors: vec![
            RegressorCoef {
                name: "lag_7".to_string(),
                mu: 65.0,
                sigma: 8.0,
                coef: 2.0,
            },
            RegressorCoef {
                name: "rolling_mean_7".to_string(),
                mu: 65.0,
                sigma: 8.0,
                coef: 1.0,
            },
        ],
    };
    AdditiveModel::from_artifact(artifact).unwrap()
}

fn training() -> TrainingData {
    let start: NaiveDate = "2025-01-01".parse().unwrap();
    let dates = (0..40).map(|i| start + Duration::days(i)).collect();
    let values = (0..40).map(|i| Some(60.0 + (i % 7) as f64 * 2.0)).collect();
    TrainingData::from_records(dates, values).unwrap()
}

fn app(state: AppState) -> axum::Router {
    ApiServer::new(state).router()
}

fn loaded_state() -> AppState {
    AppState::new(Some(model()), Some(training()))
}

fn post_predict(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn home_returns_welcome_text() {
    let response = app(loaded_state())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains(WELCOME_MESSAGE));
}

#[tokio::test]
async fn valid_date_returns_seven_predictions_and_metrics() {
    let response = app(loaded_state())
        .oneshot(post_predict(Body::from(r#"{"date": "2025-02-10"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 7);
    for p in predictions {
        assert!(p["date"].as_str().unwrap().parse::<NaiveDate>().is_ok());
        assert!(p["conversion_count"].is_i64());
    }

    let metrics = body["model_metrics"].as_object().unwrap();
    for key in ["mape", "rmse", "mae", "msle"] {
        assert!(metrics.contains_key(key), "missing metric {}", key);
    }
    // Training values here are strictly positive, so none is null.
    assert!(metrics["rmse"].as_f64().unwrap() >= 0.0);
    assert!(metrics["mae"].as_f64().unwrap() >= 0.0);
    assert!(metrics["msle"].as_f64().unwrap() >= 0.0);
    assert!(metrics["mape"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn repeated_requests_yield_identical_output() {
    let state = loaded_state();

    let first = app(state.clone())
        .oneshot(post_predict(Body::from(r#"{"date": "2025-02-10"}"#)))
        .await
        .unwrap();
    let second = app(state)
        .oneshot(post_predict(Body::from(r#"{"date": "2025-02-10"}"#)))
        .await
        .unwrap();

    assert_eq!(body_json(first).await, body_json(second).await);
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let response = app(loaded_state())
        .oneshot(post_predict(Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn non_json_body_is_bad_request() {
    let response = app(loaded_state())
        .oneshot(post_predict(Body::from("this is not json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn missing_date_field_is_bad_request() {
    let response = app(loaded_state())
        .oneshot(post_predict(Body::from("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn unparseable_date_is_internal_error() {
    let response = app(loaded_state())
        .oneshot(post_predict(Body::from(r#"{"date": "invalid-date"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn missing_model_is_server_error() {
    let state = AppState::new(None, Some(training()));
    let response = app(state)
        .oneshot(post_predict(Body::from(r#"{"date": "2025-02-10"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Model"));
}

#[tokio::test]
async fn missing_training_data_is_server_error() {
    let state = AppState::new(Some(model()), None);
    let response = app(state)
        .oneshot(post_predict(Body::from(r#"{"date": "2025-02-10"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Training data"));
}

#[tokio::test]
async fn input_validation_precedes_availability_checks() {
    // A malformed body must 400 even when the model is missing.
    let state = AppState::new(None, None);
    let response = app(state)
        .oneshot(post_predict(Body::from("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
