// src/routes.rs
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::audit;
use crate::errors::ServiceError;
use crate::features::CustomerRecord;
use crate::service::ServiceContext;

pub type SharedContext = Arc<ServiceContext>;

/// Response body for the inference endpoint. Field names match what the
/// front-end form consumes.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(rename = "Churn_Prediction")]
    pub churn_prediction: u8,
    #[serde(rename = "Churn_Probability")]
    pub churn_probability: f64,
    #[serde(rename = "Drift_Detected")]
    pub drift_detected: bool,
    #[serde(rename = "Drifted_Features")]
    pub drifted_features: Vec<String>,
    #[serde(rename = "Meaning")]
    pub meaning: String,
}

pub fn build_router(context: SharedContext) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/stats", get(stats))
        .with_state(context)
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "ML Model API is running" }))
}

async fn health(State(context): State<SharedContext>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_id": context.artifact().id,
        "model_version": context.artifact().version,
    }))
}

async fn predict(
    State(context): State<SharedContext>,
    payload: Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ServiceError> {
    let Json(record) = payload.map_err(|rejection| ServiceError::Validation {
        field: "body".to_string(),
        reason: rejection.body_text(),
    })?;

    let outcome = context.predict(&record);

    let meaning = if outcome.churned {
        "Customer will churn"
    } else {
        "Customer will NOT churn"
    };

    Ok(Json(PredictResponse {
        churn_prediction: outcome.churned as u8,
        churn_probability: outcome.probability,
        drift_detected: !outcome.drifted_features.is_empty(),
        drifted_features: outcome.drifted_features,
        meaning: meaning.to_string(),
    }))
}

async fn stats(State(context): State<SharedContext>) -> Json<Value> {
    match audit::read_stats(context.predictions_log_path(), 5).await {
        Some(stats) => Json(json!({
            "total_predictions": stats.total_predictions,
            "last_5_predictions": stats.last_predictions,
        })),
        None => Json(json!({ "message": "No predictions logged yet" })),
    }
}
