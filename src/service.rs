// src/service.rs
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::{AuditRecord, AuditSink};
use crate::drift::DriftDetector;
use crate::features::{align, CustomerRecord};
use crate::model::ModelArtifact;

/// Probability at or above which a record is predicted to churn.
pub const CHURN_DECISION_THRESHOLD: f64 = 0.5;

/// Immutable per-process service state: the loaded artifact, the drift
/// detector derived from its training means, and the audit sink. Built once
/// in main and shared read-only across requests; nothing here mutates after
/// construction.
pub struct ServiceContext {
    artifact: Arc<ModelArtifact>,
    drift: DriftDetector,
    predictions_log_path: PathBuf,
    audit: Option<AuditSink>,
}

/// What one inference run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    /// Churn probability rounded to 3 decimal places.
    pub probability: f64,
    pub churned: bool,
    pub drifted_features: Vec<String>,
}

impl ServiceContext {
    pub fn new(
        artifact: ModelArtifact,
        drift_threshold: f64,
        predictions_log_path: PathBuf,
        audit: Option<AuditSink>,
    ) -> Self {
        let drift = DriftDetector::new(artifact.feature_means.clone(), drift_threshold);
        Self {
            artifact: Arc::new(artifact),
            drift,
            predictions_log_path,
            audit,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn predictions_log_path(&self) -> &std::path::Path {
        &self.predictions_log_path
    }

    /// Runs one record through alignment, inference and drift detection,
    /// then dispatches a best-effort audit record.
    ///
    /// The churn flag is decided on the raw probability; rounding only
    /// affects the reported value.
    pub fn predict(&self, record: &CustomerRecord) -> PredictionOutcome {
        let vector = align(record, &self.artifact.columns);
        let raw = self.artifact.model.predict_proba(&vector);
        let probability = round3(raw);
        let churned = raw >= CHURN_DECISION_THRESHOLD;
        let drifted_features = self.drift.detect(&self.artifact.columns, &vector);

        info!(
            "Prediction for customer {}: prob={:.3}, churn={}, drifted_features={}",
            record.customer_id,
            probability,
            churned,
            drifted_features.len()
        );

        if let Some(audit) = &self.audit {
            audit.record(&AuditRecord {
                columns: self.artifact.columns.clone(),
                vector,
                probability,
                prediction: churned as u8,
                drifted: drifted_features.clone(),
            });
        }

        PredictionOutcome {
            probability,
            churned,
            drifted_features,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
