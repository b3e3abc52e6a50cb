// src/model/artifact.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use super::logistic::LogisticModel;

/// The serialized training output: fitted model, the one-hot-expanded column
/// order the model expects, and per-column training means for drift
/// detection. Produced once by the trainer, loaded read-only at service
/// startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelArtifact {
    pub id: String,
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub model: LogisticModel,
    pub columns: Vec<String>,
    pub feature_means: HashMap<String, f64>,
}

impl ModelArtifact {
    pub fn new(
        model: LogisticModel,
        columns: Vec<String>,
        feature_means: HashMap<String, f64>,
    ) -> Self {
        Self {
            id: format!("churn_model_{}", Uuid::new_v4()),
            version: 1,
            trained_at: Utc::now(),
            model,
            columns,
            feature_means,
        }
    }

    /// Loads and validates an artifact. Any failure here is fatal at
    /// startup; the service never serves without a usable model.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact at {}", path.display()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).context("Failed to deserialize model artifact")?;
        artifact.validate()?;
        info!(
            "Loaded model artifact {} (v{}, {} columns, trained {})",
            artifact.id,
            artifact.version,
            artifact.columns.len(),
            artifact.trained_at
        );
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize model artifact")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write model artifact to {}", path.display()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            bail!("Model artifact lists no feature columns");
        }
        if self.model.feature_count() != self.columns.len() {
            bail!(
                "Model expects {} features but the artifact lists {} columns",
                self.model.feature_count(),
                self.columns.len()
            );
        }
        for col in self.feature_means.keys() {
            if !self.columns.contains(col) {
                bail!("Feature mean '{}' does not match any training column", col);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("churn_artifact_{}.json", Uuid::new_v4()))
    }

    fn sample_artifact() -> ModelArtifact {
        let columns = vec!["Age".to_string(), "Tenure".to_string()];
        let mut means = HashMap::new();
        means.insert("Age".to_string(), 40.0);
        means.insert("Tenure".to_string(), 12.0);
        ModelArtifact::new(LogisticModel::new(2), columns, means)
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = temp_path();
        let artifact = sample_artifact();
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.id, artifact.id);
        assert_eq!(loaded.columns, artifact.columns);
        assert_eq!(loaded.feature_means["Age"], 40.0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ModelArtifact::load(&temp_path()).is_err());
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let path = temp_path();
        std::fs::write(&path, "not an artifact").unwrap();
        assert!(ModelArtifact::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_column_count_mismatch_fails_validation() {
        let path = temp_path();
        let mut artifact = sample_artifact();
        artifact.columns.push("Extra".to_string());
        artifact.save(&path).unwrap();
        assert!(ModelArtifact::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_mean_fails_validation() {
        let path = temp_path();
        let mut artifact = sample_artifact();
        artifact
            .feature_means
            .insert("Mystery".to_string(), 1.0);
        artifact.save(&path).unwrap();
        assert!(ModelArtifact::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_columns_fails_validation() {
        let path = temp_path();
        let artifact = ModelArtifact::new(LogisticModel::new(0), Vec::new(), HashMap::new());
        artifact.save(&path).unwrap();
        assert!(ModelArtifact::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
