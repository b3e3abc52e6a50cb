// src/drift.rs
use log::debug;
use std::collections::HashMap;

/// Flags features whose relative deviation from the training-set mean
/// exceeds a threshold.
///
/// Constructed once at startup from the artifact's feature means and the
/// configured threshold; read-only afterwards.
#[derive(Debug, Clone)]
pub struct DriftDetector {
    means: HashMap<String, f64>,
    threshold: f64,
}

impl DriftDetector {
    pub fn new(means: HashMap<String, f64>, threshold: f64) -> Self {
        Self { means, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the names of drifted columns for an aligned vector.
    ///
    /// A column is drifted when it has a recorded non-zero training mean and
    /// `|value - mean| / |mean|` strictly exceeds the threshold. Columns with
    /// a zero mean are skipped, as are columns with no recorded mean.
    pub fn detect(&self, columns: &[String], vector: &[f64]) -> Vec<String> {
        let mut drifted = Vec::new();
        for (col, &value) in columns.iter().zip(vector) {
            if let Some(&mean) = self.means.get(col) {
                if mean != 0.0 {
                    let ratio = (value - mean).abs() / mean.abs();
                    if ratio > self.threshold {
                        debug!(
                            "Feature '{}' drifted: value={}, mean={}, ratio={:.3}",
                            col, value, mean, ratio
                        );
                        drifted.push(col.clone());
                    }
                }
            }
        }
        drifted
    }
}
