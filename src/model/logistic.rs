// src/model/logistic.rs
use log::warn;
use serde::{Deserialize, Serialize};

// A logistic regression model trained via gradient descent. The serialized
// form is the model artifact's `model` field.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
    trials: usize,
}

impl LogisticModel {
    // Initializes the model with zero-weights.
    pub fn new(feature_count: usize) -> Self {
        Self {
            weights: vec![0.0; feature_count],
            bias: 0.0,
            learning_rate: 0.01, // A small, fixed learning rate
            trials: 0,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Predicts the churn probability for an aligned feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        if features.len() != self.weights.len() {
            warn!(
                "Expected {} features, but got {}. Prediction will be unreliable.",
                self.weights.len(),
                features.len()
            );
            return 0.5; // Return a neutral probability on error
        }

        // Dot product of weights and features, plus the bias term
        let logit: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, f)| w * f)
            .sum::<f64>()
            + self.bias;

        // Sigmoid maps the logit into a probability between 0 and 1
        1.0 / (1.0 + (-logit).exp())
    }

    // Updates the model weights based on a single training example.
    pub fn update(&mut self, features: &[f64], label: f64) {
        if features.len() != self.weights.len() {
            warn!("Skipping model update due to feature vector length mismatch.");
            return;
        }

        let prediction = self.predict_proba(features);
        let error = label - prediction;

        for (weight, feature_val) in self.weights.iter_mut().zip(features) {
            *weight += self.learning_rate * error * feature_val;
        }
        self.bias += self.learning_rate * error; // Bias feature is always 1.0

        self.trials += 1;
    }
}
