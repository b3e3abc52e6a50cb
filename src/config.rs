// src/config.rs
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::env;

/// Default relative-deviation threshold for drift flagging.
///
/// Deployments have historically overridden this with much larger values via
/// `DRIFT_THRESHOLD`, which disables flagging for all bounded features. The
/// override stays in configuration; the default documented here is the
/// intended fractional ratio.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub predictions_log_path: String,
    pub drift_threshold: f64,
}

impl ServiceConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .unwrap_or(8000);
        let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| "model.json".to_string());
        let predictions_log_path =
            env::var("PREDICTIONS_LOG_PATH").unwrap_or_else(|_| "predictions.log".to_string());
        let drift_threshold = env::var("DRIFT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_DRIFT_THRESHOLD);

        debug!(
            "Service config: host={}, port={}, model_path={}, drift_threshold={}",
            host, port, model_path, drift_threshold
        );

        Self {
            host,
            port,
            model_path,
            predictions_log_path,
            drift_threshold,
        }
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("Serving on {}:{}", self.host, self.port);
        info!("Model artifact: {}", self.model_path);
        info!("Prediction log: {}", self.predictions_log_path);
        if self.drift_threshold > 1.0 {
            warn!(
                "Drift threshold {} exceeds 1.0; drift flagging is effectively disabled for bounded features",
                self.drift_threshold
            );
        } else {
            info!("Drift threshold: {}", self.drift_threshold);
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads environment variables from an optional .env file in the working
/// directory. System environment variables always win.
pub fn load_env() {
    if let Err(e) = load_env_from_file(".env") {
        warn!("Could not process .env file: {}", e);
    }
}

pub fn load_env_from_file(file_path: &str) -> Result<()> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    match File::open(file_path) {
        Ok(file) => {
            let reader = BufReader::new(file);
            for line in reader.lines() {
                let line = line.context("Failed to read line from env file")?;
                if line.starts_with('#') || line.trim().is_empty() {
                    continue;
                }
                if let Some(idx) = line.find('=') {
                    let key = line[..idx].trim();
                    let value = line[idx + 1..].trim().trim_matches('"');
                    if env::var(key).is_err() {
                        // Set only if not already set
                        env::set_var(key, value);
                        debug!("Set env var from file: {} = {}", key, value);
                    }
                }
            }
            info!("Successfully processed env file: {}", file_path);
        }
        Err(e) => {
            debug!(
                "Could not open env file '{}': {}. Proceeding with system environment variables.",
                file_path, e
            );
        }
    }
    Ok(())
}
