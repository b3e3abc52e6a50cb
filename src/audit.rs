// src/audit.rs
use log::warn;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// One prediction's audit entry.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub columns: Vec<String>,
    pub vector: Vec<f64>,
    pub probability: f64,
    pub prediction: u8,
    pub drifted: Vec<String>,
}

impl AuditRecord {
    /// Renders the record as one plain-text log line. The format is opaque
    /// and append-only; nothing in this system parses it back beyond line
    /// counting.
    pub fn format_line(&self) -> String {
        let input: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(&self.vector)
            .map(|(col, value)| (col.clone(), json!(value)))
            .collect();
        format!(
            "input={} | prob={} | prediction={} | drift={}",
            serde_json::Value::Object(input),
            self.probability,
            self.prediction,
            json!(self.drifted)
        )
    }
}

/// Best-effort append-only prediction log.
///
/// Records are handed to a single writer task over a channel, so request
/// handling never blocks on disk and concurrent requests cannot interleave
/// partial lines. Failures are logged and dropped; the prediction response
/// is unaffected.
#[derive(Debug, Clone)]
pub struct AuditSink {
    tx: mpsc::UnboundedSender<String>,
}

impl AuditSink {
    /// Spawns the writer task and returns the sending handle.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if let Err(e) = append_line(&path, &line).await {
                    warn!("Failed to append prediction audit record: {}", e);
                }
            }
        });
        Self { tx }
    }

    /// Queues one record. Never fails the caller.
    pub fn record(&self, record: &AuditRecord) {
        if self.tx.send(record.format_line()).is_err() {
            warn!("Audit writer task is gone; dropping prediction record");
        }
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await
}

/// Summary of the audit log for the stats endpoint.
#[derive(Debug)]
pub struct AuditStats {
    pub total_predictions: usize,
    pub last_predictions: Vec<String>,
}

/// Reads the audit log. Returns None when the log does not exist yet (no
/// predictions have ever been made).
pub async fn read_stats(path: &Path, tail: usize) -> Option<AuditStats> {
    let contents = tokio::fs::read_to_string(path).await.ok()?;
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(tail);
    Some(AuditStats {
        total_predictions: lines.len(),
        last_predictions: lines[start..].iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_log() -> PathBuf {
        std::env::temp_dir().join(format!("churn_audit_{}.log", Uuid::new_v4()))
    }

    fn sample_record() -> AuditRecord {
        AuditRecord {
            columns: vec!["Age".to_string(), "Gender_Male".to_string()],
            vector: vec![30.0, 1.0],
            probability: 0.512,
            prediction: 1,
            drifted: vec!["Gender_Male".to_string()],
        }
    }

    #[test]
    fn test_format_line() {
        let line = sample_record().format_line();
        assert!(line.contains("\"Age\":30.0"));
        assert!(line.contains("| prob=0.512 |"));
        assert!(line.contains("prediction=1"));
        assert!(line.contains("drift=[\"Gender_Male\"]"));
    }

    #[tokio::test]
    async fn test_append_and_read_stats() {
        let path = temp_log();
        for _ in 0..7 {
            append_line(&path, &sample_record().format_line())
                .await
                .unwrap();
        }

        let stats = read_stats(&path, 5).await.unwrap();
        assert_eq!(stats.total_predictions, 7);
        assert_eq!(stats.last_predictions.len(), 5);

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_read_stats_missing_log() {
        assert!(read_stats(&temp_log(), 5).await.is_none());
    }

    #[tokio::test]
    async fn test_sink_writes_through_channel() {
        let path = temp_log();
        let sink = AuditSink::spawn(path.clone());
        sink.record(&sample_record());
        sink.record(&sample_record());

        // The writer task is asynchronous; poll briefly for it to catch up.
        let mut total = 0;
        for _ in 0..50 {
            if let Some(stats) = read_stats(&path, 5).await {
                total = stats.total_predictions;
                if total == 2 {
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(total, 2);

        tokio::fs::remove_file(&path).await.ok();
    }
}
