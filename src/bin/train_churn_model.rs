// src/bin/train_churn_model.rs
//
// One-shot offline trainer. Reads the churn CSV, expands categoricals the
// same way the serving path does, fits the logistic model by gradient
// descent and persists the artifact the server loads at startup.
use anyhow::{bail, Context, Result};
use churn_lib::model::{LogisticModel, ModelArtifact};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const TARGET_COLUMN: &str = "Churn";
const IDENTIFIER_COLUMN: &str = "CustomerID";
const EPOCHS: usize = 50;
const TEST_FRACTION: f64 = 0.2;
const SPLIT_SEED: u64 = 42;

#[derive(Debug)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug)]
struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

fn load_raw_table(path: &str) -> Result<RawTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open training data at {}", path))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader
        .headers()
        .context("Training data has no header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read training data row")?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    Ok(RawTable { headers, rows })
}

/// Expands the raw table into the numeric feature matrix. The identifier
/// column is dropped, numeric columns keep their names, and each categorical
/// column contributes one `<Field>_<Value>` indicator per distinct value
/// except the first (implied by the others being zero). The resulting column
/// list becomes the serving schema.
fn expand_dataset(table: &RawTable) -> Result<Dataset> {
    let target_idx = table
        .headers
        .iter()
        .position(|h| h == TARGET_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("Training data has no '{}' column", TARGET_COLUMN))?;

    let feature_idxs: Vec<usize> = (0..table.headers.len())
        .filter(|&i| i != target_idx && table.headers[i] != IDENTIFIER_COLUMN)
        .collect();

    // A column is numeric when every value in it parses as f64.
    let mut numeric = vec![true; table.headers.len()];
    for row in &table.rows {
        for &i in &feature_idxs {
            if numeric[i] && row[i].parse::<f64>().is_err() {
                numeric[i] = false;
            }
        }
    }

    let mut columns = Vec::new();
    for &i in &feature_idxs {
        if numeric[i] {
            columns.push(table.headers[i].clone());
        }
    }
    let mut categorical_indicators: Vec<(usize, Vec<String>)> = Vec::new();
    for &i in &feature_idxs {
        if !numeric[i] {
            let mut values: Vec<String> = table.rows.iter().map(|r| r[i].clone()).collect();
            values.sort();
            values.dedup();
            let kept: Vec<String> = values.into_iter().skip(1).collect();
            for value in &kept {
                columns.push(format!("{}_{}", table.headers[i], value));
            }
            categorical_indicators.push((i, kept));
        }
    }

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut labels = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut features = Vec::with_capacity(columns.len());
        for &i in &feature_idxs {
            if numeric[i] {
                features.push(row[i].parse::<f64>().unwrap_or(0.0));
            }
        }
        for (i, kept) in &categorical_indicators {
            for value in kept {
                features.push(if &row[*i] == value { 1.0 } else { 0.0 });
            }
        }
        rows.push(features);
        labels.push(parse_label(&row[target_idx])?);
    }

    Ok(Dataset {
        columns,
        rows,
        labels,
    })
}

fn parse_label(raw: &str) -> Result<f64> {
    match raw {
        "Yes" | "yes" => Ok(1.0),
        "No" | "no" => Ok(0.0),
        other => other
            .parse::<f64>()
            .map(|v| if v > 0.0 { 1.0 } else { 0.0 })
            .with_context(|| format!("Unrecognized churn label '{}'", other)),
    }
}

/// Per-column means over the full feature matrix; these feed serving-time
/// drift detection.
fn feature_means(dataset: &Dataset) -> HashMap<String, f64> {
    let n = dataset.rows.len() as f64;
    dataset
        .columns
        .iter()
        .enumerate()
        .map(|(j, col)| {
            let sum: f64 = dataset.rows.iter().map(|row| row[j]).sum();
            (col.clone(), if n > 0.0 { sum / n } else { 0.0 })
        })
        .collect()
}

fn evaluate(model: &LogisticModel, dataset: &Dataset, test_idx: &[usize]) -> f64 {
    if test_idx.is_empty() {
        return 0.0;
    }
    let correct = test_idx
        .iter()
        .filter(|&&i| {
            let predicted = model.predict_proba(&dataset.rows[i]) >= 0.5;
            predicted == (dataset.labels[i] >= 0.5)
        })
        .count();
    correct as f64 / test_idx.len() as f64
}

fn print_training_summary(
    artifact: &ModelArtifact,
    out_path: &str,
    train_count: usize,
    test_count: usize,
    accuracy: f64,
) {
    println!("\n=== CHURN MODEL TRAINING SUMMARY ===");
    println!("Artifact: {} ({})", out_path, artifact.id);
    println!("Feature columns: {}", artifact.columns.len());
    println!("Training rows: {}", train_count);
    println!("Held-out rows: {}", test_count);
    println!("Held-out accuracy: {:.3}", accuracy);
    println!("\nTo serve this model, point MODEL_PATH at the artifact and start churn_server.");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    let dry_run = args.contains(&"--dry-run".to_string());
    if dry_run {
        warn!("DRY RUN MODE: the artifact will not be saved.");
    }
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();
    let data_path = positional.first().map(|s| s.as_str()).unwrap_or("churn.csv");
    let out_path = positional.get(1).map(|s| s.as_str()).unwrap_or("model.json");

    let table = load_raw_table(data_path)?;
    info!("Loaded {} rows from {}", table.rows.len(), data_path);

    let dataset = expand_dataset(&table)?;
    if dataset.rows.is_empty() {
        bail!("Training data has no rows");
    }
    info!(
        "Expanded {} raw columns into {} feature columns",
        table.headers.len(),
        dataset.columns.len()
    );

    let means = feature_means(&dataset);

    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut indices: Vec<usize> = (0..dataset.rows.len()).collect();
    indices.shuffle(&mut rng);
    let test_count = ((dataset.rows.len() as f64) * TEST_FRACTION).round() as usize;
    let (test_idx, train_idx) = indices.split_at(test_count);

    let mut model = LogisticModel::new(dataset.columns.len());
    let pb = ProgressBar::new(EPOCHS as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap(),
    );
    let mut epoch_order: Vec<usize> = train_idx.to_vec();
    for _ in 0..EPOCHS {
        epoch_order.shuffle(&mut rng);
        for &i in &epoch_order {
            model.update(&dataset.rows[i], dataset.labels[i]);
        }
        pb.inc(1);
    }
    pb.finish_with_message("Training complete.");

    let accuracy = evaluate(&model, &dataset, test_idx);
    info!(
        "Held-out accuracy: {:.3} over {} rows",
        accuracy,
        test_idx.len()
    );

    let artifact = ModelArtifact::new(model, dataset.columns.clone(), means);
    if !dry_run {
        artifact.save(Path::new(out_path))?;
        info!("Saved model artifact to {}", out_path);
    }
    print_training_summary(&artifact, out_path, train_idx.len(), test_idx.len(), accuracy);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        RawTable {
            headers: vec![
                "CustomerID".to_string(),
                "Age".to_string(),
                "Gender".to_string(),
                "Churn".to_string(),
            ],
            rows: vec![
                vec![
                    "1".to_string(),
                    "30".to_string(),
                    "Male".to_string(),
                    "Yes".to_string(),
                ],
                vec![
                    "2".to_string(),
                    "50".to_string(),
                    "Female".to_string(),
                    "No".to_string(),
                ],
            ],
        }
    }

    #[test]
    fn test_expand_drops_identifier_and_first_category() {
        let dataset = expand_dataset(&sample_table()).unwrap();
        // Female sorts first, so only the Male indicator survives.
        assert_eq!(dataset.columns, vec!["Age", "Gender_Male"]);
        assert_eq!(dataset.rows, vec![vec![30.0, 1.0], vec![50.0, 0.0]]);
        assert_eq!(dataset.labels, vec![1.0, 0.0]);
    }

    #[test]
    fn test_feature_means() {
        let dataset = expand_dataset(&sample_table()).unwrap();
        let means = feature_means(&dataset);
        assert_eq!(means["Age"], 40.0);
        assert_eq!(means["Gender_Male"], 0.5);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("Yes").unwrap(), 1.0);
        assert_eq!(parse_label("No").unwrap(), 0.0);
        assert_eq!(parse_label("1").unwrap(), 1.0);
        assert_eq!(parse_label("0").unwrap(), 0.0);
        assert!(parse_label("maybe").is_err());
    }

    #[test]
    fn test_missing_target_column_fails() {
        let table = RawTable {
            headers: vec!["Age".to_string()],
            rows: vec![vec!["30".to_string()]],
        };
        assert!(expand_dataset(&table).is_err());
    }
}
