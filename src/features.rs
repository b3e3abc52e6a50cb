// src/features.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One customer record as submitted to the inference endpoint.
///
/// Field names mirror the upstream data feed. CustomerID is informational
/// only and never reaches the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Tenure")]
    pub tenure: i64,
    #[serde(rename = "Usage_Frequency")]
    pub usage_frequency: i64,
    #[serde(rename = "Support_Calls")]
    pub support_calls: i64,
    #[serde(rename = "Payment_Delay")]
    pub payment_delay: i64,
    #[serde(rename = "Subscription_Type")]
    pub subscription_type: String,
    #[serde(rename = "Contract_Length")]
    pub contract_length: String,
    #[serde(rename = "Total_Spend")]
    pub total_spend: f64,
    #[serde(rename = "Last_Interaction")]
    pub last_interaction: i64,
}

impl CustomerRecord {
    /// Expands the record into named numeric columns. Numeric fields keep
    /// their names; each categorical field becomes a single
    /// `<Field>_<Value>` indicator set to 1.0, built from whatever value the
    /// request carried. The identifier is dropped here.
    pub fn expand(&self) -> HashMap<String, f64> {
        let mut columns = HashMap::new();
        columns.insert("Age".to_string(), self.age as f64);
        columns.insert("Tenure".to_string(), self.tenure as f64);
        columns.insert("Usage_Frequency".to_string(), self.usage_frequency as f64);
        columns.insert("Support_Calls".to_string(), self.support_calls as f64);
        columns.insert("Payment_Delay".to_string(), self.payment_delay as f64);
        columns.insert("Total_Spend".to_string(), self.total_spend);
        columns.insert("Last_Interaction".to_string(), self.last_interaction as f64);

        for (field, value) in [
            ("Gender", &self.gender),
            ("Subscription_Type", &self.subscription_type),
            ("Contract_Length", &self.contract_length),
        ] {
            columns.insert(format!("{}_{}", field, value), 1.0);
        }
        columns
    }
}

/// Reconciles an expanded record against the training schema.
///
/// Schema columns missing from the expansion are filled with 0; expanded
/// columns the schema does not know (an unseen category) are silently
/// dropped; the output follows the schema's exact order. The result always
/// has exactly `schema.len()` entries.
pub fn align(record: &CustomerRecord, schema: &[String]) -> Vec<f64> {
    let expanded = record.expand();
    schema
        .iter()
        .map(|col| expanded.get(col).copied().unwrap_or(0.0))
        .collect()
}
