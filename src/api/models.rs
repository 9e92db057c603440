use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const LABEL_ANOMALY: &str = "ANOMALY";
pub const LABEL_NORMAL: &str = "NORMAL";

/// One input observation: feature name -> value
pub type Row = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub feature_order: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictItem {
    pub index: u64,
    pub score: f64,
    pub label: String,
}

impl PredictItem {
    pub fn is_anomaly(&self) -> bool {
        self.label == LABEL_ANOMALY
    }
}

/// Shared by `/predict` and `/maintenance/results`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub model_version: String,
    pub feature_order: Vec<String>,
    pub results: Vec<PredictItem>,
}

impl PredictResponse {
    pub fn anomaly_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_anomaly()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body of `POST /predict`. The backend takes either inline records or a
/// server-side gold parquet path; absent fields are left out of the JSON.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<&'a [Row]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_parquet_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_rows: Option<usize>,
}

impl<'a> PredictRequest<'a> {
    pub fn from_records(records: &'a [Row]) -> Self {
        Self {
            records: Some(records),
            gold_parquet_path: None,
            limit_rows: None,
        }
    }

    pub fn from_gold(path: &'a str, limit_rows: usize) -> Self {
        Self {
            records: None,
            gold_parquet_path: Some(path),
            limit_rows: Some(limit_rows),
        }
    }
}
