use rand::Rng;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

use crate::api::{FeaturesResponse, PredictItem, PredictResponse, Row};

pub const DEFAULT_RANDOM_RANGE: Range<f64> = 0.0..100.0;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("no features loaded yet; run \\features first")]
    NotReady,

    #[error("row {index} does not exist ({count} rows)")]
    RowOutOfRange { index: usize, count: usize },

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("random range {0}..{1} is empty")]
    EmptyRange(f64, f64),

    #[error("random range {0}..{1} must be finite")]
    InvalidRange(f64, f64),
}

/// Everything the dashboard shows. Every transition returns a fresh value
/// and leaves `self` untouched, so the shell can swap states wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    feature_order: Vec<String>,
    model_version: String,
    rows: Vec<Row>,
    results: Vec<PredictItem>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            feature_order: Vec::new(),
            model_version: "unknown".to_string(),
            rows: Vec::new(),
            results: Vec::new(),
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn results(&self) -> &[PredictItem] {
        &self.results
    }

    pub fn is_ready(&self) -> bool {
        !self.feature_order.is_empty()
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn blank_row(&self) -> Row {
        self.feature_order.iter().map(|k| (k.clone(), 0.0)).collect()
    }

    /// Adopt a freshly fetched feature list. Rows reset to one blank row.
    pub fn with_features(&self, features: &FeaturesResponse) -> Self {
        debug!(
            target: "dashboard",
            "Loaded {} features (model {})",
            features.feature_order.len(),
            features.model_version
        );

        let mut next = Self {
            feature_order: features.feature_order.clone(),
            model_version: features.model_version.clone(),
            rows: Vec::new(),
            results: Vec::new(),
        };
        next.rows.push(next.blank_row());
        next
    }

    pub fn add_row(&self) -> Result<Self, StateError> {
        self.ensure_ready()?;
        let mut next = self.clone();
        next.rows.push(self.blank_row());
        Ok(next)
    }

    pub fn remove_row(&self, index: usize) -> Result<Self, StateError> {
        self.check_row(index)?;
        let mut next = self.clone();
        next.rows.remove(index);
        Ok(next)
    }

    /// `index` is zero-based.
    pub fn set_cell(&self, index: usize, feature: &str, value: f64) -> Result<Self, StateError> {
        self.check_row(index)?;
        if !self.feature_order.iter().any(|f| f == feature) {
            return Err(StateError::UnknownFeature(feature.to_string()));
        }

        let mut next = self.clone();
        next.rows[index].insert(feature.to_string(), value);
        Ok(next)
    }

    /// Replace every row with uniformly drawn values rounded to 3 decimals.
    pub fn randomize<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        range: Range<f64>,
    ) -> Result<Self, StateError> {
        self.ensure_ready()?;
        // gen_range panics on non-finite bounds or a width that overflows
        let width = range.end - range.start;
        if !(range.start.is_finite() && range.end.is_finite() && width.is_finite()) {
            return Err(StateError::InvalidRange(range.start, range.end));
        }
        if range.is_empty() {
            return Err(StateError::EmptyRange(range.start, range.end));
        }

        let rows = self
            .rows
            .iter()
            .map(|_| {
                self.feature_order
                    .iter()
                    .map(|k| (k.clone(), round3(rng.gen_range(range.clone()))))
                    .collect()
            })
            .collect();

        Ok(Self {
            rows,
            ..self.clone()
        })
    }

    /// Rows are taken as given; the backend is the validation authority.
    pub fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..self.clone()
        }
    }

    /// Clears results ahead of a new backend call.
    pub fn begin_request(&self) -> Self {
        Self {
            results: Vec::new(),
            ..self.clone()
        }
    }

    pub fn with_results(&self, response: &PredictResponse) -> Self {
        Self {
            results: response.results.clone(),
            ..self.clone()
        }
    }

    fn ensure_ready(&self) -> Result<(), StateError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(StateError::NotReady)
        }
    }

    fn check_row(&self, index: usize) -> Result<(), StateError> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(StateError::RowOutOfRange {
                index: index + 1,
                count: self.rows.len(),
            })
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
