//! Prediction backend API client and models
//!
//! This module handles communication with the anomaly scoring backend
//! and defines the data models for its requests and responses.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, ClientConfig};
pub use error::ApiError;
pub use models::{
    FeaturesResponse, HealthResponse, PredictItem, PredictRequest, PredictResponse, Row,
    LABEL_ANOMALY, LABEL_NORMAL,
};
