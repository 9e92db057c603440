use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ApiError;
use super::models::{FeaturesResponse, HealthResponse, PredictRequest, PredictResponse, Row};

/// Connection settings handed to [`ApiClient::new`] at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves requests without a deadline
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        debug!(target: "api", "Client created for {}", base_url);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_features(&self) -> Result<FeaturesResponse, ApiError> {
        self.get("/features")
    }

    pub fn predict_from_records(&self, records: &[Row]) -> Result<PredictResponse, ApiError> {
        debug!(target: "api", "Predicting {} records", records.len());
        self.post_predict(&PredictRequest::from_records(records))
    }

    /// Asks the backend to score the tail of a gold parquet file it can read.
    pub fn predict_from_gold(
        &self,
        parquet_path: &str,
        limit_rows: usize,
    ) -> Result<PredictResponse, ApiError> {
        debug!(target: "api", "Predicting from {} (limit {})", parquet_path, limit_rows);
        self.post_predict(&PredictRequest::from_gold(parquet_path, limit_rows))
    }

    /// Latest batch produced by the ETL process.
    pub fn get_maintenance_results(&self) -> Result<PredictResponse, ApiError> {
        self.get("/maintenance/results")
    }

    pub fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get("/health")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self
            .client
            .get(self.url(path))
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");
        self.send(path, request)
    }

    fn post_predict(&self, body: &PredictRequest<'_>) -> Result<PredictResponse, ApiError> {
        // .json() sets Content-Type: application/json
        let request = self.client.post(self.url("/predict")).json(body);
        self.send("/predict", request)
    }

    fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().map_err(|e| {
            warn!(target: "api", "{} unreachable: {}", path, e);
            ApiError::Transport(e)
        })?;
        decode_response(path, response)
    }
}

fn decode_response<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        warn!(target: "api", "{} returned {}: {}", path, status, body);
        return Err(ApiError::RequestFailed {
            status: status.as_u16(),
            body,
        });
    }

    debug!(target: "api", "{} returned {} ({} bytes)", path, status, body.len());
    Ok(serde_json::from_str(&body)?)
}

fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }

    let url = Url::parse(trimmed).map_err(|_| ApiError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }

    Ok(trimmed.to_string())
}
