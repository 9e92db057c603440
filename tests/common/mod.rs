//! In-process stand-in for the prediction backend.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{mpsc, Arc, Mutex};

#[derive(Default)]
pub struct Recorded {
    pub predict_bodies: Vec<Value>,
    pub predict_content_types: Vec<String>,
    pub get_cache_headers: Vec<(String, String)>,
}

#[derive(Clone)]
struct Backend {
    recorded: Arc<Mutex<Recorded>>,
    failure: Option<(StatusCode, String)>,
}

pub struct FakeBackend {
    pub base_url: String,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl FakeBackend {
    pub fn start() -> Self {
        Self::spawn(None)
    }

    /// Every route answers `status` with `body` as plain text.
    pub fn failing(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        Self::spawn(Some((status, body.to_string())))
    }

    fn spawn(failure: Option<(StatusCode, String)>) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let backend = Backend {
            recorded: Arc::clone(&recorded),
            failure,
        };

        let app = Router::new()
            .route("/features", get(features))
            .route("/predict", post(predict))
            .route("/maintenance/results", get(maintenance_results))
            .route("/health", get(health))
            .route("/legacy/features", get(legacy_features))
            .route("/legacy/maintenance/results", get(legacy_results))
            .route("/flaky/predict", post(predict))
            .route("/flaky/maintenance/results", get(flaky_results))
            .with_state(backend);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        let addr = rx.recv().unwrap();
        Self {
            base_url: format!("http://{}", addr),
            recorded,
        }
    }
}

fn record_get(backend: &Backend, path: &str, headers: &HeaderMap) {
    let cache = headers
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    backend
        .recorded
        .lock()
        .unwrap()
        .get_cache_headers
        .push((path.to_string(), cache));
}

fn failure(backend: &Backend) -> Option<Response> {
    backend
        .failure
        .clone()
        .map(|(status, body)| (status, body).into_response())
}

async fn features(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    record_get(&backend, "/features", &headers);
    if let Some(response) = failure(&backend) {
        return response;
    }
    Json(json!({
        "feature_order": ["a", "b"],
        "model_version": "ae-iforest-1.2"
    }))
    .into_response()
}

async fn predict(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut recorded = backend.recorded.lock().unwrap();
        recorded.predict_bodies.push(body.clone());
        recorded.predict_content_types.push(
            headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string(),
        );
    }
    if let Some(response) = failure(&backend) {
        return response;
    }

    let results: Vec<Value> = if let Some(records) = body["records"].as_array() {
        records
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let a = row["a"].as_f64().unwrap_or(0.0);
                if a > 50.0 {
                    json!({"index": i, "score": 0.91, "label": "ANOMALY"})
                } else {
                    json!({"index": i, "score": 0.5, "label": "NORMAL"})
                }
            })
            .collect()
    } else if body["gold_parquet_path"].is_string() {
        let limit = body["limit_rows"].as_u64().unwrap_or(200).min(3);
        (0..limit)
            .map(|i| json!({"index": 100 + i, "score": 0.2, "label": "NORMAL"}))
            .collect()
    } else {
        return (
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Provide either 'records' or 'gold_parquet_path'."}"#,
        )
            .into_response();
    };

    Json(json!({
        "model_version": "ae-iforest-1.2",
        "feature_order": ["a", "b"],
        "results": results
    }))
    .into_response()
}

async fn maintenance_results(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    record_get(&backend, "/maintenance/results", &headers);
    if let Some(response) = failure(&backend) {
        return response;
    }
    Json(json!({
        "model_version": "ae-iforest-1.2",
        "feature_order": ["a", "b"],
        "results": [
            {"index": 7, "score": 0.12, "label": "NORMAL"},
            {"index": 8, "score": 0.77, "label": "ANOMALY"}
        ]
    }))
    .into_response()
}

async fn health(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    record_get(&backend, "/health", &headers);
    if let Some(response) = failure(&backend) {
        return response;
    }
    Json(json!({
        "status": "ok",
        "details": {"feature_columns": 2, "ae_loaded": true}
    }))
    .into_response()
}

async fn legacy_features() -> Json<Value> {
    Json(json!({"columns": ["a", "b"]}))
}

async fn legacy_results() -> Json<Value> {
    Json(json!({"model_version": "0.9", "feature_order": [], "results": "pending"}))
}

async fn flaky_results() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "warming up")
}
