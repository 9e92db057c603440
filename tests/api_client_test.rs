mod common;

use common::FakeBackend;
use pm_dash::api::{ApiClient, ApiError, ClientConfig, PredictItem, Row};
use serde_json::json;
use std::time::Duration;

fn client_for(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(&ClientConfig::new(backend.base_url.as_str())).unwrap()
}

fn row(pairs: &[(&str, f64)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_fetch_features_passes_fields_through() {
    let backend = FakeBackend::start();
    let features = client_for(&backend).fetch_features().unwrap();

    assert_eq!(features.feature_order, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(features.model_version, "ae-iforest-1.2");
}

#[test]
fn test_predict_round_trip_is_unmodified() {
    let backend = FakeBackend::start();
    let records = vec![row(&[("a", 1.0), ("b", 2.0)])];

    let response = client_for(&backend).predict_from_records(&records).unwrap();

    assert_eq!(response.feature_order, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        response.results,
        vec![PredictItem {
            index: 0,
            score: 0.5,
            label: "NORMAL".to_string(),
        }]
    );
}

#[test]
fn test_predict_sends_records_verbatim() {
    let backend = FakeBackend::start();
    let records = vec![
        row(&[("a", 75.25), ("b", -1.0)]),
        row(&[("b", 3.0)]),
        row(&[("a", 0.0), ("b", 0.0), ("extra", 9.0)]),
    ];

    let response = client_for(&backend).predict_from_records(&records).unwrap();
    assert_eq!(response.results.len(), records.len());
    assert!(response.results[0].is_anomaly());

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.predict_bodies.len(), 1);
    assert_eq!(
        recorded.predict_bodies[0],
        json!({
            "records": [
                {"a": 75.25, "b": -1.0},
                {"b": 3.0},
                {"a": 0.0, "b": 0.0, "extra": 9.0}
            ]
        })
    );
    assert_eq!(recorded.predict_content_types[0], "application/json");
}

#[test]
fn test_maintenance_results_share_the_predict_shape() {
    let backend = FakeBackend::start();
    let client = client_for(&backend);

    let etl = client.get_maintenance_results().unwrap();
    let manual = client.predict_from_records(&[row(&[("a", 1.0)])]).unwrap();

    assert_eq!(etl.model_version, manual.model_version);
    assert_eq!(etl.results.len(), 2);
    assert_eq!(etl.results[1].index, 8);
    assert_eq!(etl.anomaly_count(), 1);
}

#[test]
fn test_gold_batch_request() {
    let backend = FakeBackend::start();
    let response = client_for(&backend)
        .predict_from_gold("/srv/gold/lecturas.parquet", 2)
        .unwrap();

    assert_eq!(response.results.len(), 2);
    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(
        recorded.predict_bodies[0],
        json!({"gold_parquet_path": "/srv/gold/lecturas.parquet", "limit_rows": 2})
    );
}

#[test]
fn test_health() {
    let backend = FakeBackend::start();
    let health = client_for(&backend).health().unwrap();

    assert!(health.is_ok());
    assert_eq!(health.details["feature_columns"], json!(2));
}

#[test]
fn test_gets_disable_caching() {
    let backend = FakeBackend::start();
    let client = client_for(&backend);
    client.fetch_features().unwrap();
    client.get_maintenance_results().unwrap();
    client.health().unwrap();

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.get_cache_headers.len(), 3);
    for (path, cache) in &recorded.get_cache_headers {
        assert_eq!(cache, "no-cache", "{path} was cacheable");
    }
}

#[test]
fn test_error_message_is_raw_body_for_every_endpoint() {
    let body = "Internal error: scaler_if.pkl missing";
    let backend = FakeBackend::failing(500, body);
    let client = client_for(&backend);

    let errors = vec![
        client.fetch_features().unwrap_err(),
        client.predict_from_records(&[row(&[("a", 1.0)])]).unwrap_err(),
        client.get_maintenance_results().unwrap_err(),
        client.health().unwrap_err(),
        client.predict_from_gold("x.parquet", 10).unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.to_string(), body);
        assert_eq!(err.status(), Some(500));
    }

    // One request per call, no retries
    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.predict_bodies.len(), 2);
    assert_eq!(recorded.get_cache_headers.len(), 3);
}

#[test]
fn test_empty_records_are_sent_as_is() {
    let backend = FakeBackend::start();
    let response = client_for(&backend).predict_from_records(&[]).unwrap();

    assert!(response.results.is_empty());
    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.predict_bodies[0], json!({"records": []}));
}

#[test]
fn test_not_found_is_a_request_failure() {
    let backend = FakeBackend::failing(404, "Not Found");
    let err = client_for(&backend).fetch_features().unwrap_err();

    assert!(matches!(err, ApiError::RequestFailed { status: 404, .. }));
    assert_eq!(err.to_string(), "Not Found");
}

#[test]
fn test_wrong_shape_is_a_decode_error() {
    let backend = FakeBackend::start();
    // Routes under /legacy answer 200 with bodies of another shape
    let client =
        ApiClient::new(&ClientConfig::new(format!("{}/legacy", backend.base_url))).unwrap();

    assert!(matches!(client.fetch_features(), Err(ApiError::Decode(_))));
    assert!(matches!(
        client.get_maintenance_results(),
        Err(ApiError::Decode(_))
    ));
}

#[test]
fn test_unreachable_backend_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::new(format!("http://127.0.0.1:{port}"))
        .with_timeout(Duration::from_secs(5));
    let client = ApiClient::new(&config).unwrap();

    assert!(matches!(client.fetch_features(), Err(ApiError::Transport(_))));
    assert!(matches!(
        client.predict_from_records(&[]),
        Err(ApiError::Transport(_))
    ));
    assert!(matches!(
        client.get_maintenance_results(),
        Err(ApiError::Transport(_))
    ));
}

#[test]
fn test_missing_base_url_is_rejected() {
    assert!(matches!(
        ApiClient::new(&ClientConfig::new("")),
        Err(ApiError::InvalidBaseUrl(_))
    ));
}
