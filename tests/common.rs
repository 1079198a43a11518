#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use prometheus::Registry;
use pushmetrics::config::{extract_config, ConfigV1};
use pushmetrics::metrics::Metrics;
use pushmetrics::routes::create_router;
use pushmetrics::startup::build_metrics;
use pushmetrics::state::AppState;

pub const TEST_APP_NAME: &str = "inventory";

/// Renders a v1 config with the given `metrics:` section body.
pub fn config_yaml(metrics_section: &str) -> String {
    format!(
        r#"
version: "1.0.0"
app_name: "{TEST_APP_NAME}"
bind_address: 127.0.0.1:0
logging:
  level: "warn"
  format: "json"
metrics:
{metrics_section}
"#
    )
}

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract_config(&Figment::new().merge(Yaml::string(yaml)))
        .expect("Failed to parse test config YAML")
}

/// Builds the metrics component on a private registry, as startup does.
pub fn build_test_metrics(config: &ConfigV1) -> Arc<Metrics> {
    Arc::new(build_metrics(config, Registry::new()).expect("metrics config should be valid"))
}

pub fn build_app(config: ConfigV1) -> (Router, Arc<Metrics>) {
    let metrics = build_test_metrics(&config);
    let state = AppState {
        config: Arc::new(config),
        metrics: metrics.clone(),
    };
    (create_router(state), metrics)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
