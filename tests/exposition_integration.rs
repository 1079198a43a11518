mod common;

use axum::http::{header::CONTENT_TYPE, StatusCode};
use common::{body_text, build_app, config_yaml, get, load_test_config};
use prometheus::IntCounterVec;
use tower::ServiceExt;

fn namespaced_config() -> pushmetrics::config::ConfigV1 {
    load_test_config(&config_yaml(
        r#"
  namespace: "warehouse"
  subsystem: "stock"
"#,
    ))
}

#[tokio::test]
async fn integration_metrics_endpoint_serves_text_format() {
    let (app, _metrics) = build_app(namespaced_config());

    let response = app
        .oneshot(get("/metrics"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .expect("Content-Type header missing")
        .to_str()
        .expect("Content-Type not valid UTF-8")
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert!(content_type.contains("version=0.0.4"));

    let body = body_text(response).await;
    assert!(body.contains("# TYPE warehouse_stock_build_info gauge"));
    assert!(body.contains(&format!(
        "warehouse_stock_build_info{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    )));
}

#[tokio::test]
async fn integration_metrics_endpoint_reflects_application_metrics() {
    let (app, metrics) = build_app(namespaced_config());

    let moves = IntCounterVec::new(metrics.opts("moves_total", "Stock moves"), &["direction"])
        .expect("counter should build");
    metrics
        .register(Box::new(moves.clone()))
        .expect("counter should register");
    moves.with_label_values(&["in"]).inc_by(3);

    let response = app
        .oneshot(get("/metrics"))
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("warehouse_stock_moves_total{direction=\"in\"} 3"));
}

#[tokio::test]
async fn integration_health_endpoint() {
    let (app, _metrics) = build_app(namespaced_config());

    let response = app
        .oneshot(get("/health"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn integration_unknown_route_is_not_found() {
    let (app, _metrics) = build_app(namespaced_config());

    let response = app
        .oneshot(get("/metricz"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
