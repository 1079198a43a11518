mod common;

use std::time::Duration;

use common::{build_test_metrics, config_yaml, load_test_config, TEST_APP_NAME};
use mockito::{Matcher, Server};
use prometheus::Registry;
use pushmetrics::error::Error;
use pushmetrics::lifecycle::Component;
use pushmetrics::startup::build_metrics;

fn push_path(job: &str) -> Matcher {
    Matcher::Regex(format!("^/metrics/job/{}/instance/[^/]+$", job))
}

#[test]
fn integration_push_without_target_url_aborts_startup() {
    let config = load_test_config(&config_yaml(
        r#"
  pushEnabled: true
  pushJobName: "nightly"
"#,
    ));

    let result = build_metrics(&config, Registry::new());
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn integration_defaults_are_applied_on_load() {
    let config = load_test_config(&config_yaml(
        r#"
  pushEnabled: true
  pushTargetURL: "http://pushgateway:9091"
  pushInterval: -1
"#,
    ));

    let metrics = build_test_metrics(&config);
    assert_eq!(metrics.config().push_job_name, TEST_APP_NAME);
    assert_eq!(metrics.config().push_interval, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn integration_push_uses_app_name_as_job_and_stops_on_shutdown() {
    let mut server = Server::new_async().await;
    let push_mock = server
        .mock("POST", push_path(TEST_APP_NAME))
        .match_body(Matcher::Any)
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;

    let config = load_test_config(&config_yaml(&format!(
        r#"
  pushEnabled: true
  pushTargetURL: "{}"
  pushInterval: 1
"#,
        server.url()
    )));
    let metrics = build_test_metrics(&config);

    metrics.serve().await.expect("serve should succeed");
    assert!(metrics.is_pushing());
    tokio::time::sleep(Duration::from_millis(1600)).await;
    metrics.shutdown().await.expect("shutdown should succeed");
    assert!(!metrics.is_pushing());

    push_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn integration_disabled_push_never_contacts_gateway() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = load_test_config(&config_yaml(&format!(
        r#"
  pushEnabled: false
  pushTargetURL: "{}"
  pushInterval: 1
"#,
        server.url()
    )));
    let metrics = build_test_metrics(&config);

    metrics.serve().await.expect("serve should succeed");
    assert!(!metrics.is_pushing());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    metrics.shutdown().await.expect("shutdown should succeed");

    mock.assert_async().await;
}
