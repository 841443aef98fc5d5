use std::time::Duration;

use chrono::{DateTime, Utc};
use httpmock::prelude::*;
use predai_core::connector::{HistorySource, StatePublisher};
use predai_core::{PredaiError, StateUpdate};
use predai_hass::HassClient;
use serde_json::json;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn client(server: &MockServer) -> HassClient {
    HassClient::builder()
        .base_url(server.base_url())
        .token("secret")
        .build()
        .unwrap()
}

#[tokio::test]
async fn history_requests_window_and_narrows_to_samples() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/history/period/2024-01-01T00:00:00+0000")
                .query_param("filter_entity_id", "sensor.load")
                .query_param("end_time", "2024-01-08T00:00:00+0000")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(json!([[
                {"entity_id": "sensor.load", "state": "1.5", "last_updated": "2024-01-03T10:15:42.123+00:00"},
                {"entity_id": "sensor.load", "state": "unavailable", "last_updated": "2024-01-03T10:20:00+00:00"},
                {"entity_id": "sensor.load", "state": "2.5", "last_updated": "2024-01-07T23:59:59+00:00"}
            ]]));
        })
        .await;

    let h = client(&server)
        .history("sensor.load", ts("2024-01-08T00:00:00Z"), 7)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(h.samples.len(), 3);
    assert_eq!(h.samples[1].state, "unavailable");
    assert_eq!(h.start, ts("2024-01-03T10:15:00Z"));
    assert_eq!(h.end, ts("2024-01-07T23:59:00Z"));
}

#[tokio::test]
async fn empty_history_keeps_requested_window() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/history/period/2024-01-07T00:00:00+0000");
            then.status(200).json_body(json!([]));
        })
        .await;

    let h = client(&server)
        .history("sensor.none", ts("2024-01-08T00:00:00Z"), 1)
        .await
        .unwrap();
    assert!(h.is_empty());
    assert_eq!(h.start, ts("2024-01-07T00:00:00Z"));
    assert_eq!(h.end, ts("2024-01-08T00:00:00Z"));
}

#[tokio::test]
async fn undecodable_history_is_a_connector_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body("<html>proxy error</html>");
        })
        .await;

    let err = client(&server)
        .history("sensor.load", ts("2024-01-08T00:00:00Z"), 7)
        .await
        .unwrap_err();
    assert!(matches!(err, PredaiError::Connector { .. }), "{err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn state_reads_and_missing_entities() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/states/sensor.predai_last_run");
            then.status(200).json_body(json!({
                "entity_id": "sensor.predai_last_run",
                "state": "2024-01-08 00:00:00+00:00",
                "attributes": {"unit_of_measurement": "time"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/states/sensor.gone");
            then.status(404).json_body(json!({"message": "Entity not found."}));
        })
        .await;

    let c = client(&server);
    assert_eq!(
        c.state("sensor.predai_last_run").await.unwrap().as_deref(),
        Some("2024-01-08 00:00:00+00:00")
    );
    assert_eq!(c.state("sensor.gone").await.unwrap(), None);
}

#[tokio::test]
async fn set_state_posts_state_and_attributes() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/states/sensor.load_prediction")
                .header("authorization", "Bearer secret")
                .json_body(json!({
                    "state": 12.5,
                    "attributes": {"unit_of_measurement": "kWh"}
                }));
            then.status(201).json_body(json!({"state": "12.5"}));
        })
        .await;

    client(&server)
        .set_state(
            "sensor.load_prediction",
            StateUpdate::new(12.5).with_attribute("unit_of_measurement", "kWh"),
        )
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_map_to_connector_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(500);
        })
        .await;

    let err = client(&server)
        .set_state("sensor.x", StateUpdate::new(1.0))
        .await
        .unwrap_err();
    match err {
        PredaiError::Connector { connector, msg } => {
            assert_eq!(connector, HassClient::NAME);
            assert!(msg.contains("500"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"state": "on"}));
        })
        .await;

    let c = HassClient::builder()
        .base_url(server.base_url())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = c.state("sensor.slow").await.unwrap_err();
    assert_eq!(err, PredaiError::provider_timeout(HassClient::NAME, "get-state"));
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let err = HassClient::builder().base_url("not a url").build().unwrap_err();
    assert!(matches!(err, PredaiError::Config(_)));
}

#[tokio::test]
async fn out_of_range_history_window_is_rejected_before_any_request() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!([]));
        })
        .await;

    let err = client(&server)
        .history("sensor.load", ts("2024-01-08T00:00:00Z"), 200_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, PredaiError::InvalidArg(_)), "{err:?}");
    any.assert_hits_async(0).await;
}
