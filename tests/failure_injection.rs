//! Failure injection tests for the gateway's upstream side.

use std::time::{Duration, Instant};

use frpc_gateway::codec::FrpcCodec;

mod common;
use common::MockReply;

#[tokio::test]
async fn test_upstream_error_status_is_502() {
    let upstream =
        common::start_mock_backend(500, "Internal Server Error", Some("text/plain"), b"boom").await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(
        res.text().await.unwrap(),
        "error received from upstream server: 500 Internal Server Error\n"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_reason_phrase_is_reported() {
    let upstream = common::start_mock_backend(503, "Backend Sleeping", None, b"").await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.text().await.unwrap(),
        "error received from upstream server: 503 Backend Sleeping\n"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_foreign_content_type_is_forwarded_as_502() {
    let upstream =
        common::start_mock_backend(200, "OK", Some("text/html"), b"<h1>maintenance</h1>").await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.text().await.unwrap(), "<h1>maintenance</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_refused_is_502() {
    let upstream = common::closed_port().await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("request to upstream server failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_undecodable_payload_is_502() {
    let upstream =
        common::start_mock_backend(200, "OK", Some("application/x-frpc"), b"not frpc at all").await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("invalid response from upstream"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_fault_is_502() {
    let upstream = common::start_programmable_backend(|_| async {
        MockReply::frpc(FrpcCodec::new().encode_fault(500, "method not found").to_vec())
    })
    .await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    let body = res.text().await.unwrap();
    assert!(body.starts_with("invalid response from upstream"));
    assert!(body.contains("method not found"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_timeout_is_502() {
    let upstream = common::start_silent_backend().await;
    let mut config = common::gateway_config("search", upstream, "search.find");
    config.upstream.request_timeout_secs = Some(1);
    let (gateway, shutdown) = common::start_gateway(config).await;

    let started = Instant::now();
    let res = common::post_json(gateway, "search", "[]").await;

    assert_eq!(res.status(), 502);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("request to upstream server failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_gateway_survives_failed_calls() {
    let upstream = common::closed_port().await;
    let (gateway, shutdown) =
        common::start_gateway(common::gateway_config("search", upstream, "search.find")).await;

    for _ in 0..5 {
        let res = common::post_json(gateway, "search", "[1]").await;
        assert_eq!(res.status(), 502);
    }
    let res = common::post_json(gateway, "missing", "[1]").await;
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}
