//! # Integration Tests for the HTTP Matching Engine Client
//!
//! Runs [`HttpMatchingEngine`] and [`MatchClient`] against wiremock
//! servers to verify request construction, response parsing, and the
//! fail-closed error paths without a live matching engine.

use std::sync::Arc;
use std::time::Duration;

use screening_client::{
    build_match_request, EngineConfig, HttpMatchingEngine, MatchClient, MatchError,
    MatchingEngine, Readiness,
};
use screening_core::{DatasetScope, PersonQuery};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server: &MockServer) -> HttpMatchingEngine {
    let config = EngineConfig::new(&server.uri()).expect("valid url");
    HttpMatchingEngine::new(&config).expect("engine build")
}

fn ofac() -> DatasetScope {
    DatasetScope::new("us_ofac_sdn").expect("valid dataset")
}

fn jane() -> PersonQuery {
    PersonQuery::builder("Jane Smith")
        .country("US")
        .build()
        .expect("valid query")
}

// ── Readiness ───────────────────────────────────────────────────────────

#[tokio::test]
async fn readiness_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(engine(&server).readiness().await, Readiness::Ready);
}

#[tokio::test]
async fn readiness_503_is_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readyz"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    match engine(&server).readiness().await {
        Readiness::NotReady { reason } => assert!(reason.contains("503")),
        Readiness::Ready => panic!("expected not ready"),
    }
}

// ── Match ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn match_sends_map_shaped_queries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .and(body_partial_json(json!({
            "queries": {"q1": {"schema": "Person", "properties": {
                "name": ["Jane Smith"],
                "country": ["us"]
            }}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": {"q1": {"status": 200, "results": []}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = engine(&server)
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .expect("match");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn match_parses_candidates_and_skips_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": {"q1": {"status": 200, "results": [
                {
                    "id": "NK-1",
                    "caption": "Hassan Nasrallah",
                    "score": 0.95,
                    "match": true,
                    "properties": {"program": ["SDGT"], "sourceUrl": ["https://example.org/nk-1"]}
                },
                {"id": "NK-2", "caption": "Partial", "score": "high"},
                {"caption": "No id", "score": 0.4}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = engine(&server)
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .expect("match");
    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.entity_id, "NK-1");
    assert_eq!(c.dataset, ofac());
    assert!(c.is_match);
    assert_eq!(c.programs(), ["SDGT".to_string()]);
    assert_eq!(c.source_urls, vec!["https://example.org/nk-1"]);
}

#[tokio::test]
async fn match_500_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index corrupted"))
        .expect(1)
        .mount(&server)
        .await;

    let err = engine(&server)
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .unwrap_err();
    match err {
        MatchError::Status {
            dataset,
            status,
            body,
        } => {
            assert_eq!(dataset, "us_ofac_sdn");
            assert_eq!(status, 500);
            assert!(body.contains("index corrupted"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn match_missing_query_section_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"responses": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let err = engine(&server)
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::MalformedResponse { .. }));
}

#[tokio::test]
async fn match_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = engine(&server)
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::MalformedResponse { .. }));
}

#[tokio::test]
async fn match_slow_engine_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responses": {"q1": {"results": []}}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = EngineConfig::new(&server.uri())
        .expect("valid url")
        .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
    let engine = HttpMatchingEngine::new(&config).expect("engine build");
    let err = engine
        .match_dataset(&ofac(), &build_match_request(&jane()))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Timeout { timeout_ms: 200, .. }));
}

// ── Fan-out ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn fanout_queries_every_dataset_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readyz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    for (dataset, id) in [("us_ofac_sdn", "NK-1"), ("un_sc_sanctions", "UN-7")] {
        Mock::given(method("POST"))
            .and(path(format!("/match/{dataset}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": {"q1": {"status": 200, "results": [
                    {"id": id, "caption": "X", "score": 0.6}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let datasets = DatasetScope::parse_list("us_ofac_sdn,un_sc_sanctions").expect("datasets");
    let client = MatchClient::new(Arc::new(engine(&server)), datasets, 4, Duration::from_secs(5));
    let out = client.fetch(build_match_request(&jane())).await.expect("fetch");
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].candidates[0].entity_id, "NK-1");
    assert_eq!(out[1].candidates[0].entity_id, "UN-7");
}

#[tokio::test]
async fn fanout_not_ready_skips_match_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readyz"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = MatchClient::new(
        Arc::new(engine(&server)),
        vec![ofac()],
        4,
        Duration::from_secs(5),
    );
    let err = client.fetch(build_match_request(&jane())).await.unwrap_err();
    assert!(err.is_not_ready());
}

#[tokio::test]
async fn fanout_fails_closed_on_any_dataset_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readyz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/match/us_ofac_sdn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": {"q1": {"status": 200, "results": [
                {"id": "NK-1", "caption": "X", "score": 0.99}
            ]}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/match/un_sc_sanctions"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let datasets = DatasetScope::parse_list("us_ofac_sdn,un_sc_sanctions").expect("datasets");
    let client = MatchClient::new(Arc::new(engine(&server)), datasets, 4, Duration::from_secs(5));
    let err = client.fetch(build_match_request(&jane())).await.unwrap_err();
    assert_eq!(err.dataset(), Some("un_sc_sanctions"));
}
