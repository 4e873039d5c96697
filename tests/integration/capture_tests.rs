//! Integration tests for the capture client and run driver
//!
//! These tests use wiremock to stand in for the Wayback Machine and exercise
//! the Save Page Now client and complete capture runs end-to-end.

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wayback_capture::capture::{
    coordinator_from_config, run_capture, ArchiveTransport, CaptureTimestamp, RunOutcome,
    SpnClient,
};
use wayback_capture::config::{parse_config, Config};
use wayback_capture::output::ProgressCounts;
use wayback_capture::state::{CaptureRequest, Progress};
use wayback_capture::storage::{JsonFileStore, ProgressStore};
use wiremock::matchers::{body_string, body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock archive
fn create_test_config(base_url: &str, period_secs: u64) -> Config {
    parse_config(&format!(
        r#"
[archive]
base-url = "{}"
user-agent = "TestAgent/1.0"
timeout-secs = 10

[credentials]
access-key = "AKEY"
secret-key = "SKEY"

[capture]
max-capture-age = 30
period-secs = {}
"#,
        base_url, period_secs
    ))
    .expect("Failed to build test config")
}

fn job_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("J{:02}", i)).collect()
}

fn status_results(ids: &[String]) -> serde_json::Value {
    json!(ids
        .iter()
        .map(|id| json!({"job_id": id, "status": "pending"}))
        .collect::<Vec<_>>())
}

fn days_ago(days: i64) -> CaptureTimestamp {
    CaptureTimestamp::from_datetime(Utc::now() - ChronoDuration::days(days))
}

/// Mounts a latest-capture lookup that redirects to a capture with `timestamp`
async fn mount_last_capture(server: &MockServer, target: &str, timestamp: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/web/2/{}", target)))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "location",
            format!("{}/web/{}/{}", server.uri(), timestamp, target).as_str(),
        ))
        .mount(server)
        .await;
}

/// Mounts a latest-capture lookup for a URL that was never captured
async fn mount_never_captured(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/web/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_requests_are_batched_by_five() {
    let mock_server = MockServer::start().await;
    let ids = job_ids(12);

    for batch in ids.chunks(5) {
        Mock::given(method("POST"))
            .and(path("/save/status"))
            .and(body_string(format!("job_ids={}", batch.join("%2C"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_results(batch)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let results = client.check_status_batch(&ids).await;

    let returned: Vec<&str> = results
        .iter()
        .map(|r| r["job_id"].as_str().unwrap())
        .collect();
    assert_eq!(returned, ids.iter().map(String::as_str).collect::<Vec<_>>());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_status_batch_that_is_not_a_list_is_skipped() {
    let mock_server = MockServer::start().await;
    let ids = job_ids(7);

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .and(body_string(format!("job_ids={}", ids[..5].join("%2C"))))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "message": "busy"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .and(body_string(format!("job_ids={}", ids[5..].join("%2C"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_results(&ids[5..])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let results = client.check_status_batch(&ids).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["job_id"], "J06");
    assert_eq!(results[1]["job_id"], "J07");
}

#[tokio::test]
async fn test_submit_capture_sends_credentials_and_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(header("authorization", "LOW AKEY:SKEY"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("url=https%3A%2F%2Fexample.com%2Fb"))
        .and(body_string_contains("skip_first_archive=1"))
        .and(body_string_contains("js_behavior_timeout=0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "J1",
            "url": "https://example.com/b"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let request = client
        .submit_capture("https://example.com/b")
        .await
        .expect("capture should be accepted");

    assert_eq!(request.job_id, "J1");
    assert_eq!(request.url, "https://example.com/b");
}

#[tokio::test]
async fn test_submit_capture_failures_yield_none() {
    let cases = [
        ResponseTemplate::new(500),
        ResponseTemplate::new(429).set_body_json(json!({"job_id": "J1", "url": "u"})),
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
        ResponseTemplate::new(200).set_body_json(json!({"message": "You need to be logged in"})),
        ResponseTemplate::new(200).set_body_json(json!(["J1", "https://example.com/b"])),
    ];

    for response in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();
        assert!(client.submit_capture("https://example.com/b").await.is_none());
    }
}

#[tokio::test]
async fn test_submit_capture_unreachable_archive() {
    // Nothing listens on the port once the server is dropped
    let base_url = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let client = SpnClient::new(&create_test_config(&base_url, 0)).unwrap();
    assert!(client.submit_capture("https://example.com/b").await.is_none());
    assert!(client.resolve_last_capture("https://example.com/b").await.is_none());
    assert!(client.check_status_batch(&job_ids(3)).await.is_empty());
}

#[tokio::test]
async fn test_resolve_last_capture_follows_redirect_location() {
    let mock_server = MockServer::start().await;
    mount_last_capture(&mock_server, "https://example.com/a", "20240101093000").await;

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let timestamp = client
        .resolve_last_capture("https://example.com/a")
        .await
        .expect("timestamp should be parsed");

    assert_eq!(timestamp.as_str(), "20240101093000");
}

#[tokio::test]
async fn test_resolve_last_capture_without_capture() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/2/https://example.com/never"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web/2/https://example.com/odd"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://elsewhere.example/"),
        )
        .mount(&mock_server)
        .await;
    mount_last_capture(&mock_server, "https://example.com/bad-date", "20241340000000").await;
    Mock::given(method("GET"))
        .and(path("/web/2/https://example.com/no-location"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&mock_server)
        .await;

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 0)).unwrap();

    for target in [
        "https://example.com/never",
        "https://example.com/odd",
        "https://example.com/bad-date",
        "https://example.com/no-location",
    ] {
        assert!(
            client.resolve_last_capture(target).await.is_none(),
            "expected no capture for {}",
            target
        );
    }
}

#[tokio::test]
async fn test_every_request_shares_one_rate_limit() {
    let mock_server = MockServer::start().await;
    mount_never_captured(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = SpnClient::new(&create_test_config(&mock_server.uri(), 1)).unwrap();
    let start = Instant::now();

    client.resolve_last_capture("https://example.com/a").await;
    client.submit_capture("https://example.com/a").await;
    client.check_status_batch(&job_ids(1)).await;

    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_run_reuses_recent_capture() {
    let mock_server = MockServer::start().await;
    let timestamp = days_ago(5);
    mount_last_capture(&mock_server, "https://example.com/a", timestamp.as_str()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("progress.json"));
    let coordinator =
        coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let mut out = Vec::new();

    let outcome = run_capture(
        &coordinator,
        &store,
        "https://example.com/a\n".as_bytes(),
        std::future::pending(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "{}/web/{}/https://example.com/a\n",
            mock_server.uri(),
            timestamp
        )
    );
    assert_eq!(
        outcome,
        RunOutcome::Completed(ProgressCounts {
            captured: 1,
            failed: 0,
            pending: 0
        })
    );
    assert!(!store.exists());
}

#[tokio::test]
async fn test_run_submits_and_polls_until_captured() {
    let mock_server = MockServer::start().await;
    mount_never_captured(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_string_contains("url=https%3A%2F%2Fexample.com%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_id": "J1",
            "url": "https://example.com/b"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/save/status"))
        .and(body_string("job_ids=J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "job_id": "J1",
            "status": "success",
            "timestamp": "20240101000000"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("progress.json"));
    let coordinator =
        coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let mut out = Vec::new();

    run_capture(
        &coordinator,
        &store,
        "https://example.com/b\n".as_bytes(),
        std::future::pending(),
        &mut out,
    )
    .await
    .unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains(&format!(
        "{}/web/20240101000000/https://example.com/b",
        mock_server.uri()
    )));
    assert!(!store.exists());
}

#[tokio::test]
async fn test_run_reports_refused_capture_as_failed() {
    let mock_server = MockServer::start().await;
    mount_never_captured(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("progress.json"));
    let coordinator =
        coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let mut out = Vec::new();

    let outcome = run_capture(
        &coordinator,
        &store,
        "https://example.com/c\n".as_bytes(),
        std::future::pending(),
        &mut out,
    )
    .await
    .unwrap();

    assert!(out.is_empty());
    assert_eq!(
        outcome,
        RunOutcome::Completed(ProgressCounts {
            captured: 0,
            failed: 1,
            pending: 0
        })
    );
}

#[tokio::test]
async fn test_interrupted_run_saves_and_resumes() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("progress.json"));

    // First run: the job is accepted, then the run is interrupted mid-poll
    {
        let mock_server = MockServer::start().await;
        mount_never_captured(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "job_id": "J1",
                "url": "https://example.com/d",
                "message": "queued"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/save/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"job_id": "J1", "status": "pending"}]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let coordinator =
            coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
        let mut out = Vec::new();

        let outcome = run_capture(
            &coordinator,
            &store,
            "https://example.com/d\n".as_bytes(),
            tokio::time::sleep(Duration::from_millis(500)),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Interrupted(ProgressCounts {
                captured: 0,
                failed: 0,
                pending: 1
            })
        );
        assert!(out.is_empty());
    }

    let saved = store.peek().unwrap().expect("progress should be saved");
    assert_eq!(saved.pending_job_ids(), vec!["J1"]);
    assert_eq!(
        saved.capture_requests["J1"].extra.get("message"),
        Some(&json!("queued"))
    );

    // Second run: same input, the saved job is polled instead of resubmitted
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/save/status"))
        .and(body_string("job_ids=J1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "job_id": "J1",
            "status": "success",
            "timestamp": "20240102030405"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator =
        coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let mut out = Vec::new();

    run_capture(
        &coordinator,
        &store,
        "https://example.com/d\n".as_bytes(),
        std::future::pending(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "{}/web/20240102030405/https://example.com/d\n",
            mock_server.uri()
        )
    );
    assert!(!store.exists());
}

#[tokio::test]
async fn test_resumed_results_are_reported_with_new_ones() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("progress.json"));

    let mut progress = Progress::new();
    progress.record_captured("https://example.com/old", "20230101000000");
    progress.record_failed("https://example.com/broken");
    progress.record_submitted(CaptureRequest {
        job_id: "J9".to_string(),
        url: "https://example.com/slow".to_string(),
        extra: serde_json::Map::new(),
    });
    store.save(&progress).unwrap();

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "job_id": "J9",
            "status": "error",
            "status_ext": "error:too-many-daily-captures"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator =
        coordinator_from_config(&create_test_config(&mock_server.uri(), 0)).unwrap();
    let mut out = Vec::new();

    let outcome = run_capture(
        &coordinator,
        &store,
        "https://example.com/old\nhttps://example.com/broken\n".as_bytes(),
        std::future::pending(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "{}/web/20230101000000/https://example.com/old\n",
            mock_server.uri()
        )
    );
    assert_eq!(
        outcome,
        RunOutcome::Completed(ProgressCounts {
            captured: 1,
            failed: 2,
            pending: 0
        })
    );
}
