use std::time::Duration;

use chat_core::{Credential, Stage};
use chat_engine::{CandidateFetcher, FailureKind, FetchSettings, ReqwestCandidateFetcher};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> ReqwestCandidateFetcher {
    let base = Url::parse(&format!("{}/", server.uri())).expect("mock uri");
    ReqwestCandidateFetcher::new(FetchSettings::new(base)).expect("client")
}

fn credential() -> Credential {
    Credential::new("test-token")
}

#[tokio::test]
async fn fetcher_decodes_candidate_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "stage": "Candidate Interview",
                "status": "In Progress",
                "progress_percent": 50,
                "documents": [{"name": "CV", "status": "uploaded"}],
                "tasks": [{"id": "t1", "title": "Sign NDA", "completed": false}],
                "recruiter": {"name": "Grace", "email": "grace@example.com"}
            }"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let snapshot = fetcher_for(&server)
        .fetch(&credential())
        .await
        .expect("fetch ok");

    assert_eq!(snapshot.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(snapshot.stage.as_deref(), Some(Stage::CandidateInterview.label()));
    assert_eq!(snapshot.progress_percent, Some(50));
    assert_eq!(snapshot.documents.len(), 1);
    assert_eq!(snapshot.tasks.len(), 1);
    assert!(snapshot.recruiter.is_some());
}

#[tokio::test]
async fn forbidden_maps_to_identity_unverified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch(&credential())
        .await
        .expect_err("fetch should fail");
    assert_eq!(err.kind, FailureKind::IdentityUnverified);
}

#[tokio::test]
async fn unauthorized_is_distinct_from_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch(&credential())
        .await
        .expect_err("fetch should fail");
    assert_eq!(err.kind, FailureKind::Unauthorized);
}

#[tokio::test]
async fn server_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch(&credential())
        .await
        .expect_err("fetch should fail");
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch(&credential())
        .await
        .expect_err("fetch should fail");
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/candidate-data"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let mut settings =
        FetchSettings::new(Url::parse(&format!("{}/", server.uri())).expect("mock uri"));
    settings.request_timeout = Duration::from_millis(50);
    let fetcher = ReqwestCandidateFetcher::new(settings).expect("client");

    let err = fetcher
        .fetch(&credential())
        .await
        .expect_err("fetch should time out");
    assert_eq!(err.kind, FailureKind::Timeout);
}
