//! Submission Flow Integration Tests
//!
//! Exercises the studio end to end against a mock print service:
//! - script replay, compositing, multipart submission, result download
//! - history recorded and persisted
//! - service failures surfaced as alerts
//! - repeat submissions blocked while one is in flight

use std::sync::Arc;

use async_trait::async_trait;
use pod_client::{ApiResult, PrintOptions, PrintResult};
use pod_core::{EditorSession, NoHaptics, ProductColor, Size};
use pod_renderer::{create_solid_color, encode_png, BackgroundLibrary, Compositor};
use pod_studio::submission::SUBMISSION_BUSY_MESSAGE;
use pod_studio::{
    DesignRequest, EditScript, PrintGateway, ResultState, Studio, StudioConfig, SubmissionFlow,
    SubmissionOutcome, UiEvent,
};
use serde_json::json;
use tokio::sync::{mpsc, Notify};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches raw request bytes; the multipart body carries binary JPEG data.
struct BodyContains(&'static [u8]);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .body
            .windows(self.0.len())
            .any(|window| window == self.0)
    }
}

fn script() -> EditScript {
    EditScript::from_json(
        r#"{
            "product_name": "Long Sleeve T-Shirt",
            "commands": [
                {"op": "select_color", "color": "navy"},
                {"op": "add_text", "text": "Hello"},
                {"op": "gesture", "item": 0,
                 "gesture": {"gesture": "rotate", "phase": "began", "rotation": 0.0}},
                {"op": "gesture", "item": 0,
                 "gesture": {"gesture": "rotate", "phase": "changed", "rotation": 1.55}},
                {"op": "gesture", "item": 0,
                 "gesture": {"gesture": "rotate", "phase": "ended", "rotation": 1.55}}
            ]
        }"#,
    )
    .expect("script")
}

fn config(server: &MockServer, data_dir: &std::path::Path) -> StudioConfig {
    StudioConfig {
        data_dir: data_dir.to_path_buf(),
        ..StudioConfig::new(format!("{}/", server.uri()))
    }
}

#[tokio::test]
async fn test_design_submits_and_loads_result() {
    let server = MockServer::start().await;
    let image_url = format!("{}/result.png", server.uri());
    Mock::given(method("POST"))
        .and(path("/print"))
        .and(BodyContains(b"filename=\"image.jpg\""))
        .and(BodyContains(b"male"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "dataset_name": "data1",
            "gender": "male",
            "image_url": image_url,
        })))
        .expect(1)
        .mount(&server)
        .await;
    let png = encode_png(&create_solid_color(6, 4, [9, 9, 9, 255])).expect("png");
    Mock::given(method("GET"))
        .and(path("/result.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let preview = dir.path().join("preview.png");
    let mut studio = Studio::new(config(&server, dir.path())).expect("studio");
    let outcome = studio
        .design(DesignRequest {
            script: script(),
            preview_path: Some(preview.clone()),
            ..DesignRequest::default()
        })
        .await
        .expect("design");

    assert_eq!(outcome.items, 1);
    assert_eq!(outcome.report.applied, 5);
    assert!(preview.exists());
    match outcome.submission {
        Some(SubmissionOutcome::Result(screen)) => {
            assert_eq!(screen.image_url(), image_url);
            match screen.state() {
                ResultState::Loaded(image) => assert_eq!(image.dimensions(), (6, 4)),
                other => panic!("expected loaded image, got {other:?}"),
            }
        }
        other => panic!("expected result, got {other:?}"),
    }

    let records = studio.history().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_url, image_url);
    assert_eq!(records[0].color, ProductColor::Navy);

    let reopened = Studio::new(config(&server, dir.path())).expect("reopen");
    assert_eq!(reopened.history().records().len(), 1);
}

#[tokio::test]
async fn test_server_error_becomes_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/print"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut studio = Studio::new(config(&server, dir.path())).expect("studio");
    let outcome = studio
        .design(DesignRequest {
            script: script(),
            ..DesignRequest::default()
        })
        .await
        .expect("design");

    match outcome.submission {
        Some(SubmissionOutcome::Alert(alert)) => {
            assert!(alert.message.contains("[500]"), "message: {}", alert.message);
        }
        other => panic!("expected alert, got {other:?}"),
    }
    assert!(studio.history().records().is_empty());
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut studio = Studio::new(config(&server, dir.path())).expect("studio");
    let outcome = studio
        .design(DesignRequest {
            script: script(),
            dry_run: true,
            ..DesignRequest::default()
        })
        .await
        .expect("design");
    assert!(outcome.submission.is_none());
}

/// Holds every print until released.
struct GatedGateway {
    release: Arc<Notify>,
}

#[async_trait]
impl PrintGateway for GatedGateway {
    async fn print(&self, _jpeg: Vec<u8>, _options: &PrintOptions) -> ApiResult<PrintResult> {
        self.release.notified().await;
        Ok(PrintResult {
            success: true,
            dataset_name: "data1".to_string(),
            gender: "male".to_string(),
            image_url: "https://x/y.jpg".to_string(),
        })
    }
}

#[tokio::test]
async fn test_repeat_submission_is_blocked_while_in_flight() {
    let release = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let flow = SubmissionFlow::new(
        Compositor::with_defaults(),
        Arc::new(GatedGateway {
            release: Arc::clone(&release),
        }),
        PrintOptions::default(),
        tx,
    );
    let mut session = EditorSession::new(Size::new(200.0, 200.0), Box::new(NoHaptics));
    let mut backgrounds = BackgroundLibrary::plain(200, 200);

    let first = flow
        .submit(&mut session, &mut backgrounds)
        .expect("first dispatched");
    assert!(flow.is_in_flight());
    assert!(flow.submit(&mut session, &mut backgrounds).is_none());

    assert_eq!(rx.recv().await, Some(UiEvent::SubmissionStarted));
    match rx.recv().await {
        Some(UiEvent::Alert { message, .. }) => {
            assert!(message.contains(SUBMISSION_BUSY_MESSAGE));
        }
        other => panic!("expected busy alert, got {other:?}"),
    }

    release.notify_one();
    first.await.expect("task");
    assert_eq!(
        rx.recv().await,
        Some(UiEvent::ShowResult {
            image_url: "https://x/y.jpg".to_string()
        })
    );
    assert!(!flow.is_in_flight());
    assert!(flow.submit(&mut session, &mut backgrounds).is_some());
}
