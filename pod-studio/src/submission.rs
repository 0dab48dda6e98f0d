//! Submission flow.
//!
//! ```text
//! submit() ──▶ capture canvas + tinted background ──▶ JPEG
//!                                                      │ tokio::spawn
//!                                                      ▼
//!                                        PrintGateway::print(jpeg, options)
//!                                                      │
//!                      UiEvent::ShowResult | UiEvent::Alert ──▶ UI task
//! ```
//!
//! Only one submission may be in flight. A second call while the first is
//! running is rejected with an alert and nothing is sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pod_client::{ApiResult, MeshService, PrintOptions, PrintResult};
use pod_core::{location, AppError, EditorSession};
use pod_renderer::{encode_jpeg, BackgroundLibrary, Compositor, RasterImage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{StudioError, StudioResult};
use crate::ui::UiEvent;

/// Message shown when the service answers but could not render.
pub const PRINT_REJECTED_MESSAGE: &str = "The print service could not render this design";

/// Message shown when a submission is attempted while one is running.
pub const SUBMISSION_BUSY_MESSAGE: &str = "A submission is already in progress";

/// Sends composited artwork to be printed.
#[async_trait]
pub trait PrintGateway: Send + Sync {
    /// Submit `sticker_jpeg` for rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn print(&self, sticker_jpeg: Vec<u8>, options: &PrintOptions) -> ApiResult<PrintResult>;
}

#[async_trait]
impl PrintGateway for MeshService {
    async fn print(&self, sticker_jpeg: Vec<u8>, options: &PrintOptions) -> ApiResult<PrintResult> {
        MeshService::print(self, sticker_jpeg, options).await
    }
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Captures the canvas and submits it to the print service.
pub struct SubmissionFlow {
    compositor: Compositor,
    gateway: Arc<dyn PrintGateway>,
    options: PrintOptions,
    events: mpsc::UnboundedSender<UiEvent>,
    in_flight: Arc<AtomicBool>,
}

impl std::fmt::Debug for SubmissionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionFlow")
            .field("compositor", &self.compositor)
            .field("options", &self.options)
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl SubmissionFlow {
    /// Create a flow reporting to `events`.
    #[must_use]
    pub fn new(
        compositor: Compositor,
        gateway: Arc<dyn PrintGateway>,
        options: PrintOptions,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            compositor,
            gateway,
            options,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Options sent with every submission.
    #[must_use]
    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    /// Whether a submission is running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Composite the session's canvas over its tinted background.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas cannot be rendered.
    pub fn capture(
        &self,
        session: &mut EditorSession,
        backgrounds: &mut BackgroundLibrary,
    ) -> StudioResult<RasterImage> {
        let background = backgrounds.tinted(session.side(), session.color());
        if background.is_none() {
            tracing::warn!(side = %session.side(), "no outline for side, rendering without background");
        }
        Ok(self
            .compositor
            .capture_snapshot(session.canvas_mut(), background)?)
    }

    /// Capture the canvas and dispatch it to the print service.
    ///
    /// Returns the handle of the dispatched task, or `None` if nothing was
    /// sent because a submission is already running or capture failed. Every
    /// outcome reaches the UI as a [`UiEvent`].
    pub fn submit(
        &self,
        session: &mut EditorSession,
        backgrounds: &mut BackgroundLibrary,
    ) -> Option<JoinHandle<()>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            let error = AppError::illegal(SUBMISSION_BUSY_MESSAGE, location!());
            self.alert(&error.into());
            return None;
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let jpeg = match self.capture_jpeg(session, backgrounds) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                self.alert(&e);
                return None;
            }
        };

        tracing::info!(
            bytes = jpeg.len(),
            side = %session.side(),
            color = %session.color(),
            "submitting design"
        );
        self.send(UiEvent::SubmissionStarted);

        let gateway = Arc::clone(&self.gateway);
        let options = self.options.clone();
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            let event = match gateway.print(jpeg, &options).await {
                Ok(result) if result.success => UiEvent::ShowResult {
                    image_url: result.image_url,
                },
                Ok(result) => {
                    let error: StudioError =
                        AppError::runtime(PRINT_REJECTED_MESSAGE, location!()).into();
                    error.trace_warn("print rejected");
                    tracing::debug!(?result, "rejected print result");
                    UiEvent::error_alert(error.user_message())
                }
                Err(e) => UiEvent::error_alert(StudioError::from(e).user_message()),
            };
            if events.send(event).is_err() {
                tracing::debug!("UI gone before submission finished");
            }
        }))
    }

    fn capture_jpeg(
        &self,
        session: &mut EditorSession,
        backgrounds: &mut BackgroundLibrary,
    ) -> StudioResult<Vec<u8>> {
        let raster = self.capture(session, backgrounds)?;
        let config = self.compositor.config();
        Ok(encode_jpeg(&raster, config.jpeg_quality, config.matte)?)
    }

    fn alert(&self, error: &StudioError) {
        error.trace_warn("submission failed");
        self.send(UiEvent::error_alert(error.user_message()));
    }

    fn send(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("UI gone, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::{NoHaptics, Size};

    struct FixedGateway(PrintResult);

    #[async_trait]
    impl PrintGateway for FixedGateway {
        async fn print(&self, _jpeg: Vec<u8>, _options: &PrintOptions) -> ApiResult<PrintResult> {
            Ok(self.0.clone())
        }
    }

    fn flow(result: PrintResult) -> (SubmissionFlow, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let flow = SubmissionFlow::new(
            Compositor::with_defaults(),
            Arc::new(FixedGateway(result)),
            PrintOptions::default(),
            tx,
        );
        (flow, rx)
    }

    fn session() -> EditorSession {
        EditorSession::new(Size::new(200.0, 200.0), Box::new(NoHaptics))
    }

    fn print_result(success: bool) -> PrintResult {
        PrintResult {
            success,
            dataset_name: "data1".to_string(),
            gender: "male".to_string(),
            image_url: "https://x/y.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_shows_result() {
        let (flow, mut rx) = flow(print_result(true));
        let handle = flow
            .submit(&mut session(), &mut BackgroundLibrary::plain(200, 200))
            .expect("dispatched");
        handle.await.expect("task");

        assert_eq!(rx.recv().await, Some(UiEvent::SubmissionStarted));
        assert_eq!(
            rx.recv().await,
            Some(UiEvent::ShowResult {
                image_url: "https://x/y.jpg".to_string()
            })
        );
        assert!(!flow.is_in_flight());
    }

    #[tokio::test]
    async fn test_unsuccessful_print_is_alert() {
        let (flow, mut rx) = flow(print_result(false));
        let handle = flow
            .submit(&mut session(), &mut BackgroundLibrary::new())
            .expect("dispatched");
        handle.await.expect("task");

        assert_eq!(rx.recv().await, Some(UiEvent::SubmissionStarted));
        match rx.recv().await {
            Some(UiEvent::Alert { message, .. }) => {
                assert!(message.contains(PRINT_REJECTED_MESSAGE));
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capture_failure_is_alert() {
        let (flow, mut rx) = flow(print_result(true));
        let mut session = EditorSession::new(Size::new(0.0, 0.0), Box::new(NoHaptics));
        assert!(flow
            .submit(&mut session, &mut BackgroundLibrary::new())
            .is_none());
        assert!(matches!(rx.recv().await, Some(UiEvent::Alert { .. })));
        assert!(!flow.is_in_flight());
    }
}
