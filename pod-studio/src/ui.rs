//! UI events and the presentation state they drive.
//!
//! Background tasks never touch presentation state directly. They send
//! [`UiEvent`]s over a channel, and the task owning the [`Presenter`] applies
//! them in order.

use tokio::sync::mpsc;

use crate::result::ResultScreen;

/// Title of every error alert.
pub const ERROR_ALERT_TITLE: &str = "Error";

/// Events sent from background work to the UI task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A submission was dispatched.
    SubmissionStarted,
    /// The print service rendered a mock-up.
    ShowResult {
        /// URL of the rendered image.
        image_url: String,
    },
    /// Something failed and the user should be told.
    Alert {
        /// Alert title.
        title: String,
        /// Alert body.
        message: String,
    },
}

impl UiEvent {
    /// An error alert with the standard title.
    #[must_use]
    pub fn error_alert(message: impl Into<String>) -> Self {
        Self::Alert {
            title: ERROR_ALERT_TITLE.to_string(),
            message: message.into(),
        }
    }

    /// Whether this event ends a submission.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::SubmissionStarted)
    }
}

/// An alert shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub message: String,
}

/// Presentation state owned by the UI task.
#[derive(Debug, Default)]
pub struct Presenter {
    busy: bool,
    result: Option<ResultScreen>,
    alerts: Vec<Alert>,
}

impl Presenter {
    /// Create an idle presenter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission is showing a progress indicator.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The result screen, once navigated to.
    #[must_use]
    pub fn result(&self) -> Option<&ResultScreen> {
        self.result.as_ref()
    }

    /// Mutable access to the result screen, for loading its image.
    pub fn result_mut(&mut self) -> Option<&mut ResultScreen> {
        self.result.as_mut()
    }

    /// Alerts shown so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Apply one event.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::SubmissionStarted => self.busy = true,
            UiEvent::ShowResult { image_url } => {
                self.busy = false;
                tracing::info!(%image_url, "showing result");
                self.result = Some(ResultScreen::new(image_url));
            }
            UiEvent::Alert { title, message } => {
                self.busy = false;
                tracing::info!(%title, %message, "showing alert");
                self.alerts.push(Alert { title, message });
            }
        }
    }

    /// Apply events until one ends a submission or every sender is gone.
    ///
    /// Returns `true` if a terminal event was applied.
    pub async fn run_until_settled(&mut self, events: &mut mpsc::UnboundedReceiver<UiEvent>) -> bool {
        while let Some(event) = events.recv().await {
            let terminal = event.is_terminal();
            self.apply(event);
            if terminal {
                return true;
            }
        }
        false
    }
}
