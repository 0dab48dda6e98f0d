//! Studio orchestration: builds the collaborators from configuration and
//! runs the health check and design commands.

use std::path::PathBuf;
use std::sync::Arc;

use pod_client::{ApiProcessorFactory, HealthCheck, MeshService};
use pod_core::{EditorSession, FileStoreManager, Size, TracingHaptics};
use pod_renderer::{encode_png, BackgroundLibrary, Compositor};
use tokio::sync::mpsc;

use crate::error::StudioResult;
use crate::history::{SubmissionHistory, SubmissionRecord};
use crate::result::{HttpImageFetcher, ImageFetcher, ResultScreen};
use crate::script::{EditScript, ScriptReport, ScriptRunner};
use crate::submission::{PrintGateway, SubmissionFlow};
use crate::ui::{Alert, Presenter};
use crate::StudioConfig;

/// Inputs of one design run.
#[derive(Debug, Clone, Default)]
pub struct DesignRequest {
    /// The edits to replay.
    pub script: EditScript,
    /// Directory image paths in the script are relative to.
    pub script_dir: PathBuf,
    /// Directory with `front_outline.png` and `back_outline.png`; plain
    /// outlines are generated when absent.
    pub assets_dir: Option<PathBuf>,
    /// Write the composited canvas here as PNG.
    pub preview_path: Option<PathBuf>,
    /// Stop after compositing; nothing is sent.
    pub dry_run: bool,
}

/// How a submission ended.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The mock-up was rendered; the screen holds the downloaded image.
    Result(ResultScreen),
    /// The user was shown an alert.
    Alert(Alert),
}

/// Outcome of a design run.
#[derive(Debug, Clone)]
pub struct DesignOutcome {
    /// Replay summary.
    pub report: ScriptReport,
    /// Items on the canvas after replay.
    pub items: usize,
    /// Where the preview PNG was written.
    pub preview_path: Option<PathBuf>,
    /// Submission result, absent for dry runs.
    pub submission: Option<SubmissionOutcome>,
}

/// The assembled studio.
pub struct Studio {
    config: StudioConfig,
    service: MeshService,
    gateway: Arc<dyn PrintGateway>,
    fetcher: Arc<dyn ImageFetcher>,
    history: SubmissionHistory,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Build every collaborator from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the data
    /// directory cannot be prepared.
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        let factory = ApiProcessorFactory::with_defaults()?;
        let service = MeshService::new(config.base_url.clone(), factory)
            .with_token(config.token.clone());
        let manager = FileStoreManager::new(&config.data_dir)?;
        let history = SubmissionHistory::open(&manager)?;
        tracing::info!(
            base_url = %config.base_url,
            home = %manager.home().display(),
            submissions = history.records().len(),
            "studio ready"
        );

        Ok(Self {
            gateway: Arc::new(service.clone()),
            fetcher: Arc::new(HttpImageFetcher::default()),
            service,
            config,
            history,
        })
    }

    /// Replace the print gateway.
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn PrintGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Replace the result image fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Past submissions.
    #[must_use]
    pub fn history(&self) -> &SubmissionHistory {
        &self.history
    }

    /// Check the print service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or reports failure.
    pub async fn health(&self) -> StudioResult<HealthCheck> {
        Ok(self.service.health_check().await?)
    }

    /// Replay a script, composite it and submit it.
    ///
    /// Submission failures end as [`SubmissionOutcome::Alert`]; only local
    /// failures (script, assets, preview file) are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the script fails, the outlines cannot be loaded,
    /// or the preview cannot be written.
    pub async fn design(&mut self, request: DesignRequest) -> StudioResult<DesignOutcome> {
        let compositor_config = self.config.compositor.clone();
        let bounds = Size::new(
            f64::from(compositor_config.width),
            f64::from(compositor_config.height),
        );
        let mut session = EditorSession::new(bounds, Box::new(TracingHaptics));
        let report = ScriptRunner::new(&request.script_dir).run(&mut session, &request.script)?;

        let mut backgrounds = match &request.assets_dir {
            Some(dir) => BackgroundLibrary::load_dir(dir)?,
            None => BackgroundLibrary::plain(compositor_config.width, compositor_config.height),
        };

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let flow = SubmissionFlow::new(
            Compositor::new(compositor_config),
            Arc::clone(&self.gateway),
            self.config.print.clone(),
            events_tx,
        );

        if let Some(path) = &request.preview_path {
            let raster = flow.capture(&mut session, &mut backgrounds)?;
            std::fs::write(path, encode_png(&raster)?)?;
            tracing::info!(path = %path.display(), "preview written");
        }

        let mut outcome = DesignOutcome {
            report,
            items: session.canvas().len(),
            preview_path: request.preview_path.clone(),
            submission: None,
        };
        if request.dry_run {
            return Ok(outcome);
        }

        // Only the spawned task may hold a sender past this point.
        let task = flow.submit(&mut session, &mut backgrounds);
        drop(flow);

        let mut presenter = Presenter::new();
        presenter.run_until_settled(&mut events_rx).await;
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "submission task failed");
            }
        }

        if let Some(screen) = presenter.result_mut() {
            screen.load(self.fetcher.as_ref()).await;
            self.history.record(SubmissionRecord::new(
                &session,
                &self.config.print,
                screen.image_url(),
            ))?;
            outcome.submission = Some(SubmissionOutcome::Result(screen.clone()));
        } else if let Some(alert) = presenter.alerts().last() {
            outcome.submission = Some(SubmissionOutcome::Alert(alert.clone()));
        }
        Ok(outcome)
    }
}
