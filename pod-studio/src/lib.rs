//! # POD Studio
//!
//! Command-line host for the print-on-demand design studio.
//!
//! ## Usage
//!
//! ```bash
//! pod-studio --base-url https://mesh.example.com/ health
//! pod-studio --base-url https://mesh.example.com/ design shirt.json --preview out.png
//! ```
//!
//! ## Architecture
//!
//! ```text
//! CliArgs ──▶ StudioConfig ──▶ Studio
//!                                │
//!          EditScript ──▶ ScriptRunner ──▶ EditorSession
//!                                │
//!                         SubmissionFlow ── tokio::spawn ──▶ PrintGateway
//!                                │                              │
//!                                ◀──────── UiEvent (mpsc) ──────┘
//!                            Presenter ──▶ ResultScreen ──▶ SubmissionHistory
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod error;
pub mod history;
pub mod result;
pub mod script;
pub mod submission;
pub mod ui;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use pod_client::PrintOptions;
use pod_renderer::{CompositorConfig, DEFAULT_JPEG_QUALITY};

pub use app::{DesignOutcome, DesignRequest, Studio, SubmissionOutcome};
pub use error::{StudioError, StudioResult};
pub use history::{SubmissionHistory, SubmissionRecord, HISTORY_FILE};
pub use result::{HttpImageFetcher, ImageFetcher, ResultScreen, ResultState};
pub use script::{EditCommand, EditScript, ScriptReport, ScriptRunner};
pub use submission::{PrintGateway, SubmissionFlow};
pub use ui::{Alert, Presenter, UiEvent};

/// Command-line arguments for pod-studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "pod-studio")]
#[command(about = "Print-on-demand design studio")]
#[command(version)]
pub struct CliArgs {
    /// Print service base URL (e.g., <https://mesh.example.com/>)
    #[arg(long, env = "POD_BASE_URL")]
    pub base_url: String,

    /// Bearer token for the print service
    #[arg(long, env = "POD_TOKEN")]
    pub token: Option<String>,

    /// Mock-up dataset
    #[arg(long, env = "POD_DATASET", default_value = "data1")]
    pub dataset: String,

    /// Model gender for the mock-up
    #[arg(long, env = "POD_GENDER", default_value = "male")]
    pub gender: String,

    /// Keep white pixels of the artwork opaque
    #[arg(long, env = "POD_KEEP_WHITE", default_value_t = true, action = ArgAction::Set)]
    pub keep_white: bool,

    /// Canvas width in points
    #[arg(long, env = "POD_CANVAS_WIDTH", default_value = "200")]
    pub width: u32,

    /// Canvas height in points
    #[arg(long, env = "POD_CANVAS_HEIGHT", default_value = "200")]
    pub height: u32,

    /// Output pixels per canvas point
    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    /// JPEG quality of the submitted artwork (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// Directory holding the application home
    #[arg(long, env = "POD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Studio subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check the print service is reachable
    Health,
    /// Replay an edit script and submit the design
    Design {
        /// Edit script (JSON)
        script: PathBuf,
        /// Directory with front_outline.png and back_outline.png
        #[arg(long, env = "POD_ASSETS_DIR")]
        assets: Option<PathBuf>,
        /// Write the composited canvas to this PNG
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Save the downloaded mock-up to this PNG
        #[arg(long)]
        output: Option<PathBuf>,
        /// Composite only; do not submit
        #[arg(long)]
        dry_run: bool,
    },
    /// List past submissions
    History,
}

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Print service base URL.
    pub base_url: String,
    /// Bearer token for the print service.
    pub token: Option<String>,
    /// Options sent with every print.
    pub print: PrintOptions,
    /// Canvas size and encoding.
    pub compositor: CompositorConfig,
    /// Directory holding the application home.
    pub data_dir: PathBuf,
}

impl StudioConfig {
    /// Configuration with default options for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            print: PrintOptions::default(),
            compositor: CompositorConfig::default(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            base_url: args.base_url,
            token: args.token,
            print: PrintOptions {
                dataset_name: args.dataset,
                gender: args.gender,
                keep_white: args.keep_white,
            },
            compositor: CompositorConfig {
                width: args.width,
                height: args.height,
                scale: args.scale,
                jpeg_quality: args.jpeg_quality,
                ..CompositorConfig::default()
            },
            data_dir: args.data_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Studio version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
