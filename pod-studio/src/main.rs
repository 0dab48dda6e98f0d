//! # POD Studio
//!
//! Command-line entry point for the print-on-demand design studio.

use anyhow::Context;
use clap::Parser;
use pod_renderer::encode_png;
use pod_studio::{
    CliArgs, Command, DesignRequest, EditScript, ResultState, Studio, StudioConfig,
    SubmissionOutcome,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels.
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pod_studio=info,pod_client=info,pod_renderer=info,pod_core=info")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let command = args.command.clone();
    let config = StudioConfig::from(args);
    tracing::info!(version = pod_studio::VERSION, "starting pod-studio");

    let mut studio = Studio::new(config).context("failed to start studio")?;

    match command {
        Command::Health => {
            let health = studio.health().await.context("health check failed")?;
            println!(
                "status: {}  version: {}",
                health.status.as_deref().unwrap_or("unknown"),
                health.version.as_deref().unwrap_or("unknown")
            );
        }
        Command::Design {
            script,
            assets,
            preview,
            output,
            dry_run,
        } => {
            let edit_script = EditScript::load(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let request = DesignRequest {
                script: edit_script,
                script_dir: script
                    .parent()
                    .map(std::path::Path::to_path_buf)
                    .unwrap_or_default(),
                assets_dir: assets,
                preview_path: preview,
                dry_run,
            };
            let outcome = studio.design(request).await?;
            println!(
                "applied {} commands ({} ignored), {} items on canvas",
                outcome.report.applied, outcome.report.ignored, outcome.items
            );
            if let Some(path) = &outcome.preview_path {
                println!("preview: {}", path.display());
            }

            match outcome.submission {
                None => {}
                Some(SubmissionOutcome::Alert(alert)) => {
                    anyhow::bail!("{}: {}", alert.title, alert.message);
                }
                Some(SubmissionOutcome::Result(screen)) => {
                    println!("result: {}", screen.image_url());
                    match (screen.state(), output) {
                        (ResultState::Loaded(image), Some(path)) => {
                            std::fs::write(&path, encode_png(image)?)
                                .with_context(|| format!("failed to write {}", path.display()))?;
                            println!("saved: {}", path.display());
                        }
                        (ResultState::Failed(reason), _) => {
                            println!("result image unavailable: {reason}");
                        }
                        _ => {}
                    }
                }
            }
        }
        Command::History => {
            for record in studio.history().records() {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }

    Ok(())
}
