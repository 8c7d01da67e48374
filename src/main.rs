mod cli;
mod downloader;
mod error;
mod logging;
mod models;
mod state;

use anyhow::Result;
use cli::{Config, DEFAULT_DOWNLOAD_DIR, Invocation};
use downloader::{DownloadReport, Downloader, Fetch, HttpFetcher, prepare_destination};
use error::{JnlpError, describe};
use indicatif::ProgressBar;
use models::Descriptor;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Invocation::from_args(std::env::args()) {
        Invocation::Usage => {
            println!("{}", cli::usage());
            return ExitCode::SUCCESS;
        }
        Invocation::Info(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Invocation::Invalid(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
        Invocation::Run(config) => config,
    };

    logging::init_logging();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", describe(&*e));
            error!("=> exiting program...");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let fetcher = HttpFetcher::new()?;
    let progress = ProgressBar::new(0);
    run_with(&config, fetcher, progress).await?;
    Ok(())
}

/// Reads the descriptor, prepares the destination and downloads every jar.
///
/// Returns `None` when the descriptor lists no jars; nothing is created on disk in that case.
async fn run_with<F: Fetch>(
    config: &Config,
    fetcher: F,
    progress: ProgressBar,
) -> Result<Option<DownloadReport>, JnlpError> {
    let bytes = fs::read(&config.jnlp_file).map_err(|source| JnlpError::InputRead {
        path: config.jnlp_file.clone(),
        source,
    })?;

    let descriptor = Descriptor::from_bytes(&bytes).map_err(|source| JnlpError::Parse {
        path: config.jnlp_file.clone(),
        source,
    })?;

    info!(
        "loaded {} from '{}'",
        descriptor,
        config.jnlp_file.display()
    );

    if descriptor.jars.is_empty() {
        warn!("no jars found in jnlp file '{}'", config.jnlp_file.display());
        return Ok(None);
    }

    let output_dir = prepare_destination(
        &config.download_dir,
        Path::new(DEFAULT_DOWNLOAD_DIR),
        &descriptor.title,
    )?;

    let report = Downloader::new(fetcher, output_dir, config.policy)
        .with_progress(progress)
        .download_all(&descriptor)
        .await?;

    info!(
        "JAR files downloaded successfully to '{}' ({} written, {} skipped)",
        report.output_dir.display(),
        report.written,
        report.skipped
    );

    Ok(Some(report))
}
