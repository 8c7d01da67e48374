use crate::cli::FailurePolicy;
use crate::error::{BoxError, JnlpError, describe};
use crate::models::{Descriptor, DownloadTarget};
use crate::state::{JarState, JarStep};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fs::{self, File};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Blocking-style GET used by the downloader: the whole body or a transport error.
pub trait Fetch {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, BoxError>> + Send;
}

/// `Fetch` over a plain reqwest client. The status code is not checked.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, BoxError> {
        let response = self.client.get(url).send().await?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

/// Outcome of a run in which no fatal error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub output_dir: PathBuf,
    pub written: usize,
    pub skipped: usize,
}

pub struct Downloader<F> {
    fetcher: F,
    output_dir: PathBuf,
    policy: FailurePolicy,
    progress: ProgressBar,
}

impl<F: Fetch> Downloader<F> {
    /// `output_dir` must already exist; see [`prepare_destination`].
    pub fn new(fetcher: F, output_dir: PathBuf, policy: FailurePolicy) -> Self {
        Self {
            fetcher,
            output_dir,
            policy,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Downloads every jar of `descriptor` in order.
    ///
    /// Per-jar failures are logged and skipped unless the policy makes them fatal,
    /// in which case the first one is returned and the remaining jars are not attempted.
    pub async fn download_all(&self, descriptor: &Descriptor) -> Result<DownloadReport, JnlpError> {
        let pb = &self.progress;
        pb.set_length(descriptor.jars.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} {bar:40} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let mut written = 0;
        let mut skipped = 0;

        for (idx, href) in descriptor.jars.iter().enumerate() {
            pb.set_message(format!("[{:>2}] {}", idx, href));

            match self.download_jar(&descriptor.codebase, href).await {
                Ok(state) => {
                    debug!(href = %href, ?state, "jar done");
                    written += 1;
                }
                Err((step, err)) => {
                    let state = JarState::failed_at(step, self.is_fatal(step));
                    debug!(href = %href, ?state, "jar failed");
                    if let JarState::Aborted(_) = state {
                        pb.abandon_with_message(format!("{} failed, exiting", step));
                        return Err(err);
                    }
                    pb.suspend(|| {
                        warn!("{}", describe(&err));
                        warn!("=> to exit immediately, use '{}' flag", step.escalation_flag());
                    });
                    skipped += 1;
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();

        Ok(DownloadReport {
            output_dir: self.output_dir.clone(),
            written,
            skipped,
        })
    }

    async fn download_jar(
        &self,
        codebase: &str,
        href: &str,
    ) -> Result<JarState, (JarStep, JnlpError)> {
        debug!(href = %href, state = ?JarState::Pending);
        let target = DownloadTarget::resolve(codebase, href);
        debug!(url = %target.url, file = %target.file_name, state = ?JarState::Resolved);

        let body = self.fetcher.get(&target.url).await.map_err(|source| {
            let err = JnlpError::Download {
                href: href.to_string(),
                url: target.url.clone(),
                source,
            };
            (JarStep::Download, err)
        })?;
        debug!(url = %target.url, bytes = body.len(), state = ?JarState::Fetched);

        let path = self.output_dir.join(&target.file_name);
        write_jar(&path, &body)
    }

    fn is_fatal(&self, step: JarStep) -> bool {
        match step {
            JarStep::Download => self.policy.abort_on_download,
            JarStep::Create => self.policy.abort_on_create,
            JarStep::Write => self.policy.abort_on_write,
        }
    }
}

/// Creates `path` and writes `body` into it. The handle is closed before returning.
///
/// A file that fails mid-write stays on disk as is.
fn write_jar(path: &Path, body: &[u8]) -> Result<JarState, (JarStep, JnlpError)> {
    let mut file = File::create(path).map_err(|source| {
        let err = JnlpError::FileCreation {
            path: path.to_path_buf(),
            source,
        };
        (JarStep::Create, err)
    })?;
    debug!(path = %path.display(), state = ?JarState::Created);

    file.write_all(body).map_err(|source| {
        let err = JnlpError::FileWrite {
            path: path.to_path_buf(),
            source,
        };
        (JarStep::Write, err)
    })?;

    Ok(JarState::Written)
}

/// Resolves and creates `<requested>/<title>`.
///
/// A missing directory is created. Any other error while checking it makes the
/// downloader fall back to `<fallback>/<title>`, where creation failures are fatal.
pub fn prepare_destination(
    requested: &Path,
    fallback: &Path,
    title: &str,
) -> Result<PathBuf, JnlpError> {
    let primary = title_dir(requested, title);

    match fs::metadata(&primary) {
        Ok(_) => Ok(primary),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            create_dir(&primary)?;
            Ok(primary)
        }
        Err(e) => {
            let fallback = title_dir(fallback, title);
            warn!(
                "provided download directory '{}' cannot be set ({}), using default '{}'",
                primary.display(),
                e,
                fallback.display()
            );
            if fs::metadata(&fallback).is_err() {
                create_dir(&fallback)?;
            }
            Ok(fallback)
        }
    }
}

/// `base` joined with the plain segments of `title`.
///
/// Roots, prefixes, `.` and `..` are dropped so the result always stays under `base`.
fn title_dir(base: &Path, title: &str) -> PathBuf {
    let mut dir = base.to_path_buf();
    for component in Path::new(title).components() {
        if let Component::Normal(segment) = component {
            dir.push(segment);
        }
    }
    dir
}

fn create_dir(path: &Path) -> Result<(), JnlpError> {
    fs::create_dir_all(path).map_err(|source| JnlpError::DirectoryPreparation {
        path: path.to_path_buf(),
        source,
    })?;
    info!("created download directory '{}'", path.display());
    Ok(())
}
