use std::fmt;

pub const FAILED_DOWNLOAD_FLAG: &str = "--failed-download-exit";
pub const FAILED_FILE_CREATION_FLAG: &str = "--failed-file-creation-exit";
pub const FAILED_FILE_WRITE_FLAG: &str = "--failed-file-write-exit";

/// The per-jar steps that may fail without necessarily stopping the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JarStep {
    Download,
    Create,
    Write,
}

impl JarStep {
    /// Command-line flag that turns a failure at this step into a fatal one.
    pub fn escalation_flag(self) -> &'static str {
        match self {
            JarStep::Download => FAILED_DOWNLOAD_FLAG,
            JarStep::Create => FAILED_FILE_CREATION_FLAG,
            JarStep::Write => FAILED_FILE_WRITE_FLAG,
        }
    }
}

impl fmt::Display for JarStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JarStep::Download => "download",
            JarStep::Create => "file creation",
            JarStep::Write => "file write",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one jar: `Pending -> Resolved -> Fetched -> Created -> Written`,
/// or stopped early at a failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JarState {
    Pending,
    Resolved,
    Fetched,
    Created,
    Written,
    Skipped(JarStep),
    Aborted(JarStep),
}

impl JarState {
    /// State reached when `step` fails, depending on whether the policy makes it fatal.
    pub fn failed_at(step: JarStep, fatal: bool) -> Self {
        if fatal {
            JarState::Aborted(step)
        } else {
            JarState::Skipped(step)
        }
    }
}
