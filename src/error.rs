use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed transport error returned by a [`crate::downloader::Fetch`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong between reading the JNLP file and writing the last jar.
///
/// The first three variants are always fatal. The per-jar variants are only
/// returned when the matching [`crate::cli::FailurePolicy`] flag asks for it.
#[derive(Debug, Error)]
pub enum JnlpError {
    #[error("cannot open specified jnlp file '{}'", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot unmarshal jnlp file '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::de::DeError,
    },

    #[error("cannot create download directory '{}'", path.display())]
    DirectoryPreparation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot download jar '{href}' ({url})")]
    Download {
        href: String,
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("cannot create jar file '{}'", path.display())]
    FileCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write jar file '{}'", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Renders an error and its causes the way the log expects them: one `=>` line per cause.
pub fn describe(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(":\n=> ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_every_cause() {
        let err = JnlpError::FileWrite {
            path: PathBuf::from("downloads/App/a.jar"),
            source: io::Error::new(io::ErrorKind::Other, "no space left on device"),
        };
        assert_eq!(
            describe(&err),
            "cannot write jar file 'downloads/App/a.jar':\n=> no space left on device"
        );
    }
}
