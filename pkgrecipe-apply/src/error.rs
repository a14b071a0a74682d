//! Error types for pkgrecipe-apply.
//!
//! Sync and manifest failures abort the run; packaging failures never surface here and are
//! reported per entry in a `PackageOutcome` instead.

use camino::Utf8PathBuf;
use pkgrecipe_types::report::Phase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// A stale destination entry could not be removed.
    #[error("failed to remove {path}")]
    Remove {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module entry could not be copied into the workspace.
    #[error("failed to copy {from} to {to}")]
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write manifest {path}")]
    Manifest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApplyError {
    /// Stage of the run the error belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            ApplyError::Remove { .. } | ApplyError::Copy { .. } => Phase::Sync,
            ApplyError::Manifest { .. } => Phase::Manifest,
        }
    }

    /// Path the failed operation was writing to.
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            ApplyError::Remove { path, .. } | ApplyError::Manifest { path, .. } => path,
            ApplyError::Copy { to, .. } => to,
        }
    }
}

pub type ApplyResult<T> = Result<T, ApplyError>;
