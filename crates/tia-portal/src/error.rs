//! Automation layer errors.

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;
use tia_watchdog::Interrupted;

pub type PortalResult<T> = Result<T, PortalError>;

/// Errors raised by the automation layer.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The call observed its cancellation token.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// Named object does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: SmolStr },

    /// Block folder missing on the PLC.
    #[error("block folder '{0}' not found")]
    FolderNotFound(SmolStr),

    #[error("failed to read '{path}': {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project snapshot '{path}': {message}", path = .path.display())]
    Parse { path: PathBuf, message: String },

    /// The engineering environment refused the request.
    #[error("request rejected: {0}")]
    Rejected(SmolStr),

    /// The portal connection was disposed; a reconnect is required.
    #[error("portal connection has been disposed")]
    Disposed,

    #[error("{0}")]
    Unsupported(SmolStr),
}

impl PortalError {
    pub fn not_found(kind: &'static str, name: impl Into<SmolStr>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// `true` when the error only reports that the call was cancelled.
    #[must_use]
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }

    /// `true` when the connection itself is unusable.
    #[must_use]
    pub fn invalidates_connection(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}
