//! Tool-level errors. `Display` is the text returned to the client.

use smol_str::SmolStr;
use thiserror::Error;
use tia_portal::PortalError;
use tia_watchdog::Expired;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Not connected to TIA Portal. Use connect_to_tia tool first.")]
    NotConnected,

    #[error("No project is currently open")]
    NoProjectOpen,

    #[error(transparent)]
    TimedOut(#[from] Expired),

    /// Structure walk that ran out of time; keeps what was collected.
    #[error("{expired}, partial structure:\n{partial}")]
    Partial { expired: Expired, partial: String },

    #[error("PLC with name '{0}' not found")]
    PlcNotFound(SmolStr),

    #[error("Block '{block}' not found in PLC '{plc}'")]
    BlockNotFound { plc: SmolStr, block: SmolStr },

    #[error("{context}: {source}")]
    Native {
        context: String,
        #[source]
        source: PortalError,
    },
}

impl ToolError {
    pub fn native(context: impl Into<String>, source: PortalError) -> Self {
        Self::Native {
            context: context.into(),
            source,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_) | Self::Partial { .. })
    }
}
