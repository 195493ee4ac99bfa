//! Read-only Model Context Protocol server for TIA Portal projects.
//!
//! Every call into the engineering layer runs as a guarded call with its own
//! deadline (see `tia-watchdog`); tool handlers turn the outcome into the
//! text returned to the client.

mod adapter;
pub mod config;
mod error;
pub mod protocol;
mod session;
mod tools;

pub use adapter::{McpAdapter, STRUCTURE_URI, TOOL_NAMES, TRANSCRIPT_ENV};
pub use config::{BackendKind, ConfigError, ReaderConfig, Timeouts};
pub use error::ToolError;
pub use session::Session;
pub use tools::{ToolReply, ToolResult, Toolbox};
