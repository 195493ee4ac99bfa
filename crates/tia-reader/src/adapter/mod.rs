//! MCP adapter module map.
//! - core: stdio loop, line decoding, method dispatch
//! - handlers: initialize/tools/resources requests
//! - catalog: tool and resource descriptors
//! - protocol_io: newline framing + transcript logging
//! - tests: adapter unit tests

mod catalog;
mod core;
mod handlers;
mod protocol_io;


use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::RpcResponse;
use crate::session::Session;
use crate::tools::Toolbox;

pub use self::catalog::{STRUCTURE_URI, TOOL_NAMES};

/// Environment variable naming a file that receives the raw transcript.
pub const TRANSCRIPT_ENV: &str = "TIA_READER_MCP_LOG";

/// MCP server over one [`Session`]. Requests are handled one at a time.
pub struct McpAdapter {
    session: Session,
    toolbox: Toolbox,
    transcript: Option<Arc<Mutex<BufWriter<File>>>>,
}

#[derive(Debug, Default)]
struct DispatchOutcome {
    response: Option<RpcResponse>,
}

impl DispatchOutcome {
    fn reply(response: RpcResponse) -> Self {
        Self {
            response: Some(response),
        }
    }
}
