//! Adapter core loop + request dispatch.
//! - McpAdapter::new
//! - run_stdio/run: protocol loop
//! - dispatch_line/dispatch_request: route MCP methods

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufWriter, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::protocol::{RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
use crate::session::Session;
use crate::tools::Toolbox;

use super::protocol_io::{read_message, write_message, write_protocol_log};
use super::{DispatchOutcome, McpAdapter, TRANSCRIPT_ENV};

impl McpAdapter {
    #[must_use]
    pub fn new(session: Session, toolbox: Toolbox) -> Self {
        Self {
            session,
            toolbox,
            transcript: None,
        }
    }

    /// Run a blocking stdio loop until stdin closes.
    pub fn run_stdio(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), BufWriter::new(stdout.lock()))
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`.
    pub fn run<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> io::Result<()> {
        if let Ok(path) = std::env::var(TRANSCRIPT_ENV) {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    info!("writing MCP transcript to {path}");
                    self.transcript = Some(Arc::new(Mutex::new(BufWriter::new(file))));
                }
                Err(err) => warn!("cannot open MCP transcript {path}: {err}"),
            }
        }

        while let Some(payload) = read_message(&mut reader)? {
            self.log_transcript("<-", &payload);
            let outcome = self.dispatch_line(&payload);
            let Some(response) = outcome.response else {
                continue;
            };
            let serialized = serde_json::to_string(&response)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            self.log_transcript("->", &serialized);
            write_message(&mut writer, &serialized)?;
        }
        debug!("stdin closed");
        Ok(())
    }

    fn log_transcript(&self, direction: &str, payload: &str) {
        if let Some(logger) = &self.transcript {
            let _ = write_protocol_log(logger, direction, payload);
        }
    }

    pub(super) fn dispatch_line(&mut self, payload: &str) -> DispatchOutcome {
        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(err) => {
                warn!("invalid json: {err}");
                return DispatchOutcome::reply(RpcResponse::failure(
                    Value::Null,
                    RpcError::parse_error(&err.to_string()),
                ));
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                return DispatchOutcome::reply(RpcResponse::failure(
                    id,
                    RpcError::invalid_request(&err.to_string()),
                ));
            }
        };
        if request.jsonrpc != JSONRPC_VERSION {
            return DispatchOutcome::reply(RpcResponse::failure(
                id,
                RpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }
        self.dispatch_request(request)
    }

    pub(super) fn dispatch_request(&mut self, request: RpcRequest) -> DispatchOutcome {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return DispatchOutcome::default();
        }
        let id = request.id.unwrap_or(Value::Null);
        debug!(method = %request.method, "request");

        let params = request.params;
        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(Value::Object(serde_json::Map::new())),
            "tools/list" => Ok(self.handle_list_tools()),
            "tools/call" => self.handle_call_tool(params),
            "resources/list" => Ok(self.handle_list_resources()),
            "resources/read" => self.handle_read_resource(params),
            method => Err(RpcError::method_not_found(method)),
        };

        DispatchOutcome::reply(match result {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }
}
