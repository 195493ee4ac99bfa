//! MCP method handlers.
//! - handle_initialize: server info + capabilities
//! - handle_list_tools/handle_call_tool: tool surface
//! - handle_list_resources/handle_read_resource: structure resource

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeResult, ListChangedCapability,
    ListResourcesResult, ListToolsResult, ListBlocksArguments, OpenProjectArguments,
    ReadBlockCodeArguments, ReadResourceParams, ReadResourceResult, ResourceContents,
    ResourcesCapability, RpcError, ServerCapabilities, TextContent, PROTOCOL_VERSION, SERVER_NAME,
};
use crate::tools::ToolReply;

use super::catalog::{resource_descriptors, tool_descriptors, ToolName, STRUCTURE_URI};
use super::McpAdapter;

impl McpAdapter {
    pub(super) fn handle_initialize(&self) -> Value {
        to_value(&InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability::default()),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Read-only access to TIA Portal projects. Connect, open a project, then list PLCs and blocks."
                    .to_string(),
            ),
        })
    }

    pub(super) fn handle_list_tools(&self) -> Value {
        to_value(&ListToolsResult {
            tools: tool_descriptors(),
        })
    }

    pub(super) fn handle_call_tool(&mut self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams = parse_params(params)?;
        let tool = ToolName::parse(&params.name)
            .ok_or_else(|| RpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;
        let arguments = params.arguments;
        info!(tool = %params.name, "tool call");

        let toolbox = &self.toolbox;
        let session = &mut self.session;
        let result = match tool {
            ToolName::ConnectToTia => toolbox.connect(session),
            ToolName::OpenProject => {
                let args: OpenProjectArguments = parse_params(arguments)?;
                toolbox.open_project(session, &args.project_path)
            }
            ToolName::GetPlcList => toolbox.plc_list(session),
            ToolName::ListBlocks => {
                let args: ListBlocksArguments = parse_params(arguments)?;
                toolbox.list_blocks(session, &args.plc_name)
            }
            ToolName::ReadBlockCode => {
                let args: ReadBlockCodeArguments = parse_params(arguments)?;
                toolbox.read_block_code(session, &args.plc_name, &args.block_name)
            }
            ToolName::Reconnect => toolbox.reconnect(session),
        };

        let reply = ToolReply::from(result);
        Ok(to_value(&CallToolResult {
            content: vec![TextContent::text(reply.text)],
            is_error: reply.is_error,
        }))
    }

    pub(super) fn handle_list_resources(&self) -> Value {
        to_value(&ListResourcesResult {
            resources: resource_descriptors(),
        })
    }

    pub(super) fn handle_read_resource(&mut self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: ReadResourceParams = parse_params(params)?;
        if params.uri != STRUCTURE_URI {
            return Err(RpcError::invalid_params(format!(
                "Unknown resource: {}",
                params.uri
            )));
        }
        let reply = ToolReply::from(self.toolbox.project_structure(&self.session));
        Ok(to_value(&ReadResourceResult {
            contents: vec![ResourceContents {
                uri: params.uri,
                mime_type: "text/plain".to_string(),
                text: reply.text,
            }],
        }))
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, RpcError> {
    let value = params.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(value).map_err(RpcError::invalid_params)
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        tracing::error!("failed to serialize MCP result: {err}");
        Value::Null
    })
}
