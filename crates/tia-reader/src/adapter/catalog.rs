//! Tool and resource descriptors.

use serde_json::{json, Value};

use crate::protocol::{ResourceDescriptor, ToolDescriptor};

pub const STRUCTURE_URI: &str = "tia://project/structure";

/// Tool names in `tools/list` order.
pub const TOOL_NAMES: [&str; 6] = [
    "connect_to_tia",
    "open_project",
    "get_plc_list",
    "list_blocks",
    "read_block_code",
    "reconnect",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ToolName {
    ConnectToTia,
    OpenProject,
    GetPlcList,
    ListBlocks,
    ReadBlockCode,
    Reconnect,
}

impl ToolName {
    pub(super) fn parse(name: &str) -> Option<Self> {
        match name {
            "connect_to_tia" => Some(Self::ConnectToTia),
            "open_project" => Some(Self::OpenProject),
            "get_plc_list" => Some(Self::GetPlcList),
            "list_blocks" => Some(Self::ListBlocks),
            "read_block_code" => Some(Self::ReadBlockCode),
            "reconnect" => Some(Self::Reconnect),
            _ => None,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::ConnectToTia => "Connect to TIA Portal.",
            Self::OpenProject => {
                "Open a TIA Portal project from a .ap[1-9][0-9] project file or project directory."
            }
            Self::GetPlcList => "Get the list of all PLCs in the current project.",
            Self::ListBlocks => "List all available blocks in a PLC with their types and languages.",
            Self::ReadBlockCode => {
                "Read the code from a specific block (SCL or LAD) in a PLC."
            }
            Self::Reconnect => "Force reconnection to TIA Portal.",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::ConnectToTia | Self::GetPlcList | Self::Reconnect => object_schema(&[]),
            Self::OpenProject => object_schema(&[(
                "project_path",
                "Path to .ap[1-9][0-9] project file or project directory",
            )]),
            Self::ListBlocks => object_schema(&[("plc_name", "Name of the PLC")]),
            Self::ReadBlockCode => object_schema(&[
                ("plc_name", "Name of the PLC"),
                ("block_name", "Name of the block to analyze"),
            ]),
        }
    }
}

fn object_schema(properties: &[(&str, &str)]) -> Value {
    let props: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, description)| {
            (
                (*name).to_string(),
                json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

pub(super) fn tool_descriptors() -> Vec<ToolDescriptor> {
    TOOL_NAMES
        .iter()
        .filter_map(|name| ToolName::parse(name).map(|tool| (name, tool)))
        .map(|(name, tool)| ToolDescriptor {
            name: (*name).to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        })
        .collect()
}

pub(super) fn resource_descriptors() -> Vec<ResourceDescriptor> {
    vec![ResourceDescriptor {
        uri: STRUCTURE_URI.to_string(),
        name: "project_structure".to_string(),
        description: "Structure of the currently opened TIA project.".to_string(),
        mime_type: "text/plain".to_string(),
    }]
}
