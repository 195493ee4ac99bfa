//! JSON project snapshot format.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tia_watchdog::CancelToken;

use crate::error::{PortalError, PortalResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    #[serde(default)]
    pub devices: Vec<DeviceSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub name: String,
    #[serde(alias = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plc: Option<PlcSnapshot>,
}

/// PLC software: block folders in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlcSnapshot {
    pub name: String,
    #[serde(default)]
    pub folders: IndexMap<String, Vec<BlockSnapshot>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<NetworkSnapshot>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<String>>,
}

impl ProjectSnapshot {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse a snapshot file. The read runs on a detached helper
    /// so a stalled file (FIFO, hung network share) cannot outlive `cancel`.
    pub fn load(path: &Path, cancel: &CancelToken) -> PortalResult<Self> {
        let owned = path.to_path_buf();
        let text = cancel
            .wait_detached(move || std::fs::read_to_string(owned))?
            .map_err(|source| PortalError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text).map_err(|err| PortalError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub(crate) fn plc(&self, name: &str) -> Option<&PlcSnapshot> {
        self.devices
            .iter()
            .filter_map(|device| device.plc.as_ref())
            .find(|plc| plc.name == name)
    }
}

impl PlcSnapshot {
    pub(crate) fn blocks(&self) -> impl Iterator<Item = &BlockSnapshot> {
        self.folders.values().flatten()
    }

    pub(crate) fn block(&self, name: &str) -> Option<&BlockSnapshot> {
        self.blocks().find(|block| block.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_folder_order_and_defaults() {
        let snapshot = ProjectSnapshot::parse(
            r#"{
                "name": "Plant",
                "devices": [
                    {"name": "HMI_1", "type": "KTP700"},
                    {"name": "S71500", "type_name": "CPU 1516-3 PN/DP", "plc": {
                        "name": "PLC_1",
                        "folders": {
                            "System blocks": [{"name": "Diag", "type": "FB"}],
                            "Program blocks": [{"name": "Main", "type": "OB", "language": "SCL", "code": "x := 1;"}]
                        }
                    }}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.devices[0].type_name, "KTP700");
        assert!(snapshot.devices[0].plc.is_none());
        let plc = snapshot.plc("PLC_1").unwrap();
        let folders: Vec<_> = plc.folders.keys().map(String::as_str).collect();
        assert_eq!(folders, ["System blocks", "Program blocks"]);
        assert_eq!(plc.block("Main").unwrap().code.as_deref(), Some("x := 1;"));
        assert!(plc.block("Diag").unwrap().language.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ProjectSnapshot::load(
            Path::new("/definitely/not/here.json"),
            &CancelToken::unguarded(),
        )
        .unwrap_err();
        assert!(matches!(err, PortalError::Io { .. }));
    }
}
