//! Tool handlers.
//! - connection: connect_to_tia/open_project/reconnect
//! - listing: get_plc_list/list_blocks
//! - code: read_block_code
//! - structure: tia://project/structure resource
//!
//! Handlers return `Result<String, ToolError>`; [`ToolReply`] turns both arms
//! into client text.

mod code;
mod connection;
mod listing;
mod structure;

use tia_portal::{BlockInfo, CancelToken, PortalError, PortalResult, Project, BLOCK_FOLDERS};
use tia_watchdog::{Outcome, Supervisor};
use tracing::warn;

use crate::config::{ReaderConfig, Timeouts};
use crate::error::ToolError;

pub type ToolResult = Result<String, ToolError>;

/// Text handed back to the client for one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl From<ToolResult> for ToolReply {
    fn from(result: ToolResult) -> Self {
        match result {
            Ok(text) => Self {
                text,
                is_error: false,
            },
            Err(err) => Self {
                text: err.to_string(),
                is_error: true,
            },
        }
    }
}

/// Runs tool handlers against a [`crate::Session`] under configured deadlines.
#[derive(Debug)]
pub struct Toolbox {
    supervisor: Supervisor,
    timeouts: Timeouts,
    block_limit: usize,
}

impl Toolbox {
    #[must_use]
    pub fn new(timeouts: Timeouts, block_limit: usize) -> Self {
        Self {
            supervisor: Supervisor::new(),
            timeouts,
            block_limit,
        }
    }

    #[must_use]
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.timeouts, config.structure.block_limit)
    }
}

/// Collapse a guarded call into a handler result. `context` prefixes the
/// failure cause.
fn settle<T>(outcome: Outcome<T, PortalError>, context: &str) -> Result<T, ToolError> {
    match outcome {
        Outcome::Success(value) => Ok(value),
        Outcome::TimedOut(expired) => Err(ToolError::TimedOut(expired)),
        Outcome::Failed(err) => Err(ToolError::native(context, err)),
    }
}

/// Whether some device carries a PLC called `name`. Device lookup failures
/// count as "not found"; only cancellation propagates.
fn find_plc(project: &dyn Project, name: &str, cancel: &CancelToken) -> PortalResult<bool> {
    let devices = match project.devices(cancel) {
        Ok(devices) => devices,
        Err(err) if err.is_interruption() => return Err(err),
        Err(err) => {
            warn!("Error finding PLC: {err}");
            return Ok(false);
        }
    };
    let found = devices
        .iter()
        .filter_map(|device| device.plc.as_ref())
        .any(|plc| plc.name == name);
    if !found {
        warn!("PLC '{name}' not found in project");
    }
    Ok(found)
}

/// First block called `block` in the standard folders, searched in order.
/// Folders that cannot be opened are skipped.
fn find_block(
    project: &dyn Project,
    plc: &str,
    block: &str,
    cancel: &CancelToken,
) -> PortalResult<Option<BlockInfo>> {
    for folder in BLOCK_FOLDERS {
        match project.blocks_folder(plc, folder, cancel) {
            Ok(blocks) => {
                if let Some(found) = blocks.into_iter().find(|info| info.name == block) {
                    return Ok(Some(found));
                }
            }
            Err(err) if err.is_interruption() => return Err(err),
            Err(err) => warn!("Error accessing folder {folder}: {err}"),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tia_portal::{Device, Network, PlcInfo};

    struct FlakyProject;

    impl Project for FlakyProject {
        fn name(&self) -> &str {
            "Flaky"
        }
        fn devices(&self, _: &CancelToken) -> PortalResult<Vec<Device>> {
            Ok(vec![Device {
                name: "S71500".into(),
                type_name: "CPU 1516".into(),
                plc: Some(PlcInfo {
                    name: "PLC_1".into(),
                }),
            }])
        }
        fn blocks_folder(
            &self,
            _: &str,
            folder: &str,
            _: &CancelToken,
        ) -> PortalResult<Vec<BlockInfo>> {
            match folder {
                "Program blocks" => Err(PortalError::Rejected("folder locked".into())),
                "System blocks" => Ok(vec![BlockInfo {
                    name: "Diag".into(),
                    kind: "FC".into(),
                    language: None,
                }]),
                _ => Err(PortalError::FolderNotFound(folder.into())),
            }
        }
        fn all_blocks(&self, _: &str, _: &CancelToken) -> PortalResult<Vec<BlockInfo>> {
            Ok(Vec::new())
        }
        fn block_code(&self, _: &str, _: &str, _: &CancelToken) -> PortalResult<String> {
            Ok(String::new())
        }
        fn block_networks(&self, _: &str, _: &str, _: &CancelToken) -> PortalResult<Vec<Network>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn find_block_skips_unreadable_folders() {
        let token = CancelToken::unguarded();
        let found = find_block(&FlakyProject, "PLC_1", "Diag", &token).unwrap();
        assert_eq!(found.map(|info| info.kind), Some("FC".into()));
        assert!(find_block(&FlakyProject, "PLC_1", "Main", &token)
            .unwrap()
            .is_none());
    }

    #[test]
    fn find_plc_matches_plc_name_not_device_name() {
        let token = CancelToken::unguarded();
        assert!(find_plc(&FlakyProject, "PLC_1", &token).unwrap());
        assert!(!find_plc(&FlakyProject, "S71500", &token).unwrap());
    }

    #[test]
    fn reply_marks_errors() {
        let reply = ToolReply::from(Err(ToolError::NoProjectOpen));
        assert!(reply.is_error);
        assert_eq!(reply.text, "No project is currently open");
        let reply = ToolReply::from(Ok("fine".to_string()));
        assert!(!reply.is_error);
    }
}
