//! `tia://project/structure` resource text.

use tia_portal::{CancelToken, Device, PortalError, PortalResult, Project, BLOCK_FOLDERS};
use tia_watchdog::Outcome;
use tracing::{info, warn};

use super::{ToolResult, Toolbox};
use crate::error::ToolError;
use crate::session::Session;

impl Toolbox {
    /// Project, devices, PLCs and their block folders. On timeout the
    /// devices described so far are kept.
    pub fn project_structure(&self, session: &Session) -> ToolResult {
        let project = session.project().ok_or(ToolError::NoProjectOpen)?;
        info!("Building project structure overview");

        let mut lines = vec![format!("Project: {}", project.name())];
        let outcome = self.supervisor.guarded_call(
            "Getting devices",
            self.timeouts.structure,
            |token| -> PortalResult<()> {
                for device in project.devices(token)? {
                    let section = describe_device(project, &device, self.block_limit, token)?;
                    lines.push(section);
                }
                Ok(())
            },
        );

        match outcome {
            Outcome::Success(()) => Ok(lines.join("\n")),
            Outcome::TimedOut(expired) => Err(ToolError::Partial {
                expired,
                partial: lines.join("\n"),
            }),
            Outcome::Failed(err) => Err(ToolError::native("Error building project structure", err)),
        }
    }
}

/// One device section. Folders that cannot be opened are skipped.
fn describe_device(
    project: &dyn Project,
    device: &Device,
    block_limit: usize,
    cancel: &CancelToken,
) -> PortalResult<String> {
    let mut lines = vec![format!("Device: {} ({})", device.name, device.type_name)];
    let Some(plc) = &device.plc else {
        return Ok(lines.join("\n"));
    };
    lines.push(format!("  PLC: {}", plc.name));

    for folder in BLOCK_FOLDERS {
        let blocks = match project.blocks_folder(&plc.name, folder, cancel) {
            Ok(blocks) => blocks,
            Err(err) if err.is_interruption() => return Err(err),
            Err(err) => {
                log_folder_error(folder, &err);
                continue;
            }
        };
        lines.push(format!("    {folder}:"));
        for (index, block) in blocks.iter().enumerate() {
            if index == block_limit {
                lines.push(format!(
                    "      ... and {} more blocks",
                    blocks.len() - block_limit
                ));
                break;
            }
            match &block.language {
                Some(language) => {
                    lines.push(format!("      {} ({}): {language}", block.name, block.kind));
                }
                None => warn!("Error getting block info: no language for '{}'", block.name),
            }
        }
    }
    Ok(lines.join("\n"))
}

fn log_folder_error(folder: &str, err: &PortalError) {
    match err {
        PortalError::FolderNotFound(_) => info!("Folder {folder} not present"),
        _ => warn!("Error accessing folder {folder}: {err}"),
    }
}
