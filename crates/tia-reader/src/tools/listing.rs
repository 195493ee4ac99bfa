use smol_str::SmolStr;
use tracing::{info, warn};

use super::{find_plc, settle, ToolResult, Toolbox};
use crate::error::ToolError;
use crate::session::Session;

impl Toolbox {
    pub fn plc_list(&self, session: &Session) -> ToolResult {
        let project = session.project().ok_or(ToolError::NoProjectOpen)?;
        info!("Getting list of PLCs in the project");

        let devices = settle(
            self.supervisor.guarded_call(
                "Getting devices",
                self.timeouts.list_devices,
                |token| project.devices(token),
            ),
            "Error getting PLC list",
        )?;
        let plcs: Vec<_> = devices
            .into_iter()
            .filter_map(|device| device.plc)
            .map(|plc| plc.name)
            .collect();
        if plcs.is_empty() {
            info!("No PLCs found in the project");
            return Ok("No PLCs found in the project".to_string());
        }

        info!("Found {} PLCs in the project", plcs.len());
        let mut lines = vec!["PLCs in the project:".to_string()];
        lines.extend(plcs.iter().map(|name| format!("- {name}")));
        Ok(lines.join("\n"))
    }

    pub fn list_blocks(&self, session: &Session, plc_name: &str) -> ToolResult {
        let project = session.project().ok_or(ToolError::NoProjectOpen)?;

        let found = settle(
            self.supervisor.guarded_call(
                &format!("Finding PLC '{plc_name}'"),
                self.timeouts.find_plc,
                |token| find_plc(project, plc_name, token),
            ),
            "Error listing blocks",
        )?;
        if !found {
            return Err(ToolError::PlcNotFound(SmolStr::new(plc_name)));
        }

        let blocks = settle(
            self.supervisor.guarded_call(
                &format!("Getting blocks for PLC '{plc_name}'"),
                self.timeouts.list_blocks,
                |token| project.all_blocks(plc_name, token),
            ),
            "Error getting blocks",
        )?;

        let mut lines = vec![format!("Blocks in PLC '{plc_name}':\n")];
        for block in &blocks {
            match &block.language {
                Some(language) => lines.push(format!("{} ({}): {language}", block.name, block.kind)),
                None => {
                    warn!("Error getting block info: no language for '{}'", block.name);
                    lines.push(format!("{}: Unknown language", block.name));
                }
            }
        }
        info!("Found {} blocks in PLC '{plc_name}'", blocks.len());
        Ok(lines.join("\n"))
    }
}
