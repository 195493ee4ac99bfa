use std::fmt::Write as _;

use smol_str::SmolStr;
use tia_portal::{Language, Network};
use tracing::{info, warn};

use super::{find_block, find_plc, settle, ToolResult, Toolbox};
use crate::error::ToolError;
use crate::session::Session;

const UNKNOWN_LANGUAGE: &str = "Unknown";

impl Toolbox {
    /// Source of one block: SCL as text, LAD as a network summary.
    pub fn read_block_code(&self, session: &Session, plc_name: &str, block_name: &str) -> ToolResult {
        let project = session.project().ok_or(ToolError::NoProjectOpen)?;
        info!("Attempting to read code for block '{block_name}' in PLC '{plc_name}'");

        let found = settle(
            self.supervisor.guarded_call(
                &format!("Finding PLC '{plc_name}'"),
                self.timeouts.find_plc,
                |token| find_plc(project, plc_name, token),
            ),
            "Error retrieving block code",
        )?;
        if !found {
            return Err(ToolError::PlcNotFound(SmolStr::new(plc_name)));
        }

        let block = settle(
            self.supervisor.guarded_call(
                &format!("Finding block '{block_name}'"),
                self.timeouts.find_block,
                |token| find_block(project, plc_name, block_name, token),
            ),
            "Error retrieving block code",
        )?
        .ok_or_else(|| ToolError::BlockNotFound {
            plc: SmolStr::new(plc_name),
            block: SmolStr::new(block_name),
        })?;

        match block.language {
            Some(Language::Scl) => {
                info!("Reading SCL code for block '{block_name}'");
                let code = settle(
                    self.supervisor.guarded_call(
                        &format!("SCL code retrieval for block '{block_name}'"),
                        self.timeouts.read_code,
                        |token| project.block_code(plc_name, block_name, token),
                    ),
                    &format!("Unable to get code for SCL block '{block_name}'"),
                )?;
                Ok(format!("SCL Block {block_name}:\n\n{code}"))
            }
            Some(Language::Lad) => {
                info!("Reading LAD networks for block '{block_name}'");
                let networks = settle(
                    self.supervisor.guarded_call(
                        &format!("LAD network retrieval for block '{block_name}'"),
                        self.timeouts.read_code,
                        |token| project.block_networks(plc_name, block_name, token),
                    ),
                    &format!("Unable to get network information for LAD block '{block_name}'"),
                )?;
                Ok(format_networks(block_name, &networks))
            }
            other => {
                let language = other
                    .as_ref()
                    .map_or(UNKNOWN_LANGUAGE, Language::as_str);
                info!("Block '{block_name}' has unsupported language: {language}");
                Ok(format!(
                    "Block '{block_name}' has language '{language}' - detailed viewing not supported, but may still be readable"
                ))
            }
        }
    }
}

fn format_networks(block_name: &str, networks: &[Network]) -> String {
    let mut text = format!("LAD Block {block_name}:\n\n");
    for (index, network) in networks.iter().enumerate() {
        let _ = writeln!(text, "Network {}: {}", index + 1, network.title);
        let _ = writeln!(text, "Description: {}", network.comment);
        match &network.elements {
            Some(elements) => {
                let names: Vec<&str> = elements.iter().map(SmolStr::as_str).collect();
                let _ = write!(text, "Elements: {}\n\n", names.join(", "));
            }
            None => {
                warn!("Error getting element names for network {}", index + 1);
                text.push_str("Elements: [Unable to retrieve element names]\n\n");
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn networks_render_one_entry_each() {
        let networks = vec![
            Network {
                title: "Start".to_string(),
                comment: "Latch motor".to_string(),
                elements: Some(vec!["Start".into(), "Stop".into()]),
            },
            Network {
                title: "Alarm".to_string(),
                comment: "Horn".to_string(),
                elements: None,
            },
        ];
        expect![[r#"
            LAD Block Motor:

            Network 1: Start
            Description: Latch motor
            Elements: Start, Stop

            Network 2: Alarm
            Description: Horn
            Elements: [Unable to retrieve element names]

        "#]]
        .assert_eq(&format_networks("Motor", &networks));
    }
}
