//! Snapshot-backed automation backend.
//! - ExportAutomation: connect/config entry point
//! - ExportPortal: opens snapshot files, dispose invalidates projects
//! - ExportProject: answers queries from the loaded snapshot
//! - snapshot: serde model of the JSON file

mod snapshot;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use smol_str::SmolStr;
use tia_watchdog::CancelToken;
use tracing::{debug, info};

use crate::automation::{Automation, Portal, Project};
use crate::error::{PortalError, PortalResult};
use crate::model::{BlockInfo, Device, Language, Network, PlcInfo, ProjectLocation};

pub use snapshot::{BlockSnapshot, DeviceSnapshot, NetworkSnapshot, PlcSnapshot, ProjectSnapshot};

const SNAPSHOT_EXTENSION: &str = "json";

#[derive(Debug, Clone, Default)]
pub struct ExportSettings {
    /// Simulated round-trip time of every engineering call.
    pub latency: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ExportAutomation {
    settings: ExportSettings,
}

impl ExportAutomation {
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }
}

impl Automation for ExportAutomation {
    fn load_config(&mut self, cancel: &CancelToken) -> PortalResult<()> {
        cancel.sleep(self.settings.latency)?;
        debug!("export backend needs no client configuration");
        Ok(())
    }

    fn connect(&mut self, cancel: &CancelToken) -> PortalResult<Box<dyn Portal>> {
        cancel.sleep(self.settings.latency)?;
        Ok(Box::new(ExportPortal {
            settings: self.settings.clone(),
            disposed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

#[derive(Debug)]
struct ExportPortal {
    settings: ExportSettings,
    disposed: Arc<AtomicBool>,
}

impl Portal for ExportPortal {
    fn open_project(
        &mut self,
        location: &ProjectLocation,
        cancel: &CancelToken,
    ) -> PortalResult<Box<dyn Project>> {
        round_trip(&self.disposed, &self.settings, cancel)?;
        let path = snapshot_path(location);
        let snapshot = ProjectSnapshot::load(&path, cancel)?;
        info!("loaded project snapshot '{}' from {}", snapshot.name, path.display());
        Ok(Box::new(ExportProject {
            snapshot,
            settings: self.settings.clone(),
            disposed: Arc::clone(&self.disposed),
        }))
    }

    fn dispose(&mut self, cancel: &CancelToken) -> PortalResult<()> {
        cancel.sleep(self.settings.latency)?;
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn round_trip(
    disposed: &AtomicBool,
    settings: &ExportSettings,
    cancel: &CancelToken,
) -> PortalResult<()> {
    if disposed.load(Ordering::SeqCst) {
        return Err(PortalError::Disposed);
    }
    cancel.sleep(settings.latency)?;
    Ok(())
}

fn snapshot_path(location: &ProjectLocation) -> PathBuf {
    match location {
        ProjectLocation::File(path) if path.is_dir() => {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            path.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
        }
        ProjectLocation::File(path) => path.clone(),
        ProjectLocation::Directory { dir, name } => {
            dir.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
        }
    }
}

#[derive(Debug)]
struct ExportProject {
    snapshot: ProjectSnapshot,
    settings: ExportSettings,
    disposed: Arc<AtomicBool>,
}

impl ExportProject {
    fn round_trip(&self, cancel: &CancelToken) -> PortalResult<()> {
        round_trip(&self.disposed, &self.settings, cancel)
    }

    fn plc(&self, name: &str) -> PortalResult<&PlcSnapshot> {
        self.snapshot
            .plc(name)
            .ok_or_else(|| PortalError::not_found("PLC", name))
    }

    fn block(&self, plc: &str, block: &str) -> PortalResult<&BlockSnapshot> {
        self.plc(plc)?
            .block(block)
            .ok_or_else(|| PortalError::not_found("block", block))
    }
}

impl Project for ExportProject {
    fn name(&self) -> &str {
        &self.snapshot.name
    }

    fn devices(&self, cancel: &CancelToken) -> PortalResult<Vec<Device>> {
        self.round_trip(cancel)?;
        Ok(self
            .snapshot
            .devices
            .iter()
            .map(|device| Device {
                name: SmolStr::new(&device.name),
                type_name: SmolStr::new(&device.type_name),
                plc: device.plc.as_ref().map(|plc| PlcInfo {
                    name: SmolStr::new(&plc.name),
                }),
            })
            .collect())
    }

    fn blocks_folder(
        &self,
        plc: &str,
        folder: &str,
        cancel: &CancelToken,
    ) -> PortalResult<Vec<BlockInfo>> {
        self.round_trip(cancel)?;
        let blocks = self
            .plc(plc)?
            .folders
            .get(folder)
            .ok_or_else(|| PortalError::FolderNotFound(SmolStr::new(folder)))?;
        Ok(blocks.iter().map(block_info).collect())
    }

    fn all_blocks(&self, plc: &str, cancel: &CancelToken) -> PortalResult<Vec<BlockInfo>> {
        self.round_trip(cancel)?;
        Ok(self.plc(plc)?.blocks().map(block_info).collect())
    }

    fn block_code(&self, plc: &str, block: &str, cancel: &CancelToken) -> PortalResult<String> {
        self.round_trip(cancel)?;
        self.block(plc, block)?.code.clone().ok_or_else(|| {
            PortalError::Unsupported(SmolStr::new(format!(
                "block '{block}' has no textual source"
            )))
        })
    }

    fn block_networks(
        &self,
        plc: &str,
        block: &str,
        cancel: &CancelToken,
    ) -> PortalResult<Vec<Network>> {
        self.round_trip(cancel)?;
        let networks = self.block(plc, block)?.networks.as_ref().ok_or_else(|| {
            PortalError::Unsupported(SmolStr::new(format!("block '{block}' has no networks")))
        })?;
        Ok(networks
            .iter()
            .map(|network| Network {
                title: network.title.clone(),
                comment: network.comment.clone(),
                elements: network
                    .elements
                    .as_ref()
                    .map(|elements| elements.iter().map(SmolStr::new).collect()),
            })
            .collect())
    }
}

fn block_info(block: &BlockSnapshot) -> BlockInfo {
    BlockInfo {
        name: SmolStr::new(&block.name),
        kind: SmolStr::new(&block.kind),
        language: block.language.as_deref().map(Language::parse),
    }
}
