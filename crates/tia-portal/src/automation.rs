//! Engineering environment traits.

use tia_watchdog::CancelToken;

use crate::error::PortalResult;
use crate::model::{BlockInfo, Device, Network, ProjectLocation};

/// Entry point to the engineering environment.
pub trait Automation: Send {
    /// Load client configuration. Failures here are not fatal to connecting.
    fn load_config(&mut self, cancel: &CancelToken) -> PortalResult<()>;
    fn connect(&mut self, cancel: &CancelToken) -> PortalResult<Box<dyn Portal>>;
}

/// A live connection to a portal instance.
pub trait Portal: Send {
    fn open_project(
        &mut self,
        location: &ProjectLocation,
        cancel: &CancelToken,
    ) -> PortalResult<Box<dyn Project>>;

    /// Release the connection. Projects opened through it become unusable.
    fn dispose(&mut self, cancel: &CancelToken) -> PortalResult<()>;
}

/// An open engineering project. Read-only.
pub trait Project: Send {
    fn name(&self) -> &str;
    fn devices(&self, cancel: &CancelToken) -> PortalResult<Vec<Device>>;
    fn blocks_folder(
        &self,
        plc: &str,
        folder: &str,
        cancel: &CancelToken,
    ) -> PortalResult<Vec<BlockInfo>>;
    /// Every block of the PLC, subfolders included.
    fn all_blocks(&self, plc: &str, cancel: &CancelToken) -> PortalResult<Vec<BlockInfo>>;
    fn block_code(&self, plc: &str, block: &str, cancel: &CancelToken) -> PortalResult<String>;
    fn block_networks(
        &self,
        plc: &str,
        block: &str,
        cancel: &CancelToken,
    ) -> PortalResult<Vec<Network>>;
}
