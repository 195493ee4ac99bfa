//! Read-only access to TIA Portal engineering projects.
//!
//! The [`Automation`], [`Portal`] and [`Project`] traits are the seam to the
//! engineering environment. Every method takes the [`CancelToken`] of the
//! guarded call it runs under and must observe it at its blocking points.
//!
//! The native Openness client only exists on Windows and is not part of this
//! crate; [`ExportAutomation`] serves projects from JSON snapshots instead.

mod automation;
mod error;
mod export;
mod model;

pub use automation::{Automation, Portal, Project};
pub use error::{PortalError, PortalResult};
pub use export::{
    BlockSnapshot, DeviceSnapshot, ExportAutomation, ExportSettings, NetworkSnapshot,
    PlcSnapshot, ProjectSnapshot,
};
pub use model::{BlockInfo, Device, Language, Network, PlcInfo, ProjectLocation, BLOCK_FOLDERS};
pub use tia_watchdog::CancelToken;
