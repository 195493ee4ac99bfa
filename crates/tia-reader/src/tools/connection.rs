//! connect_to_tia, open_project and reconnect.

use std::path::Path;

use tia_portal::ProjectLocation;
use tia_watchdog::Outcome;
use tracing::{info, warn};

use super::{settle, ToolResult, Toolbox};
use crate::error::ToolError;
use crate::session::Session;

impl Toolbox {
    /// Load the client configuration, then create a portal connection.
    pub fn connect(&self, session: &mut Session) -> ToolResult {
        let automation = session.automation_mut();
        match self.supervisor.guarded_call(
            "TIA config loading",
            self.timeouts.config_load,
            |token| automation.load_config(token),
        ) {
            Outcome::Success(()) => info!("TIA Portal configuration loaded"),
            Outcome::TimedOut(expired) => return Err(expired.into()),
            Outcome::Failed(err) => warn!("Error loading TIA config: {err}"),
        }

        let portal = settle(
            self.supervisor.guarded_call(
                "TIA Portal client creation",
                self.timeouts.connect,
                |token| automation.connect(token),
            ),
            "Failed to connect to TIA Portal",
        )?;
        session.attach_portal(portal);
        info!("TIA Portal client created successfully");
        Ok("Successfully connected to TIA Portal instance".to_string())
    }

    /// Open `project_path`, connecting first when needed. The path is tried
    /// as given, then as directory plus project name.
    pub fn open_project(&self, session: &mut Session, project_path: &str) -> ToolResult {
        if !session.is_connected() {
            match self.connect(session) {
                Ok(text) => info!("Auto-connect result: {text}"),
                Err(err) => {
                    warn!("Auto-connect failed: {err}");
                    return Err(ToolError::NotConnected);
                }
            }
        }
        let portal = session.portal_mut().ok_or(ToolError::NotConnected)?;

        let path = Path::new(project_path);
        let primary = ProjectLocation::file(path);
        let fallback = ProjectLocation::fallback(path);
        info!("Attempting to open project: {fallback}");

        let (project, location) = match self.supervisor.guarded_call(
            "Project opening",
            self.timeouts.open_project,
            |token| portal.open_project(&primary, token),
        ) {
            Outcome::Success(project) => (project, primary),
            Outcome::TimedOut(expired) => return Err(expired.into()),
            Outcome::Failed(err) => {
                warn!("Opening {primary} failed, retrying as {fallback}: {err}");
                let project = settle(
                    self.supervisor.guarded_call(
                        "Project opening",
                        self.timeouts.open_project,
                        |token| portal.open_project(&fallback, token),
                    ),
                    "Failed to open project",
                )?;
                (project, fallback)
            }
        };

        session
            .attach_project(project)
            .map_err(|_| ToolError::NotConnected)?;
        info!("Project opened from {location}");
        Ok(format!(
            "Successfully opened project: {}",
            location.display_name()
        ))
    }

    /// Dispose the current connection (best effort) and connect again.
    pub fn reconnect(&self, session: &mut Session) -> ToolResult {
        info!("Attempting to reconnect to TIA Portal");
        if let Some(mut portal) = session.take_portal() {
            match self.supervisor.guarded_call(
                "Portal dispose",
                self.timeouts.dispose,
                |token| portal.dispose(token),
            ) {
                Outcome::Success(()) => info!("Disposed existing portal connection"),
                Outcome::TimedOut(expired) => warn!("{expired}"),
                Outcome::Failed(err) => warn!("Error disposing portal: {err}"),
            }
        }
        session.clear();
        self.connect(session)
    }
}
