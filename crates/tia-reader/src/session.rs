//! Connection and project state owned by the dispatcher.

use tia_portal::{Automation, Portal, Project};
use tracing::debug;

/// At most one portal connection and at most one open project.
///
/// A project is only ever held alongside the connection it was opened
/// through; replacing or dropping the connection drops the project too.
pub struct Session {
    automation: Box<dyn Automation>,
    portal: Option<Box<dyn Portal>>,
    project: Option<Box<dyn Project>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.is_connected())
            .field("project", &self.project.as_ref().map(|project| project.name()))
            .finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(automation: impl Automation + 'static) -> Self {
        Self {
            automation: Box::new(automation),
            portal: None,
            project: None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.portal.is_some()
    }

    #[must_use]
    pub fn has_project(&self) -> bool {
        self.project.is_some()
    }

    pub(crate) fn automation_mut(&mut self) -> &mut dyn Automation {
        self.automation.as_mut()
    }

    pub(crate) fn portal_mut(&mut self) -> Option<&mut (dyn Portal + 'static)> {
        self.portal.as_deref_mut()
    }

    pub(crate) fn project(&self) -> Option<&dyn Project> {
        self.project.as_deref()
    }

    /// Install a fresh connection. Any open project belonged to the old one
    /// and is dropped.
    pub(crate) fn attach_portal(&mut self, portal: Box<dyn Portal>) {
        if self.project.take().is_some() {
            debug!("dropping open project with replaced connection");
        }
        self.portal = Some(portal);
    }

    /// Keep `project` as the open project. Returns it back when there is no
    /// connection to hold it.
    pub(crate) fn attach_project(
        &mut self,
        project: Box<dyn Project>,
    ) -> Result<(), Box<dyn Project>> {
        if self.portal.is_none() {
            return Err(project);
        }
        self.project = Some(project);
        Ok(())
    }

    /// Detach the connection, dropping the open project with it.
    pub(crate) fn take_portal(&mut self) -> Option<Box<dyn Portal>> {
        self.project = None;
        self.portal.take()
    }

    pub fn clear(&mut self) {
        self.project = None;
        self.portal = None;
    }
}
