//! The folder-view pane facade.
//!
//! [`FolderPane`] owns one folder listing end to end: the model, layout,
//! renderer, overlay, input state, and the background worker. The host
//! shell drives it with events (keys, mouse, timers, paint) and receives
//! everything outward through [`PaneCallbacks`]. The pane holds no
//! reference to the host beyond that callback box, so the host/pane
//! relationship stays acyclic.
//!
//! Threading: every method on `FolderPane` is UI-thread-only. The worker
//! communicates exclusively through the message channel drained by
//! [`FolderPane::pump_messages`].

mod icon_flow;
mod pane;

pub use icon_flow::build_icon_groups;
pub use pane::{FolderPane, PaneDeps, PaneTickOutcome};

use core_model::SelectionStats;
use core_source::{FileOperationRequest, SourceError};
use std::path::Path;

/// Host-bound navigation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    SwitchPane,
}

/// Request to open a file in the host's viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFileRequest {
    pub path: std::path::PathBuf,
}

/// Everything the pane reports outward. Default impls are no-ops so hosts
/// implement only what they care about.
pub trait PaneCallbacks {
    fn path_changed(&mut self, _path: Option<&Path>) {}
    fn selection_changed(&mut self, _stats: &SelectionStats) {}
    fn incremental_search_changed(&mut self) {}
    fn enumeration_completed(&mut self, _folder: &Path) {}
    fn navigation_request(&mut self, _request: NavigationRequest) {}
    fn navigate_up_from_root_request(&mut self) {}
    /// Return true when the host opened the file.
    fn open_file_request(&mut self, _path: &Path) -> bool {
        false
    }
    fn file_operation_request(&mut self, _request: &FileOperationRequest) -> Result<(), SourceError> {
        Ok(())
    }
    fn properties_request(&mut self, _path: &Path) -> Result<(), SourceError> {
        Ok(())
    }
    fn view_file_request(&mut self, _request: &ViewFileRequest) -> bool {
        false
    }
}

/// No-op callbacks for tests and headless use.
#[derive(Debug, Default)]
pub struct NoopCallbacks;

impl PaneCallbacks for NoopCallbacks {}
