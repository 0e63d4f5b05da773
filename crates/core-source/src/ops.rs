//! File-operation request types handed from the pane to the host.
//!
//! The pane only *constructs* these; execution (progress UI, conflict
//! dialogs, recycle bin) belongs to the host shell and the plugin.

use bitflags::bitflags;
use std::path::PathBuf;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileOperationFlags: u32 {
        const RECURSIVE              = 0x01;
        const USE_RECYCLE_BIN        = 0x02;
        const ALLOW_OVERWRITE        = 0x04;
        const ALLOW_REPLACE_READONLY = 0x08;
        const CONTINUE_ON_ERROR      = 0x10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperationKind {
    Copy,
    Move,
    Delete,
    Rename,
}

#[derive(Debug, Clone)]
pub struct FileOperationRequest {
    pub kind: FileOperationKind,
    pub sources: Vec<PathBuf>,
    /// Destination directory for copy/move; new leaf name for rename
    /// (carried in `new_name`); unused for delete.
    pub destination: Option<PathBuf>,
    pub new_name: Option<String>,
    pub flags: FileOperationFlags,
}

impl FileOperationRequest {
    pub fn delete(sources: Vec<PathBuf>, flags: FileOperationFlags) -> Self {
        Self {
            kind: FileOperationKind::Delete,
            sources,
            destination: None,
            new_name: None,
            flags,
        }
    }

    pub fn copy(sources: Vec<PathBuf>, destination: PathBuf, flags: FileOperationFlags) -> Self {
        Self {
            kind: FileOperationKind::Copy,
            sources,
            destination: Some(destination),
            new_name: None,
            flags,
        }
    }

    pub fn move_to(sources: Vec<PathBuf>, destination: PathBuf, flags: FileOperationFlags) -> Self {
        Self {
            kind: FileOperationKind::Move,
            sources,
            destination: Some(destination),
            new_name: None,
            flags,
        }
    }

    pub fn rename(source: PathBuf, new_name: String, flags: FileOperationFlags) -> Self {
        Self {
            kind: FileOperationKind::Rename,
            sources: vec![source],
            destination: None,
            new_name: Some(new_name),
            flags,
        }
    }
}
