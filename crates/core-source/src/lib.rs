//! Filesystem-plugin seam: listing borrow, record iteration, operations.
//!
//! A pane never touches the filesystem directly. It borrows a *listing* from
//! a [`DirectoryListingSource`], walks the plugin's variable-record buffer
//! exactly once to build an arena-backed name table, and hands the resulting
//! [`ArenaListing`] to the enumeration pipeline. Everything downstream holds
//! ranges into the arena rather than owned strings; replacing a listing
//! replaces one `Arc`.
//!
//! Record wire format (little-endian):
//!
//! ```text
//! struct Record {
//!     next_entry_offset: u32,   // 0 terminates the chain
//!     file_attributes:   u32,
//!     last_write_time:   i64,   // platform epoch units
//!     end_of_file:       u64,   // size in bytes
//!     file_name_size:    u16,   // bytes, UTF-16 code units * 2
//!     file_name:         u16[file_name_size / 2],
//! }
//! ```
//!
//! Validation is all-or-nothing: any next pointer or name range escaping the
//! buffer fails the whole walk with [`SourceError::InvalidData`]. A plugin
//! that lies about its buffer does not get partial results.

mod arena;
mod dropdata;
mod ops;
mod properties;
mod records;

pub use arena::{ArenaListing, ArenaString, ListingEntry, NameArena};
pub use dropdata::{DropPayload, decode_drop_payload, encode_drop_payload};
pub use ops::{FileOperationFlags, FileOperationKind, FileOperationRequest};
pub use properties::{ItemProperties, PropertyField, PropertySection, parse_item_properties};
pub use records::{RawRecord, RecordWalker, write_record};

use bitflags::bitflags;
use std::path::{Path, PathBuf};

bitflags! {
    /// Entry attribute bits, matching the plugin wire encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        const READONLY      = 0x0000_0001;
        const HIDDEN        = 0x0000_0002;
        const SYSTEM        = 0x0000_0004;
        const DIRECTORY     = 0x0000_0010;
        const ARCHIVE       = 0x0000_0020;
        const NORMAL        = 0x0000_0080;
        const TEMPORARY     = 0x0000_0100;
        const REPARSE_POINT = 0x0000_0400;
        const COMPRESSED    = 0x0000_0800;
        const OFFLINE       = 0x0000_1000;
        const ENCRYPTED     = 0x0000_4000;
    }
}

impl FileAttributes {
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.contains(FileAttributes::DIRECTORY)
    }
}

/// How a listing borrow may satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowMode {
    /// Serve from the plugin's cache only; fail if nothing is cached.
    CachedOnly,
    /// Serve from cache or enumerate; may block (network backends).
    AllowEnumerate,
    /// Drop any cached listing and enumerate fresh.
    ForceRefresh,
}

/// Failure classes surfaced by listing sources and operations.
///
/// The overlay controller maps these onto its severity taxonomy; the pane
/// itself only distinguishes "retryable presentation problem" from
/// "programmer error" (`InvalidData`, `InvalidArgument`).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("network path unreachable: {0}")]
    Disconnected(String),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("certificate validation failed: {0}")]
    CertificateFailed(String),
    #[error("listing buffer failed validation: {0}")]
    InvalidData(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("operation canceled")]
    Canceled,
    #[error("enumeration failed: {0}")]
    Other(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A borrowed directory listing: a record buffer plus its allocation facts.
///
/// `buffer()` exposes `(data, buffer_size)` where `data.len()` is the
/// allocated size; `buffer_size <= data.len()` is the valid prefix the
/// record chain lives in.
pub trait Listing: Send {
    fn count(&self) -> u32;
    fn buffer(&self) -> (&[u8], usize);
}

/// The capability surface a filesystem plugin exposes to the pane.
///
/// All methods may be called from the enumeration worker thread; `borrow`
/// may block (network shares). Optional operations return
/// `SourceError::InvalidArgument` when unsupported rather than panicking,
/// so hosts can probe capabilities uniformly.
pub trait DirectoryListingSource: Send + Sync {
    /// Stable identifier used in logs and the drag-drop payload.
    fn id(&self) -> &str;

    fn borrow(&self, path: &Path, mode: BorrowMode) -> SourceResult<Box<dyn Listing>>;

    /// True when `path` is this source's storage root (its parent is outside
    /// the source). `Backspace` at the root escalates to the host.
    fn is_storage_root(&self, path: &Path) -> bool;

    fn copy_items(
        &self,
        _sources: &[PathBuf],
        _destination: &Path,
        _flags: FileOperationFlags,
    ) -> SourceResult<()> {
        Err(SourceError::InvalidArgument("copy not supported"))
    }

    fn move_items(
        &self,
        _sources: &[PathBuf],
        _destination: &Path,
        _flags: FileOperationFlags,
    ) -> SourceResult<()> {
        Err(SourceError::InvalidArgument("move not supported"))
    }

    fn delete_items(&self, _targets: &[PathBuf], _flags: FileOperationFlags) -> SourceResult<()> {
        Err(SourceError::InvalidArgument("delete not supported"))
    }

    fn rename_item(
        &self,
        _source: &Path,
        _new_name: &str,
        _flags: FileOperationFlags,
    ) -> SourceResult<()> {
        Err(SourceError::InvalidArgument("rename not supported"))
    }

    /// Optional: UTF-8 JSON describing an item, parsed by
    /// [`parse_item_properties`]. `None` means the source has no properties
    /// provider at all (distinct from a per-item lookup failure).
    fn item_properties_json(&self, _path: &Path) -> Option<SourceResult<String>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_directory_bit() {
        let a = FileAttributes::DIRECTORY | FileAttributes::HIDDEN;
        assert!(a.is_directory());
        assert!(!FileAttributes::ARCHIVE.is_directory());
    }

    #[test]
    fn source_error_display_is_classified() {
        let e = SourceError::Disconnected("\\\\share\\x".into());
        assert!(e.to_string().contains("unreachable"));
    }
}
