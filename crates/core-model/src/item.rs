//! Item and payload types.

use crate::text::TextLayoutHandle;
use core_geometry::DipRect;
use core_icons::SharedBitmap;
use core_source::{ArenaString, FileAttributes, NameArena, SourceError};
use std::path::PathBuf;
use std::sync::Arc;

/// How much text each tile shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Brief,
    Detailed,
    ExtraDetailed,
}

/// One entry of the folder listing plus all per-item derived state.
///
/// Heavy fields (`icon`, the three layouts, `details_text`) are caches:
/// dropping any of them is always legal and they are rebuilt lazily when
/// the item approaches the viewport.
#[derive(Debug, Clone)]
pub struct Item {
    pub name: ArenaString,
    pub attributes: FileAttributes,
    pub is_directory: bool,
    /// `.lnk` entries; drawn with the shortcut overlay but otherwise files.
    pub is_shortcut: bool,
    pub size_bytes: u64,
    pub last_write_time: i64,
    /// Shell icon index; `-1` until enumeration resolves it.
    pub icon_index: i32,
    pub icon: Option<SharedBitmap>,
    /// FNV-1a of `folder + "|" + name`; drives the rainbow tint.
    pub stable_hash32: u32,
    pub column: u32,
    pub row: u32,
    pub bounds: DipRect,
    pub label_layout: Option<TextLayoutHandle>,
    pub details_layout: Option<TextLayoutHandle>,
    pub metadata_layout: Option<TextLayoutHandle>,
    /// Cached "size · modified" line for Detailed modes.
    pub details_text: Option<String>,
    /// Cached attribute line for ExtraDetailed mode.
    pub metadata_text: Option<String>,
    /// Byte offset of the last `.` in `name`, 0 when the name has no
    /// extension (a leading dot does not count).
    pub extension_offset: u16,
    pub selected: bool,
    pub focused: bool,
    /// Position in the enumeration order; final sort tie-breaker.
    pub unsorted_order: u32,
}

impl Item {
    pub fn from_entry(
        name: ArenaString,
        attributes: FileAttributes,
        size_bytes: u64,
        last_write_time: i64,
        stable_hash32: u32,
        unsorted_order: u32,
    ) -> Self {
        let is_directory = attributes.is_directory();
        let extension_offset = extension_offset_of(name.as_str());
        let is_shortcut = !is_directory
            && extension_offset > 0
            && name.as_str()[extension_offset as usize..].eq_ignore_ascii_case(".lnk");
        Self {
            name,
            attributes,
            is_directory,
            is_shortcut,
            size_bytes,
            last_write_time,
            icon_index: -1,
            icon: None,
            stable_hash32,
            column: 0,
            row: 0,
            bounds: DipRect::default(),
            label_layout: None,
            details_layout: None,
            metadata_layout: None,
            details_text: None,
            metadata_text: None,
            extension_offset,
            selected: false,
            focused: false,
            unsorted_order,
        }
    }

    /// Extension without the dot, empty when none.
    pub fn extension(&self) -> &str {
        if self.extension_offset == 0 {
            ""
        } else {
            &self.name.as_str()[self.extension_offset as usize + 1..]
        }
    }

    /// The identity tuple that must match for cached state to transfer
    /// across an incremental refresh.
    pub(crate) fn refresh_key(&self) -> (u64, i64, u32, bool, i32) {
        (
            self.size_bytes,
            self.last_write_time,
            self.attributes.bits(),
            self.is_directory,
            self.icon_index,
        )
    }

    /// Drop all reconstructible heavy state. Cache-only; never affects
    /// correctness.
    pub fn release_heavy_state(&mut self) {
        self.icon = None;
        self.label_layout = None;
        self.details_layout = None;
        self.metadata_layout = None;
        self.details_text = None;
        self.metadata_text = None;
    }

    pub fn has_any_layout(&self) -> bool {
        self.label_layout.is_some()
            || self.details_layout.is_some()
            || self.metadata_layout.is_some()
    }
}

/// Byte offset of the last `.` in `name`, or 0.
///
/// Offset 0 doubles as "no extension": a dot at position 0 (`.gitignore`)
/// names a hidden file, not an empty stem with an extension.
pub fn extension_offset_of(name: &str) -> u16 {
    match name.rfind('.') {
        Some(0) | None => 0,
        Some(at) => u16::try_from(at).unwrap_or(0),
    }
}

/// Enumeration outcome carried by a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Ok,
    Failed(SourceError),
}

impl ListingStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ListingStatus::Ok)
    }
}

/// Ownership handoff unit from the enumeration worker to the UI thread.
///
/// `arena` is the buffer every item name in `items` points into; the
/// payload keeps it alive through adoption and beyond, until the *next*
/// adoption drops the previous payload.
pub struct ListingPayload {
    pub generation: u64,
    pub status: ListingStatus,
    pub folder: PathBuf,
    pub arena: Arc<NameArena>,
    /// `[directories…, files…]`, each group sorted ordinal
    /// case-insensitively.
    pub items: Vec<Item>,
}

impl ListingPayload {
    pub fn failed(generation: u64, folder: PathBuf, error: SourceError) -> Self {
        Self {
            generation,
            status: ListingStatus::Failed(error),
            folder,
            arena: Arc::new(NameArena::default()),
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, attrs: FileAttributes) -> Item {
        Item::from_entry(ArenaString::detached(name), attrs, 0, 0, 0, 0)
    }

    #[test]
    fn extension_offsets() {
        assert_eq!(extension_offset_of("readme.txt"), 6);
        assert_eq!(extension_offset_of("archive.tar.gz"), 11);
        assert_eq!(extension_offset_of("noext"), 0);
        assert_eq!(extension_offset_of(".gitignore"), 0);
        assert_eq!(extension_offset_of(""), 0);
    }

    #[test]
    fn extension_accessor() {
        assert_eq!(item("readme.txt", FileAttributes::empty()).extension(), "txt");
        assert_eq!(item("noext", FileAttributes::empty()).extension(), "");
        assert_eq!(item(".gitignore", FileAttributes::empty()).extension(), "");
    }

    #[test]
    fn shortcut_detection() {
        assert!(item("app.lnk", FileAttributes::empty()).is_shortcut);
        assert!(item("APP.LNK", FileAttributes::empty()).is_shortcut);
        assert!(!item("app.txt", FileAttributes::empty()).is_shortcut);
        // A directory named like a shortcut is still a directory.
        assert!(!item("app.lnk", FileAttributes::DIRECTORY).is_shortcut);
    }

    #[test]
    fn release_heavy_state_clears_caches_only() {
        let mut i = item("a.txt", FileAttributes::empty());
        i.details_text = Some("4 KB".into());
        i.selected = true;
        i.icon_index = 12;
        i.release_heavy_state();
        assert!(i.details_text.is_none());
        assert!(!i.has_any_layout());
        // Identity and interaction state survive.
        assert!(i.selected);
        assert_eq!(i.icon_index, 12);
    }
}
