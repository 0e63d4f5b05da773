//! Arena-backed listing built from one walk over the plugin buffer.
//!
//! All entry names are decoded into a single contiguous UTF-8 table during
//! the walk; entries and every downstream item refer to names as byte
//! ranges into that table. The table lives inside an `Arc`, so a payload
//! swap on the UI thread is one pointer exchange and the old arena stays
//! alive exactly as long as any [`ArenaString`] still points into it.

use crate::records::RecordWalker;
use crate::{FileAttributes, Listing, SourceError, SourceResult};
use std::fmt;
use std::sync::Arc;

/// Contiguous UTF-8 name table. Ranges handed out by [`ArenaListing::parse`]
/// are always valid, char-boundary-aligned indices into `text`.
#[derive(Debug, Default)]
pub struct NameArena {
    text: String,
}

impl NameArena {
    #[inline]
    pub fn slice(&self, start: u32, len: u32) -> &str {
        &self.text[start as usize..(start + len) as usize]
    }

    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}

/// One parsed directory entry. Name is a range into the owning arena.
#[derive(Debug, Clone, Copy)]
pub struct ListingEntry {
    pub name_start: u32,
    pub name_len: u32,
    pub attributes: FileAttributes,
    pub last_write_time: i64,
    pub size_bytes: u64,
}

/// Parsed listing: entries plus the shared name arena they point into.
pub struct ArenaListing {
    pub arena: Arc<NameArena>,
    pub entries: Vec<ListingEntry>,
}

impl ArenaListing {
    /// Walk and validate `listing`'s record chain, decoding names into a
    /// fresh arena. Fails wholesale on the first malformed record.
    pub fn parse(listing: &dyn Listing) -> SourceResult<ArenaListing> {
        let count = listing.count();
        let (buf, buffer_size) = listing.buffer();
        let mut arena = NameArena::default();
        let mut entries = Vec::with_capacity(count as usize);
        let mut units = Vec::new();
        for record in RecordWalker::new(buf, buffer_size, count)? {
            let record = record?;
            units.clear();
            units.extend(
                record
                    .name_utf16
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]])),
            );
            let start = arena.text.len();
            {
                let decoded = String::from_utf16(&units)
                    .map_err(|_| SourceError::InvalidData("name is not valid UTF-16"))?;
                arena.text.push_str(&decoded);
            }
            let len = arena.text.len() - start;
            if start > u32::MAX as usize || len > u32::MAX as usize {
                return Err(SourceError::InvalidData("name table exceeds 4 GiB"));
            }
            entries.push(ListingEntry {
                name_start: start as u32,
                name_len: len as u32,
                attributes: FileAttributes::from_bits_retain(record.file_attributes),
                last_write_time: record.last_write_time,
                size_bytes: record.end_of_file,
            });
        }
        tracing::trace!(
            target: "source.listing",
            entries = entries.len(),
            arena_bytes = arena.text.len(),
            "listing_parsed"
        );
        Ok(ArenaListing { arena: Arc::new(arena), entries })
    }

    /// Resolve an entry's name as an owned view into the shared arena.
    pub fn name_of(&self, entry: &ListingEntry) -> ArenaString {
        ArenaString {
            arena: Arc::clone(&self.arena),
            start: entry.name_start,
            len: entry.name_len,
        }
    }
}

/// A cheap, clonable string view into a [`NameArena`].
///
/// Two clones of the same view compare equal and hash equal to the `str`
/// they resolve to. Holding any `ArenaString` keeps its arena alive.
#[derive(Clone)]
pub struct ArenaString {
    arena: Arc<NameArena>,
    start: u32,
    len: u32,
}

impl ArenaString {
    /// Build a detached view (own arena) from an owned string. Used for
    /// synthetic names in tests and placeholder items.
    pub fn detached(s: &str) -> Self {
        let arena = NameArena { text: s.to_owned() };
        ArenaString {
            arena: Arc::new(arena),
            start: 0,
            len: s.len() as u32,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.arena.slice(self.start, self.len)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when both views share one arena allocation.
    pub fn same_arena(&self, other: &ArenaString) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }
}

impl fmt::Debug for ArenaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ArenaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for ArenaString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ArenaString {}

impl PartialEq<str> for ArenaString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl std::hash::Hash for ArenaString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}
