//! Process-wide icon cache and the OS icon-extraction seam.
//!
//! Two levels, two lifetimes:
//!
//! 1. `extension → icon index`: OS shell queries keyed by lowercased
//!    extension (plus the `<directory>` sentinel). Populated from any
//!    thread; survives device loss.
//! 2. `(icon index, device) → bitmap`: GPU bitmaps converted on the UI
//!    thread, evicted LRU under a byte budget, dropped wholesale when the
//!    owning device goes away.
//!
//! A handful of extensions carry per-file icons (each `.exe` has its own);
//! those bypass level 1 entirely and resolve through
//! [`IconBackend::query_icon_index_for_path`].

mod cache;

pub use cache::{IconCache, IconCacheStats, extension_cache_key};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Synthetic extension key for ordinary directories.
pub const DIRECTORY_SENTINEL: &str = "<directory>";

/// Extensions whose icon depends on the individual file, not the extension.
const PER_FILE_EXTENSIONS: &[&str] = &["exe", "dll", "ico", "lnk", "url", "scr", "cur", "ani"];

/// Identity of one live rendering device. Recreating the device after loss
/// yields a new id, implicitly orphaning all bitmaps keyed by the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

impl DeviceId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        DeviceId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque token for an extracted OS icon, produced off-thread and consumed
/// exactly once by a device-side conversion on the UI thread.
#[derive(Debug)]
pub struct IconExtractHandle {
    pub icon_index: i32,
    pub token: u64,
}

/// A device-scoped bitmap shared between the cache and any number of items.
///
/// Identity is the `Arc` allocation: two items showing the same icon on the
/// same device hold clones of one `SharedBitmap`.
#[derive(Debug, Clone)]
pub struct SharedBitmap(Arc<BitmapInfo>);

#[derive(Debug)]
pub struct BitmapInfo {
    pub device: DeviceId,
    pub width: u32,
    pub height: u32,
    /// GPU-side byte footprint used for budget accounting.
    pub byte_size: usize,
    /// Backend-meaningful resource token.
    pub resource: u64,
}

impl SharedBitmap {
    pub fn new(info: BitmapInfo) -> Self {
        SharedBitmap(Arc::new(info))
    }

    pub fn info(&self) -> &BitmapInfo {
        &self.0
    }

    pub fn byte_size(&self) -> usize {
        self.0.byte_size
    }

    pub fn device(&self) -> DeviceId {
        self.0.device
    }

    pub fn same_bitmap(&self, other: &SharedBitmap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// OS shell icon queries. All methods must be callable from any thread;
/// `extract_icon` may block (it can cross process boundaries).
pub trait IconBackend: Send + Sync {
    /// Icon index for an extension (`"txt"`, lowercased, no dot) or the
    /// `<directory>` sentinel. `attributes` disambiguates directory-ish
    /// queries. `None` when the shell has no answer.
    fn query_icon_index_by_extension(&self, extension: &str, attributes: u32) -> Option<i32>;

    /// Per-file icon index for paths whose extension is in the per-file set
    /// or which are special folders.
    fn query_icon_index_for_path(&self, path: &Path) -> Option<i32>;

    /// Extract the OS icon for `icon_index` at `size_dip`. Blocking.
    fn extract_icon(&self, icon_index: i32, size_dip: f32) -> Option<IconExtractHandle>;
}

/// Device-side conversion of an extracted handle into a GPU bitmap.
/// Implemented by the renderer's device wrapper; UI thread only.
pub trait DeviceBitmapConverter {
    fn device_id(&self) -> DeviceId;
    fn convert(&self, handle: IconExtractHandle) -> Option<SharedBitmap>;
}

/// True for extensions that carry per-file icons.
pub fn requires_per_file_lookup(extension: &str) -> bool {
    PER_FILE_EXTENSIONS
        .iter()
        .any(|e| extension.eq_ignore_ascii_case(e))
}
