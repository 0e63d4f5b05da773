//! The cache proper.
//!
//! Locking: one mutex over the extension map (read-mostly, taken from the
//! enumeration worker and its query pool), one over the device-bitmap map
//! (UI thread plus the occasional worker cache-probe). Neither lock is held
//! across an OS call.

use crate::{
    DIRECTORY_SENTINEL, DeviceBitmapConverter, DeviceId, IconBackend, IconExtractHandle,
    SharedBitmap, requires_per_file_lookup,
};
use ahash::AHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

const DEFAULT_BITMAP_BUDGET_BYTES: usize = 48 * 1024 * 1024;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IconCacheStats {
    pub extension_entries: usize,
    pub bitmap_entries: usize,
    pub bitmap_bytes: usize,
    pub evictions: u64,
}

struct BitmapEntry {
    bitmap: SharedBitmap,
    /// Monotonic recency stamp; smallest is coldest.
    stamp: u64,
}

struct DeviceBitmaps {
    map: AHashMap<(i32, DeviceId), BitmapEntry>,
    total_bytes: usize,
    clock: u64,
    evictions: u64,
}

pub struct IconCache {
    backend: Arc<dyn IconBackend>,
    budget_bytes: usize,
    /// Lowercased extension (or `<directory>`) → shell icon index.
    extensions: Mutex<AHashMap<String, i32>>,
    bitmaps: Mutex<DeviceBitmaps>,
    special_folders: Mutex<Vec<PathBuf>>,
}

static GLOBAL: OnceLock<IconCache> = OnceLock::new();

impl IconCache {
    pub fn new(backend: Arc<dyn IconBackend>, budget_bytes: usize) -> Self {
        Self {
            backend,
            budget_bytes,
            extensions: Mutex::new(AHashMap::new()),
            bitmaps: Mutex::new(DeviceBitmaps {
                map: AHashMap::new(),
                total_bytes: 0,
                clock: 0,
                evictions: 0,
            }),
            special_folders: Mutex::new(Vec::new()),
        }
    }

    /// Install the process-wide instance. Later calls win nothing: the first
    /// initialization sticks, which is what a singleton means here.
    pub fn initialize(backend: Arc<dyn IconBackend>) -> &'static IconCache {
        GLOBAL.get_or_init(|| IconCache::new(backend, DEFAULT_BITMAP_BUDGET_BYTES))
    }

    /// The process-wide instance; panics if [`IconCache::initialize`] has
    /// not run. Panes may also carry their own instance (tests do).
    pub fn global() -> &'static IconCache {
        GLOBAL.get().expect("IconCache::initialize must run first")
    }

    fn key_for(extension: &str) -> String {
        extension.to_ascii_lowercase()
    }

    /// Cached index only; no OS traffic.
    pub fn get_icon_index(&self, extension: &str) -> Option<i32> {
        self.extensions
            .lock()
            .unwrap()
            .get(&Self::key_for(extension))
            .copied()
    }

    /// Cached index, or a synchronous backend query whose result is cached.
    /// Safe from any thread.
    pub fn query_icon_index(&self, extension: &str, attributes: u32) -> Option<i32> {
        let key = Self::key_for(extension);
        if let Some(hit) = self.extensions.lock().unwrap().get(&key).copied() {
            return Some(hit);
        }
        // Query outside the lock; a racing duplicate query is harmless and
        // both writers store the same index.
        let index = self.backend.query_icon_index_by_extension(&key, attributes)?;
        self.extensions.lock().unwrap().insert(key, index);
        Some(index)
    }

    pub fn query_icon_index_for_path(&self, path: &Path) -> Option<i32> {
        self.backend.query_icon_index_for_path(path)
    }

    pub fn requires_per_file_lookup(&self, extension: &str) -> bool {
        requires_per_file_lookup(extension)
    }

    /// Directories with bespoke shell icons (Desktop, Documents, …). The
    /// host seeds this once at startup.
    pub fn set_special_folders(&self, folders: Vec<PathBuf>) {
        *self.special_folders.lock().unwrap() = folders;
    }

    pub fn is_special_folder(&self, path: &Path) -> bool {
        self.special_folders
            .lock()
            .unwrap()
            .iter()
            .any(|f| f == path)
    }

    /// Blocking OS extraction. Any thread.
    pub fn extract_bitmap_handle(&self, icon_index: i32, size_dip: f32) -> Option<IconExtractHandle> {
        let handle = self.backend.extract_icon(icon_index, size_dip);
        if handle.is_none() {
            tracing::debug!(target: "icons.cache", icon_index, "extract_failed");
        }
        handle
    }

    /// UI thread: convert an extracted handle into a device bitmap and cache
    /// it under `(icon_index, device)`. Returns the cached bitmap if one
    /// appeared in the meantime (the handle is then dropped unconverted).
    pub fn convert_handle_to_device_bitmap(
        &self,
        handle: IconExtractHandle,
        icon_index: i32,
        converter: &dyn DeviceBitmapConverter,
    ) -> Option<SharedBitmap> {
        let device = converter.device_id();
        if let Some(existing) = self.get_cached_bitmap(icon_index, device) {
            return Some(existing);
        }
        let bitmap = converter.convert(handle)?;
        self.insert_bitmap(icon_index, device, bitmap.clone());
        Some(bitmap)
    }

    pub fn get_cached_bitmap(&self, icon_index: i32, device: DeviceId) -> Option<SharedBitmap> {
        let mut inner = self.bitmaps.lock().unwrap();
        inner.clock += 1;
        let stamp = inner.clock;
        let entry = inner.map.get_mut(&(icon_index, device))?;
        entry.stamp = stamp;
        Some(entry.bitmap.clone())
    }

    fn insert_bitmap(&self, icon_index: i32, device: DeviceId, bitmap: SharedBitmap) {
        let mut inner = self.bitmaps.lock().unwrap();
        inner.clock += 1;
        let stamp = inner.clock;
        let bytes = bitmap.byte_size();
        if let Some(old) = inner.map.insert((icon_index, device), BitmapEntry { bitmap, stamp }) {
            inner.total_bytes -= old.bitmap.byte_size();
        }
        inner.total_bytes += bytes;
        self.evict_over_budget(&mut inner);
    }

    fn evict_over_budget(&self, inner: &mut DeviceBitmaps) {
        while inner.total_bytes > self.budget_bytes && inner.map.len() > 1 {
            let coldest = inner
                .map
                .iter()
                .min_by_key(|(_, e)| e.stamp)
                .map(|(k, _)| *k);
            let Some(key) = coldest else { break };
            if let Some(evicted) = inner.map.remove(&key) {
                inner.total_bytes -= evicted.bitmap.byte_size();
                inner.evictions += 1;
                tracing::trace!(
                    target: "icons.cache",
                    icon_index = key.0,
                    device = key.1.0,
                    freed = evicted.bitmap.byte_size(),
                    "bitmap_evicted"
                );
            }
        }
    }

    /// Drop every bitmap owned by a lost or released device.
    pub fn clear_device_cache(&self, device: DeviceId) {
        let mut inner = self.bitmaps.lock().unwrap();
        let before = inner.map.len();
        let mut freed = 0usize;
        inner.map.retain(|(_, d), e| {
            if *d == device {
                freed += e.bitmap.byte_size();
                false
            } else {
                true
            }
        });
        inner.total_bytes -= freed;
        tracing::debug!(
            target: "icons.cache",
            device = device.0,
            dropped = before - inner.map.len(),
            freed,
            "device_cache_cleared"
        );
    }

    pub fn stats(&self) -> IconCacheStats {
        let ext = self.extensions.lock().unwrap();
        let inner = self.bitmaps.lock().unwrap();
        IconCacheStats {
            extension_entries: ext.len(),
            bitmap_entries: inner.map.len(),
            bitmap_bytes: inner.total_bytes,
            evictions: inner.evictions,
        }
    }
}

/// Extension key an item resolves through: the `<directory>` sentinel for
/// plain directories, the (possibly empty) extension for files.
pub fn extension_cache_key(is_directory: bool, extension: &str) -> String {
    if is_directory {
        DIRECTORY_SENTINEL.to_owned()
    } else {
        extension.to_ascii_lowercase()
    }
}
