//! Shared fixtures: an in-memory listing source, counting icon backend,
//! recording device, and a stub text engine.

use core_geometry::{DipPoint, DipRect, PxRect};
use core_icons::{
    BitmapInfo, DeviceBitmapConverter, DeviceId, IconBackend, IconCache, IconExtractHandle,
    SharedBitmap,
};
use core_model::{EstimatedTextMetrics, TextEngine, TextLayoutHandle, TextLayoutKind};
use core_pane::{FolderPane, NoopCallbacks, PaneDeps};
use core_render::{
    Color, Device, DeviceFactory, DrawContext, PlaceholderKind, PresentTarget, RenderError,
    RenderResult, Theme,
};
use core_source::{
    BorrowMode, DirectoryListingSource, FileAttributes, Listing, SourceError, SourceResult,
    write_record,
};
use core_worker::WorkerConfig;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------
// Listing source
// ---------------------------------------------------------------------

#[derive(Clone)]
pub struct Entry {
    pub name: String,
    pub directory: bool,
    pub size: u64,
    pub time: i64,
}

impl Entry {
    pub fn file(name: &str, size: u64) -> Self {
        Self { name: name.into(), directory: false, size, time: 1_000 }
    }

    pub fn dir(name: &str) -> Self {
        Self { name: name.into(), directory: true, size: 0, time: 1_000 }
    }
}

struct MemListing {
    buf: Vec<u8>,
    count: u32,
}

impl Listing for MemListing {
    fn count(&self) -> u32 {
        self.count
    }
    fn buffer(&self) -> (&[u8], usize) {
        (&self.buf, self.buf.len())
    }
}

/// In-memory source: a map of folder → entries, an optional per-borrow
/// delay, and an optional error to inject.
pub struct MemSource {
    pub folders: Mutex<std::collections::HashMap<String, Vec<Entry>>>,
    pub borrow_delay: Mutex<Duration>,
    pub fail_with: Mutex<Option<SourceError>>,
    pub borrows: AtomicUsize,
}

impl MemSource {
    pub fn new() -> Self {
        Self {
            folders: Mutex::new(std::collections::HashMap::new()),
            borrow_delay: Mutex::new(Duration::ZERO),
            fail_with: Mutex::new(None),
            borrows: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, folder: &str, entries: Vec<Entry>) {
        self.folders.lock().unwrap().insert(folder.to_owned(), entries);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.borrow_delay.lock().unwrap() = delay;
    }
}

impl DirectoryListingSource for MemSource {
    fn id(&self) -> &str {
        "mem"
    }

    fn borrow(&self, path: &Path, _mode: BorrowMode) -> SourceResult<Box<dyn Listing>> {
        self.borrows.fetch_add(1, Ordering::Relaxed);
        let delay = *self.borrow_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        let folders = self.folders.lock().unwrap();
        let entries = folders
            .get(&path.to_string_lossy().into_owned())
            .ok_or_else(|| SourceError::NotFound(path.display().to_string()))?;
        let mut buf = Vec::new();
        let mut prev = None;
        for e in entries {
            let attrs = if e.directory { FileAttributes::DIRECTORY.bits() } else { 0 };
            prev = Some(write_record(&mut buf, prev, attrs, e.time, e.size, &e.name));
        }
        Ok(Box::new(MemListing { buf, count: entries.len() as u32 }))
    }

    fn is_storage_root(&self, path: &Path) -> bool {
        path == Path::new("/")
    }
}

// ---------------------------------------------------------------------
// Icon backend
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct CountingIconBackend {
    pub ext_queries: AtomicUsize,
    pub path_queries: AtomicUsize,
    pub extracts: AtomicUsize,
}

impl IconBackend for CountingIconBackend {
    fn query_icon_index_by_extension(&self, extension: &str, _attrs: u32) -> Option<i32> {
        self.ext_queries.fetch_add(1, Ordering::Relaxed);
        Some(extension.len() as i32)
    }
    fn query_icon_index_for_path(&self, _path: &Path) -> Option<i32> {
        self.path_queries.fetch_add(1, Ordering::Relaxed);
        Some(900)
    }
    fn extract_icon(&self, icon_index: i32, _size: f32) -> Option<IconExtractHandle> {
        self.extracts.fetch_add(1, Ordering::Relaxed);
        Some(IconExtractHandle { icon_index, token: icon_index as u64 })
    }
}

// ---------------------------------------------------------------------
// Device / renderer stubs
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct PresentLog {
    pub fulls: AtomicU32,
    pub partials: AtomicU32,
    pub fail_next: AtomicU32,
}

struct NullCtx;

impl DrawContext for NullCtx {
    fn fill_rect(&mut self, _r: DipRect, _c: Color) {}
    fn fill_rounded_rect(&mut self, _r: DipRect, _radius: f32, _c: Color) {}
    fn stroke_rect(&mut self, _r: DipRect, _c: Color, _w: f32) {}
    fn draw_bitmap(&mut self, _b: &SharedBitmap, _d: DipRect, _o: f32) {}
    fn draw_text_layout(&mut self, _l: &TextLayoutHandle, _o: DipPoint, _c: Color) {}
    fn fill_text(&mut self, _t: &str, _r: DipRect, _c: Color) {}
    fn layout_range_bounds(&mut self, _l: &TextLayoutHandle, range: std::ops::Range<usize>) -> DipRect {
        DipRect::new(range.start as f32, 0.0, range.end as f32, 14.0)
    }
    fn push_clip(&mut self, _r: DipRect) {}
    fn pop_clip(&mut self) {}
}

struct LogTarget {
    log: Arc<PresentLog>,
}

impl PresentTarget for LogTarget {
    fn present_full(&mut self) -> RenderResult<()> {
        if self.log.fail_next.load(Ordering::Relaxed) > 0 {
            self.log.fail_next.fetch_sub(1, Ordering::Relaxed);
            return Err(RenderError::PresentFailed);
        }
        self.log.fulls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
    fn present_partial(&mut self, _d: PxRect, _s: Option<(PxRect, i32)>) -> RenderResult<()> {
        if self.log.fail_next.load(Ordering::Relaxed) > 0 {
            self.log.fail_next.fetch_sub(1, Ordering::Relaxed);
            return Err(RenderError::PresentFailed);
        }
        self.log.partials.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

struct StubDevice {
    id: DeviceId,
    ctx: NullCtx,
    target: LogTarget,
}

impl DeviceBitmapConverter for StubDevice {
    fn device_id(&self) -> DeviceId {
        self.id
    }
    fn convert(&self, handle: IconExtractHandle) -> Option<SharedBitmap> {
        Some(SharedBitmap::new(BitmapInfo {
            device: self.id,
            width: 16,
            height: 16,
            byte_size: 1024,
            resource: handle.token,
        }))
    }
}

impl Device for StubDevice {
    fn id(&self) -> DeviceId {
        self.id
    }
    fn as_converter(&self) -> &dyn DeviceBitmapConverter {
        self
    }
    fn begin_frame(&mut self) -> RenderResult<&mut dyn DrawContext> {
        Ok(&mut self.ctx)
    }
    fn end_frame(&mut self) -> RenderResult<()> {
        Ok(())
    }
    fn present_target(&mut self) -> &mut dyn PresentTarget {
        &mut self.target
    }
    fn placeholder(&mut self, kind: PlaceholderKind) -> RenderResult<SharedBitmap> {
        Ok(SharedBitmap::new(BitmapInfo {
            device: self.id,
            width: 16,
            height: 16,
            byte_size: 64,
            resource: match kind {
                PlaceholderKind::Folder => 9001,
                PlaceholderKind::File => 9002,
            },
        }))
    }
    fn resize(&mut self, _w: u32, _h: u32) -> RenderResult<()> {
        Ok(())
    }
}

pub struct StubFactory {
    pub log: Arc<PresentLog>,
    pub created: Arc<AtomicU32>,
}

impl DeviceFactory for StubFactory {
    fn create_device(&mut self, _w: u32, _h: u32) -> RenderResult<Box<dyn Device>> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(StubDevice {
            id: DeviceId::next(),
            ctx: NullCtx,
            target: LogTarget { log: self.log.clone() },
        }))
    }
}

// ---------------------------------------------------------------------
// Text engine
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct CountingTextEngine {
    pub created: AtomicUsize,
}

impl TextEngine for CountingTextEngine {
    fn device_id(&self) -> DeviceId {
        DeviceId(0)
    }
    fn measure_sample(&self, _sample: &str) -> EstimatedTextMetrics {
        EstimatedTextMetrics { mean_char_width_dip: 7.0, line_height_dip: 16.0 }
    }
    fn create_layout(&self, _t: &str, kind: TextLayoutKind, w: f32, h: f32) -> TextLayoutHandle {
        let id = self.created.fetch_add(1, Ordering::Relaxed) as u64 + 1;
        TextLayoutHandle::new(DeviceId(0), kind, w, h, id)
    }
    fn update_layout_box(&self, l: &TextLayoutHandle, w: f32, h: f32) -> TextLayoutHandle {
        TextLayoutHandle::new(DeviceId(0), l.kind(), w, h, l.resource())
    }
}

// ---------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------

pub struct Harness {
    pub pane: FolderPane,
    pub source: Arc<MemSource>,
    pub backend: Arc<CountingIconBackend>,
    pub cache: Arc<IconCache>,
    pub present_log: Arc<PresentLog>,
    pub devices_created: Arc<AtomicU32>,
}

pub fn harness() -> Harness {
    let source = Arc::new(MemSource::new());
    let backend = Arc::new(CountingIconBackend::default());
    let cache = Arc::new(IconCache::new(backend.clone(), usize::MAX));
    let present_log = Arc::new(PresentLog::default());
    let devices_created = Arc::new(AtomicU32::new(0));
    let factory = StubFactory { log: present_log.clone(), created: devices_created.clone() };
    let pane = FolderPane::new(PaneDeps {
        source: source.clone(),
        icon_cache: cache.clone(),
        device_factory: Box::new(factory),
        text_engine: Box::new(CountingTextEngine::default()),
        callbacks: Box::new(NoopCallbacks),
        theme: Theme::default(),
        settings: Default::default(),
        worker_config: WorkerConfig::default(),
    });
    Harness { pane, source, backend, cache, present_log, devices_created }
}

/// Poll `condition` (interleaved with message pumping) until it holds or
/// the timeout expires.
pub fn pump_until(pane: &mut FolderPane, timeout: Duration, mut condition: impl FnMut(&FolderPane) -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        pane.pump_messages(Instant::now());
        if condition(pane) {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(3));
    }
}
