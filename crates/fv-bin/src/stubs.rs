//! Headless stand-ins for the platform seams: an in-memory listing
//! source, a synthetic icon backend, a null device, and a fixed-metrics
//! text engine.

use core_geometry::{DipPoint, DipRect, PxRect};
use core_icons::{
    BitmapInfo, DeviceBitmapConverter, DeviceId, IconBackend, IconExtractHandle, SharedBitmap,
};
use core_model::{EstimatedTextMetrics, TextEngine, TextLayoutHandle, TextLayoutKind};
use core_render::{
    Color, Device, DeviceFactory, DrawContext, PlaceholderKind, PresentTarget, RenderResult,
};
use core_source::{
    BorrowMode, DirectoryListingSource, FileAttributes, Listing, SourceError, SourceResult,
    write_record,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------
// Listing source
// ---------------------------------------------------------------------

struct DemoListing {
    buf: Vec<u8>,
    count: u32,
}

impl Listing for DemoListing {
    fn count(&self) -> u32 {
        self.count
    }
    fn buffer(&self) -> (&[u8], usize) {
        (&self.buf, self.buf.len())
    }
}

/// One synthetic folder full of files plus a couple of directories.
pub struct DemoSource {
    folder: PathBuf,
    entries: Mutex<Vec<(String, u32, u64)>>, // (name, attributes, size)
    appended: AtomicU64,
}

impl DemoSource {
    pub fn populate(folder: &Path, items: usize) -> Self {
        let mut entries = Vec::with_capacity(items + 3);
        entries.push(("Desktop".to_owned(), FileAttributes::DIRECTORY.bits(), 0));
        entries.push(("projects".to_owned(), FileAttributes::DIRECTORY.bits(), 0));
        entries.push(("tool.exe".to_owned(), 0, 88_064));
        for i in 0..items {
            let ext = match i % 4 {
                0 => "txt",
                1 => "rs",
                2 => "png",
                _ => "pdf",
            };
            entries.push((format!("file{i:04}.{ext}"), 0, (i as u64 % 700) * 1024));
        }
        Self {
            folder: folder.to_path_buf(),
            entries: Mutex::new(entries),
            appended: AtomicU64::new(0),
        }
    }

    /// Demo append path: a new entry shows up, as if a watcher fired.
    pub fn append_entry(&self) {
        let n = self.appended.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap()
            .push((format!("appended{n:04}.log"), 0, 512));
    }
}

impl DirectoryListingSource for DemoSource {
    fn id(&self) -> &str {
        "demo"
    }

    fn borrow(&self, path: &Path, _mode: BorrowMode) -> SourceResult<Box<dyn Listing>> {
        if path != self.folder {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let entries = self.entries.lock().unwrap();
        let mut buf = Vec::new();
        let mut prev = None;
        for (name, attrs, size) in entries.iter() {
            prev = Some(write_record(&mut buf, prev, *attrs, 1_700_000_000, *size, name));
        }
        Ok(Box::new(DemoListing { buf, count: entries.len() as u32 }))
    }

    fn is_storage_root(&self, path: &Path) -> bool {
        path == self.folder
    }
}

// ---------------------------------------------------------------------
// Icon backend
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct DemoIconBackend;

impl IconBackend for DemoIconBackend {
    fn query_icon_index_by_extension(&self, extension: &str, _attrs: u32) -> Option<i32> {
        // Deterministic synthetic index per extension.
        Some(extension.bytes().fold(7i32, |acc, b| acc.wrapping_mul(31) + b as i32).abs())
    }

    fn query_icon_index_for_path(&self, path: &Path) -> Option<i32> {
        Some(path.as_os_str().len() as i32 + 10_000)
    }

    fn extract_icon(&self, icon_index: i32, _size_dip: f32) -> Option<IconExtractHandle> {
        Some(IconExtractHandle { icon_index, token: icon_index as u64 })
    }
}

// ---------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------

struct NullCtx;

impl DrawContext for NullCtx {
    fn fill_rect(&mut self, _r: DipRect, _c: Color) {}
    fn fill_rounded_rect(&mut self, _r: DipRect, _radius: f32, _c: Color) {}
    fn stroke_rect(&mut self, _r: DipRect, _c: Color, _w: f32) {}
    fn draw_bitmap(&mut self, _b: &SharedBitmap, _d: DipRect, _o: f32) {}
    fn draw_text_layout(&mut self, _l: &TextLayoutHandle, _o: DipPoint, _c: Color) {}
    fn fill_text(&mut self, _t: &str, _r: DipRect, _c: Color) {}
    fn layout_range_bounds(
        &mut self,
        _l: &TextLayoutHandle,
        range: std::ops::Range<usize>,
    ) -> DipRect {
        DipRect::new(range.start as f32 * 7.0, 0.0, range.end as f32 * 7.0, 16.0)
    }
    fn push_clip(&mut self, _r: DipRect) {}
    fn pop_clip(&mut self) {}
}

struct NullTarget;

impl PresentTarget for NullTarget {
    fn present_full(&mut self) -> RenderResult<()> {
        Ok(())
    }
    fn present_partial(&mut self, _d: PxRect, _s: Option<(PxRect, i32)>) -> RenderResult<()> {
        Ok(())
    }
}

struct NullDevice {
    id: DeviceId,
    ctx: NullCtx,
    target: NullTarget,
}

impl DeviceBitmapConverter for NullDevice {
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

impl Device for NullDevice {
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
                PlaceholderKind::Folder => 1,
                PlaceholderKind::File => 2,
            },
        }))
    }
    fn resize(&mut self, _w: u32, _h: u32) -> RenderResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct NullDeviceFactory;

impl DeviceFactory for NullDeviceFactory {
    fn create_device(&mut self, _w: u32, _h: u32) -> RenderResult<Box<dyn Device>> {
        Ok(Box::new(NullDevice { id: DeviceId::next(), ctx: NullCtx, target: NullTarget }))
    }
}

// ---------------------------------------------------------------------
// Text engine
// ---------------------------------------------------------------------

/// Fixed-metrics shaping: every char 7 DIPs wide, 16 DIP line height.
pub struct DemoTextEngine;

impl TextEngine for DemoTextEngine {
    fn device_id(&self) -> DeviceId {
        DeviceId(0)
    }
    fn measure_sample(&self, _sample: &str) -> EstimatedTextMetrics {
        EstimatedTextMetrics { mean_char_width_dip: 7.0, line_height_dip: 16.0 }
    }
    fn create_layout(&self, _t: &str, kind: TextLayoutKind, w: f32, h: f32) -> TextLayoutHandle {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TextLayoutHandle::new(DeviceId(0), kind, w, h, NEXT.fetch_add(1, Ordering::Relaxed))
    }
    fn update_layout_box(&self, l: &TextLayoutHandle, w: f32, h: f32) -> TextLayoutHandle {
        TextLayoutHandle::new(DeviceId(0), l.kind(), w, h, l.resource())
    }
}
