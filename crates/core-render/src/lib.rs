//! Rendering: device seam, damage tracking, partial presentation, item draw.
//!
//! Everything below talks to three traits: [`Device`] (resource lifecycle
//! plus conversion), [`DrawContext`] (2D/text draw calls for one frame),
//! and [`PresentTarget`] (flip-model presentation). The real backend wraps
//! the platform APIs; tests use a recording implementation.
//!
//! Frame flow per paint:
//! 1. Damage is collected as pixel rects ([`DamageTracker`]), coalesced to
//!    one invalid rect, clamped to the client.
//! 2. The invalid rect converts to DIPs and restricts the visible-item
//!    iteration window.
//! 3. Items draw back-to-front per tile: state background, focus ring,
//!    icon (real → placeholder → fallback), label and secondary lines,
//!    search-match highlight.
//! 4. [`PresentGate`] decides full vs partial: partial presents (dirty
//!    rect, optional scroll rect) are allowed only after at least one full
//!    present succeeded on the current swap chain; any failure forces a
//!    device rebuild and a full redraw.

mod damage;
mod present;
mod renderer;
mod theme;

pub use damage::DamageTracker;
pub use present::{PresentGate, PresentPlan, PresentRequest, PresentStats};
pub use renderer::{FrameParams, OverlayPanel, Renderer, SearchHighlight, SearchPill};
pub use theme::{Color, Theme, rainbow_tint};

use core_geometry::{DipPoint, DipRect, PxRect};
use core_icons::{DeviceBitmapConverter, DeviceId, SharedBitmap};
use core_model::TextLayoutHandle;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("rendering device lost")]
    DeviceLost,
    #[error("draw failed: {0}")]
    DrawFailed(&'static str),
    #[error("present failed")]
    PresentFailed,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Which placeholder bitmap to use while an item's icon is loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Folder,
    File,
}

/// One frame's draw surface. All coordinates are DIPs.
pub trait DrawContext {
    fn fill_rect(&mut self, rect: DipRect, color: Color);
    fn fill_rounded_rect(&mut self, rect: DipRect, radius: f32, color: Color);
    fn stroke_rect(&mut self, rect: DipRect, color: Color, width: f32);
    fn draw_bitmap(&mut self, bitmap: &SharedBitmap, dest: DipRect, opacity: f32);
    fn draw_text_layout(&mut self, layout: &TextLayoutHandle, origin: DipPoint, color: Color);
    /// Immediate-mode text for chrome (overlay panel, search pill) where a
    /// cached layout would buy nothing.
    fn fill_text(&mut self, text: &str, rect: DipRect, color: Color);
    /// Bounds of a character range inside a shaped layout, relative to the
    /// layout origin. Used for the incremental-search highlight.
    fn layout_range_bounds(&mut self, layout: &TextLayoutHandle, range: std::ops::Range<usize>)
    -> DipRect;
    fn push_clip(&mut self, rect: DipRect);
    fn pop_clip(&mut self);
}

/// Flip-model presentation for one swap chain.
pub trait PresentTarget {
    /// Present the whole backbuffer (null dirty/scroll).
    fn present_full(&mut self) -> RenderResult<()>;
    /// Present with one dirty rect and an optional scroll
    /// `(scroll_rect, dy_px)`: source content at `y + dy` moves to `y`.
    fn present_partial(&mut self, dirty: PxRect, scroll: Option<(PxRect, i32)>) -> RenderResult<()>;
}

/// Device resources for one pane. UI thread only.
pub trait Device: DeviceBitmapConverter {
    fn id(&self) -> DeviceId;

    /// Upcast for the icon cache's conversion entry point.
    fn as_converter(&self) -> &dyn DeviceBitmapConverter;

    /// Begin a frame; returns the draw surface. `end_frame` reports draw
    /// errors detected at flush time (the flip-model pattern).
    fn begin_frame(&mut self) -> RenderResult<&mut dyn DrawContext>;
    fn end_frame(&mut self) -> RenderResult<()>;

    fn present_target(&mut self) -> &mut dyn PresentTarget;

    /// Rasterized once per device; drawn at reduced opacity while the real
    /// icon loads.
    fn placeholder(&mut self, kind: PlaceholderKind) -> RenderResult<SharedBitmap>;

    /// Resize backbuffers to the client size in pixels.
    fn resize(&mut self, width_px: u32, height_px: u32) -> RenderResult<()>;
}

/// Creates devices; invoked on first paint and again after device loss.
pub trait DeviceFactory {
    fn create_device(&mut self, width_px: u32, height_px: u32) -> RenderResult<Box<dyn Device>>;
}
