//! Text-engine seam.
//!
//! Shaping is expensive and device-scoped, so the model stores shaped
//! layouts as opaque handles created through [`TextEngine`] and drops them
//! freely: any released layout can be re-created on demand from the item's
//! strings. The real engine wraps the platform text stack; tests use a
//! counting stub.

use core_icons::DeviceId;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayoutKind {
    /// Primary file-name line.
    Label,
    /// Size/time line in Detailed modes.
    Details,
    /// Attribute line in ExtraDetailed mode.
    Metadata,
}

/// Metrics derived once per DPI change from a fixed measurement sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedTextMetrics {
    pub mean_char_width_dip: f32,
    pub line_height_dip: f32,
}

/// An opaque shaped-text object. Clones share the underlying layout.
#[derive(Debug, Clone)]
pub struct TextLayoutHandle {
    inner: Arc<LayoutInner>,
}

#[derive(Debug)]
struct LayoutInner {
    device: DeviceId,
    kind: TextLayoutKind,
    max_width: f32,
    max_height: f32,
    /// Engine-meaningful token.
    resource: u64,
}

impl TextLayoutHandle {
    pub fn new(
        device: DeviceId,
        kind: TextLayoutKind,
        max_width: f32,
        max_height: f32,
        resource: u64,
    ) -> Self {
        Self {
            inner: Arc::new(LayoutInner { device, kind, max_width, max_height, resource }),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.inner.device
    }

    pub fn kind(&self) -> TextLayoutKind {
        self.inner.kind
    }

    pub fn max_width(&self) -> f32 {
        self.inner.max_width
    }

    pub fn max_height(&self) -> f32 {
        self.inner.max_height
    }

    pub fn resource(&self) -> u64 {
        self.inner.resource
    }

    pub fn same_layout(&self, other: &TextLayoutHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Shaping and measurement. UI thread only; layouts are device-scoped.
pub trait TextEngine {
    fn device_id(&self) -> DeviceId;

    /// Measure a representative sample to derive estimated metrics. Called
    /// once per DPI change with a fixed 62-character alphanumeric sample.
    fn measure_sample(&self, sample: &str) -> EstimatedTextMetrics;

    fn create_layout(
        &self,
        text: &str,
        kind: TextLayoutKind,
        max_width: f32,
        max_height: f32,
    ) -> TextLayoutHandle;

    /// Adjust an existing layout's wrap box; engines that cannot resize in
    /// place return a replacement handle.
    fn update_layout_box(
        &self,
        layout: &TextLayoutHandle,
        max_width: f32,
        max_height: f32,
    ) -> TextLayoutHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_identity_survives_clone() {
        let h = TextLayoutHandle::new(DeviceId(1), TextLayoutKind::Label, 100.0, 20.0, 5);
        let c = h.clone();
        assert!(h.same_layout(&c));
        assert_eq!(c.kind(), TextLayoutKind::Label);
        assert_eq!(c.max_width(), 100.0);
    }
}
