//! The layout engine proper.

use crate::METRICS_SAMPLE;
use crate::details::{format_attributes_line, format_details_line};
use core_geometry::{DipPoint, DipRect, DipSize};
use core_model::{DisplayMode, EstimatedTextMetrics, Item, TextEngine, TextLayoutKind};
use std::ops::Range;

/// Shaping window: items ahead of the scroll direction get the deep buffer,
/// items behind the shallow one.
pub const SHAPE_BUFFER_LEADING: usize = 64;
pub const SHAPE_BUFFER_TRAILING: usize = 10;

/// Idle pre-shaping batch size per timer tick.
pub const IDLE_BATCH_SIZE: usize = 16;

/// Above this item count, distant items get their heavy state released.
pub const RELEASE_ITEM_THRESHOLD: usize = 10_000;
/// Items farther than this from the visible range are release candidates.
pub const RELEASE_KEEP_RADIUS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub icon_size_dip: f32,
    pub icon_text_gap_dip: f32,
    pub tile_padding_dip: f32,
    pub width_safety_dip: f32,
    pub row_spacing_dip: f32,
    /// Height factor for details/metadata lines relative to the label.
    pub secondary_shrink: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            icon_size_dip: 16.0,
            icon_text_gap_dip: 4.0,
            tile_padding_dip: 4.0,
            width_safety_dip: 2.0,
            row_spacing_dip: 2.0,
            secondary_shrink: 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    /// Toward higher item indices (scrolling right).
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleShapeOutcome {
    pub created: usize,
    pub complete: bool,
}

pub struct LayoutEngine {
    params: LayoutParams,
    metrics: Option<EstimatedTextMetrics>,
    mode: DisplayMode,
    client: DipSize,
    tile_width: f32,
    tile_height: f32,
    rows_per_column: usize,
    columns: usize,
    column_prefix_sums: Vec<usize>,
    item_count: usize,
    idle_cursor: usize,
    idle_complete: bool,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            metrics: None,
            mode: DisplayMode::default(),
            client: DipSize::default(),
            tile_width: 0.0,
            tile_height: 0.0,
            rows_per_column: 1,
            columns: 0,
            column_prefix_sums: vec![0],
            item_count: 0,
            idle_cursor: 0,
            idle_complete: true,
        }
    }

    /// Re-measure the estimate sample. Call once at startup and again on
    /// every DPI change.
    pub fn refresh_metrics(&mut self, engine: &dyn TextEngine) {
        let metrics = engine.measure_sample(METRICS_SAMPLE);
        tracing::debug!(
            target: "layout.metrics",
            mean_char_width = metrics.mean_char_width_dip,
            line_height = metrics.line_height_dip,
            "metrics_measured"
        );
        self.metrics = Some(metrics);
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    fn metrics_or_default(&self) -> EstimatedTextMetrics {
        self.metrics.unwrap_or(EstimatedTextMetrics {
            mean_char_width_dip: 7.0,
            line_height_dip: 16.0,
        })
    }

    fn text_lines_height(&self, m: EstimatedTextMetrics) -> f32 {
        let label = m.line_height_dip;
        let secondary = m.line_height_dip * self.params.secondary_shrink;
        match self.mode {
            DisplayMode::Brief => label,
            DisplayMode::Detailed => label + secondary,
            DisplayMode::ExtraDetailed => label + 2.0 * secondary,
        }
    }

    // -----------------------------------------------------------------
    // Geometry pass
    // -----------------------------------------------------------------

    /// Assign columns, rows and bounds for every item and rebuild the
    /// prefix sums. Pure arithmetic; no shaping.
    pub fn perform_layout(&mut self, items: &mut [Item], client: DipSize) {
        let m = self.metrics_or_default();
        self.client = client;
        self.item_count = items.len();
        self.idle_cursor = 0;
        self.idle_complete = items.is_empty();

        if items.is_empty() {
            self.columns = 0;
            self.rows_per_column = 1;
            self.tile_width = 0.0;
            self.tile_height = 0.0;
            self.column_prefix_sums.clear();
            self.column_prefix_sums.push(0);
            return;
        }

        let mut max_text_width = 0f32;
        for item in items.iter() {
            let label = item.name.as_str().chars().count() as f32 * m.mean_char_width_dip;
            max_text_width = max_text_width.max(label);
        }

        let p = self.params;
        let desired = p.icon_size_dip
            + p.icon_text_gap_dip
            + max_text_width
            + 2.0 * p.tile_padding_dip
            + p.width_safety_dip;
        self.tile_width = if client.width > 0.0 { desired.min(client.width) } else { desired };
        self.tile_height =
            2.0 * p.tile_padding_dip + p.icon_size_dip.max(self.text_lines_height(m));

        let row_stride = self.row_stride();
        self.rows_per_column = if client.height > 0.0 {
            (((client.height + p.row_spacing_dip) / row_stride).floor() as usize).max(1)
        } else {
            1
        };
        self.columns = items.len().div_ceil(self.rows_per_column);

        for (i, item) in items.iter_mut().enumerate() {
            let column = i / self.rows_per_column;
            let row = i % self.rows_per_column;
            item.column = column as u32;
            item.row = row as u32;
            let left = column as f32 * self.tile_width;
            let top = row as f32 * row_stride;
            item.bounds = DipRect::new(left, top, left + self.tile_width, top + self.tile_height);
        }

        self.column_prefix_sums.clear();
        self.column_prefix_sums.reserve(self.columns + 1);
        for c in 0..=self.columns {
            self.column_prefix_sums
                .push((c * self.rows_per_column).min(items.len()));
        }

        tracing::trace!(
            target: "layout.pass",
            items = items.len(),
            columns = self.columns,
            rows = self.rows_per_column,
            tile_w = self.tile_width,
            tile_h = self.tile_height,
            "layout_performed"
        );
    }

    #[inline]
    pub fn row_stride(&self) -> f32 {
        self.tile_height + self.params.row_spacing_dip
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows_per_column(&self) -> usize {
        self.rows_per_column
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    pub fn column_prefix_sums(&self) -> &[usize] {
        &self.column_prefix_sums
    }

    /// Total content width; the horizontal scroll range is
    /// `0..=(content_width - client.width)`.
    pub fn content_width(&self) -> f32 {
        self.columns as f32 * self.tile_width
    }

    /// Whole columns that fit the viewport; page navigation steps by this.
    pub fn columns_per_viewport(&self) -> usize {
        if self.tile_width <= 0.0 {
            return 1;
        }
        ((self.client.width / self.tile_width) as usize).max(1)
    }

    pub fn max_scroll_offset(&self) -> f32 {
        (self.content_width() - self.client.width).max(0.0)
    }

    // -----------------------------------------------------------------
    // Viewport queries
    // -----------------------------------------------------------------

    /// Half-open index interval covered by the viewport at
    /// `horizontal_offset`. O(1) via the prefix sums.
    pub fn visible_item_range(&self, horizontal_offset: f32) -> Range<usize> {
        if self.item_count == 0 || self.tile_width <= 0.0 {
            return 0..0;
        }
        let first_col = ((horizontal_offset / self.tile_width).floor().max(0.0) as usize)
            .min(self.columns - 1);
        let last_edge = horizontal_offset + self.client.width;
        let last_col = if last_edge <= 0.0 {
            first_col
        } else {
            (((last_edge / self.tile_width).ceil() as usize).max(first_col + 1) - 1)
                .min(self.columns - 1)
        };
        self.column_prefix_sums[first_col]..self.column_prefix_sums[last_col + 1]
    }

    /// Item under a client-space point, if any. O(1).
    pub fn hit_test(&self, point: DipPoint, horizontal_offset: f32) -> Option<usize> {
        if self.item_count == 0 || self.tile_width <= 0.0 {
            return None;
        }
        let content_x = point.x + horizontal_offset;
        if content_x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (content_x / self.tile_width) as usize;
        if column >= self.columns {
            return None;
        }
        let row_stride = self.row_stride();
        let row = (point.y / row_stride) as usize;
        if row >= self.rows_per_column {
            return None;
        }
        // Between-row spacing is not part of any tile.
        if point.y - row as f32 * row_stride >= self.tile_height {
            return None;
        }
        let index = column * self.rows_per_column + row;
        (index < self.column_prefix_sums[column + 1]).then_some(index)
    }

    /// Offset that scrolls `index`'s column fully into view, or the current
    /// offset when it already is.
    pub fn ensure_visible_offset(&self, index: usize, horizontal_offset: f32) -> f32 {
        if self.item_count == 0 || index >= self.item_count {
            return horizontal_offset;
        }
        let column = index / self.rows_per_column;
        let left = column as f32 * self.tile_width;
        let right = left + self.tile_width;
        if left < horizontal_offset {
            left
        } else if right > horizontal_offset + self.client.width {
            (right - self.client.width).max(0.0)
        } else {
            horizontal_offset
        }
        .min(self.max_scroll_offset())
        .max(0.0)
    }

    // -----------------------------------------------------------------
    // Shaping tier
    // -----------------------------------------------------------------

    fn label_box_width(&self) -> f32 {
        let p = self.params;
        (self.tile_width - p.icon_size_dip - p.icon_text_gap_dip - 2.0 * p.tile_padding_dip)
            .max(1.0)
    }

    /// Create or refresh the shaped layouts for one item. UI thread.
    pub fn ensure_item_text_layout(&self, item: &mut Item, engine: &dyn TextEngine) {
        let m = self.metrics_or_default();
        let width = self.label_box_width();
        let label_h = m.line_height_dip;
        let secondary_h = m.line_height_dip * self.params.secondary_shrink;

        match &item.label_layout {
            None => {
                item.label_layout = Some(engine.create_layout(
                    item.name.as_str(),
                    TextLayoutKind::Label,
                    width,
                    label_h,
                ));
            }
            Some(layout) if layout.max_width() != width => {
                item.label_layout = Some(engine.update_layout_box(layout, width, label_h));
            }
            Some(_) => {}
        }

        if matches!(self.mode, DisplayMode::Detailed | DisplayMode::ExtraDetailed) {
            if item.details_text.is_none() {
                item.details_text = Some(format_details_line(item));
            }
            match &item.details_layout {
                None => {
                    item.details_layout = Some(engine.create_layout(
                        item.details_text.as_deref().unwrap_or(""),
                        TextLayoutKind::Details,
                        width,
                        secondary_h,
                    ));
                }
                Some(layout) if layout.max_width() != width => {
                    item.details_layout =
                        Some(engine.update_layout_box(layout, width, secondary_h));
                }
                Some(_) => {}
            }
        }

        if matches!(self.mode, DisplayMode::ExtraDetailed) {
            if item.metadata_text.is_none() {
                item.metadata_text = Some(format_attributes_line(item));
            }
            match &item.metadata_layout {
                None => {
                    item.metadata_layout = Some(engine.create_layout(
                        item.metadata_text.as_deref().unwrap_or(""),
                        TextLayoutKind::Metadata,
                        width,
                        secondary_h,
                    ));
                }
                Some(layout) if layout.max_width() != width => {
                    item.metadata_layout =
                        Some(engine.update_layout_box(layout, width, secondary_h));
                }
                Some(_) => {}
            }
        }
    }

    /// The half-open shaping window for a viewport range: deep buffer on
    /// the leading side of the scroll direction, shallow behind.
    pub fn shaping_window(&self, visible: &Range<usize>, direction: ScrollDirection) -> Range<usize> {
        let (back, forward) = match direction {
            ScrollDirection::Forward => (SHAPE_BUFFER_TRAILING, SHAPE_BUFFER_LEADING),
            ScrollDirection::Backward => (SHAPE_BUFFER_LEADING, SHAPE_BUFFER_TRAILING),
        };
        let start = visible.start.saturating_sub(back);
        let end = (visible.end + forward).min(self.item_count);
        start..end
    }

    /// Shape every item inside the windowed viewport range.
    pub fn update_item_text_layouts(
        &mut self,
        items: &mut [Item],
        engine: &dyn TextEngine,
        visible: Range<usize>,
        direction: ScrollDirection,
    ) {
        let window = self.shaping_window(&visible, direction);
        for item in &mut items[window] {
            self.ensure_item_text_layout(item, engine);
        }
    }

    // -----------------------------------------------------------------
    // Idle pre-shaping
    // -----------------------------------------------------------------

    /// One idle-timer tick: shape at most [`IDLE_BATCH_SIZE`] items that
    /// still lack a label layout. On oversized listings the cursor skips
    /// items outside the release keep-window; shaping them would only
    /// feed the release pass.
    pub fn idle_shape_batch(
        &mut self,
        items: &mut [Item],
        engine: &dyn TextEngine,
        visible: Range<usize>,
    ) -> IdleShapeOutcome {
        if self.idle_complete {
            return IdleShapeOutcome { created: 0, complete: true };
        }
        let keep = self.release_keep_window(items.len(), &visible);
        let mut created = 0usize;
        while self.idle_cursor < items.len() && created < IDLE_BATCH_SIZE {
            let i = self.idle_cursor;
            self.idle_cursor += 1;
            if let Some(keep) = &keep {
                if !keep.contains(&i) {
                    continue;
                }
            }
            if items[i].label_layout.is_none() {
                self.ensure_item_text_layout(&mut items[i], engine);
                created += 1;
            }
        }
        if self.idle_cursor >= items.len() {
            self.idle_complete = true;
        }
        IdleShapeOutcome { created, complete: self.idle_complete }
    }

    pub fn idle_shaping_complete(&self) -> bool {
        self.idle_complete
    }

    /// Restart idle shaping (after release or a shaping-relevant change).
    pub fn restart_idle_shaping(&mut self) {
        self.idle_cursor = 0;
        self.idle_complete = self.item_count == 0;
    }

    // -----------------------------------------------------------------
    // Distant-state release
    // -----------------------------------------------------------------

    fn release_keep_window(&self, count: usize, visible: &Range<usize>) -> Option<Range<usize>> {
        if count <= RELEASE_ITEM_THRESHOLD {
            return None;
        }
        let lo = visible.start.saturating_sub(RELEASE_KEEP_RADIUS);
        let hi = (visible.end + RELEASE_KEEP_RADIUS).min(count);
        Some(lo..hi)
    }

    /// Drop layouts, icons and secondary text for items far outside the
    /// viewport. Pure cache eviction; re-entering the window rebuilds
    /// everything lazily. Returns the number of items released.
    pub fn release_distant_state(&mut self, items: &mut [Item], visible: Range<usize>) -> usize {
        let Some(keep) = self.release_keep_window(items.len(), &visible) else {
            return 0;
        };
        let mut released = 0usize;
        for (i, item) in items.iter_mut().enumerate() {
            if keep.contains(&i) {
                continue;
            }
            if item.icon.is_some() || item.has_any_layout() || item.details_text.is_some() {
                item.release_heavy_state();
                released += 1;
            }
        }
        if released > 0 {
            tracing::debug!(
                target: "layout.release",
                released,
                keep_start = keep.start,
                keep_end = keep.end,
                "distant_state_released"
            );
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_icons::DeviceId;
    use core_model::TextLayoutHandle;
    use core_source::{ArenaString, FileAttributes};
    use std::cell::Cell;

    struct StubEngine {
        created: Cell<u64>,
    }

    impl StubEngine {
        fn new() -> Self {
            Self { created: Cell::new(0) }
        }
    }

    impl TextEngine for StubEngine {
        fn device_id(&self) -> DeviceId {
            DeviceId(1)
        }
        fn measure_sample(&self, sample: &str) -> EstimatedTextMetrics {
            EstimatedTextMetrics {
                mean_char_width_dip: 434.0 / sample.chars().count() as f32, // 7.0
                line_height_dip: 16.0,
            }
        }
        fn create_layout(
            &self,
            _text: &str,
            kind: TextLayoutKind,
            max_width: f32,
            max_height: f32,
        ) -> TextLayoutHandle {
            let id = self.created.get() + 1;
            self.created.set(id);
            TextLayoutHandle::new(DeviceId(1), kind, max_width, max_height, id)
        }
        fn update_layout_box(
            &self,
            layout: &TextLayoutHandle,
            max_width: f32,
            max_height: f32,
        ) -> TextLayoutHandle {
            TextLayoutHandle::new(DeviceId(1), layout.kind(), max_width, max_height, layout.resource())
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::from_entry(
                    ArenaString::detached(&format!("file{i:05}.txt")),
                    FileAttributes::empty(),
                    10,
                    0,
                    0,
                    i as u32,
                )
            })
            .collect()
    }

    fn engine_with(n: usize, client: DipSize) -> (LayoutEngine, Vec<Item>, StubEngine) {
        let stub = StubEngine::new();
        let mut engine = LayoutEngine::new(LayoutParams::default());
        engine.refresh_metrics(&stub);
        let mut v = items(n);
        engine.perform_layout(&mut v, client);
        (engine, v, stub)
    }

    #[test]
    fn prefix_sums_invariant() {
        let (engine, v, _) = engine_with(25, DipSize::new(400.0, 100.0));
        let sums = engine.column_prefix_sums();
        assert_eq!(sums.len(), engine.columns() + 1);
        assert_eq!(*sums.last().unwrap(), v.len());
        for c in 0..engine.columns() {
            assert_eq!(sums[c], (c * engine.rows_per_column()).min(v.len()));
        }
    }

    #[test]
    fn columns_fill_top_to_bottom() {
        let (engine, v, _) = engine_with(10, DipSize::new(800.0, 80.0));
        let rows = engine.rows_per_column();
        assert!(rows >= 2);
        assert_eq!(v[0].column, 0);
        assert_eq!(v[0].row, 0);
        assert_eq!(v[1].row, 1);
        assert_eq!(v[rows].column, 1);
        assert_eq!(v[rows].row, 0);
    }

    #[test]
    fn hit_test_center_round_trip() {
        let (engine, v, _) = engine_with(23, DipSize::new(300.0, 90.0));
        for offset in [0.0f32, engine.tile_width() * 1.5] {
            for (i, item) in v.iter().enumerate() {
                let center = item.bounds.center();
                let client = DipPoint::new(center.x - offset, center.y);
                if client.x < 0.0 || client.x >= 300.0 {
                    continue; // off-screen at this offset
                }
                assert_eq!(engine.hit_test(client, offset), Some(i), "item {i}");
            }
        }
    }

    #[test]
    fn hit_test_outside_any_tile() {
        let (engine, v, _) = engine_with(3, DipSize::new(300.0, 300.0));
        // Single column of 3 on a tall client: below the last item is empty.
        let below = DipPoint::new(4.0, v[2].bounds.bottom + engine.row_stride() * 2.0);
        assert_eq!(engine.hit_test(below, 0.0), None);
        // In the spacing gap between rows.
        let gap = DipPoint::new(4.0, v[0].bounds.bottom + 0.5);
        assert_eq!(engine.hit_test(gap, 0.0), None);
        // Past the last column.
        let right = DipPoint::new(engine.content_width() + 5.0, 4.0);
        assert_eq!(engine.hit_test(right, 0.0), None);
    }

    #[test]
    fn empty_layout() {
        let (engine, v, _) = engine_with(0, DipSize::new(300.0, 100.0));
        assert!(v.is_empty());
        assert_eq!(engine.visible_item_range(0.0), 0..0);
        assert_eq!(engine.hit_test(DipPoint::new(1.0, 1.0), 0.0), None);
        assert_eq!(engine.column_prefix_sums(), &[0]);
    }

    #[test]
    fn single_column_when_viewport_tall() {
        let (engine, _, _) = engine_with(5, DipSize::new(300.0, 1000.0));
        assert_eq!(engine.columns(), 1);
        assert!(engine.rows_per_column() >= 5);
        assert_eq!(engine.visible_item_range(0.0), 0..5);
    }

    #[test]
    fn tile_clamps_to_narrow_viewport() {
        let stub = StubEngine::new();
        let mut engine = LayoutEngine::new(LayoutParams::default());
        engine.refresh_metrics(&stub);
        let mut v = vec![Item::from_entry(
            ArenaString::detached(&"x".repeat(200)),
            FileAttributes::empty(),
            0,
            0,
            0,
            0,
        )];
        engine.perform_layout(&mut v, DipSize::new(120.0, 100.0));
        assert_eq!(engine.tile_width(), 120.0);
    }

    #[test]
    fn visible_range_tracks_offset() {
        let (engine, v, _) = engine_with(40, DipSize::new(engine_tile_width() * 2.0, 60.0));
        let rows = engine.rows_per_column();
        let tw = engine.tile_width();
        let r0 = engine.visible_item_range(0.0);
        assert_eq!(r0.start, 0);
        // Two columns and the partially visible third.
        assert!(r0.end >= rows * 2);
        let r2 = engine.visible_item_range(tw * 2.0);
        assert_eq!(r2.start, rows * 2);
        assert!(r2.end <= v.len());
    }

    // Helper for the test above: a representative tile width for 40 short
    // names under the default params and stub metrics.
    fn engine_tile_width() -> f32 {
        let (engine, _, _) = engine_with(40, DipSize::new(10_000.0, 60.0));
        engine.tile_width()
    }

    #[test]
    fn shaping_window_biases_by_direction() {
        let (engine, _, _) = engine_with(1_000, DipSize::new(300.0, 100.0));
        let visible = 500..520;
        let fwd = engine.shaping_window(&visible, ScrollDirection::Forward);
        assert_eq!(fwd, 500 - SHAPE_BUFFER_TRAILING..520 + SHAPE_BUFFER_LEADING);
        let back = engine.shaping_window(&visible, ScrollDirection::Backward);
        assert_eq!(back, 500 - SHAPE_BUFFER_LEADING..520 + SHAPE_BUFFER_TRAILING);
    }

    #[test]
    fn update_layouts_only_in_window() {
        let (mut engine, mut v, stub) = engine_with(1_000, DipSize::new(300.0, 100.0));
        let visible = engine.visible_item_range(0.0);
        engine.update_item_text_layouts(&mut v, &stub, visible.clone(), ScrollDirection::Forward);
        let window = engine.shaping_window(&visible, ScrollDirection::Forward);
        for (i, item) in v.iter().enumerate() {
            assert_eq!(item.label_layout.is_some(), window.contains(&i), "item {i}");
        }
    }

    #[test]
    fn ensure_reshapes_on_width_change() {
        let (mut engine, mut v, stub) = engine_with(4, DipSize::new(500.0, 200.0));
        engine.update_item_text_layouts(&mut v, &stub, 0..4, ScrollDirection::Forward);
        let before = v[0].label_layout.clone().unwrap();
        // Shrink the client so the tile (and the label box) narrows.
        engine.perform_layout(&mut v, DipSize::new(60.0, 200.0));
        engine.update_item_text_layouts(&mut v, &stub, 0..4, ScrollDirection::Forward);
        let after = v[0].label_layout.clone().unwrap();
        assert_ne!(before.max_width(), after.max_width());
    }

    #[test]
    fn detailed_mode_builds_secondary_layouts_and_text() {
        let (mut engine, mut v, stub) = engine_with(2, DipSize::new(500.0, 200.0));
        engine.set_display_mode(DisplayMode::ExtraDetailed);
        engine.update_item_text_layouts(&mut v, &stub, 0..2, ScrollDirection::Forward);
        assert!(v[0].details_layout.is_some());
        assert!(v[0].metadata_layout.is_some());
        assert!(v[0].details_text.as_deref().unwrap().contains("B"));
        assert_eq!(v[0].metadata_text.as_deref(), Some("-"));
    }

    #[test]
    fn idle_shaping_completes_in_batches() {
        let (mut engine, mut v, stub) = engine_with(40, DipSize::new(300.0, 100.0));
        let visible = engine.visible_item_range(0.0);
        let mut ticks = 0;
        loop {
            let out = engine.idle_shape_batch(&mut v, &stub, visible.clone());
            ticks += 1;
            assert!(out.created <= IDLE_BATCH_SIZE);
            if out.complete {
                break;
            }
            assert!(ticks < 100, "idle shaping did not converge");
        }
        assert!(v.iter().all(|i| i.label_layout.is_some()));
        // Further ticks are free no-ops.
        let out = engine.idle_shape_batch(&mut v, &stub, visible);
        assert_eq!(out, IdleShapeOutcome { created: 0, complete: true });
    }

    #[test]
    fn release_skips_small_listings() {
        let (mut engine, mut v, stub) = engine_with(100, DipSize::new(300.0, 100.0));
        engine.update_item_text_layouts(&mut v, &stub, 0..50, ScrollDirection::Forward);
        assert_eq!(engine.release_distant_state(&mut v, 0..10), 0);
    }

    #[test]
    fn release_drops_distant_heavy_state_only() {
        let (mut engine, mut v, stub) = engine_with(12_000, DipSize::new(300.0, 100.0));
        // Shape a far item and a near item.
        engine.ensure_item_text_layout(&mut v[11_000], &stub);
        engine.ensure_item_text_layout(&mut v[10], &stub);
        let visible = 0..30;
        let released = engine.release_distant_state(&mut v, visible);
        assert_eq!(released, 1);
        assert!(v[11_000].label_layout.is_none());
        assert!(v[10].label_layout.is_some());
    }

    #[test]
    fn idle_skips_outside_keep_window_on_huge_listings() {
        let (mut engine, mut v, stub) = engine_with(12_000, DipSize::new(300.0, 100.0));
        let visible = 0..30;
        // Drain the idle queue fully.
        while !engine.idle_shape_batch(&mut v, &stub, visible.clone()).complete {}
        assert!(v[RELEASE_KEEP_RADIUS + 100].label_layout.is_none());
        assert!(v[100].label_layout.is_some());
    }

    #[test]
    fn ensure_visible_offset_scrolls_minimally() {
        let (engine, _, _) = engine_with(60, DipSize::new(200.0, 60.0));
        let tw = engine.tile_width();
        let rows = engine.rows_per_column();
        // Item in column 5.
        let idx = 5 * rows;
        let off = engine.ensure_visible_offset(idx, 0.0);
        assert_eq!(off, (6.0 * tw - 200.0).max(0.0).min(engine.max_scroll_offset()));
        // Already visible: unchanged.
        assert_eq!(engine.ensure_visible_offset(0, 0.0), 0.0);
    }
}
