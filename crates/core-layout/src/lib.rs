//! Column-major tile layout with lazy text shaping.
//!
//! Layout runs in two tiers so a 50,000-item folder stays interactive:
//!
//! * The *estimate* tier touches every item but does only arithmetic:
//!   name length times the mean glyph width from a once-per-DPI
//!   measurement sample. It produces tile geometry, column assignment and
//!   the prefix sums that make viewport queries and hit tests O(1).
//! * The *shaping* tier creates real text layouts, and only for items
//!   inside a window around the viewport, biased toward the scroll
//!   direction. An idle timer finishes the rest in small batches, and a
//!   release pass drops layouts (and icons) for items far away again.
//!
//! Invariants:
//! * `column_prefix_sums.len() == columns + 1`;
//!   `column_prefix_sums[columns] == item_count`;
//!   `column_prefix_sums[c]` counts items in columns `< c`.
//! * `rows_per_column >= 1` whenever a layout exists.
//! * `hit_test(center(bounds(i))) == Some(i)` for every laid-out item.
//! * Shaping/release never changes geometry; they touch caches only.

mod details;
mod engine;

pub use details::{format_attributes_line, format_details_line, format_size_human};
pub use engine::{
    IDLE_BATCH_SIZE, IdleShapeOutcome, LayoutEngine, LayoutParams, RELEASE_ITEM_THRESHOLD,
    RELEASE_KEEP_RADIUS, SHAPE_BUFFER_LEADING, SHAPE_BUFFER_TRAILING, ScrollDirection,
};

/// Fixed 62-character alphanumeric sample measured once per DPI change.
pub const METRICS_SAMPLE: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
