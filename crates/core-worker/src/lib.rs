//! The per-pane background worker.
//!
//! One thread per pane services two kinds of work behind a single mutex +
//! condvar:
//!
//! * **Enumeration** is latest-wins: a new request overwrites any pending
//!   one, and a generation counter (owned by the pane, bumped before every
//!   request or cancel) lets in-flight work discover it is stale at every
//!   phase boundary. Stale work returns without posting; cancellation is
//!   silent, never an error.
//! * **Icon loading** drains a deque of icon-index groups built on the UI
//!   thread in visibility order. The worker extracts each icon at most
//!   once per group and posts the handle back; conversion to a device
//!   bitmap stays on the UI thread.
//!
//! The worker owns no UI state. Everything it produces crosses back as an
//! owned [`UiMessage`] over an unbounded FIFO channel, and the receiver
//! takes ownership on dequeue.

mod enumerate;
mod worker;

pub use worker::{EnumerationWorker, WorkerConfig};

use core_icons::{DeviceId, IconExtractHandle};
use core_model::ListingPayload;
use std::collections::VecDeque;

/// Messages posted to the UI thread. FIFO; each carries owned data.
pub enum UiMessage {
    /// A finished (or failed) enumeration for the carried generation.
    ListingReady(ListingPayload),
    /// An extracted icon ready for device conversion and fan-out to the
    /// listed item indices.
    CreateIconBitmap {
        batch_id: u64,
        icon_index: i32,
        handle: IconExtractHandle,
        item_indices: Vec<usize>,
    },
    /// The icon deque ran dry for this batch.
    IconBatchDrained { batch_id: u64 },
}

impl std::fmt::Debug for UiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiMessage::ListingReady(p) => f
                .debug_struct("ListingReady")
                .field("generation", &p.generation)
                .field("items", &p.items.len())
                .finish(),
            UiMessage::CreateIconBitmap { batch_id, icon_index, item_indices, .. } => f
                .debug_struct("CreateIconBitmap")
                .field("batch_id", batch_id)
                .field("icon_index", icon_index)
                .field("items", &item_indices.len())
                .finish(),
            UiMessage::IconBatchDrained { batch_id } => f
                .debug_struct("IconBatchDrained")
                .field("batch_id", batch_id)
                .finish(),
        }
    }
}

/// A cluster of items sharing one icon index, serviced by one extraction.
#[derive(Debug, Clone)]
pub struct IconGroup {
    pub icon_index: i32,
    pub item_indices: Vec<usize>,
    pub has_visible_items: bool,
    /// Smallest visible item index, for front-of-queue ordering.
    pub first_visible_item_index: usize,
}

/// One icon-loading batch: groups in service order plus the device the
/// eventual bitmaps are for.
#[derive(Debug)]
pub struct IconBatch {
    pub batch_id: u64,
    pub device: DeviceId,
    pub icon_size_dip: f32,
    pub groups: VecDeque<IconGroup>,
}
