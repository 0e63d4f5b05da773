//! Pixel-space damage accumulation.
//!
//! Producers mark rects (an item's tile, the overlay area, everything);
//! `take` coalesces them into a single invalid rect clamped to the client,
//! one-shot. Coalescing to the bounding rect trades precision for a single
//! dirty rect per present, which is what the flip-model path wants.
//!
//! Invariants:
//! * After `take`, the tracker is empty.
//! * A `mark_all` dominates every narrower mark until consumed.

use core_geometry::PxRect;

#[derive(Debug, Default)]
pub struct DamageTracker {
    bounds: PxRect,
    full: bool,
    any: bool,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_rect(&mut self, rect: PxRect) {
        if rect.is_empty() {
            return;
        }
        self.bounds = self.bounds.union(&rect);
        self.any = true;
    }

    pub fn mark_all(&mut self) {
        self.full = true;
        self.any = true;
    }

    pub fn is_empty(&self) -> bool {
        !self.any
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Consume the accumulated damage, clamped to a client of
    /// `width × height` pixels. `None` when nothing was marked or the
    /// damage lies entirely outside the client.
    pub fn take(&mut self, width: i32, height: i32) -> Option<PxRect> {
        if !self.any {
            return None;
        }
        let result = if self.full {
            PxRect::new(0, 0, width, height)
        } else {
            self.bounds.clamp_to(width, height)
        };
        self.bounds = PxRect::default();
        self.full = false;
        self.any = false;
        if result.is_empty() { None } else { Some(result) }
    }
}
