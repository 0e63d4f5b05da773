//! Partial-present gating.
//!
//! Flip-model rules, in order of authority:
//! * A swap chain must complete one successful *full* present before any
//!   partial present; until then every request degrades to full.
//! * Any present failure (or an explicit device reset) re-arms the gate:
//!   the next frame is a forced full present, and partials resume only
//!   after it succeeds.
//! * A scroll rect rides along only when the caller knows the frame is a
//!   pure integer-pixel shift; the gate never invents one.
//!
//! The gate itself does not talk to the device. It merges a
//! [`PresentRequest`] into a [`PresentPlan`] the renderer executes, and is
//! told the outcome, which keeps the policy testable without a swap chain.

use core_geometry::PxRect;

/// What the frame wants to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentRequest {
    Full,
    Partial { dirty: PxRect, scroll: Option<(PxRect, i32)> },
}

/// What the renderer must execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentPlan {
    Full,
    Partial { dirty: PxRect, scroll: Option<(PxRect, i32)> },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PresentStats {
    pub full_presents: u64,
    pub partial_presents: u64,
    pub degraded_to_full: u64,
    pub failures: u64,
}

#[derive(Debug, Default)]
pub struct PresentGate {
    full_succeeded: bool,
    force_full_next: bool,
    stats: PresentStats,
}

impl PresentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The swap chain was (re)created; nothing is on the backbuffer yet.
    pub fn reset(&mut self) {
        self.full_succeeded = false;
        self.force_full_next = true;
    }

    pub fn plan(&mut self, request: PresentRequest) -> PresentPlan {
        let must_full = self.force_full_next || !self.full_succeeded;
        match request {
            PresentRequest::Full => PresentPlan::Full,
            PresentRequest::Partial { .. } if must_full => {
                self.stats.degraded_to_full += 1;
                PresentPlan::Full
            }
            PresentRequest::Partial { dirty, scroll } => PresentPlan::Partial { dirty, scroll },
        }
    }

    pub fn note_success(&mut self, executed: &PresentPlan) {
        match executed {
            PresentPlan::Full => {
                self.full_succeeded = true;
                self.force_full_next = false;
                self.stats.full_presents += 1;
            }
            PresentPlan::Partial { .. } => {
                self.stats.partial_presents += 1;
            }
        }
    }

    pub fn note_failure(&mut self) {
        self.stats.failures += 1;
        self.reset();
        tracing::warn!(target: "render.present", "present_failed_forcing_full");
    }

    pub fn partials_allowed(&self) -> bool {
        self.full_succeeded && !self.force_full_next
    }

    pub fn stats(&self) -> PresentStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirty() -> PxRect {
        PxRect::new(0, 0, 10, 10)
    }

    #[test]
    fn first_frame_degrades_partial_to_full() {
        let mut gate = PresentGate::new();
        gate.reset();
        let plan = gate.plan(PresentRequest::Partial { dirty: dirty(), scroll: None });
        assert_eq!(plan, PresentPlan::Full);
        gate.note_success(&plan);
        assert!(gate.partials_allowed());
    }

    #[test]
    fn partial_allowed_after_successful_full() {
        let mut gate = PresentGate::new();
        gate.reset();
        let first = gate.plan(PresentRequest::Full);
        gate.note_success(&first);
        let plan = gate.plan(PresentRequest::Partial {
            dirty: dirty(),
            scroll: Some((PxRect::new(0, 0, 10, 100), 16)),
        });
        assert!(matches!(plan, PresentPlan::Partial { scroll: Some((_, 16)), .. }));
    }

    #[test]
    fn failure_forces_full_then_recovers() {
        let mut gate = PresentGate::new();
        gate.reset();
        let full = gate.plan(PresentRequest::Full);
        gate.note_success(&full);

        // A partial fails mid-flight.
        let partial = gate.plan(PresentRequest::Partial { dirty: dirty(), scroll: None });
        assert!(matches!(partial, PresentPlan::Partial { .. }));
        gate.note_failure();
        assert!(!gate.partials_allowed());

        // Next frame degrades, succeeds, and partials come back.
        let next = gate.plan(PresentRequest::Partial { dirty: dirty(), scroll: None });
        assert_eq!(next, PresentPlan::Full);
        gate.note_success(&next);
        let again = gate.plan(PresentRequest::Partial { dirty: dirty(), scroll: None });
        assert!(matches!(again, PresentPlan::Partial { .. }));
        assert_eq!(gate.stats().degraded_to_full, 2);
        assert_eq!(gate.stats().failures, 1);
    }
}
