//! Alert overlay: busy debounce, error taxonomy, animation ticks.
//!
//! State machine rules:
//! * An enumeration request *arms* the busy overlay; it only becomes
//!   visible if 300 ms pass without a completion. Fast folders never
//!   flash.
//! * Cancelling a busy enumeration swaps the busy overlay for a closable
//!   "Enumeration canceled" note (the generation bump happens in the pane,
//!   not here).
//! * Enumeration failures map onto a fixed taxonomy: unreachable network
//!   is an informational "Disconnected", credential and certificate
//!   problems are errors with their own titles, and everything else is a
//!   generic enumeration error.
//! * A blocking overlay swallows input except pane switch and Esc; the
//!   input crate enforces that, this crate just carries the flags.

mod dispatcher;

pub use dispatcher::{ANIMATION_TICK, AnimationDispatcher};

use core_source::SourceError;
use std::time::{Duration, Instant};

/// Delay before an in-progress enumeration is worth an overlay.
pub const BUSY_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Busy,
    Enumeration,
    Operation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    pub kind: OverlayKind,
    pub severity: OverlaySeverity,
    pub title: String,
    pub message: String,
    pub closable: bool,
    pub blocks_input: bool,
    pub shown_at: Instant,
}

impl OverlayState {
    pub fn is_busy(&self) -> bool {
        self.kind == OverlayKind::Busy
    }
}

/// Map an enumeration failure onto overlay severity/title.
pub fn classify_enumeration_error(error: &SourceError, now: Instant) -> OverlayState {
    let (severity, title, closable) = match error {
        SourceError::Disconnected(_) => (OverlaySeverity::Information, "Disconnected", false),
        SourceError::AuthFailed(_) => (OverlaySeverity::Error, "Login failed", true),
        SourceError::CertificateFailed(_) => (OverlaySeverity::Error, "Certificate failed", true),
        SourceError::AccessDenied(_) => (OverlaySeverity::Error, "Access denied", true),
        _ => (OverlaySeverity::Error, "Enumeration failed", true),
    };
    OverlayState {
        kind: OverlayKind::Enumeration,
        severity,
        title: title.to_owned(),
        message: error.to_string(),
        closable,
        blocks_input: true,
        shown_at: now,
    }
}

#[derive(Debug, Default)]
pub struct OverlayController {
    current: Option<OverlayState>,
    busy_armed_at: Option<Instant>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&OverlayState> {
        self.current.as_ref()
    }

    /// Arm the busy debounce timer for a just-requested enumeration.
    pub fn arm_busy(&mut self, now: Instant) {
        self.busy_armed_at = Some(now);
        // A previous enumeration overlay is obsolete the moment a new
        // enumeration starts.
        if matches!(
            self.current,
            Some(OverlayState { kind: OverlayKind::Busy | OverlayKind::Enumeration, .. })
        ) {
            self.current = None;
        }
    }

    /// Completion (success path): kill the timer and any busy overlay.
    pub fn enumeration_completed(&mut self) -> bool {
        self.busy_armed_at = None;
        if matches!(self.current, Some(ref s) if s.is_busy()) {
            self.current = None;
            return true;
        }
        false
    }

    /// Debounce tick; returns true when the busy overlay just appeared.
    pub fn tick_busy(&mut self, now: Instant) -> bool {
        let Some(armed) = self.busy_armed_at else {
            return false;
        };
        if now.saturating_duration_since(armed) < BUSY_DEBOUNCE {
            return false;
        }
        self.busy_armed_at = None;
        tracing::debug!(target: "overlay", "busy_overlay_shown");
        self.current = Some(OverlayState {
            kind: OverlayKind::Busy,
            severity: OverlaySeverity::Information,
            title: "Reading folder…".to_owned(),
            message: "This location is taking a while.".to_owned(),
            closable: false,
            blocks_input: true,
            shown_at: now,
        });
        true
    }

    /// The busy overlay's Cancel: swap to the canceled note. The caller
    /// bumps the enumeration generation; the stale worker result is then
    /// dropped silently.
    pub fn busy_canceled(&mut self, now: Instant) {
        self.busy_armed_at = None;
        tracing::info!(target: "overlay", "enumeration_canceled");
        self.current = Some(OverlayState {
            kind: OverlayKind::Enumeration,
            severity: OverlaySeverity::Information,
            title: "Enumeration canceled".to_owned(),
            message: "The folder listing was canceled.".to_owned(),
            closable: true,
            blocks_input: false,
            shown_at: now,
        });
    }

    pub fn show_enumeration_error(&mut self, error: &SourceError, now: Instant) {
        self.busy_armed_at = None;
        let state = classify_enumeration_error(error, now);
        tracing::info!(
            target: "overlay",
            title = state.title.as_str(),
            severity = ?state.severity,
            "enumeration_error_overlay"
        );
        self.current = Some(state);
    }

    pub fn show_operation_error(&mut self, title: &str, message: String, now: Instant) {
        self.current = Some(OverlayState {
            kind: OverlayKind::Operation,
            severity: OverlaySeverity::Error,
            title: title.to_owned(),
            message,
            closable: true,
            blocks_input: false,
            shown_at: now,
        });
    }

    /// Esc on a closable overlay. Returns true when something closed.
    pub fn dismiss(&mut self) -> bool {
        match &self.current {
            Some(state) if state.closable => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Clear unconditionally (navigation away, pane teardown).
    pub fn clear(&mut self) {
        self.current = None;
        self.busy_armed_at = None;
    }

    pub fn busy_timer_armed(&self) -> bool {
        self.busy_armed_at.is_some()
    }
}
