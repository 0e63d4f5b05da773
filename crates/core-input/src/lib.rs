//! Input translation: host events → model mutations + pane effects.
//!
//! Handlers run on the UI thread, serialized with rendering. They mutate
//! the model/scroll state directly and return [`InputEffect`]s for
//! everything that crosses the pane boundary (host callbacks, enumeration
//! cancellation, repaint requests). The pane drains the effect list in
//! order; effects never re-enter the handler.
//!
//! Key semantics live in `handler.rs`; the incremental-search state machine
//! in `search.rs`.

mod handler;
mod search;

pub use handler::{InputHandler, OverlayGate};
pub use search::{SearchController, find_match_range};

use bitflags::bitflags;

/// Logical key identities the pane reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b001;
        const SHIFT = 0b010;
        const ALT   = 0b100;
    }
}

/// A key with its modifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self { key, mods: Modifiers::empty() }
    }

    pub fn shift(key: Key) -> Self {
        Self { key, mods: Modifiers::SHIFT }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, mods: Modifiers::CTRL }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Everything a handler can ask the pane to do.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEffect {
    /// Repaint everything.
    Invalidate,
    /// Repaint one item's tile.
    InvalidateItem(usize),
    /// Horizontal scroll to the given offset (already column-snapped).
    ScrollTo(f32),
    /// Enter / double-click on an item: descend or open.
    ActivateItem(usize),
    /// Backspace away from a non-root folder.
    NavigateToParent,
    /// Backspace at the storage root; the host takes over.
    NavigateUpFromRoot,
    /// Tab.
    SwitchPane,
    /// Delete key with a live selection.
    RequestDeleteSelection,
    /// Esc on a closable overlay.
    DismissOverlay,
    /// Esc on the busy overlay: bump the generation, drop the work.
    CancelEnumeration,
    /// The incremental-search state changed (query, match, or visibility).
    SearchChanged,
}
