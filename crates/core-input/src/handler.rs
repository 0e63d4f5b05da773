//! Key, mouse and wheel handling.
//!
//! Column-major navigation contract:
//! * `Up`/`Down` move within a column; `Left`/`Right` move to the
//!   neighboring column at the same row, clamped to that column's count.
//! * Plain navigation moves focus (and re-seats the anchor) without
//!   touching the selection; `Shift` extends a range from the anchor;
//!   `Space` toggles and advances.
//! * Every focus move ends with an ensure-visible scroll and a repaint.

use crate::search::{SearchController, find_backward, find_forward, name_matches};
use crate::{InputEffect, Key, KeyChord, Modifiers, MouseButton};
use core_geometry::DipPoint;
use core_layout::{LayoutEngine, ScrollDirection};
use core_model::FolderModel;
use std::time::Instant;

/// Overlay context the pane passes per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayGate {
    pub present: bool,
    pub blocks_input: bool,
    pub closable: bool,
    pub busy: bool,
}

/// Wheel units per column step (one detent on most mice).
const WHEEL_NOTCH: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectMode {
    FocusOnly,
    Range,
}

pub struct InputHandler {
    scroll_offset: f32,
    scroll_direction: ScrollDirection,
    wheel_accum: f32,
    search: SearchController,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0.0,
            scroll_direction: ScrollDirection::Forward,
            wheel_accum: 0.0,
            search: SearchController::new(),
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.scroll_direction
    }

    /// The pane re-clamps after relayout (item count or client changed).
    pub fn clamp_scroll(&mut self, layout: &LayoutEngine) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, layout.max_scroll_offset());
    }

    /// Programmatic scroll (ensure-visible after adoption or focus jumps).
    pub fn scroll_to(&mut self, offset: f32) {
        if offset != self.scroll_offset {
            self.scroll_direction = if offset > self.scroll_offset {
                ScrollDirection::Forward
            } else {
                ScrollDirection::Backward
            };
            self.scroll_offset = offset.max(0.0);
        }
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchController {
        &mut self.search
    }

    /// Current match range on the focused item, for the renderer.
    pub fn search_highlight(&self, model: &FolderModel) -> Option<(usize, std::ops::Range<usize>)> {
        if !self.search.is_active() || self.search.query().is_empty() {
            return None;
        }
        let index = model.focused_index()?;
        let range =
            crate::search::find_match_range(model.items()[index].name.as_str(), self.search.query())?;
        Some((index, range))
    }

    // -----------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------

    pub fn handle_key(
        &mut self,
        chord: KeyChord,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        overlay: OverlayGate,
        at_storage_root: bool,
        now: Instant,
    ) -> Vec<InputEffect> {
        let mut effects = Vec::new();

        if overlay.present && overlay.blocks_input {
            // A blocking overlay swallows everything except pane switch and
            // its own dismissal.
            match chord.key {
                Key::Tab => effects.push(InputEffect::SwitchPane),
                Key::Esc if overlay.busy => effects.push(InputEffect::CancelEnumeration),
                Key::Esc if overlay.closable => effects.push(InputEffect::DismissOverlay),
                _ => {}
            }
            return effects;
        }

        if self.search.is_active() && self.handle_search_key(chord, model, layout, now, &mut effects)
        {
            return effects;
        }

        match (chord.key, chord.mods) {
            (Key::Char(c), mods)
                if !mods.contains(Modifiers::CTRL) && !c.is_control() =>
            {
                self.begin_search(c, model, layout, now, &mut effects);
            }
            (Key::Char(c), mods)
                if mods.contains(Modifiers::CTRL) && c.eq_ignore_ascii_case(&'a') =>
            {
                model.select_all();
                effects.push(InputEffect::Invalidate);
            }
            (Key::Up, mods) => self.navigate(model, layout, NavTarget::RowDelta(-1), mods, &mut effects),
            (Key::Down, mods) => self.navigate(model, layout, NavTarget::RowDelta(1), mods, &mut effects),
            (Key::Left, mods) => self.navigate(model, layout, NavTarget::ColumnDelta(-1), mods, &mut effects),
            (Key::Right, mods) => self.navigate(model, layout, NavTarget::ColumnDelta(1), mods, &mut effects),
            (Key::PageUp, mods) => {
                let page = layout.columns_per_viewport() as isize;
                self.navigate(model, layout, NavTarget::ColumnDelta(-page), mods, &mut effects);
            }
            (Key::PageDown, mods) => {
                let page = layout.columns_per_viewport() as isize;
                self.navigate(model, layout, NavTarget::ColumnDelta(page), mods, &mut effects);
            }
            (Key::Home, mods) => self.navigate(model, layout, NavTarget::First, mods, &mut effects),
            (Key::End, mods) => self.navigate(model, layout, NavTarget::Last, mods, &mut effects),
            (Key::Space, _) => {
                if let Some(focus) = model.focused_index() {
                    model.toggle_selection(focus);
                    let next = (focus + 1).min(model.len().saturating_sub(1));
                    model.set_focus(Some(next));
                    self.scroll_to_item(layout, next, &mut effects);
                    effects.push(InputEffect::Invalidate);
                }
            }
            (Key::Enter, _) => {
                if let Some(focus) = model.focused_index() {
                    effects.push(InputEffect::ActivateItem(focus));
                }
            }
            (Key::Backspace, _) => {
                effects.push(if at_storage_root {
                    InputEffect::NavigateUpFromRoot
                } else {
                    InputEffect::NavigateToParent
                });
            }
            (Key::Tab, _) => effects.push(InputEffect::SwitchPane),
            (Key::Delete, _) => {
                if model.stats().total_selected() > 0 || model.focused_index().is_some() {
                    effects.push(InputEffect::RequestDeleteSelection);
                }
            }
            (Key::Esc, _) => {
                if overlay.present && overlay.closable {
                    effects.push(InputEffect::DismissOverlay);
                } else {
                    model.clear_selection();
                    effects.push(InputEffect::Invalidate);
                }
            }
            _ => {}
        }
        effects
    }

    /// Returns true when the chord was consumed by search mode.
    fn handle_search_key(
        &mut self,
        chord: KeyChord,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        now: Instant,
        effects: &mut Vec<InputEffect>,
    ) -> bool {
        match (chord.key, chord.mods) {
            (Key::Char(c), mods) if !mods.contains(Modifiers::CTRL) && !c.is_control() => {
                self.search.push_char(c, now);
                // Inclusive scan: a focus that still matches stays put.
                let start = model.focused_index().unwrap_or(0);
                match self.find_search_match(model, start, true) {
                    Some(hit) => self.focus_search_hit(model, layout, hit, effects),
                    None => self.search.revert_char(),
                }
                effects.push(InputEffect::SearchChanged);
                true
            }
            (Key::Backspace, _) => {
                self.search.pop_char(now);
                effects.push(InputEffect::SearchChanged);
                true
            }
            (Key::Right | Key::Down, _) => {
                let start = model.focused_index().map_or(0, |i| i + 1);
                if let Some(hit) = self.find_search_match(model, start % model.len().max(1), true) {
                    self.focus_search_hit(model, layout, hit, effects);
                }
                effects.push(InputEffect::SearchChanged);
                true
            }
            (Key::Left | Key::Up, _) => {
                let count = model.len();
                if count > 0 {
                    let start = model
                        .focused_index()
                        .map_or(count - 1, |i| (i + count - 1) % count);
                    if let Some(hit) = self.find_search_match(model, start, false) {
                        self.focus_search_hit(model, layout, hit, effects);
                    }
                }
                effects.push(InputEffect::SearchChanged);
                true
            }
            (Key::Esc, _) => {
                self.search.close(now);
                effects.push(InputEffect::SearchChanged);
                effects.push(InputEffect::Invalidate);
                true
            }
            // Anything else leaves search mode and handles normally.
            _ => {
                self.search.close(now);
                effects.push(InputEffect::SearchChanged);
                false
            }
        }
    }

    fn begin_search(
        &mut self,
        first: char,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        now: Instant,
        effects: &mut Vec<InputEffect>,
    ) {
        self.search.begin(now);
        self.search.push_char(first, now);
        let start = model.focused_index().unwrap_or(0);
        match self.find_search_match(model, start, true) {
            Some(hit) => self.focus_search_hit(model, layout, hit, effects),
            None => self.search.revert_char(),
        }
        effects.push(InputEffect::SearchChanged);
    }

    fn find_search_match(&self, model: &FolderModel, start: usize, forward: bool) -> Option<usize> {
        let query = self.search.query();
        if query.is_empty() {
            return None;
        }
        let matches = |i: usize| name_matches(model.items()[i].name.as_str(), query);
        if forward {
            find_forward(model.len(), start, matches)
        } else {
            find_backward(model.len(), start, matches)
        }
    }

    fn focus_search_hit(
        &mut self,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        hit: usize,
        effects: &mut Vec<InputEffect>,
    ) {
        model.set_focus(Some(hit));
        self.scroll_to_item(layout, hit, effects);
        effects.push(InputEffect::Invalidate);
    }

    // -----------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------

    fn navigate(
        &mut self,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        target: NavTarget,
        mods: Modifiers,
        effects: &mut Vec<InputEffect>,
    ) {
        if model.is_empty() {
            return;
        }
        let current = model.focused_index().unwrap_or(0);
        let new_index = resolve_nav_target(layout, model.len(), current, target);
        let mode = if mods.contains(Modifiers::SHIFT) { SelectMode::Range } else { SelectMode::FocusOnly };
        self.apply_focus_move(model, layout, new_index, mode, effects);
    }

    fn apply_focus_move(
        &mut self,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        index: usize,
        mode: SelectMode,
        effects: &mut Vec<InputEffect>,
    ) {
        match mode {
            SelectMode::FocusOnly => {
                model.set_focus(Some(index));
                // A later Shift+move ranges from here.
                model.set_anchor(Some(index));
            }
            SelectMode::Range => model.range_select(index),
        }
        self.scroll_to_item(layout, index, effects);
        effects.push(InputEffect::Invalidate);
    }

    fn scroll_to_item(&mut self, layout: &LayoutEngine, index: usize, effects: &mut Vec<InputEffect>) {
        let target = layout.ensure_visible_offset(index, self.scroll_offset);
        if target != self.scroll_offset {
            self.scroll_direction = if target > self.scroll_offset {
                ScrollDirection::Forward
            } else {
                ScrollDirection::Backward
            };
            self.scroll_offset = target;
            effects.push(InputEffect::ScrollTo(target));
        }
    }

    // -----------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------

    pub fn handle_mouse_down(
        &mut self,
        point: DipPoint,
        _button: MouseButton,
        mods: Modifiers,
        click_count: u32,
        model: &mut FolderModel,
        layout: &LayoutEngine,
        now: Instant,
    ) -> Vec<InputEffect> {
        let mut effects = Vec::new();
        if self.search.is_active() {
            self.search.close(now);
            effects.push(InputEffect::SearchChanged);
        }
        match layout.hit_test(point, self.scroll_offset) {
            Some(index) => {
                if mods.contains(Modifiers::CTRL) {
                    model.toggle_selection(index);
                } else if mods.contains(Modifiers::SHIFT) {
                    model.range_select(index);
                } else {
                    model.select_single(index);
                }
                effects.push(InputEffect::Invalidate);
                if click_count >= 2 && !mods.intersects(Modifiers::CTRL | Modifiers::SHIFT) {
                    effects.push(InputEffect::ActivateItem(index));
                }
            }
            None => {
                model.clear_selection();
                effects.push(InputEffect::Invalidate);
            }
        }
        effects
    }

    pub fn handle_mouse_move(
        &mut self,
        point: DipPoint,
        model: &mut FolderModel,
        layout: &LayoutEngine,
    ) -> Vec<InputEffect> {
        let mut effects = Vec::new();
        let old = model.hover_index();
        let new = layout.hit_test(point, self.scroll_offset);
        if model.set_hover(new) {
            if let Some(i) = old {
                effects.push(InputEffect::InvalidateItem(i));
            }
            if let Some(i) = new {
                effects.push(InputEffect::InvalidateItem(i));
            }
        }
        effects
    }

    // -----------------------------------------------------------------
    // Wheel
    // -----------------------------------------------------------------

    /// Vertical wheel delta (in 120-unit detents) maps to horizontal
    /// column scroll; `shift` inverts. Offsets snap to column boundaries
    /// and fractional detents accumulate.
    pub fn handle_wheel(&mut self, delta: f32, shift: bool, layout: &LayoutEngine) -> Vec<InputEffect> {
        let tile = layout.tile_width();
        if tile <= 0.0 {
            return Vec::new();
        }
        let effective = if shift { delta } else { -delta };
        self.wheel_accum += effective / WHEEL_NOTCH;
        let whole = self.wheel_accum.trunc();
        if whole == 0.0 {
            return Vec::new();
        }
        self.wheel_accum -= whole;

        // Column-boundary arithmetic: the highest boundary is the first one
        // at or past the max offset, so the last column is fully reachable.
        let max_column = (layout.max_scroll_offset() / tile).ceil();
        let snapped_current = (self.scroll_offset / tile).round();
        let target_column = (snapped_current + whole).clamp(0.0, max_column);
        let target = target_column * tile;
        if target == self.scroll_offset {
            return Vec::new();
        }
        self.scroll_direction =
            if target > self.scroll_offset { ScrollDirection::Forward } else { ScrollDirection::Backward };
        self.scroll_offset = target;
        vec![InputEffect::ScrollTo(target), InputEffect::Invalidate]
    }
}

#[derive(Debug, Clone, Copy)]
enum NavTarget {
    RowDelta(isize),
    ColumnDelta(isize),
    First,
    Last,
}

/// Column-major index arithmetic for the navigation keys.
fn resolve_nav_target(
    layout: &LayoutEngine,
    count: usize,
    current: usize,
    target: NavTarget,
) -> usize {
    let rows = layout.rows_per_column().max(1);
    match target {
        NavTarget::First => 0,
        NavTarget::Last => count - 1,
        NavTarget::RowDelta(delta) => {
            let row = current % rows;
            let new_row = row as isize + delta;
            let column_start = current - row;
            let column_len = rows.min(count - column_start);
            let new_row = new_row.clamp(0, column_len as isize - 1) as usize;
            column_start + new_row
        }
        NavTarget::ColumnDelta(delta) => {
            let columns = count.div_ceil(rows) as isize;
            let column = (current / rows) as isize;
            let row = current % rows;
            let new_column = (column + delta).clamp(0, columns - 1);
            let column_start = new_column as usize * rows;
            let column_len = rows.min(count - column_start);
            column_start + row.min(column_len - 1)
        }
    }
}
