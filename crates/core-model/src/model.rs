//! `FolderModel`: the UI thread's authoritative item list.

use crate::item::{Item, ListingPayload};
use crate::selection::SelectionStats;
use crate::sort::{SortBy, SortDirection, sort_items};
use ahash::AHashMap;
use core_source::NameArena;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What an adoption did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdoptOutcome {
    pub total: usize,
    /// Items that inherited cached icon/layout state from the previous
    /// listing of the same folder.
    pub transferred: usize,
    pub focused_index: Option<usize>,
}

pub struct FolderModel {
    items: Vec<Item>,
    /// Keeps every item name alive; replaced atomically on adoption.
    arena: Arc<NameArena>,
    folder: Option<PathBuf>,
    sort_by: SortBy,
    sort_direction: SortDirection,
    focused_index: Option<usize>,
    anchor_index: Option<usize>,
    hover_index: Option<usize>,
    stats: SelectionStats,
    selection_changed: bool,
}

impl Default for FolderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderModel {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            arena: Arc::new(NameArena::default()),
            folder: None,
            sort_by: SortBy::default(),
            sort_direction: SortDirection::default(),
            focused_index: None,
            anchor_index: None,
            hover_index: None,
            stats: SelectionStats::default(),
            selection_changed: false,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Mutable access for the layout engine and icon apply paths. Callers
    /// must not reorder or remove items.
    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn sort(&self) -> (SortBy, SortDirection) {
        (self.sort_by, self.sort_direction)
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    pub fn anchor_index(&self) -> Option<usize> {
        self.anchor_index
    }

    pub fn hover_index(&self) -> Option<usize> {
        self.hover_index
    }

    pub fn set_hover(&mut self, index: Option<usize>) -> bool {
        let index = index.filter(|&i| i < self.items.len());
        let changed = self.hover_index != index;
        self.hover_index = index;
        changed
    }

    pub fn stats(&self) -> &SelectionStats {
        &self.stats
    }

    /// One-shot change notification, consumed by the pane to fire its
    /// `selection_changed` callback.
    pub fn take_selection_changed(&mut self) -> bool {
        std::mem::take(&mut self.selection_changed)
    }

    pub fn focused_name(&self) -> Option<&str> {
        self.focused_index.map(|i| self.items[i].name.as_str())
    }

    // ---------------------------------------------------------------------
    // Adoption
    // ---------------------------------------------------------------------

    /// Replace the listing with a freshly enumerated payload.
    ///
    /// When the payload re-lists the folder already shown, cached per-item
    /// state (icon, layouts, details text, selection) transfers to new
    /// items whose identity tuple is unchanged, so a refresh does not
    /// flash blank tiles or lose the user's selection.
    ///
    /// Ordering matters: the new items (borrowing the new arena) are moved
    /// in place *before* the binding of the old arena is dropped, and the
    /// old items (with their layouts) go with it only at function exit.
    pub fn adopt_payload(
        &mut self,
        payload: ListingPayload,
        fallback_focus: Option<usize>,
    ) -> AdoptOutcome {
        let same_folder = self.folder.as_deref() == Some(payload.folder.as_path());
        let previous_focus_name = self.focused_name().map(str::to_owned);
        let had_focus = self.focused_index.is_some();

        let mut new_items = payload.items;
        let mut transferred = 0usize;

        if same_folder && !self.items.is_empty() {
            let old_by_name: AHashMap<&str, usize> = self
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| (item.name.as_str(), i))
                .collect();
            for item in new_items.iter_mut() {
                let Some(&old_index) = old_by_name.get(item.name.as_str()) else {
                    continue;
                };
                let old = &self.items[old_index];
                if old.refresh_key() != item.refresh_key() {
                    continue;
                }
                item.icon = old.icon.clone();
                item.label_layout = old.label_layout.clone();
                item.details_layout = old.details_layout.clone();
                item.metadata_layout = old.metadata_layout.clone();
                item.details_text = old.details_text.clone();
                item.metadata_text = old.metadata_text.clone();
                item.selected = old.selected;
                transferred += 1;
            }
        }

        // Swap in the new listing; the old arena stays alive until the old
        // items (holding views into it) drop at end of scope.
        let old_items = std::mem::replace(&mut self.items, new_items);
        self.arena = payload.arena;
        self.folder = Some(payload.folder);

        for (i, item) in self.items.iter_mut().enumerate() {
            item.unsorted_order = i as u32;
            item.focused = false;
        }
        sort_items(&mut self.items, self.sort_by, self.sort_direction);

        // Focus resolution: previous name → first selected → fallback → 0.
        self.focused_index = None;
        self.anchor_index = None;
        self.hover_index = None;
        if !self.items.is_empty() && (had_focus || fallback_focus.is_some()) {
            let resolved = previous_focus_name
                .as_deref()
                .and_then(|name| self.index_of_name(name))
                .or_else(|| self.items.iter().position(|i| i.selected))
                .or_else(|| fallback_focus.filter(|&i| i < self.items.len()))
                .unwrap_or(0);
            self.set_focus(Some(resolved));
            self.anchor_index = Some(resolved);
        }

        self.recompute_stats();
        drop(old_items);

        let outcome = AdoptOutcome {
            total: self.items.len(),
            transferred,
            focused_index: self.focused_index,
        };
        tracing::debug!(
            target: "model.adopt",
            total = outcome.total,
            transferred,
            same_folder,
            "payload_adopted"
        );
        outcome
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.name.as_str() == name)
    }

    /// Drop the listing entirely (navigation to "no folder").
    pub fn clear(&mut self) {
        self.items.clear();
        self.arena = Arc::new(NameArena::default());
        self.folder = None;
        self.focused_index = None;
        self.anchor_index = None;
        self.hover_index = None;
        self.recompute_stats();
    }

    // ---------------------------------------------------------------------
    // Sorting
    // ---------------------------------------------------------------------

    pub fn apply_sort(&mut self, by: SortBy, direction: SortDirection) {
        self.sort_by = by;
        self.sort_direction = direction;
        let focused_name = self.focused_name().map(str::to_owned);
        let anchor_name = self
            .anchor_index
            .map(|i| self.items[i].name.as_str().to_owned());
        sort_items(&mut self.items, by, direction);
        self.focused_index = focused_name.as_deref().and_then(|n| self.index_of_name(n));
        self.anchor_index = anchor_name.as_deref().and_then(|n| self.index_of_name(n));
        self.hover_index = None;
    }

    // ---------------------------------------------------------------------
    // Focus & selection algebra
    // ---------------------------------------------------------------------

    /// Re-seat the range anchor (plain navigation and clicks do this).
    pub fn set_anchor(&mut self, index: Option<usize>) {
        self.anchor_index = index.filter(|&i| i < self.items.len());
    }

    pub fn set_focus(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.items.len());
        if let Some(old) = self.focused_index {
            if let Some(item) = self.items.get_mut(old) {
                item.focused = false;
            }
        }
        if let Some(i) = index {
            self.items[i].focused = true;
        }
        self.focused_index = index;
    }

    pub fn select_single(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        for item in &mut self.items {
            item.selected = false;
        }
        self.items[index].selected = true;
        self.set_focus(Some(index));
        self.anchor_index = Some(index);
        self.recompute_stats();
    }

    pub fn toggle_selection(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        self.items[index].selected = !self.items[index].selected;
        self.set_focus(Some(index));
        self.recompute_stats();
    }

    /// Select the inclusive range between the anchor and `index`; the
    /// anchor stays put so repeated shift-presses re-derive the range.
    pub fn range_select(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        let anchor = self.anchor_index.unwrap_or(index);
        let (lo, hi) = (anchor.min(index), anchor.max(index));
        for (i, item) in self.items.iter_mut().enumerate() {
            item.selected = i >= lo && i <= hi;
        }
        self.set_focus(Some(index));
        self.recompute_stats();
    }

    pub fn clear_selection(&mut self) {
        let any = self.items.iter().any(|i| i.selected);
        for item in &mut self.items {
            item.selected = false;
        }
        if any {
            self.recompute_stats();
        }
    }

    pub fn select_all(&mut self) {
        for item in &mut self.items {
            item.selected = true;
        }
        self.recompute_stats();
    }

    /// Apply `predicate` to every display name. `replace == true` rewrites
    /// the selection; otherwise matching items are added to it.
    pub fn select_by_predicate(&mut self, predicate: &dyn Fn(&str) -> bool, replace: bool) {
        for item in &mut self.items {
            let hit = predicate(item.name.as_str());
            item.selected = if replace { hit } else { item.selected || hit };
        }
        self.recompute_stats();
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.selected.then_some(i))
            .collect()
    }

    fn recompute_stats(&mut self) {
        let stats = SelectionStats::compute(&self.items);
        if stats != self.stats {
            self.stats = stats;
            self.selection_changed = true;
        }
    }

    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        if let Some(i) = self.focused_index {
            debug_assert!(i < self.items.len());
            debug_assert!(self.items[i].focused);
        }
        debug_assert!(self.items.iter().filter(|i| i.focused).count() <= 1);
        if let Some(i) = self.anchor_index {
            debug_assert!(i < self.items.len());
        }
    }
}
