//! `FolderPane` assembly and event plumbing.

use crate::icon_flow::{apply_bitmap_to_items, build_icon_groups, visible_icon_indices};
use crate::{NavigationRequest, PaneCallbacks, ViewFileRequest};
use core_config::{
    DisplayModeSetting, PaneSettings, SortDirectionSetting, SortFieldSetting,
};
use core_geometry::{DipPoint, DipSize, Scale};
use core_icons::IconCache;
use core_input::{InputEffect, InputHandler, KeyChord, Modifiers, MouseButton, OverlayGate};
use core_layout::{LayoutEngine, LayoutParams};
use core_model::{
    DisplayMode, FocusMemory, FolderModel, ListingPayload, ListingStatus, SortBy, SortDirection,
    TextEngine,
};
use core_overlay::{OverlayController, OverlaySeverity, OverlayState};
use core_render::{
    Color, Device, DeviceFactory, FrameParams, OverlayPanel, Renderer, RenderError,
    SearchHighlight, SearchPill, Theme,
};
use core_source::{BorrowMode, DirectoryListingSource, FileOperationFlags, FileOperationRequest};
use core_worker::{EnumerationWorker, UiMessage, WorkerConfig};
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const ICON_SIZE_DIP: f32 = 16.0;

/// Construction-time dependencies; the seams tests replace.
pub struct PaneDeps {
    pub source: Arc<dyn DirectoryListingSource>,
    pub icon_cache: Arc<IconCache>,
    pub device_factory: Box<dyn DeviceFactory>,
    pub text_engine: Box<dyn TextEngine>,
    pub callbacks: Box<dyn PaneCallbacks>,
    pub theme: Theme,
    pub settings: PaneSettings,
    pub worker_config: WorkerConfig,
}

/// What one animation/idle tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneTickOutcome {
    pub invalidated: bool,
    pub needs_more_ticks: bool,
}

pub struct FolderPane {
    source: Arc<dyn DirectoryListingSource>,
    cache: Arc<IconCache>,
    callbacks: Box<dyn PaneCallbacks>,
    model: FolderModel,
    layout: LayoutEngine,
    input: InputHandler,
    overlay: OverlayController,
    renderer: Renderer,
    text: Box<dyn TextEngine>,
    worker: EnumerationWorker,
    rx: Receiver<UiMessage>,
    generation: Arc<AtomicU64>,
    focus_memory: FocusMemory,
    client_px: (u32, u32),
    scale: Scale,
    pane_focused: bool,
    last_listing_ok: bool,
    /// Generation of the most recently adopted listing.
    adopted_generation: u64,
    /// Icon queue deferred until a device exists.
    icon_queue_pending: bool,
}

impl FolderPane {
    pub fn new(deps: PaneDeps) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let worker = EnumerationWorker::spawn(
            Arc::clone(&deps.source),
            Arc::clone(&deps.icon_cache),
            Arc::clone(&generation),
            tx,
            deps.worker_config,
        );
        let mut layout = LayoutEngine::new(LayoutParams::default());
        layout.refresh_metrics(deps.text_engine.as_ref());
        layout.set_display_mode(display_mode_from_setting(deps.settings.display_mode));

        let mut model = FolderModel::new();
        model.apply_sort(
            sort_by_from_setting(deps.settings.sort_by),
            sort_direction_from_setting(deps.settings.sort_direction),
        );

        Self {
            source: deps.source,
            cache: deps.icon_cache,
            callbacks: deps.callbacks,
            model,
            layout,
            input: InputHandler::new(),
            overlay: OverlayController::new(),
            renderer: Renderer::new(deps.device_factory, deps.theme),
            text: deps.text_engine,
            worker,
            rx,
            generation,
            focus_memory: FocusMemory::new(),
            client_px: (0, 0),
            scale: Scale::IDENTITY,
            pane_focused: true,
            last_listing_ok: true,
            adopted_generation: 0,
            icon_queue_pending: false,
        }
    }

    // -----------------------------------------------------------------
    // Host-facing API
    // -----------------------------------------------------------------

    pub fn set_folder(&mut self, folder: Option<PathBuf>, now: Instant) {
        self.remember_current_focus();
        match folder {
            None => {
                self.bump_generation();
                self.model.clear();
                self.overlay.clear();
                self.relayout();
                self.callbacks.path_changed(None);
            }
            Some(folder) => {
                let generation = self.bump_generation();
                tracing::info!(
                    target: "pane.nav",
                    folder = %folder.display(),
                    generation,
                    "set_folder"
                );
                self.overlay.arm_busy(now);
                self.callbacks.path_changed(Some(&folder));
                self.worker
                    .request_enumeration(folder, BorrowMode::AllowEnumerate, generation);
            }
        }
        self.renderer.damage().mark_all();
    }

    /// Drop any cached listing and re-enumerate the current folder.
    pub fn force_refresh(&mut self, now: Instant) {
        let Some(folder) = self.model.folder().map(Path::to_path_buf) else {
            return;
        };
        let generation = self.bump_generation();
        self.overlay.arm_busy(now);
        self.worker
            .request_enumeration(folder, BorrowMode::ForceRefresh, generation);
    }

    /// Abandon the in-flight enumeration and show the canceled note.
    pub fn cancel_pending_enumeration(&mut self, now: Instant) {
        let generation = self.bump_generation();
        tracing::info!(target: "pane.nav", generation, "enumeration_canceled_by_user");
        self.overlay.busy_canceled(now);
        self.renderer.damage().mark_all();
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.layout.set_display_mode(mode);
        self.relayout();
    }

    pub fn set_sort(&mut self, by: SortBy, direction: SortDirection) {
        self.model.apply_sort(by, direction);
        self.relayout();
        self.queue_icon_loading();
        self.notify_selection_if_changed();
    }

    pub fn select_by_predicate(&mut self, predicate: &dyn Fn(&str) -> bool, replace: bool) {
        self.model.select_by_predicate(predicate, replace);
        self.renderer.damage().mark_all();
        self.notify_selection_if_changed();
    }

    pub fn set_pane_focused(&mut self, focused: bool) {
        if self.pane_focused != focused {
            self.pane_focused = focused;
            self.renderer.damage().mark_all();
        }
    }

    pub fn set_client(&mut self, client_px: (u32, u32), scale: Scale) {
        if self.client_px == client_px && self.scale == scale {
            return;
        }
        self.client_px = client_px;
        self.scale = scale;
        self.layout.refresh_metrics(self.text.as_ref());
        self.relayout();
    }

    /// Emit the properties callback for the focused item.
    pub fn request_focused_properties(&mut self) {
        let Some(path) = self.focused_path() else {
            return;
        };
        if let Err(error) = self.callbacks.properties_request(&path) {
            let now = Instant::now();
            self.overlay
                .show_operation_error("Properties failed", error.to_string(), now);
            self.renderer.damage().mark_all();
        }
    }

    /// Current view state for persistence.
    pub fn settings(&self) -> PaneSettings {
        let (by, direction) = self.model.sort();
        PaneSettings {
            sort_by: sort_by_to_setting(by),
            sort_direction: sort_direction_to_setting(direction),
            display_mode: display_mode_to_setting(self.layout.display_mode()),
            column_widths: vec![self.layout.tile_width()],
        }
    }

    // -----------------------------------------------------------------
    // Accessors (host status bar, tests)
    // -----------------------------------------------------------------

    pub fn model(&self) -> &FolderModel {
        &self.model
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.current()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.input.scroll_offset()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Generation of the listing currently shown (0 before any adoption).
    pub fn adopted_generation(&self) -> u64 {
        self.adopted_generation
    }

    pub fn search_query(&self) -> &str {
        self.input.search().query()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    // -----------------------------------------------------------------
    // Messages from the worker
    // -----------------------------------------------------------------

    /// Drain worker messages. Returns true when anything changed.
    pub fn pump_messages(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                UiMessage::ListingReady(payload) => {
                    if payload.generation != self.generation() {
                        tracing::debug!(
                            target: "pane.enum",
                            stale = payload.generation,
                            current = self.generation(),
                            "listing_dropped_stale"
                        );
                        continue;
                    }
                    self.adopt_listing(payload, now);
                    changed = true;
                }
                UiMessage::CreateIconBitmap { batch_id, icon_index, handle, item_indices } => {
                    if batch_id != self.worker.current_icon_batch_id() {
                        continue; // stale batch; drop the handle unconverted
                    }
                    changed |= self.apply_icon_bitmap(icon_index, handle, &item_indices);
                }
                UiMessage::IconBatchDrained { batch_id } => {
                    // No automatic requeue: a group whose extraction keeps
                    // failing would bounce between the threads forever.
                    // Viewport changes rebuild the queue via the boost path.
                    tracing::trace!(target: "pane.icons", batch_id, "icon_batch_drained");
                }
            }
        }
        changed
    }

    fn adopt_listing(&mut self, payload: ListingPayload, now: Instant) {
        let folder = payload.folder.clone();
        // A refresh of the folder already shown keeps the user's scroll
        // position; only a navigation scrolls the restored focus into view.
        let same_folder = self.model.folder() == Some(folder.as_path());
        self.adopted_generation = payload.generation;
        self.overlay.enumeration_completed();
        match &payload.status {
            ListingStatus::Failed(error) => {
                self.last_listing_ok = false;
                let error = error.clone();
                self.model.adopt_payload(payload, None);
                self.overlay.show_enumeration_error(&error, now);
            }
            ListingStatus::Ok => {
                self.last_listing_ok = true;
                // Entering a folder always lands a cursor; index 0 is the
                // fallback when nothing better resolves.
                let outcome = self.model.adopt_payload(payload, Some(0));
                // Focus restoration for a folder we've been in before.
                if let Some(remembered) = self
                    .focus_memory
                    .recall(&folder.to_string_lossy())
                    .map(str::to_owned)
                {
                    if let Some(index) = self.model.index_of_name(&remembered) {
                        self.model.set_focus(Some(index));
                        self.model.set_anchor(Some(index));
                    }
                }
                tracing::debug!(
                    target: "pane.enum",
                    items = outcome.total,
                    transferred = outcome.transferred,
                    "listing_adopted"
                );
            }
        }
        self.relayout();
        if !same_folder {
            self.scroll_focus_into_view();
        }
        self.queue_icon_loading();
        self.callbacks.enumeration_completed(&folder);
        self.notify_selection_if_changed();
        self.renderer.damage().mark_all();
    }

    fn apply_icon_bitmap(
        &mut self,
        icon_index: i32,
        handle: core_icons::IconExtractHandle,
        item_indices: &[usize],
    ) -> bool {
        let Some(device) = self.renderer.device() else {
            return false; // device gone; bitmap will be re-requested
        };
        let Some(bitmap) =
            self.cache
                .convert_handle_to_device_bitmap(handle, icon_index, device.as_converter())
        else {
            return false;
        };
        let updated = apply_bitmap_to_items(self.model.items_mut(), icon_index, &bitmap, item_indices);
        match updated.as_slice() {
            [] => false,
            // A single updated item repaints just its tile; fan-outs
            // repaint the view.
            [single] => {
                self.damage_item(*single);
                true
            }
            _ => {
                self.renderer.damage().mark_all();
                true
            }
        }
    }

    // -----------------------------------------------------------------
    // Icon queueing
    // -----------------------------------------------------------------

    pub fn queue_icon_loading(&mut self) {
        let Some(device) = self.renderer.device_id() else {
            // No device yet (first enumeration can finish before the first
            // paint); re-queue right after device creation.
            self.icon_queue_pending = true;
            return;
        };
        self.icon_queue_pending = false;
        let visible = self.layout.visible_item_range(self.input.scroll_offset());
        let build = build_icon_groups(self.model.items_mut(), visible, &self.cache, device);
        if build.stamped_from_cache > 0 {
            self.renderer.damage().mark_all();
        }
        if build.groups.is_empty() {
            return;
        }
        tracing::debug!(
            target: "pane.icons",
            groups = build.groups.len(),
            visible_groups = build.visible_groups,
            stamped = build.stamped_from_cache,
            "icon_queue_built"
        );
        self.worker.queue_icon_batch(device, ICON_SIZE_DIP, build.groups);
    }

    /// Viewport moved: pull the now-needed groups to the queue front, or
    /// rebuild the queue when it already drained.
    pub fn boost_icon_loading_for_visible_range(&mut self) {
        let visible = self.layout.visible_item_range(self.input.scroll_offset());
        let needed = visible_icon_indices(self.model.items(), visible);
        if needed.is_empty() {
            return;
        }
        if !self.worker.boost_icon_groups(&needed) {
            self.queue_icon_loading();
        }
    }

    // -----------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------

    pub fn key_event(&mut self, chord: KeyChord, now: Instant) {
        let gate = self.overlay_gate();
        let at_root = self
            .model
            .folder()
            .map(|f| self.source.is_storage_root(f))
            .unwrap_or(true);
        let effects =
            self.input
                .handle_key(chord, &mut self.model, &self.layout, gate, at_root, now);
        self.process_effects(effects, now);
    }

    pub fn mouse_down(
        &mut self,
        point: DipPoint,
        button: MouseButton,
        mods: Modifiers,
        click_count: u32,
        now: Instant,
    ) {
        if self.overlay_gate().blocks_input {
            return;
        }
        let effects = self.input.handle_mouse_down(
            point,
            button,
            mods,
            click_count,
            &mut self.model,
            &self.layout,
            now,
        );
        self.process_effects(effects, now);
    }

    pub fn mouse_move(&mut self, point: DipPoint, now: Instant) {
        if self.overlay_gate().blocks_input {
            return;
        }
        let effects = self.input.handle_mouse_move(point, &mut self.model, &self.layout);
        self.process_effects(effects, now);
    }

    pub fn wheel(&mut self, delta: f32, shift: bool, now: Instant) {
        if self.overlay_gate().blocks_input {
            return;
        }
        let effects = self.input.handle_wheel(delta, shift, &self.layout);
        self.process_effects(effects, now);
    }

    fn overlay_gate(&self) -> OverlayGate {
        match self.overlay.current() {
            None => OverlayGate::default(),
            Some(state) => OverlayGate {
                present: true,
                blocks_input: state.blocks_input,
                closable: state.closable,
                busy: state.is_busy(),
            },
        }
    }

    fn process_effects(&mut self, effects: Vec<InputEffect>, now: Instant) {
        for effect in effects {
            match effect {
                InputEffect::Invalidate => self.renderer.damage().mark_all(),
                InputEffect::InvalidateItem(index) => self.damage_item(index),
                InputEffect::ScrollTo(_offset) => {
                    self.update_shaping_window();
                    self.boost_icon_loading_for_visible_range();
                    // Large viewport jumps shed far-away heavy state right
                    // away instead of waiting for the next idle tick.
                    let visible = self.layout.visible_item_range(self.input.scroll_offset());
                    self.layout.release_distant_state(self.model.items_mut(), visible);
                    self.renderer.damage().mark_all();
                }
                InputEffect::ActivateItem(index) => self.activate_item(index, now),
                InputEffect::NavigateToParent => self.navigate_to_parent(now),
                InputEffect::NavigateUpFromRoot => {
                    self.callbacks.navigate_up_from_root_request();
                }
                InputEffect::SwitchPane => {
                    self.callbacks.navigation_request(NavigationRequest::SwitchPane);
                }
                InputEffect::RequestDeleteSelection => self.request_delete_selection(now),
                InputEffect::DismissOverlay => {
                    if self.overlay.dismiss() {
                        self.renderer.damage().mark_all();
                    }
                }
                InputEffect::CancelEnumeration => self.cancel_pending_enumeration(now),
                InputEffect::SearchChanged => {
                    self.callbacks.incremental_search_changed();
                    self.renderer.damage().mark_all();
                }
            }
        }
        self.notify_selection_if_changed();
    }

    fn activate_item(&mut self, index: usize, now: Instant) {
        let Some(folder) = self.model.folder().map(Path::to_path_buf) else {
            return;
        };
        let Some(item) = self.model.items().get(index) else {
            return;
        };
        let path = folder.join(item.name.as_str());
        if item.is_directory {
            self.set_folder(Some(path), now);
        } else if !self.callbacks.open_file_request(&path) {
            let request = ViewFileRequest { path };
            self.callbacks.view_file_request(&request);
        }
    }

    fn navigate_to_parent(&mut self, now: Instant) {
        let Some(folder) = self.model.folder().map(Path::to_path_buf) else {
            return;
        };
        let Some(parent) = folder.parent().map(Path::to_path_buf) else {
            self.callbacks.navigate_up_from_root_request();
            return;
        };
        // Landing in the parent, focus the folder we just left.
        if let Some(leaf) = folder.file_name().and_then(|n| n.to_str()) {
            self.focus_memory.remember(&parent.to_string_lossy(), leaf);
        }
        self.set_folder(Some(parent), now);
    }

    fn request_delete_selection(&mut self, now: Instant) {
        let Some(folder) = self.model.folder().map(Path::to_path_buf) else {
            return;
        };
        let mut targets: Vec<PathBuf> = self
            .model
            .selected_indices()
            .into_iter()
            .map(|i| folder.join(self.model.items()[i].name.as_str()))
            .collect();
        if targets.is_empty() {
            if let Some(path) = self.focused_path() {
                targets.push(path);
            }
        }
        if targets.is_empty() {
            return;
        }
        let request = FileOperationRequest::delete(
            targets,
            FileOperationFlags::RECURSIVE | FileOperationFlags::USE_RECYCLE_BIN,
        );
        if let Err(error) = self.callbacks.file_operation_request(&request) {
            self.overlay
                .show_operation_error("Delete failed", error.to_string(), now);
            self.renderer.damage().mark_all();
        }
    }

    fn focused_path(&self) -> Option<PathBuf> {
        let folder = self.model.folder()?;
        let name = self.model.focused_name()?;
        Some(folder.join(name))
    }

    // -----------------------------------------------------------------
    // Ticks & rendering
    // -----------------------------------------------------------------

    /// One 16 ms animation/idle tick.
    pub fn tick(&mut self, now: Instant) -> PaneTickOutcome {
        let mut invalidated = false;

        if self.overlay.tick_busy(now) {
            self.renderer.damage().mark_all();
            invalidated = true;
        }

        let search_animating = self.input.search().needs_ticks(now);
        if search_animating {
            self.renderer.damage().mark_all();
            invalidated = true;
        }
        self.input.search_mut().settle(now);

        let visible = self.layout.visible_item_range(self.input.scroll_offset());
        if !self.layout.idle_shaping_complete() {
            let outcome =
                self.layout
                    .idle_shape_batch(self.model.items_mut(), self.text.as_ref(), visible.clone());
            if outcome.created > 0 {
                invalidated = true;
                self.renderer.damage().mark_all();
            }
        }
        let released = self.layout.release_distant_state(self.model.items_mut(), visible);
        if released > 0 {
            invalidated = true;
        }

        PaneTickOutcome {
            invalidated,
            needs_more_ticks: self.overlay.busy_timer_armed()
                || self.input.search().needs_ticks(now)
                || !self.layout.idle_shaping_complete(),
        }
    }

    /// Paint if anything is dirty. On device failure the device-scoped
    /// caches are purged and the next call recreates everything.
    pub fn render(&mut self, now: Instant) -> Result<bool, RenderError> {
        if self.client_px.0 == 0 || self.client_px.1 == 0 {
            return Ok(false);
        }
        let old_device = self.renderer.device_id();
        let pill = self.search_pill(now);
        let highlight = self
            .input
            .search_highlight(&self.model)
            .map(|(item_index, byte_range)| SearchHighlight { item_index, byte_range });
        let overlay = self.overlay.current().map(overlay_panel);
        let empty_message = (self.model.is_empty()
            && self.model.folder().is_some()
            && self.last_listing_ok
            && overlay.is_none())
        .then_some("This folder is empty");

        let params = FrameParams {
            client_px: self.client_px,
            scale: self.scale,
            horizontal_offset: self.input.scroll_offset(),
            pane_focused: self.pane_focused,
            hover_index: self.model.hover_index(),
            search_highlight: highlight,
            search_pill: pill,
            overlay,
            empty_message,
            scroll_shift: None,
        };
        let result = self.renderer.render_frame(
            self.model.items_mut(),
            &self.layout,
            self.text.as_ref(),
            &params,
        );
        match result {
            Ok(drew) => {
                if self.icon_queue_pending {
                    self.queue_icon_loading();
                }
                Ok(drew)
            }
            Err(error) => {
                self.purge_device_state(old_device);
                Err(error)
            }
        }
    }

    fn purge_device_state(&mut self, old_device: Option<core_icons::DeviceId>) {
        if let Some(device) = old_device {
            self.cache.clear_device_cache(device);
        }
        self.worker.cancel_icon_batch();
        for item in self.model.items_mut() {
            item.release_heavy_state();
        }
        self.layout.restart_idle_shaping();
        self.icon_queue_pending = true;
    }

    fn search_pill(&self, now: Instant) -> Option<SearchPill> {
        let search = self.input.search();
        let visibility = search.visibility(now);
        if visibility <= 0.0 {
            return None;
        }
        Some(SearchPill {
            query: search.query().to_owned(),
            visibility,
            pulse: search.pulse(now),
        })
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn bump_generation(&mut self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn remember_current_focus(&mut self) {
        if let (Some(folder), Some(name)) = (self.model.folder(), self.model.focused_name()) {
            let key = folder.to_string_lossy().into_owned();
            self.focus_memory.remember(&key, name);
        }
    }

    fn relayout(&mut self) {
        let client = DipSize::new(
            self.scale.dip_from_px(self.client_px.0 as i32),
            self.scale.dip_from_px(self.client_px.1 as i32),
        );
        self.layout.perform_layout(self.model.items_mut(), client);
        self.input.clamp_scroll(&self.layout);
        self.update_shaping_window();
        self.renderer.damage().mark_all();
    }

    fn update_shaping_window(&mut self) {
        let visible = self.layout.visible_item_range(self.input.scroll_offset());
        let direction = self.input.scroll_direction();
        self.layout.update_item_text_layouts(
            self.model.items_mut(),
            self.text.as_ref(),
            visible,
            direction,
        );
    }

    fn scroll_focus_into_view(&mut self) {
        if let Some(focus) = self.model.focused_index() {
            let target = self.layout.ensure_visible_offset(focus, self.input.scroll_offset());
            if target != self.input.scroll_offset() {
                self.input.scroll_to(target);
                self.update_shaping_window();
                self.boost_icon_loading_for_visible_range();
                self.renderer.damage().mark_all();
            }
        }
    }

    fn notify_selection_if_changed(&mut self) {
        if self.model.take_selection_changed() {
            let stats = self.model.stats().clone();
            self.callbacks.selection_changed(&stats);
        }
    }

    fn damage_item(&mut self, index: usize) {
        let Some(item) = self.model.items().get(index) else {
            return;
        };
        let rect = item
            .bounds
            .translate(-self.input.scroll_offset(), 0.0)
            .to_px_outward(self.scale);
        self.renderer.damage().mark_rect(rect);
    }
}

fn overlay_panel(state: &OverlayState) -> OverlayPanel {
    let accent = match state.severity {
        OverlaySeverity::Information => Color::rgb(0.30, 0.55, 0.95),
        OverlaySeverity::Warning => Color::rgb(0.95, 0.70, 0.20),
        OverlaySeverity::Error => Color::rgb(0.90, 0.25, 0.25),
    };
    OverlayPanel {
        title: state.title.clone(),
        message: state.message.clone(),
        accent,
        busy: state.is_busy(),
        closable: state.closable,
    }
}

fn sort_by_from_setting(setting: SortFieldSetting) -> SortBy {
    match setting {
        SortFieldSetting::Name => SortBy::Name,
        SortFieldSetting::Extension => SortBy::Extension,
        SortFieldSetting::Time => SortBy::Time,
        SortFieldSetting::Size => SortBy::Size,
        SortFieldSetting::Attributes => SortBy::Attributes,
        SortFieldSetting::None => SortBy::None,
    }
}

fn sort_by_to_setting(by: SortBy) -> SortFieldSetting {
    match by {
        SortBy::Name => SortFieldSetting::Name,
        SortBy::Extension => SortFieldSetting::Extension,
        SortBy::Time => SortFieldSetting::Time,
        SortBy::Size => SortFieldSetting::Size,
        SortBy::Attributes => SortFieldSetting::Attributes,
        SortBy::None => SortFieldSetting::None,
    }
}

fn sort_direction_from_setting(setting: SortDirectionSetting) -> SortDirection {
    match setting {
        SortDirectionSetting::Ascending => SortDirection::Ascending,
        SortDirectionSetting::Descending => SortDirection::Descending,
    }
}

fn sort_direction_to_setting(direction: SortDirection) -> SortDirectionSetting {
    match direction {
        SortDirection::Ascending => SortDirectionSetting::Ascending,
        SortDirection::Descending => SortDirectionSetting::Descending,
    }
}

fn display_mode_from_setting(setting: DisplayModeSetting) -> DisplayMode {
    match setting {
        DisplayModeSetting::Brief => DisplayMode::Brief,
        DisplayModeSetting::Detailed => DisplayMode::Detailed,
        DisplayModeSetting::ExtraDetailed => DisplayMode::ExtraDetailed,
    }
}

fn display_mode_to_setting(mode: DisplayMode) -> DisplayModeSetting {
    match mode {
        DisplayMode::Brief => DisplayModeSetting::Brief,
        DisplayMode::Detailed => DisplayModeSetting::Detailed,
        DisplayMode::ExtraDetailed => DisplayModeSetting::ExtraDetailed,
    }
}
