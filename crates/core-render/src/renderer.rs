//! Frame assembly and per-item drawing.

use crate::damage::DamageTracker;
use crate::present::{PresentGate, PresentPlan, PresentRequest};
use crate::theme::{Color, Theme, rainbow_tint};
use crate::{Device, DeviceFactory, DrawContext, PlaceholderKind, RenderError, RenderResult};
use core_geometry::{DipPoint, DipRect, PxRect, Scale};
use core_icons::{DeviceId, SharedBitmap};
use core_layout::LayoutEngine;
use core_model::{DisplayMode, Item, TextEngine};
use std::ops::Range;

/// Incremental-search match on the focused item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHighlight {
    pub item_index: usize,
    pub byte_range: Range<usize>,
}

/// Floating search indicator state (animated by the overlay dispatcher).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPill {
    pub query: String,
    /// 0.0 (hidden) ..= 1.0 (fully slid in).
    pub visibility: f32,
    /// 0.0 ..= 1.0 typing-pulse intensity.
    pub pulse: f32,
}

/// Overlay panel contents, already flattened by the overlay controller.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPanel {
    pub title: String,
    pub message: String,
    pub accent: Color,
    pub busy: bool,
    pub closable: bool,
}

/// Everything one paint needs besides the items themselves.
pub struct FrameParams<'a> {
    pub client_px: (u32, u32),
    pub scale: Scale,
    pub horizontal_offset: f32,
    pub pane_focused: bool,
    pub hover_index: Option<usize>,
    pub search_highlight: Option<SearchHighlight>,
    pub search_pill: Option<SearchPill>,
    pub overlay: Option<OverlayPanel>,
    pub empty_message: Option<&'a str>,
    /// Known integer-pixel horizontal shift for a scroll-only frame,
    /// `(scroll_rect, dy_px)`; forwarded to the partial present.
    pub scroll_shift: Option<(PxRect, i32)>,
}

const PLACEHOLDER_OPACITY: f32 = 0.4;
const SEARCH_PILL_SLIDE_DIP: f32 = 8.0;

pub struct Renderer {
    factory: Box<dyn DeviceFactory>,
    device: Option<Box<dyn Device>>,
    client_px: (u32, u32),
    gate: PresentGate,
    damage: DamageTracker,
    theme: Theme,
    placeholder_folder: Option<SharedBitmap>,
    placeholder_file: Option<SharedBitmap>,
}

impl Renderer {
    pub fn new(factory: Box<dyn DeviceFactory>, theme: Theme) -> Self {
        Self {
            factory,
            device: None,
            client_px: (0, 0),
            gate: PresentGate::new(),
            damage: DamageTracker::new(),
            theme,
            placeholder_folder: None,
            placeholder_file: None,
        }
    }

    pub fn damage(&mut self) -> &mut DamageTracker {
        &mut self.damage
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the theme; brushes are theme-derived so everything repaints.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.damage.mark_all();
    }

    pub fn device_id(&self) -> Option<DeviceId> {
        self.device.as_ref().map(|d| d.id())
    }

    pub fn partials_allowed(&self) -> bool {
        self.gate.partials_allowed()
    }

    pub fn present_stats(&self) -> crate::PresentStats {
        self.gate.stats()
    }

    /// Convert an extracted icon handle on the current device.
    pub fn device(&self) -> Option<&dyn Device> {
        self.device.as_deref()
    }

    /// Tear down the device after loss or present failure. Returns the old
    /// device id so the caller can purge device-scoped caches (icon
    /// bitmaps, item layouts).
    pub fn discard_device(&mut self) -> Option<DeviceId> {
        let id = self.device_id();
        self.device = None;
        self.placeholder_folder = None;
        self.placeholder_file = None;
        self.gate.reset();
        self.damage.mark_all();
        if let Some(id) = id {
            tracing::warn!(target: "render.device", device = id.0, "device_discarded");
        }
        id
    }

    fn ensure_device(&mut self, client_px: (u32, u32)) -> RenderResult<()> {
        if self.device.is_none() {
            let device = self
                .factory
                .create_device(client_px.0.max(1), client_px.1.max(1))?;
            tracing::info!(target: "render.device", device = device.id().0, "device_created");
            self.device = Some(device);
            self.client_px = client_px;
            self.gate.reset();
            self.damage.mark_all();
        } else if self.client_px != client_px {
            self.device
                .as_mut()
                .unwrap()
                .resize(client_px.0.max(1), client_px.1.max(1))?;
            self.client_px = client_px;
            self.gate.reset();
            self.damage.mark_all();
        }
        let device = self.device.as_mut().unwrap();
        if self.placeholder_folder.is_none() {
            self.placeholder_folder = Some(device.placeholder(PlaceholderKind::Folder)?);
            self.placeholder_file = Some(device.placeholder(PlaceholderKind::File)?);
        }
        Ok(())
    }

    /// Paint the accumulated damage and present. `Ok(false)` means there
    /// was nothing to paint. On error the device is already discarded; the
    /// caller repaints fully next frame (after purging device caches).
    pub fn render_frame(
        &mut self,
        items: &mut [Item],
        layout: &LayoutEngine,
        text: &dyn TextEngine,
        params: &FrameParams<'_>,
    ) -> RenderResult<bool> {
        self.ensure_device(params.client_px).inspect_err(|_| {
            self.discard_device();
        })?;

        let (w, h) = params.client_px;
        let was_full = self.damage.is_full();
        let Some(invalid_px) = self.damage.take(w as i32, h as i32) else {
            return Ok(false);
        };
        let invalid_dip = invalid_px.to_dip(params.scale);

        let draw = self.draw_contents(items, layout, text, params, invalid_dip);
        if let Err(e) = draw {
            self.discard_device();
            return Err(e);
        }

        let request = if was_full {
            PresentRequest::Full
        } else {
            PresentRequest::Partial { dirty: invalid_px, scroll: params.scroll_shift }
        };
        let plan = self.gate.plan(request);
        let result = {
            let target = self.device.as_mut().unwrap().present_target();
            match &plan {
                PresentPlan::Full => target.present_full(),
                PresentPlan::Partial { dirty, scroll } => target.present_partial(*dirty, *scroll),
            }
        };
        match result {
            Ok(()) => {
                self.gate.note_success(&plan);
                Ok(true)
            }
            Err(_) => {
                self.gate.note_failure();
                self.discard_device();
                Err(RenderError::PresentFailed)
            }
        }
    }

    fn draw_contents(
        &mut self,
        items: &mut [Item],
        layout: &LayoutEngine,
        text: &dyn TextEngine,
        params: &FrameParams<'_>,
        invalid_dip: DipRect,
    ) -> RenderResult<()> {
        let theme = self.theme.clone();
        let placeholder_folder = self.placeholder_folder.clone();
        let placeholder_file = self.placeholder_file.clone();
        let client_dip = DipRect::new(
            0.0,
            0.0,
            params.scale.dip_from_px(params.client_px.0 as i32),
            params.scale.dip_from_px(params.client_px.1 as i32),
        );

        let device = self.device.as_mut().unwrap();
        let ctx = device.begin_frame()?;
        ctx.push_clip(invalid_dip);
        ctx.fill_rect(invalid_dip, theme.background);

        if items.is_empty() {
            if let Some(message) = params.empty_message {
                let center = client_dip.center();
                let rect = DipRect::new(center.x - 160.0, center.y - 12.0, center.x + 160.0, center.y + 12.0);
                ctx.fill_text(message, rect, theme.text_secondary);
            }
        } else {
            // Content-space damage bounds the iteration window further than
            // visibility alone.
            let content_invalid = invalid_dip.translate(params.horizontal_offset, 0.0);
            let visible = layout.visible_item_range(params.horizontal_offset);
            for i in visible {
                if !items[i].bounds.intersects(&content_invalid) {
                    continue;
                }
                layout.ensure_item_text_layout(&mut items[i], text);
                let hovered = params.hover_index == Some(i);
                let search = params
                    .search_highlight
                    .as_ref()
                    .filter(|s| s.item_index == i);
                draw_item(
                    ctx,
                    &items[i],
                    layout,
                    params.horizontal_offset,
                    &theme,
                    params.pane_focused,
                    hovered,
                    placeholder_folder.as_ref(),
                    placeholder_file.as_ref(),
                    search,
                );
            }
        }

        if let Some(pill) = &params.search_pill {
            draw_search_pill(ctx, pill, &theme, client_dip);
        }
        if let Some(panel) = &params.overlay {
            draw_overlay_panel(ctx, panel, &theme, client_dip);
        }

        ctx.pop_clip();
        device.end_frame()
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_item(
    ctx: &mut dyn DrawContext,
    item: &Item,
    layout: &LayoutEngine,
    horizontal_offset: f32,
    theme: &Theme,
    pane_focused: bool,
    hovered: bool,
    placeholder_folder: Option<&SharedBitmap>,
    placeholder_file: Option<&SharedBitmap>,
    search: Option<&SearchHighlight>,
) {
    let rect = item.bounds.translate(-horizontal_offset, 0.0);

    // State background, most-specific first.
    let background = if item.selected {
        Some(if theme.rainbow_selection {
            rainbow_tint(item.stable_hash32)
        } else {
            theme.selected
        })
    } else if item.focused && pane_focused {
        Some(theme.focused)
    } else if hovered {
        Some(theme.hover)
    } else {
        None
    };
    if let Some(color) = background {
        ctx.fill_rounded_rect(rect, 3.0, color);
    }

    if item.focused {
        let (width, opacity) = if pane_focused { (1.5, 1.0) } else { (1.0, 0.45) };
        ctx.stroke_rect(rect.inflate(-0.75, -0.75), theme.focus_border.with_alpha(opacity), width);
    }

    // Icon column.
    let pad = 4.0;
    let icon_size = 16.0_f32.min(rect.height() - 2.0 * pad);
    let icon_rect = DipRect::new(
        rect.left + pad,
        rect.top + (rect.height() - icon_size) / 2.0,
        rect.left + pad + icon_size,
        rect.top + (rect.height() + icon_size) / 2.0,
    );
    if let Some(icon) = &item.icon {
        ctx.draw_bitmap(icon, icon_rect, 1.0);
    } else {
        let placeholder = if item.is_directory { placeholder_folder } else { placeholder_file };
        match placeholder {
            Some(bitmap) => ctx.draw_bitmap(bitmap, icon_rect, PLACEHOLDER_OPACITY),
            None => ctx.fill_rect(icon_rect, theme.text_secondary.with_alpha(0.2)),
        }
    }
    if item.is_shortcut {
        // Link badge in the icon's lower-left corner.
        let badge = DipRect::new(
            icon_rect.left,
            icon_rect.bottom - 6.0,
            icon_rect.left + 6.0,
            icon_rect.bottom,
        );
        ctx.fill_rounded_rect(badge, 1.5, Color::rgb(1.0, 1.0, 1.0));
        ctx.stroke_rect(badge, theme.text_secondary, 0.75);
    }

    // Text block.
    let text_left = icon_rect.right + 4.0;
    let mut line_top = rect.top + pad;
    if let Some(label) = &item.label_layout {
        let origin = DipPoint::new(text_left, line_top);
        if let Some(search) = search {
            let local = ctx.layout_range_bounds(label, search.byte_range.clone());
            let highlight = local.translate(origin.x, origin.y).inflate(1.5, 0.5);
            ctx.fill_rounded_rect(highlight, 2.5, theme.search_highlight);
            ctx.draw_text_layout(label, origin, theme.text);
            // Repaint just the matched run in a color that reads on the
            // highlight.
            ctx.push_clip(highlight);
            ctx.draw_text_layout(label, origin, theme.search_highlight.contrasting_text());
            ctx.pop_clip();
        } else {
            ctx.draw_text_layout(label, origin, theme.text);
        }
        line_top += label.max_height();
    }
    if matches!(layout.display_mode(), DisplayMode::Detailed | DisplayMode::ExtraDetailed) {
        if let Some(details) = &item.details_layout {
            ctx.draw_text_layout(details, DipPoint::new(text_left, line_top), theme.text_secondary);
            line_top += details.max_height();
        }
    }
    if matches!(layout.display_mode(), DisplayMode::ExtraDetailed) {
        if let Some(metadata) = &item.metadata_layout {
            ctx.draw_text_layout(metadata, DipPoint::new(text_left, line_top), theme.text_secondary);
        }
    }
}

fn draw_search_pill(ctx: &mut dyn DrawContext, pill: &SearchPill, theme: &Theme, client: DipRect) {
    if pill.visibility <= 0.0 {
        return;
    }
    let width = 48.0 + pill.query.chars().count() as f32 * 7.0;
    let slide = (1.0 - pill.visibility) * SEARCH_PILL_SLIDE_DIP;
    let rect = DipRect::new(
        client.right - width - 16.0,
        client.bottom - 40.0 + slide,
        client.right - 16.0,
        client.bottom - 16.0 + slide,
    );
    let alpha = pill.visibility * (0.85 + 0.15 * pill.pulse);
    ctx.fill_rounded_rect(rect, 12.0, theme.overlay_background.with_alpha(alpha));
    ctx.fill_text(&pill.query, rect.inflate(-10.0, -4.0), theme.overlay_text);
}

fn draw_overlay_panel(ctx: &mut dyn DrawContext, panel: &OverlayPanel, theme: &Theme, client: DipRect) {
    // Dim the pane, then the centered card.
    ctx.fill_rect(client, Color::rgba(0.0, 0.0, 0.0, 0.25));
    let center = client.center();
    let half_w = (client.width() * 0.4).clamp(120.0, 260.0);
    let card = DipRect::new(center.x - half_w, center.y - 64.0, center.x + half_w, center.y + 64.0);
    ctx.fill_rounded_rect(card, 8.0, theme.overlay_background);
    ctx.fill_rect(DipRect::new(card.left, card.top, card.left + 4.0, card.bottom), panel.accent);

    let title_rect = DipRect::new(card.left + 16.0, card.top + 12.0, card.right - 16.0, card.top + 34.0);
    ctx.fill_text(&panel.title, title_rect, theme.overlay_text);
    let message_rect = DipRect::new(card.left + 16.0, card.top + 38.0, card.right - 16.0, card.bottom - 34.0);
    ctx.fill_text(&panel.message, message_rect, theme.overlay_text.with_alpha(0.8));

    let action = if panel.busy {
        "Cancel (Esc)"
    } else if panel.closable {
        "Dismiss (Esc)"
    } else {
        ""
    };
    if !action.is_empty() {
        let action_rect =
            DipRect::new(card.left + 16.0, card.bottom - 30.0, card.right - 16.0, card.bottom - 10.0);
        ctx.fill_text(action, action_rect, panel.accent);
    }
}
