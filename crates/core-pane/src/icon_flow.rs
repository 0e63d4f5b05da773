//! Icon-loading queue assembly and UI-side bitmap apply.
//!
//! Grouping happens on the UI thread because it needs item state and the
//! viewport; the worker only ever sees finished groups. Items whose bitmap
//! is already cached for the live device are stamped here and never reach
//! the queue.

use core_icons::{DeviceId, IconCache, SharedBitmap};
use core_model::Item;
use core_worker::IconGroup;
use std::collections::VecDeque;
use std::ops::Range;

/// Outcome of a queue build: groups for the worker plus how many items got
/// their bitmap stamped straight from the cache.
#[derive(Debug)]
pub struct IconQueueBuild {
    pub groups: VecDeque<IconGroup>,
    pub stamped_from_cache: usize,
    pub visible_groups: usize,
}

/// Group items needing bitmaps by icon index, visible-first.
pub fn build_icon_groups(
    items: &mut [Item],
    visible: Range<usize>,
    cache: &IconCache,
    device: DeviceId,
) -> IconQueueBuild {
    struct Build {
        icon_index: i32,
        item_indices: Vec<usize>,
        has_visible: bool,
        first_visible: usize,
    }

    let mut builds: Vec<Build> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if item.icon_index < 0 || item.icon.is_some() {
            continue;
        }
        let is_visible = visible.contains(&i);
        match builds.iter_mut().find(|b| b.icon_index == item.icon_index) {
            Some(build) => {
                build.item_indices.push(i);
                if is_visible {
                    build.has_visible = true;
                    build.first_visible = build.first_visible.min(i);
                }
            }
            None => builds.push(Build {
                icon_index: item.icon_index,
                item_indices: vec![i],
                has_visible: is_visible,
                first_visible: if is_visible { i } else { usize::MAX },
            }),
        }
    }

    // Stamp groups whose bitmap is already on the device.
    let mut stamped = 0usize;
    let mut pending: Vec<Build> = Vec::new();
    for build in builds {
        if let Some(bitmap) = cache.get_cached_bitmap(build.icon_index, device) {
            for &i in &build.item_indices {
                stamp_item(&mut items[i], build.icon_index, &bitmap);
                stamped += 1;
            }
        } else {
            pending.push(build);
        }
    }

    // Visible groups first, ordered by first visible index; equal firsts
    // prefer the larger fan-out. Off-screen groups keep discovery order.
    let (mut visible_builds, offscreen): (Vec<Build>, Vec<Build>) =
        pending.into_iter().partition(|b| b.has_visible);
    visible_builds.sort_by(|a, b| {
        a.first_visible
            .cmp(&b.first_visible)
            .then_with(|| b.item_indices.len().cmp(&a.item_indices.len()))
    });
    let visible_groups = visible_builds.len();

    let groups = visible_builds
        .into_iter()
        .chain(offscreen)
        .map(|b| IconGroup {
            icon_index: b.icon_index,
            item_indices: b.item_indices,
            has_visible_items: b.has_visible,
            first_visible_item_index: b.first_visible,
        })
        .collect();

    IconQueueBuild { groups, stamped_from_cache: stamped, visible_groups }
}

/// Apply a converted bitmap to every carried item still expecting it.
/// Returns the item indices actually updated.
pub fn apply_bitmap_to_items(
    items: &mut [Item],
    icon_index: i32,
    bitmap: &SharedBitmap,
    carried: &[usize],
) -> Vec<usize> {
    let mut updated = Vec::new();
    for &i in carried {
        let Some(item) = items.get_mut(i) else {
            continue;
        };
        // The listing may have been re-sorted or replaced since the group
        // was queued; the index must still denote the same icon.
        if item.icon_index == icon_index && item.icon.is_none() {
            item.icon = Some(bitmap.clone());
            updated.push(i);
        }
    }
    updated
}

fn stamp_item(item: &mut Item, icon_index: i32, bitmap: &SharedBitmap) {
    if item.icon_index == icon_index && item.icon.is_none() {
        item.icon = Some(bitmap.clone());
    }
}

/// Icon indices the viewport needs right now (for boosting).
pub fn visible_icon_indices(items: &[Item], visible: Range<usize>) -> Vec<i32> {
    let mut needed: Vec<i32> = Vec::new();
    for item in &items[visible] {
        if item.icon_index >= 0 && item.icon.is_none() && !needed.contains(&item.icon_index) {
            needed.push(item.icon_index);
        }
    }
    needed
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_icons::{BitmapInfo, IconBackend, IconExtractHandle};
    use core_source::{ArenaString, FileAttributes};
    use std::path::Path;
    use std::sync::Arc;

    struct NullBackend;
    impl IconBackend for NullBackend {
        fn query_icon_index_by_extension(&self, _e: &str, _a: u32) -> Option<i32> {
            None
        }
        fn query_icon_index_for_path(&self, _p: &Path) -> Option<i32> {
            None
        }
        fn extract_icon(&self, icon_index: i32, _s: f32) -> Option<IconExtractHandle> {
            Some(IconExtractHandle { icon_index, token: 0 })
        }
    }

    fn item(icon_index: i32) -> Item {
        let mut it = Item::from_entry(
            ArenaString::detached("x"),
            FileAttributes::empty(),
            0,
            0,
            0,
            0,
        );
        it.icon_index = icon_index;
        it
    }

    fn bitmap(device: DeviceId) -> SharedBitmap {
        SharedBitmap::new(BitmapInfo {
            device,
            width: 16,
            height: 16,
            byte_size: 16,
            resource: 1,
        })
    }

    #[test]
    fn groups_dedupe_by_icon_index_visible_first() {
        let mut items = vec![item(7), item(3), item(7), item(3), item(9)];
        let cache = IconCache::new(Arc::new(NullBackend), usize::MAX);
        // Only indices 2..5 visible.
        let build = build_icon_groups(&mut items, 2..5, &cache, DeviceId(1));
        assert_eq!(build.groups.len(), 3);
        assert_eq!(build.stamped_from_cache, 0);
        // Group for icon 7 first (first visible index 2), then 3 (index 3),
        // then 9 (index 4).
        let order: Vec<i32> = build.groups.iter().map(|g| g.icon_index).collect();
        assert_eq!(order, [7, 3, 9]);
        assert!(build.groups.iter().all(|g| g.has_visible_items));
        assert_eq!(build.groups[0].item_indices, [0, 2]);
    }

    #[test]
    fn offscreen_groups_trail_visible_ones() {
        let mut items = vec![item(1), item(2), item(3)];
        let cache = IconCache::new(Arc::new(NullBackend), usize::MAX);
        let build = build_icon_groups(&mut items, 1..2, &cache, DeviceId(1));
        let order: Vec<(i32, bool)> = build
            .groups
            .iter()
            .map(|g| (g.icon_index, g.has_visible_items))
            .collect();
        assert_eq!(order, [(2, true), (1, false), (3, false)]);
    }

    #[test]
    fn tie_on_first_visible_prefers_larger_group() {
        // Two groups first visible at the same index cannot exist (an item
        // has one icon), so tie means both start off the same leading edge
        // of the viewport via later items; emulate with equal firsts.
        let mut items = vec![item(5), item(6), item(6)];
        let cache = IconCache::new(Arc::new(NullBackend), usize::MAX);
        let build = build_icon_groups(&mut items, 0..0, &cache, DeviceId(1));
        // No visible items: discovery order preserved.
        let order: Vec<i32> = build.groups.iter().map(|g| g.icon_index).collect();
        assert_eq!(order, [5, 6]);
    }

    #[test]
    fn cached_bitmaps_stamp_without_queueing() {
        let mut items = vec![item(4), item(4)];
        let cache = IconCache::new(Arc::new(NullBackend), usize::MAX);
        let device = DeviceId(2);
        let converter = StampConverter { device };
        let handle = IconExtractHandle { icon_index: 4, token: 0 };
        cache.convert_handle_to_device_bitmap(handle, 4, &converter).unwrap();

        let build = build_icon_groups(&mut items, 0..2, &cache, device);
        assert!(build.groups.is_empty());
        assert_eq!(build.stamped_from_cache, 2);
        assert!(items.iter().all(|i| i.icon.is_some()));
    }

    struct StampConverter {
        device: DeviceId,
    }
    impl core_icons::DeviceBitmapConverter for StampConverter {
        fn device_id(&self) -> DeviceId {
            self.device
        }
        fn convert(&self, handle: IconExtractHandle) -> Option<SharedBitmap> {
            Some(SharedBitmap::new(BitmapInfo {
                device: self.device,
                width: 16,
                height: 16,
                byte_size: 8,
                resource: handle.token,
            }))
        }
    }

    #[test]
    fn apply_respects_current_icon_index() {
        let mut items = vec![item(4), item(5), item(4)];
        items[2].icon = Some(bitmap(DeviceId(1))); // already stamped
        let b = bitmap(DeviceId(1));
        let updated = apply_bitmap_to_items(&mut items, 4, &b, &[0, 1, 2, 99]);
        assert_eq!(updated, [0]);
        assert!(items[0].icon.is_some());
        assert!(items[1].icon.is_none(), "index mismatch must not stamp");
    }

    #[test]
    fn visible_indices_dedupe() {
        let mut items = vec![item(1), item(1), item(2), item(-1)];
        items[2].icon = Some(bitmap(DeviceId(1)));
        assert_eq!(visible_icon_indices(&items, 0..4), [1]);
    }
}
