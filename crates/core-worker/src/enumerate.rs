//! The enumeration algorithm, phase by phase.
//!
//! Cancellation discipline: the generation atomic is consulted once per
//! item while building and once between phases. Work discovered stale
//! returns `None`; the caller posts nothing.

use core_icons::{IconCache, extension_cache_key};
use core_model::{
    Item, ListingPayload, ListingStatus, compare_ordinal_ignore_case, fnv1a32, folder_hash_seed,
};
use core_source::{ArenaListing, BorrowMode, DirectoryListingSource, SourceResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) struct EnumerationRequest {
    pub folder: PathBuf,
    pub generation: u64,
    pub mode: BorrowMode,
}

pub(crate) fn run_enumeration(
    source: &dyn DirectoryListingSource,
    cache: &IconCache,
    current_generation: &Arc<AtomicU64>,
    request: EnumerationRequest,
) -> Option<ListingPayload> {
    let EnumerationRequest { folder, generation, mode } = request;
    let is_stale = || current_generation.load(Ordering::Acquire) != generation;

    let parsed = match borrow_and_parse(source, &folder, mode) {
        Ok(parsed) => parsed,
        Err(error) => {
            if is_stale() {
                return None;
            }
            tracing::info!(
                target: "worker.enum",
                folder = %folder.display(),
                generation,
                error = %error,
                "enumeration_failed"
            );
            return Some(ListingPayload::failed(generation, folder, error));
        }
    };
    if is_stale() {
        return None;
    }

    // Phase: build directory/file vectors with folder-seeded stable hashes.
    let seed = folder_hash_seed(&folder.to_string_lossy());
    let mut directories: Vec<Item> = Vec::new();
    let mut files: Vec<Item> = Vec::new();
    for (i, entry) in parsed.entries.iter().enumerate() {
        let name = parsed.name_of(entry);
        let hash = fnv1a32(seed, name.as_str().as_bytes());
        let item = Item::from_entry(
            name,
            entry.attributes,
            entry.size_bytes,
            entry.last_write_time,
            hash,
            i as u32,
        );
        if item.is_directory {
            directories.push(item);
        } else {
            files.push(item);
        }
        if i % 64 == 0 && is_stale() {
            return None;
        }
    }
    if is_stale() {
        return None;
    }

    // Phase: group-local name sort, directories ahead of files.
    let by_name = |a: &Item, b: &Item| compare_ordinal_ignore_case(a.name.as_str(), b.name.as_str());
    directories.sort_by(by_name);
    files.sort_by(by_name);
    let mut items = directories;
    items.append(&mut files);
    if is_stale() {
        return None;
    }

    resolve_icon_indices(cache, &folder, &mut items);
    if is_stale() {
        return None;
    }

    Some(ListingPayload {
        generation,
        status: ListingStatus::Ok,
        folder,
        arena: parsed.arena,
        items,
    })
}

fn borrow_and_parse(
    source: &dyn DirectoryListingSource,
    folder: &Path,
    mode: BorrowMode,
) -> SourceResult<ArenaListing> {
    let listing = source.borrow(folder, mode)?;
    ArenaListing::parse(listing.as_ref())
}

/// Resolve every item's icon index: cache first, then one parallel sweep
/// of unique extension queries, then the per-file stragglers.
fn resolve_icon_indices(cache: &IconCache, folder: &Path, items: &mut [Item]) {
    use rayon::prelude::*;

    // Plan: which extension key each item resolves through, and which items
    // bypass the extension cache entirely.
    let mut unique_extensions: Vec<(String, u32)> = Vec::new();
    let mut pending_by_extension: Vec<(usize, usize)> = Vec::new(); // (item, unique index)
    let mut per_file: Vec<usize> = Vec::new();

    for (i, item) in items.iter_mut().enumerate() {
        let per_file_lookup = if item.is_directory {
            cache.is_special_folder(&folder.join(item.name.as_str()))
        } else {
            cache.requires_per_file_lookup(item.extension())
        };
        if per_file_lookup {
            per_file.push(i);
            continue;
        }
        let key = extension_cache_key(item.is_directory, item.extension());
        if let Some(index) = cache.get_icon_index(&key) {
            item.icon_index = index;
            continue;
        }
        let unique = match unique_extensions.iter().position(|(k, _)| *k == key) {
            Some(at) => at,
            None => {
                unique_extensions.push((key, item.attributes.bits()));
                unique_extensions.len() - 1
            }
        };
        pending_by_extension.push((i, unique));
    }

    tracing::debug!(
        target: "worker.enum",
        unique_extensions = unique_extensions.len(),
        per_file = per_file.len(),
        "icon_index_plan"
    );

    // Parallel unique-extension queries; each result is cached inside
    // `query_icon_index`, so the per-item apply below is pure lookup.
    let resolved: Vec<Option<i32>> = unique_extensions
        .par_iter()
        .map(|(key, attrs)| cache.query_icon_index(key, *attrs))
        .collect();
    for (item_index, unique) in pending_by_extension {
        if let Some(index) = resolved[unique] {
            items[item_index].icon_index = index;
        }
    }

    // Parallel per-file queries (paths assembled up front so the pool
    // borrows nothing mutable).
    let per_file_paths: Vec<(usize, PathBuf)> = per_file
        .into_iter()
        .map(|i| (i, folder.join(items[i].name.as_str())))
        .collect();
    let per_file_resolved: Vec<(usize, Option<i32>)> = per_file_paths
        .par_iter()
        .map(|(i, path)| (*i, cache.query_icon_index_for_path(path)))
        .collect();
    for (i, index) in per_file_resolved {
        if let Some(index) = index {
            items[i].icon_index = index;
        }
    }
}
