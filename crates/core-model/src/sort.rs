//! Sort comparators.
//!
//! Directories always precede files, regardless of field or direction.
//! Within a group the active field orders items; equal keys fall through a
//! fixed chain (case-insensitive name, then case-sensitive name, then
//! `unsorted_order`) so the result is total and reproducible. Direction
//! inverts the primary key only; the final `unsorted_order` tie stays
//! ascending to keep equal-key runs stable.

use crate::item::Item;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Name,
    Extension,
    Time,
    Size,
    Attributes,
    /// Enumeration order (directories still grouped first).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[inline]
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Ordinal (code-point) case-insensitive compare; ASCII fast path first.
///
/// Deliberately not locale-aware: listing order must not change with the
/// user's locale, and plugins compare the same way on their side.
pub fn compare_ordinal_ignore_case(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().flat_map(char::to_lowercase);
    let mut bi = b.chars().flat_map(char::to_lowercase);
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// The shared fallback chain (always ascending apart from the caller's
/// primary key).
#[inline]
fn name_chain(a: &Item, b: &Item, direction: SortDirection) -> Ordering {
    direction
        .apply(compare_ordinal_ignore_case(a.name.as_str(), b.name.as_str()))
        .then_with(|| direction.apply(a.name.as_str().cmp(b.name.as_str())))
        .then_with(|| a.unsorted_order.cmp(&b.unsorted_order))
}

pub fn compare_items(a: &Item, b: &Item, by: SortBy, direction: SortDirection) -> Ordering {
    // Group boundary first; direction never moves files above directories.
    match (a.is_directory, b.is_directory) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match by {
        SortBy::Name => name_chain(a, b, direction),
        SortBy::Extension => direction
            .apply(compare_ordinal_ignore_case(a.extension(), b.extension()))
            .then_with(|| name_chain(a, b, direction)),
        SortBy::Time => direction
            .apply(a.last_write_time.cmp(&b.last_write_time))
            .then_with(|| name_chain(a, b, direction)),
        SortBy::Size => direction
            .apply(a.size_bytes.cmp(&b.size_bytes))
            .then_with(|| name_chain(a, b, direction)),
        SortBy::Attributes => direction
            .apply(a.attributes.bits().cmp(&b.attributes.bits()))
            .then_with(|| name_chain(a, b, direction)),
        SortBy::None => direction.apply(a.unsorted_order.cmp(&b.unsorted_order)),
    }
}

/// Threshold above which the stable sort runs on the rayon pool.
pub const PARALLEL_SORT_THRESHOLD: usize = 1_000;

pub fn sort_items(items: &mut [Item], by: SortBy, direction: SortDirection) {
    use rayon::prelude::*;
    if items.len() > PARALLEL_SORT_THRESHOLD {
        // rayon's par_sort_by is a stable merge sort, matching the serial
        // path's stability guarantee.
        items.par_sort_by(|a, b| compare_items(a, b, by, direction));
    } else {
        items.sort_by(|a, b| compare_items(a, b, by, direction));
    }
}
