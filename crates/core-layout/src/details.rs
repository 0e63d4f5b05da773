//! Secondary-line text for Detailed / ExtraDetailed modes.
//!
//! These strings are caches on the item (cleared by distant-state release)
//! and deliberately locale-free: the pane shows stable, plugin-agnostic
//! text and leaves pretty locale formatting to the host's status bar.

use core_model::Item;
use core_source::FileAttributes;

pub fn format_size_human(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value >= 100.0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// "size · modified" for files, `<DIR>` for directories.
pub fn format_details_line(item: &Item) -> String {
    if item.is_directory {
        "<DIR>".to_owned()
    } else {
        format!(
            "{} · {}",
            format_size_human(item.size_bytes),
            item.last_write_time
        )
    }
}

/// Attribute letter line for ExtraDetailed mode (`R`, `H`, `S`, `A`, `L`).
pub fn format_attributes_line(item: &Item) -> String {
    let mut out = String::with_capacity(5);
    let a = item.attributes;
    if a.contains(FileAttributes::READONLY) {
        out.push('R');
    }
    if a.contains(FileAttributes::HIDDEN) {
        out.push('H');
    }
    if a.contains(FileAttributes::SYSTEM) {
        out.push('S');
    }
    if a.contains(FileAttributes::ARCHIVE) {
        out.push('A');
    }
    if a.contains(FileAttributes::REPARSE_POINT) {
        out.push('L');
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
