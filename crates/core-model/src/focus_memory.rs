//! Per-folder focus memory.
//!
//! Navigating away remembers the focused item's name; navigating back
//! restores it. Keys are normalized paths so `C:\Docs` and `c:/docs/`
//! collide the way a user expects; non-Windows paths keep their case
//! because their filesystems usually do.

use ahash::AHashMap;

const CAPACITY: usize = 256;

/// Normalized lookup key for a folder path.
///
/// Generic form: `\` becomes `/`, duplicate separators collapse, a lone
/// trailing separator is dropped (except for roots like `C:/`). Windows
/// absolutes (drive `C:`, UNC `//server`, extended `//?/`) are lowercased
/// wholesale; everything else is case-preserving.
pub fn folder_key(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_sep = false;
    for ch in path.chars() {
        let c = if ch == '\\' { '/' } else { ch };
        if c == '/' {
            if last_sep {
                continue;
            }
            last_sep = true;
        } else {
            last_sep = false;
        }
        out.push(c);
    }
    while out.len() > 1 && out.ends_with('/') && !out.ends_with(":/") {
        out.pop();
    }

    let bytes = out.as_bytes();
    let windows_absolute = (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
        || out.starts_with("//");
    if windows_absolute {
        out.to_lowercase()
    } else {
        out
    }
}

/// `folder key → last focused name`, bounded, insertion-order eviction.
#[derive(Debug, Default)]
pub struct FocusMemory {
    map: AHashMap<String, String>,
    order: Vec<String>,
}

impl FocusMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, folder: &str, focused_name: &str) {
        let key = folder_key(folder);
        if self.map.insert(key.clone(), focused_name.to_owned()).is_none() {
            self.order.push(key);
            if self.order.len() > CAPACITY {
                let oldest = self.order.remove(0);
                self.map.remove(&oldest);
            }
        }
    }

    pub fn recall(&self, folder: &str) -> Option<&str> {
        self.map.get(&folder_key(folder)).map(String::as_str)
    }

    /// Called when the storage root changes: remembered names from another
    /// root are meaningless.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
