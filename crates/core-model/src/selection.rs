//! Selection aggregates.

use crate::item::Item;

/// Details shown when exactly one item is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleItemDetails {
    pub name: String,
    pub is_directory: bool,
    pub size_bytes: u64,
    pub last_write_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub selected_folders: usize,
    pub selected_files: usize,
    pub selected_file_bytes: u64,
    pub single_item_details: Option<SingleItemDetails>,
}

impl SelectionStats {
    pub fn total_selected(&self) -> usize {
        self.selected_folders + self.selected_files
    }

    pub fn compute(items: &[Item]) -> SelectionStats {
        let mut stats = SelectionStats::default();
        let mut single: Option<&Item> = None;
        for item in items.iter().filter(|i| i.selected) {
            if item.is_directory {
                stats.selected_folders += 1;
            } else {
                stats.selected_files += 1;
                stats.selected_file_bytes += item.size_bytes;
            }
            single = if stats.total_selected() == 1 { Some(item) } else { None };
        }
        stats.single_item_details = single.map(|item| SingleItemDetails {
            name: item.name.as_str().to_owned(),
            is_directory: item.is_directory,
            size_bytes: item.size_bytes,
            last_write_time: item.last_write_time,
        });
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_source::{ArenaString, FileAttributes};

    fn item(name: &str, dir: bool, size: u64, selected: bool) -> Item {
        let attrs = if dir { FileAttributes::DIRECTORY } else { FileAttributes::empty() };
        let mut it = Item::from_entry(ArenaString::detached(name), attrs, size, 0, 0, 0);
        it.selected = selected;
        it
    }

    #[test]
    fn empty_selection() {
        let stats = SelectionStats::compute(&[item("a", false, 5, false)]);
        assert_eq!(stats, SelectionStats::default());
    }

    #[test]
    fn mixed_selection_counts_and_bytes() {
        let items = vec![
            item("d1", true, 0, true),
            item("f1", false, 100, true),
            item("f2", false, 50, true),
            item("f3", false, 7, false),
        ];
        let stats = SelectionStats::compute(&items);
        assert_eq!(stats.selected_folders, 1);
        assert_eq!(stats.selected_files, 2);
        assert_eq!(stats.selected_file_bytes, 150);
        assert!(stats.single_item_details.is_none());
    }

    #[test]
    fn single_selection_carries_details() {
        let items = vec![item("only.txt", false, 42, true), item("x", false, 1, false)];
        let stats = SelectionStats::compute(&items);
        let details = stats.single_item_details.unwrap();
        assert_eq!(details.name, "only.txt");
        assert_eq!(details.size_bytes, 42);
        assert!(!details.is_directory);
    }
}
