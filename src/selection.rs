/// Bulk selection
///
/// The selection is a set of record keys that survives page changes. The
/// "select all" checkbox only ever looks at, and acts on, the visible page.

use crate::table::RecordKey;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: BTreeSet<RecordKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    /// Selected keys in key order.
    pub fn keys(&self) -> Vec<RecordKey> {
        self.keys.iter().cloned().collect()
    }

    pub fn toggle(&mut self, key: RecordKey, checked: bool) {
        if checked {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Add or remove exactly the visible keys; other pages are untouched.
    pub fn toggle_all<'a, I>(&mut self, visible: I, checked: bool)
    where
        I: IntoIterator<Item = &'a RecordKey>,
    {
        for key in visible {
            if checked {
                self.keys.insert(key.clone());
            } else {
                self.keys.remove(key);
            }
        }
    }

    /// True when the visible page is non-empty and fully selected.
    pub fn all_selected<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a RecordKey>,
    {
        let mut any = false;
        for key in visible {
            if !self.keys.contains(key) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Drop keys for which `exists` returns false.
    pub fn retain(&mut self, mut exists: impl FnMut(&RecordKey) -> bool) {
        self.keys.retain(|k| exists(k));
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(range: std::ops::RangeInclusive<i64>) -> Vec<RecordKey> {
        range.map(RecordKey::Int).collect()
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        selection.toggle(RecordKey::Int(1), true);
        selection.toggle(RecordKey::Int(2), true);
        selection.toggle(RecordKey::Int(1), false);
        assert_eq!(selection.keys(), vec![RecordKey::Int(2)]);
    }

    #[test]
    fn test_select_all_across_pages() {
        let page1 = keys(1..=10);
        let page2 = keys(11..=20);
        let mut selection = Selection::new();

        selection.toggle_all(&page1, true);
        assert!(selection.all_selected(&page1));
        assert!(!selection.all_selected(&page2));

        selection.toggle_all(&page2, true);
        assert_eq!(selection.len(), 20);
        assert!(selection.all_selected(&page1));
        assert!(selection.all_selected(&page2));
    }

    #[test]
    fn test_unselect_all_leaves_other_pages() {
        let page1 = keys(1..=10);
        let page2 = keys(11..=20);
        let mut selection = Selection::new();
        selection.toggle_all(&page1, true);
        selection.toggle_all(&page2, true);

        selection.toggle_all(&page2, false);
        assert_eq!(selection.keys(), page1);
    }

    #[test]
    fn test_all_selected_requires_full_coverage() {
        let page = keys(1..=3);
        let mut selection = Selection::new();
        selection.toggle(RecordKey::Int(1), true);
        selection.toggle(RecordKey::Int(2), true);
        assert!(!selection.all_selected(&page));
        selection.toggle(RecordKey::Int(3), true);
        assert!(selection.all_selected(&page));
        assert!(!selection.all_selected(&Vec::new()));
    }

    #[test]
    fn test_retain() {
        let mut selection = Selection::new();
        selection.toggle_all(&keys(1..=5), true);
        selection.retain(|k| matches!(k, RecordKey::Int(v) if v % 2 == 1));
        assert_eq!(selection.keys(), vec![RecordKey::Int(1), RecordKey::Int(3), RecordKey::Int(5)]);
    }
}
