//! Multi-select accumulator of item paths

use indexmap::IndexSet;

/// Selected path identifiers in the order they were picked. Survives
/// pagination; independent of which page or view produced an id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: IndexSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.shift_remove(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flip membership of a single id. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// If every visible id is selected, deselect them all; otherwise select
    /// them all. Ids outside `visible` are never touched.
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: Vec<&str> = visible.into_iter().collect();
        let all_selected = visible.iter().all(|id| self.ids.contains(*id));

        for id in visible {
            if all_selected {
                self.ids.shift_remove(id);
            } else {
                self.ids.insert(id.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in selection order, for bulk calls.
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_all_selects_missing_then_clears() {
        let mut selection = SelectionSet::new();
        selection.add("a");
        selection.add("b");

        selection.toggle_all(["a", "b", "c"]);
        assert!(selection.contains("a") && selection.contains("b") && selection.contains("c"));

        selection.toggle_all(["a", "b", "c"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_leaves_outside_ids_alone() {
        let mut selection = SelectionSet::new();
        selection.add("page1/x");

        selection.toggle_all(["page2/a", "page2/b"]);
        assert_eq!(selection.len(), 3);

        selection.toggle_all(["page2/a", "page2/b"]);
        assert_eq!(selection.to_vec(), vec!["page1/x".to_string()]);
    }

    #[test]
    fn test_order_follows_selection() {
        let mut selection = SelectionSet::new();
        selection.add("z/3.flac");
        selection.add("a/1.flac");
        selection.add("m/2.flac");
        selection.remove("a/1.flac");
        selection.add("a/1.flac");

        assert_eq!(selection.to_vec(), vec!["z/3.flac", "m/2.flac", "a/1.flac"]);
    }

    #[test]
    fn test_uniqueness_and_toggle() {
        let mut selection = SelectionSet::new();
        selection.add("a");
        selection.add("a");
        assert_eq!(selection.len(), 1);

        assert!(!selection.toggle("a"));
        assert!(selection.toggle("a"));
        selection.remove("a");
        assert!(!selection.contains("a"));
    }
}
