//! LIFO history of views left by drill-down navigation

use super::types::NavigationFrame;

/// Unbounded, no deduplication. Root selections clear it.
#[derive(Clone, Debug, Default)]
pub struct NavigationStack {
    frames: Vec<NavigationFrame>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: NavigationFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<NavigationFrame> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&NavigationFrame> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RootView, View};

    fn frame(title: &str) -> NavigationFrame {
        NavigationFrame::new(View::Root(RootView::Artists), title)
    }

    #[test]
    fn test_push_then_pop_returns_frame() {
        let mut stack = NavigationStack::new();
        stack.push(frame("Artists"));

        assert_eq!(stack.pop(), Some(frame("Artists")));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_pop_on_empty_is_none() {
        let mut stack = NavigationStack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.peek(), None);
    }

    #[test]
    fn test_lifo_without_dedup() {
        let mut stack = NavigationStack::new();
        stack.push(frame("a"));
        stack.push(frame("a"));
        stack.push(frame("b"));

        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.peek().map(|f| f.title.as_str()), Some("b"));
        assert_eq!(stack.pop().map(|f| f.title), Some("b".to_string()));
        assert_eq!(stack.pop().map(|f| f.title), Some("a".to_string()));

        stack.clear();
        assert!(stack.is_empty());
    }
}
