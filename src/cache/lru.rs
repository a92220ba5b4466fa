//! LRU Tracker Module
//!
//! Recency ordering used by the bounded in-memory backend.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Keys ordered by last use: front is most recent, back is least recent.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Recency ==
    /// Marks `key` as just used, inserting it if it was not tracked.
    pub fn touch(&mut self, key: &str) {
        self.forget(key);
        self.order.push_front(key.to_owned());
    }

    /// Stops tracking `key`. Unknown keys are ignored.
    pub fn forget(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    /// Removes and returns the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    // == Size ==
    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order_follows_insertion() {
        let mut lru = LruTracker::new();
        lru.touch("roles:1");
        lru.touch("channels:1");
        lru.touch("items");

        assert_eq!(lru.pop_least_recent().as_deref(), Some("roles:1"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("channels:1"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_touch_refreshes_position() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        // front=[a, c, b]=back
        assert_eq!(lru.pop_least_recent().as_deref(), Some("b"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("c"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("a"));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_touch_same_key_does_not_duplicate() {
        let mut lru = LruTracker::new();
        lru.touch("k");
        lru.touch("k");
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_forget_unknown_key_is_noop() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.forget("missing");
        assert_eq!(lru.len(), 1);

        lru.forget("a");
        assert!(lru.is_empty());
        assert_eq!(lru.pop_least_recent(), None);
    }
}
