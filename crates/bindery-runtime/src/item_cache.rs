#![forbid(unsafe_code)]

//! Change detection for list-shaped aspects.
//!
//! An [`ItemCache`] remembers the last list it was given. Callers reset a
//! list-backed widget only when [`ItemCache::replace_content`] reports a
//! change, so selection and scroll state survive refreshes that did not
//! alter the list.
//!
//! # Invariants
//!
//! 1. `replace_content(c)` returns `true` iff `c` differs from the cached
//!    list, element by element and in order.
//! 2. On `true` the cache holds exactly `c`; on `false` it is untouched.
//! 3. [`ItemCache::items`] always reflects the last successful replacement.

/// Last known content of one list-shaped aspect.
#[derive(Debug, Clone)]
pub struct ItemCache<T> {
    items: Vec<T>,
    replacements: u64,
}

impl<T> Default for ItemCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            replacements: 0,
        }
    }
}

impl<T: PartialEq> ItemCache<T> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached list with `candidate` if it differs.
    ///
    /// Returns whether the content changed.
    pub fn replace_content(&mut self, candidate: Vec<T>) -> bool {
        if self.items == candidate {
            return false;
        }
        self.items = candidate;
        self.replacements += 1;
        true
    }

    /// Current content.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget the cached list; the next non-empty candidate is a change.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of successful replacements so far.
    #[must_use]
    pub fn replacements(&self) -> u64 {
        self.replacements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_candidate_is_a_change() {
        let mut cache = ItemCache::new();
        assert!(cache.replace_content(vec!["a", "b"]));
        assert_eq!(cache.items(), &["a", "b"]);
    }

    #[test]
    fn empty_candidate_on_empty_cache_is_no_change() {
        let mut cache: ItemCache<i32> = ItemCache::new();
        assert!(!cache.replace_content(Vec::new()));
        assert_eq!(cache.replacements(), 0);
    }

    #[test]
    fn equal_content_keeps_cache() {
        let mut cache = ItemCache::new();
        cache.replace_content(vec![1, 2, 3]);
        assert!(!cache.replace_content(vec![1, 2, 3]));
        assert_eq!(cache.replacements(), 1);
    }

    #[test]
    fn order_matters() {
        let mut cache = ItemCache::new();
        cache.replace_content(vec![1, 2, 3]);
        assert!(cache.replace_content(vec![3, 2, 1]));
        assert_eq!(cache.items(), &[3, 2, 1]);
    }

    #[test]
    fn clear_forces_next_change() {
        let mut cache = ItemCache::new();
        cache.replace_content(vec![1]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.replace_content(vec![1]));
    }

    #[test]
    fn nan_option_is_no_change() {
        use bindery_core::Value;

        let mut cache = ItemCache::new();
        cache.replace_content(vec![Value::Float(f64::NAN), Value::Float(1.5)]);
        assert!(!cache.replace_content(vec![Value::Float(f64::NAN), Value::Float(1.5)]));
        assert_eq!(cache.replacements(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn changed_iff_different(
                first in proptest::collection::vec(0u8..4, 0..6),
                second in proptest::collection::vec(0u8..4, 0..6),
            ) {
                let mut cache = ItemCache::new();
                cache.replace_content(first.clone());
                let changed = cache.replace_content(second.clone());
                prop_assert_eq!(changed, first != second);
                prop_assert_eq!(cache.items(), second.as_slice());
            }

            #[test]
            fn repeat_is_idempotent(items in proptest::collection::vec(any::<i16>(), 0..8)) {
                let mut cache = ItemCache::new();
                cache.replace_content(items.clone());
                let before = cache.replacements();
                prop_assert!(!cache.replace_content(items.clone()));
                prop_assert_eq!(cache.replacements(), before);
                prop_assert_eq!(cache.items(), items.as_slice());
            }
        }
    }
}
