//! Keyed memoization for derived view-state
//!
//! Each derived value is cached together with the dependency key it was
//! computed from. Asking again with an equal key returns the cached value;
//! a different key (or an explicit invalidation) recomputes.

/// Single-slot cache keyed on its dependency set
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    computations: u64,
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }

    /// Return the cached value for `key`, recomputing only when the key changed
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                return value.clone();
            }
        }
        let value = compute(&key);
        self.computations += 1;
        self.entry = Some((key, value.clone()));
        value
    }

    /// Drop the cached value so the next read recomputes
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Cached value without touching the key
    pub fn peek(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, value)| value)
    }

    /// Number of times the value has been computed
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

impl<K: PartialEq, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
