use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::CacheError;

pub const DEFAULT_LIMIT: usize = 32;

/// Fixed-capacity memo table.
///
/// Inserting a new key while `limit` keys are already stored drops every
/// entry first, so the table never holds more than `limit` values. In strict
/// mode a second insert under an existing key is an error instead of an
/// overwrite, and `size` cross-checks the counter against the stored keys.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    entries: HashMap<K, V>,
    count: usize,
    limit: usize,
    strict: bool,
}

impl<K: Hash + Eq + Debug, V> BoundedCache<K, V> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            count: 0,
            limit: limit.max(1),
            strict: false,
        }
    }

    pub fn strict(limit: usize) -> Self {
        Self {
            strict: true,
            ..Self::new(limit)
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn add(&mut self, key: K, value: V) -> Result<(), CacheError> {
        let exists = self.entries.contains_key(&key);
        if exists {
            if self.strict {
                return Err(CacheError::DuplicateKey {
                    key: format!("{key:?}"),
                });
            }
            self.entries.insert(key, value);
            return Ok(());
        }

        if self.count >= self.limit {
            self.clear();
        }
        self.entries.insert(key, value);
        self.count += 1;
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn size(&self) -> Result<usize, CacheError> {
        if self.strict && self.entries.len() != self.count {
            return Err(CacheError::SizeMismatch {
                expected: self.count,
                actual: self.entries.len(),
            });
        }
        Ok(self.count)
    }

    /// Stored entry count, without the strict-mode cross-check of `size`.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.count = 0;
    }
}

impl<K: Hash + Eq + Debug, V> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
