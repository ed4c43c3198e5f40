// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized resolution of handles into real resources.

use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

/// Memoizes the result of resolving a key the first time it is requested.
///
/// Successful resolutions are always kept. Misses are kept only when the
/// cache was created with `cache_misses`; otherwise the resolver runs again
/// on the next request, which is how an asset that finishes loading between
/// frames becomes visible.
pub struct LazyCache<K, V> {
    entries: HashMap<K, Option<V>>,
    cache_misses: bool,
    resolve_count: u64,
}

impl<K, V> fmt::Debug for LazyCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCache")
            .field("len", &self.entries.len())
            .field("cache_misses", &self.cache_misses)
            .field("resolve_count", &self.resolve_count)
            .finish()
    }
}

impl<K: Hash + Eq, V> LazyCache<K, V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(cache_misses: bool) -> Self {
        Self {
            entries: HashMap::new(),
            cache_misses,
            resolve_count: 0,
        }
    }

    /// Returns the memoized value for `key`, resolving it first if needed.
    pub fn get_or_resolve(&mut self, key: K, resolve: impl FnOnce(&K) -> Option<V>) -> Option<&V> {
        match self.entries.entry(key) {
            // Misses are only stored when `cache_misses` is set.
            Entry::Occupied(entry) => entry.into_mut().as_ref(),
            Entry::Vacant(entry) => {
                self.resolve_count += 1;
                let value = resolve(entry.key());
                if value.is_none() && !self.cache_misses {
                    return None;
                }
                entry.insert(value).as_ref()
            }
        }
    }

    /// Returns the memoized value without resolving.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Whether `key` has a memoized entry (hit or remembered miss).
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Forgets the entry for `key`, forcing the next request to resolve.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times a resolver has been invoked.
    #[must_use]
    pub const fn resolve_count(&self) -> u64 {
        self.resolve_count
    }
}
