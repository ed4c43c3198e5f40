// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-keyed interning of values into small integer handles.
//!
//! An [`Interner`] canonicalizes values by a caller-supplied *key function*:
//! two values with equal keys share one [`InternId`]. Comparing two ids is
//! then a substitute for deep-comparing the values, which is what lets the
//! encoder detect "style unchanged" with a single integer compare.
//!
//! Ids start at 1 and are handed out monotonically. [`Interner::clear`]
//! drops every entry but keeps counting, so an id issued before a clear can
//! never alias a value interned after it; it resolves to `None` instead.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use core::num::NonZeroU32;

use hashbrown::HashMap;

/// A handle to an interned value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternId(NonZeroU32);

impl InternId {
    /// Creates an id from its raw value, or `None` for zero.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Returns the raw value (always `>= 1`).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Encodes the id as an `f64` operand.
    #[inline]
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.get())
    }

    /// Decodes an id from an `f64` operand.
    ///
    /// Returns `None` for values that are not positive integers in `u32`
    /// range.
    #[inline]
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !(value >= 1.0 && value <= f64::from(u32::MAX)) {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "range checked above; operands are written from u32 ids"
        )]
        let raw = value as u32;
        if f64::from(raw) != value {
            return None;
        }
        Self::new(raw)
    }
}

impl fmt::Debug for InternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternId({})", self.get())
    }
}

/// Maps values to stable [`InternId`]s by content.
pub struct Interner<T, K = String> {
    key_fn: fn(&T) -> K,
    by_key: HashMap<K, InternId>,
    /// Values for ids `base..base + items.len()`.
    items: Vec<(K, T)>,
    base: NonZeroU32,
}

impl<T: fmt::Debug, K> fmt::Debug for Interner<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("base", &self.base)
            .field("len", &self.items.len())
            .field("items", &self.items.iter().map(|(_, v)| v).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Interner<String, String> {
    /// Creates an interner whose key is the string itself.
    ///
    /// Used for image paths and text runs.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(String::clone)
    }

    /// Like [`to_id`](Self::to_id), but only allocates the first time `s`
    /// is seen.
    pub fn intern_str(&mut self, s: &str) -> InternId {
        if let Some(&id) = self.by_key.get(s) {
            return id;
        }
        self.to_id(&String::from(s))
    }

    /// Looks up the id of an already interned string.
    #[must_use]
    pub fn id_of_str(&self, s: &str) -> Option<InternId> {
        self.by_key.get(s).copied()
    }
}

impl<T, K: Hash + Eq + Clone> Interner<T, K> {
    /// Creates an empty interner using `key_fn` to derive content keys.
    #[must_use]
    pub fn new(key_fn: fn(&T) -> K) -> Self {
        Self {
            key_fn,
            by_key: HashMap::new(),
            items: Vec::new(),
            base: NonZeroU32::MIN,
        }
    }

    /// Returns the id for `value`, allocating a new one the first time its
    /// key is seen.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` ids have been issued.
    pub fn to_id(&mut self, value: &T) -> InternId
    where
        T: Clone,
    {
        let key = (self.key_fn)(value);
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.next_id();
        self.by_key.insert(key.clone(), id);
        self.items.push((key, value.clone()));
        id
    }

    /// Looks up the value for an id.
    #[must_use]
    pub fn id_to_item(&self, id: InternId) -> Option<&T> {
        let slot = id.get().checked_sub(self.base.get())?;
        self.items.get(slot as usize).map(|(_, v)| v)
    }

    /// Looks up a value (and its id) by content key.
    #[must_use]
    pub fn hash_to_item(&self, key: &K) -> Option<(InternId, &T)> {
        let id = *self.by_key.get(key)?;
        self.id_to_item(id).map(|v| (id, v))
    }

    /// Returns the content key stored for an id.
    #[must_use]
    pub fn key_of(&self, id: InternId) -> Option<&K> {
        let slot = id.get().checked_sub(self.base.get())?;
        self.items.get(slot as usize).map(|(k, _)| k)
    }

    /// Number of interned values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no values are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops all entries. Numbering continues after the last issued id.
    pub fn clear(&mut self) {
        self.base = self.next_id().0;
        self.by_key.clear();
        self.items.clear();
    }

    fn next_id(&self) -> InternId {
        let next = u32::try_from(self.items.len())
            .ok()
            .and_then(|len| self.base.checked_add(len));
        match next {
            Some(n) => InternId(n),
            None => panic!("interner exhausted u32 ids"),
        }
    }
}
