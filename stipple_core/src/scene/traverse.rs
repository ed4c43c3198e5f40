// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{EntityId, INVALID};
use super::store::SceneStore;

/// An iterator over the direct children of an entity.
///
/// Created by [`SceneStore::children`].
pub struct Children<'a, C> {
    store: &'a SceneStore<C>,
    current: u32,
}

impl<C> core::fmt::Debug for Children<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Children")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<'a, C> Children<'a, C> {
    pub(crate) fn new(store: &'a SceneStore<C>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<C> Iterator for Children<'_, C> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.handle(idx))
    }
}
