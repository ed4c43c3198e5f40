// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays entity storage with allocation, topology, and property management.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};

use super::component::{Anchor, Component};
use super::id::{EntityId, INVALID};
use super::traverse::Children;
use crate::bbox::BoundingBox;
use crate::dirty::Dirty;
use crate::matrix::Matrix;

/// How many times each derived value has been recomputed.
///
/// Diagnostics only; a well-behaved frame recomputes each dirty value once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    /// Local matrix rebuilds.
    pub local: u64,
    /// World matrix compositions.
    pub world: u64,
    /// Bounding-box aggregations.
    pub bounds: u64,
}

/// Struct-of-arrays storage for all entities.
///
/// Entities are addressed by [`EntityId`] handles. Internally, each entity
/// occupies a slot in parallel arrays. Destroyed entities are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// Derived values (local matrix, world matrix, world bounding box) live in
/// per-slot scratch instances that are rewritten in place when dirty; the
/// lazy getters hand out copies, so nothing stale can be held across a
/// mutation.
pub struct SceneStore<C> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) position: Vec<Point>,
    pub(crate) rotation: Vec<f64>,
    pub(crate) scale: Vec<Vec2>,
    pub(crate) position_offset: Vec<Vec2>,
    pub(crate) scale_mult: Vec<Vec2>,
    pub(crate) enabled: Vec<bool>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) anchor: Vec<Option<Anchor>>,
    pub(crate) components: Vec<Vec<C>>,

    // -- Derived properties (written lazily by evaluate) --
    pub(crate) local_matrix: Vec<Matrix>,
    pub(crate) world_matrix: Vec<Matrix>,
    pub(crate) bounds: Vec<BoundingBox>,
    pub(crate) dirty: Vec<Dirty>,
    pub(crate) counters: EvalCounters,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl<C> fmt::Debug for SceneStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl<C> Default for SceneStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SceneStore<C> {
    /// Creates an empty scene store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            position: Vec::new(),
            rotation: Vec::new(),
            scale: Vec::new(),
            position_offset: Vec::new(),
            scale_mult: Vec::new(),
            enabled: Vec::new(),
            opacity: Vec::new(),
            anchor: Vec::new(),
            components: Vec::new(),
            local_matrix: Vec::new(),
            world_matrix: Vec::new(),
            bounds: Vec::new(),
            dirty: Vec::new(),
            counters: EvalCounters::default(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new entity and returns its handle.
    ///
    /// The entity starts at the origin with no rotation, unit scale, full
    /// opacity, enabled, with no components and no parent.
    pub fn create_entity(&mut self) -> EntityId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; the generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.position[i] = Point::ORIGIN;
            self.rotation[i] = 0.0;
            self.scale[i] = Vec2::new(1.0, 1.0);
            self.position_offset[i] = Vec2::ZERO;
            self.scale_mult[i] = Vec2::new(1.0, 1.0);
            self.enabled[i] = true;
            self.opacity[i] = 1.0;
            self.anchor[i] = None;
            self.components[i].clear();
            self.local_matrix[i] = Matrix::IDENTITY;
            self.world_matrix[i] = Matrix::IDENTITY;
            self.bounds[i] = BoundingBox::EMPTY;
            self.dirty[i] = Dirty::TRANSFORM;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.position.push(Point::ORIGIN);
            self.rotation.push(0.0);
            self.scale.push(Vec2::new(1.0, 1.0));
            self.position_offset.push(Vec2::ZERO);
            self.scale_mult.push(Vec2::new(1.0, 1.0));
            self.enabled.push(true);
            self.opacity.push(1.0);
            self.anchor.push(None);
            self.components.push(Vec::new());
            self.local_matrix.push(Matrix::IDENTITY);
            self.world_matrix.push(Matrix::IDENTITY);
            self.bounds.push(BoundingBox::EMPTY);
            self.dirty.push(Dirty::TRANSFORM);
            self.generation.push(0);
            idx
        };

        self.handle(idx)
    }

    /// Destroys an entity, dropping its components and freeing its slot.
    ///
    /// # Panics
    ///
    /// Panics if the entity has children (remove them first) or if the
    /// handle is stale.
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy entity with children"
        );

        let p = self.parent[idx as usize];
        if p != INVALID {
            self.unlink_from_parent(idx);
            self.mark_bounds_upward(p);
        }

        self.components[idx as usize].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Whether the store holds no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks `child`'s subtree world-dirty (it has a new ancestry) and
    /// `parent`'s bounds and those of its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` is `child` itself or one of its descendants.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_ancestor_or_self(child.idx, parent.idx),
            "cannot add an entity under its own subtree"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Removes `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the entity has no parent.
    pub fn remove_from_parent(&mut self, child: EntityId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        assert!(p != INVALID, "entity has no parent");

        self.unlink_from_parent(c);
        self.mark_world_subtree(c);
        self.mark_bounds_upward(p);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `new_parent` is `child`
    /// itself or one of its descendants.
    pub fn reparent(&mut self, child: EntityId, new_parent: EntityId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(
            !self.is_ancestor_or_self(child.idx, new_parent.idx),
            "cannot reparent an entity under its own subtree"
        );

        let old_p = self.parent[child.idx as usize];
        if old_p != INVALID {
            self.unlink_from_parent(child.idx);
            self.mark_bounds_upward(old_p);
        }
        self.link_last(new_parent.idx, child.idx);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, `sibling`
    /// has no parent, or `sibling`'s parent lies in `child`'s subtree.
    pub fn insert_before(&mut self, child: EntityId, sibling: EntityId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        assert!(
            !self.is_ancestor_or_self(c, p),
            "cannot add an entity under its own subtree"
        );

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.mark_world_subtree(c);
        self.mark_bounds_upward(p);
    }

    /// Returns the parent of an entity, if any.
    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of an entity.
    #[must_use]
    pub fn children(&self, id: EntityId) -> Children<'_, C> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the first child of an entity.
    ///
    /// Together with [`next_sibling`](Self::next_sibling) this walks the
    /// children without holding a borrow of the store, which traversals that
    /// also read lazy values need.
    #[must_use]
    pub fn first_child(&self, id: EntityId) -> Option<EntityId> {
        self.validate(id);
        let c = self.first_child[id.idx as usize];
        (c != INVALID).then(|| self.handle(c))
    }

    /// Returns the next sibling of an entity.
    #[must_use]
    pub fn next_sibling(&self, id: EntityId) -> Option<EntityId> {
        self.validate(id);
        let s = self.next_sibling[id.idx as usize];
        (s != INVALID).then(|| self.handle(s))
    }

    /// Returns the root entities (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<EntityId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local position.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Returns the local rotation in radians.
    #[must_use]
    pub fn rotation(&self, id: EntityId) -> f64 {
        self.validate(id);
        self.rotation[id.idx as usize]
    }

    /// Returns the local scale.
    #[must_use]
    pub fn scale(&self, id: EntityId) -> Vec2 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Returns the additive position offset.
    #[must_use]
    pub fn position_offset(&self, id: EntityId) -> Vec2 {
        self.validate(id);
        self.position_offset[id.idx as usize]
    }

    /// Returns the multiplicative scale factor.
    #[must_use]
    pub fn scale_mult(&self, id: EntityId) -> Vec2 {
        self.validate(id);
        self.scale_mult[id.idx as usize]
    }

    /// Returns whether the entity (and thus its subtree) is drawn.
    #[must_use]
    pub fn is_enabled(&self, id: EntityId) -> bool {
        self.validate(id);
        self.enabled[id.idx as usize]
    }

    /// Returns the local opacity.
    #[must_use]
    pub fn opacity(&self, id: EntityId) -> f64 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the camera anchor, if any.
    #[must_use]
    pub fn anchor(&self, id: EntityId) -> Option<Anchor> {
        self.validate(id);
        self.anchor[id.idx as usize]
    }

    /// Returns the stale derived values of an entity.
    #[must_use]
    pub fn dirty(&self, id: EntityId) -> Dirty {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    /// Returns the recomputation counters.
    #[must_use]
    pub fn eval_counters(&self) -> EvalCounters {
        self.counters
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local position.
    ///
    /// Marks nothing if the value is unchanged.
    pub fn set_position(&mut self, id: EntityId, position: Point) {
        self.validate(id);
        if self.position[id.idx as usize] != position {
            self.position[id.idx as usize] = position;
            self.mark_transform(id.idx);
        }
    }

    /// Sets the local rotation in radians.
    ///
    /// Marks nothing if the value is unchanged.
    pub fn set_rotation(&mut self, id: EntityId, radians: f64) {
        self.validate(id);
        if self.rotation[id.idx as usize] != radians {
            self.rotation[id.idx as usize] = radians;
            self.mark_transform(id.idx);
        }
    }

    /// Sets the local scale.
    ///
    /// Marks nothing if the value is unchanged.
    pub fn set_scale(&mut self, id: EntityId, scale: Vec2) {
        self.validate(id);
        if self.scale[id.idx as usize] != scale {
            self.scale[id.idx as usize] = scale;
            self.mark_transform(id.idx);
        }
    }

    /// Sets the additive position offset applied on top of the position.
    ///
    /// Marks nothing if the value is unchanged.
    pub fn set_position_offset(&mut self, id: EntityId, offset: Vec2) {
        self.validate(id);
        if self.position_offset[id.idx as usize] != offset {
            self.position_offset[id.idx as usize] = offset;
            self.mark_transform(id.idx);
        }
    }

    /// Sets the multiplicative factor applied on top of the scale.
    ///
    /// Marks nothing if the value is unchanged.
    pub fn set_scale_mult(&mut self, id: EntityId, mult: Vec2) {
        self.validate(id);
        if self.scale_mult[id.idx as usize] != mult {
            self.scale_mult[id.idx as usize] = mult;
            self.mark_transform(id.idx);
        }
    }

    /// Enables or disables an entity and its subtree.
    ///
    /// A disabled child does not contribute to its ancestors' bounds.
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.enabled[i] != enabled {
            self.enabled[i] = enabled;
            let p = self.parent[i];
            if p != INVALID {
                self.mark_bounds_upward(p);
            }
        }
    }

    /// Sets the local opacity, multiplied down the tree during traversal.
    pub fn set_opacity(&mut self, id: EntityId, opacity: f64) {
        self.validate(id);
        self.opacity[id.idx as usize] = opacity;
    }

    /// Sets or clears the camera anchor.
    ///
    /// Clearing the anchor resets the offset and multiplier it drove.
    pub fn set_anchor(&mut self, id: EntityId, anchor: Option<Anchor>) {
        self.validate(id);
        self.anchor[id.idx as usize] = anchor;
        if anchor.is_none() {
            self.set_position_offset(id, Vec2::ZERO);
            self.set_scale_mult(id, Vec2::new(1.0, 1.0));
        }
    }

    /// Forces the entity's bounds (and its ancestors') to be re-aggregated
    /// on the next read.
    ///
    /// Call this after mutating a component's geometry through a path the
    /// store cannot observe.
    pub fn invalidate_bounds(&mut self, id: EntityId) {
        self.validate(id);
        self.mark_bounds_upward(id.idx);
    }

    // -- Internal helpers --

    /// Builds a handle for a live slot.
    #[inline]
    pub(crate) fn handle(&self, idx: u32) -> EntityId {
        EntityId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: EntityId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale EntityId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Appends `c` to `p`'s child list and marks what the move invalidates.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.mark_world_subtree(c);
        self.mark_bounds_upward(p);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks everything a change to `idx`'s own transform invalidates.
    fn mark_transform(&mut self, idx: u32) {
        self.dirty[idx as usize].insert(Dirty::LOCAL);
        self.mark_world_subtree(idx);
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.mark_bounds_upward(p);
        }
    }

    /// Marks `idx` and its descendants world- and bounds-dirty, stopping at
    /// nodes that are already world-dirty.
    fn mark_world_subtree(&mut self, idx: u32) {
        if self.dirty[idx as usize].contains(Dirty::WORLD) {
            return;
        }
        self.dirty[idx as usize].insert(Dirty::INHERITED);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.mark_world_subtree(child);
            child = self.next_sibling[child as usize];
        }
    }

    /// Marks `idx` and its ancestors bounds-dirty, stopping at the first one
    /// that already is.
    fn mark_bounds_upward(&mut self, mut idx: u32) {
        while idx != INVALID {
            if self.dirty[idx as usize].contains(Dirty::BOUNDS) {
                return;
            }
            self.dirty[idx as usize].insert(Dirty::BOUNDS);
            idx = self.parent[idx as usize];
        }
    }
}

impl<C: Component> SceneStore<C> {
    // -- Component API --

    /// Attaches a component, keeping the list sorted by
    /// [`z_index`](Component::z_index).
    ///
    /// Components with equal z keep insertion order. Returns the position
    /// the component was inserted at.
    pub fn add_component(&mut self, id: EntityId, component: C) -> usize {
        self.validate(id);
        let list = &mut self.components[id.idx as usize];
        let z = component.z_index();
        let at = list.partition_point(|c| c.z_index() <= z);
        list.insert(at, component);
        self.mark_bounds_upward(id.idx);
        at
    }

    /// Returns the components of an entity in paint order.
    #[must_use]
    pub fn components(&self, id: EntityId) -> &[C] {
        self.validate(id);
        &self.components[id.idx as usize]
    }

    /// Returns a component for mutation.
    ///
    /// The entity's bounds are invalidated, since the component may change
    /// its extent. Z order is not re-sorted.
    pub fn component_mut(&mut self, id: EntityId, index: usize) -> Option<&mut C> {
        self.validate(id);
        if index >= self.components[id.idx as usize].len() {
            return None;
        }
        self.mark_bounds_upward(id.idx);
        self.components[id.idx as usize].get_mut(index)
    }

    /// Detaches and returns the component at `index`.
    pub fn remove_component(&mut self, id: EntityId, index: usize) -> Option<C> {
        self.validate(id);
        let list = &mut self.components[id.idx as usize];
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        self.mark_bounds_upward(id.idx);
        Some(removed)
    }
}
