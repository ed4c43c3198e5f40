// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy evaluation of derived entity values.
//!
//! Evaluation is pull-based: each getter recomputes its value only if the
//! corresponding [`Dirty`] flag is set, then clears the flag.
//!
//! 1. **Local** — `T(position + offset) · R(rotation) · S(scale ⊙ mult)`,
//!    rebuilt in place in the slot's scratch matrix.
//! 2. **World** — `parent_world · local`, or `local` at a root. The parent's
//!    world matrix is brought up to date first.
//! 3. **Bounds** — starts at [`BoundingBox::EMPTY`], adds the four mapped
//!    corners of every component's local box, then the world box of every
//!    enabled child (already in world space, so no corner mapping).
//!
//! Each value is recomputed exactly once per dirty period, regardless of how
//! many times it is read. [`EvalCounters`](super::EvalCounters) records
//! every recomputation for diagnostics.

use super::component::Component;
use super::id::{EntityId, INVALID};
use super::store::SceneStore;
use crate::bbox::BoundingBox;
use crate::dirty::Dirty;
use crate::matrix::Matrix;

impl<C> SceneStore<C> {
    /// Returns the local matrix, rebuilding it if dirty.
    pub fn local_matrix(&mut self, id: EntityId) -> Matrix {
        self.validate(id);
        self.ensure_local(id.idx);
        self.local_matrix[id.idx as usize]
    }

    /// Returns the world matrix, recomposing it (and any dirty ancestors')
    /// if needed.
    pub fn world_matrix(&mut self, id: EntityId) -> Matrix {
        self.validate(id);
        self.ensure_world(id.idx);
        self.world_matrix[id.idx as usize]
    }

    fn ensure_local(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.dirty[i].contains(Dirty::LOCAL) {
            return;
        }
        let translation = self.position[i].to_vec2() + self.position_offset[i];
        let scale = self.scale[i];
        let mult = self.scale_mult[i];

        let m = &mut self.local_matrix[i];
        m.reset();
        m.translate(translation.x, translation.y)
            .rotate(self.rotation[i])
            .scale(scale.x * mult.x, scale.y * mult.y);

        self.dirty[i].remove(Dirty::LOCAL);
        self.counters.local += 1;
    }

    fn ensure_world(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.dirty[i].contains(Dirty::WORLD) {
            return;
        }
        self.ensure_local(idx);
        let p = self.parent[i];
        let world = if p != INVALID {
            self.ensure_world(p);
            self.world_matrix[p as usize] * self.local_matrix[i]
        } else {
            self.local_matrix[i]
        };
        self.world_matrix[i] = world;
        self.dirty[i].remove(Dirty::WORLD);
        self.counters.world += 1;
    }
}

impl<C: Component> SceneStore<C> {
    /// Returns the world-space bounding box of the entity's subtree,
    /// re-aggregating it if dirty.
    ///
    /// An entity with no bounded components and no enabled children reports
    /// [`BoundingBox::EMPTY`].
    pub fn bounding_box(&mut self, id: EntityId) -> BoundingBox {
        self.validate(id);
        self.ensure_bounds(id.idx);
        self.bounds[id.idx as usize]
    }

    /// Returns the union of the entity's component boxes in its local space.
    ///
    /// Not cached; components that report no bounds are skipped. With
    /// `exclude` set, the component at that position is left out.
    #[must_use]
    pub fn local_content_bounds(&self, id: EntityId, exclude: Option<usize>) -> BoundingBox {
        self.validate(id);
        let mut bounds = BoundingBox::EMPTY;
        for (n, component) in self.components[id.idx as usize].iter().enumerate() {
            if Some(n) == exclude {
                continue;
            }
            if let Some(local) = component.local_bounds() {
                bounds.expand_box(&local);
            }
        }
        bounds
    }

    fn ensure_bounds(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.dirty[i].contains(Dirty::BOUNDS) {
            return;
        }
        self.ensure_world(idx);
        let world = self.world_matrix[i];

        let mut bounds = BoundingBox::EMPTY;
        for component in &self.components[i] {
            if let Some(local) = component.local_bounds() {
                bounds.expand_transformed(&local, &world);
            }
        }

        let mut child = self.first_child[i];
        while child != INVALID {
            if self.enabled[child as usize] {
                self.ensure_bounds(child);
                bounds.expand_box(&self.bounds[child as usize]);
            }
            child = self.next_sibling[child as usize];
        }

        self.bounds[i] = bounds;
        self.dirty[i].remove(Dirty::BOUNDS);
        self.counters.bounds += 1;
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use kurbo::{Point, Vec2};

    use super::*;

    struct Boxed(BoundingBox);

    impl Component for Boxed {
        fn local_bounds(&self) -> Option<BoundingBox> {
            Some(self.0)
        }
    }

    type Store = SceneStore<Boxed>;

    fn unit_square() -> Boxed {
        Boxed(BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn world_recomputes_exactly_once() {
        let mut store = Store::new();
        let id = store.create_entity();
        let _ = store.world_matrix(id);

        store.set_position(id, Point::new(10.0, 0.0));
        let before = store.eval_counters();
        let first = store.world_matrix(id);
        let after_first = store.eval_counters();
        let second = store.world_matrix(id);
        let after_second = store.eval_counters();

        assert_eq!(after_first.world - before.world, 1);
        assert_eq!(after_second.world, after_first.world);
        assert_eq!(after_second.local, after_first.local);
        assert_eq!(first, second);
        assert_eq!(first, Matrix::from_translation(10.0, 0.0));
    }

    #[test]
    fn unchanged_setter_marks_nothing() {
        let mut store = Store::new();
        let id = store.create_entity();
        store.set_position(id, Point::new(1.0, 2.0));
        let _ = store.world_matrix(id);
        store.set_position(id, Point::new(1.0, 2.0));
        store.set_rotation(id, 0.0);
        store.set_scale(id, Vec2::new(1.0, 1.0));
        assert!(!store.dirty(id).intersects(Dirty::LOCAL | Dirty::WORLD));
    }

    #[test]
    fn local_composition_order() {
        let mut store = Store::new();
        let id = store.create_entity();
        store.set_position(id, Point::new(10.0, 20.0));
        store.set_position_offset(id, Vec2::new(1.0, 1.0));
        store.set_rotation(id, FRAC_PI_2);
        store.set_scale(id, Vec2::new(2.0, 2.0));
        store.set_scale_mult(id, Vec2::new(0.5, 1.5));

        let m = store.local_matrix(id);
        // Scale (1, 0) by (1, 3), rotate +90° to (0, 1), translate to (11, 22).
        let p = m.transform_point(Point::new(1.0, 0.0));
        assert!((p.x - 11.0).abs() < 1e-9, "{p:?}");
        assert!((p.y - 22.0).abs() < 1e-9, "{p:?}");
    }

    #[test]
    fn world_composes_with_parent() {
        let mut store = Store::new();
        let parent = store.create_entity();
        let child = store.create_entity();
        store.add_child(parent, child);
        store.set_scale(parent, Vec2::new(2.0, 2.0));
        store.set_position(child, Point::new(5.0, 0.0));

        let world = store.world_matrix(child);
        assert_eq!(world.transform_point(Point::ORIGIN), Point::new(10.0, 0.0));
    }

    #[test]
    fn parent_move_dirties_descendants() {
        let mut store = Store::new();
        let root = store.create_entity();
        let mid = store.create_entity();
        let leaf = store.create_entity();
        store.add_child(root, mid);
        store.add_child(mid, leaf);
        let _ = store.world_matrix(leaf);
        assert!(!store.dirty(leaf).contains(Dirty::WORLD));

        store.set_position(root, Point::new(3.0, 0.0));
        assert!(store.dirty(mid).contains(Dirty::WORLD | Dirty::BOUNDS));
        assert!(store.dirty(leaf).contains(Dirty::WORLD | Dirty::BOUNDS));
        assert!(!store.dirty(leaf).contains(Dirty::LOCAL));

        assert_eq!(
            store.world_matrix(leaf).transform_point(Point::ORIGIN),
            Point::new(3.0, 0.0)
        );
    }

    #[test]
    fn child_move_dirties_ancestor_bounds_only() {
        let mut store = Store::new();
        let root = store.create_entity();
        let child = store.create_entity();
        store.add_child(root, child);
        store.add_component(child, unit_square());
        let _ = store.bounding_box(root);
        assert!(!store.dirty(root).contains(Dirty::BOUNDS));

        store.set_position(child, Point::new(10.0, 10.0));
        assert!(store.dirty(root).contains(Dirty::BOUNDS));
        assert!(!store.dirty(root).contains(Dirty::WORLD));
        assert_eq!(
            store.bounding_box(root),
            BoundingBox::new(10.0, 10.0, 11.0, 11.0)
        );
    }

    #[test]
    fn empty_entity_has_empty_bounds() {
        let mut store = Store::new();
        let id = store.create_entity();
        let b = store.bounding_box(id);
        assert!(b.is_empty());
        assert!(b.x1 > b.x2);
    }

    #[test]
    fn bounds_aggregate_components_and_children() {
        let mut store = Store::new();
        let root = store.create_entity();
        let child = store.create_entity();
        store.add_child(root, child);
        store.add_component(root, unit_square());
        store.add_component(child, unit_square());
        store.set_position(child, Point::new(4.0, 0.0));
        store.set_scale(root, Vec2::new(2.0, 2.0));

        // Root square covers 0..2, child (world offset 8) covers 8..10.
        assert_eq!(
            store.bounding_box(root),
            BoundingBox::new(0.0, 0.0, 10.0, 2.0)
        );
        assert_eq!(
            store.bounding_box(child),
            BoundingBox::new(8.0, 0.0, 10.0, 2.0)
        );
    }

    #[test]
    fn disabled_children_do_not_contribute() {
        let mut store = Store::new();
        let root = store.create_entity();
        let child = store.create_entity();
        store.add_child(root, child);
        store.add_component(child, unit_square());
        assert!(!store.bounding_box(root).is_empty());

        store.set_enabled(child, false);
        assert!(store.bounding_box(root).is_empty());
        store.set_enabled(child, true);
        assert!(!store.bounding_box(root).is_empty());
    }

    #[test]
    fn bounds_read_twice_aggregates_once() {
        let mut store = Store::new();
        let id = store.create_entity();
        store.add_component(id, unit_square());
        let _ = store.bounding_box(id);
        let counted = store.eval_counters().bounds;
        let _ = store.bounding_box(id);
        assert_eq!(store.eval_counters().bounds, counted);
    }

    #[test]
    fn component_changes_invalidate_bounds() {
        let mut store = Store::new();
        let id = store.create_entity();
        store.add_component(id, unit_square());
        let _ = store.bounding_box(id);
        store.component_mut(id, 0).unwrap().0 = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(store.bounding_box(id), BoundingBox::new(0.0, 0.0, 5.0, 5.0));
        let _ = store.remove_component(id, 0);
        assert!(store.bounding_box(id).is_empty());
    }

    #[test]
    fn reparent_recomposes_world() {
        let mut store = Store::new();
        let a = store.create_entity();
        let b = store.create_entity();
        let child = store.create_entity();
        store.set_position(a, Point::new(1.0, 0.0));
        store.set_position(b, Point::new(0.0, 7.0));
        store.add_child(a, child);
        assert_eq!(store.world_matrix(child).translation(), Vec2::new(1.0, 0.0));
        store.reparent(child, b);
        assert_eq!(store.world_matrix(child).translation(), Vec2::new(0.0, 7.0));
        store.remove_from_parent(child);
        assert_eq!(store.world_matrix(child).translation(), Vec2::ZERO);
    }

    #[test]
    fn local_content_bounds_can_exclude() {
        let mut store = Store::new();
        let id = store.create_entity();
        store.add_component(id, unit_square());
        store.add_component(id, Boxed(BoundingBox::new(-3.0, -3.0, -2.0, -2.0)));
        assert_eq!(
            store.local_content_bounds(id, None),
            BoundingBox::new(-3.0, -3.0, 1.0, 1.0)
        );
        assert_eq!(
            store.local_content_bounds(id, Some(1)),
            BoundingBox::new(0.0, 0.0, 1.0, 1.0)
        );
    }
}
