// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-entity dirty flags.
//!
//! Each entity in a [`SceneStore`](crate::scene::SceneStore) carries a
//! [`Dirty`] set describing which of its derived values are stale. The
//! values are recomputed lazily, on the next read, and the flag is cleared.
//!
//! # Propagation semantics
//!
//! - **Local** — [`Dirty::LOCAL`] is only ever set on the entity whose
//!   position, rotation, scale, offset or multiplier changed.
//! - **Downward** — [`Dirty::WORLD`] is set on the entity and every
//!   descendant, since world matrices are inherited. A node that already
//!   carries it is not descended into: a world-dirty node always has
//!   world-dirty descendants.
//! - **Upward** — [`Dirty::BOUNDS`] is set on the entity, every descendant
//!   (their world boxes moved) and every ancestor (their aggregate boxes
//!   contain the moved subtree). Upward marking stops at the first ancestor
//!   that is already bounds-dirty: a bounds-dirty node always has
//!   bounds-dirty ancestors.
//!
//! Reads clear flags top-down (a world matrix is computed after its parent's)
//! and bounds bottom-up (a box is computed after its children's), which is
//! what keeps both early-stop invariants true.

bitflags::bitflags! {
    /// Stale derived values of one entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Dirty: u8 {
        /// The local matrix must be rebuilt from position/rotation/scale.
        const LOCAL = 1 << 0;
        /// The world matrix must be recomposed with the parent's.
        const WORLD = 1 << 1;
        /// The world bounding box must be re-aggregated.
        const BOUNDS = 1 << 2;
    }
}

impl Dirty {
    /// What a change to an entity's own transform invalidates on itself.
    pub const TRANSFORM: Self = Self::all();

    /// What a change to an ancestor's transform invalidates on a descendant.
    pub const INHERITED: Self = Self::WORLD.union(Self::BOUNDS);
}
