// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! An *entity* is a node in the scene tree. Each entity has:
//!
//! - An identity ([`EntityId`]) — a generational handle that becomes stale
//!   when the entity is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. Children hold their parent as a plain slot index; destruction
//!   never walks upward through ownership.
//! - **Local properties** set by the caller:
//!   [`position`](SceneStore::set_position),
//!   [`rotation`](SceneStore::set_rotation), [`scale`](SceneStore::set_scale),
//!   the camera-driven [`offset`](SceneStore::set_position_offset) and
//!   [`multiplier`](SceneStore::set_scale_mult),
//!   [`enabled`](SceneStore::set_enabled), [`opacity`](SceneStore::set_opacity),
//!   an optional [`Anchor`], and a z-sorted list of [`Component`]s.
//! - **Derived properties** computed lazily on read:
//!   [`local_matrix`](SceneStore::local_matrix),
//!   [`world_matrix`](SceneStore::world_matrix) and
//!   [`bounding_box`](SceneStore::bounding_box).
//!
//! Entities are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Setters compare against the current value and, only on change, mark the
//! flags described in [`dirty`](crate::dirty). Reads recompute what is
//! stale and clear it.

mod component;
mod evaluate;
mod id;
mod store;
mod traverse;

pub use component::{Anchor, Component};
pub use id::{EntityId, INVALID};
pub use store::{EvalCounters, SceneStore};
pub use traverse::Children;
