// Copyright 2026 the Stipple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core buffers, interning, affine transforms and scene storage.
//!
//! `stipple_core` provides the data structures the stipple renderer is built
//! on. It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! A frame flows through two passes that share the types in this crate:
//!
//! ```text
//!   SceneStore (lazy world matrices + bounds)
//!       │  traversal
//!       ▼
//!   Encoder ──► TypedBuffer<u8> ops + TypedBuffer<f64> data ──► Interpreter
//!       │                                                           │
//!       └── Interner (styles, images, texts) ◄── lookups ───────────┤
//!                                                LazyCache ◄────────┘
//! ```
//!
//! **[`scene`]** — Struct-of-arrays entity tree with generational handles.
//! Positions, rotations and scales are set by the caller; local and world
//! matrices and world bounding boxes are computed lazily on read.
//!
//! **[`dirty`]** — Per-entity dirty flags and their propagation rules.
//!
//! **[`matrix`]** / **[`bbox`]** — 2-D affine matrix and axis-aligned
//! bounding box, both mutated in place.
//!
//! **[`buffer`]** — Growable typed buffer that keeps its capacity across
//! frames.
//!
//! **[`intern`]** — Content-keyed interning of values into small ids.
//!
//! **[`cache`]** — Memoized resolution of ids into loaded resources.
//!
//! **[`stats`]** — Per-category encode counters and replay counters.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-entity
//!   culling events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod bbox;
pub mod buffer;
pub mod cache;
pub mod dirty;
pub mod intern;
pub mod matrix;
pub mod scene;
pub mod stats;
pub mod trace;
