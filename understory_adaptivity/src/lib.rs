// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Adaptivity: responsive size classes for UI.
//!
//! Components rarely care about the exact pixel width of the viewport. They
//! care whether there is room for the regular variant, whether a mouse is
//! around, and whether this is a desktop. This crate reduces viewport metrics,
//! pointer capability, and platform identity to exactly those signals:
//!
//! - [`AdaptivityState::size_x`] / [`AdaptivityState::size_y`]: [`SizeType::Regular`]
//!   or [`SizeType::Compact`] per axis.
//! - [`AdaptivityState::has_mouse`] / [`AdaptivityState::has_hover`]: pointer capability.
//! - [`AdaptivityState::is_desktop`]: coarse desktop classification.
//!
//! The pieces, leaves first:
//!
//! - [`Breakpoints`]: a validated, swappable threshold table with width and
//!   height buckets ([`ViewWidth`], [`ViewHeight`]).
//! - Classifiers on the table: [`Breakpoints::size_x`], [`Breakpoints::size_y`]
//!   and [`Breakpoints::is_desktop`]. Pure and total.
//! - [`MediaQueryRegistry`]: six named live queries the host drives with
//!   viewport sizes, observable per query, shared between consumers through a
//!   [`RegistryCache`].
//! - [`AdaptivityOverrides`]: values pinned by an enclosing scope, each one
//!   optional so that "not pinned" never reads as `false` or `0`.
//! - [`AdaptivityResolver`]: merges overrides over live measurements, listens
//!   to the queries that matter, and notifies observers on effective changes.
//!
//! [`select_mimicry`] shows a consumer turning the signals into a concrete
//! rendering decision.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::Size;
//! use understory_adaptivity::{
//!     AdaptivityOverrides, AdaptivityResolver, Environment, Platform, RegistryCache, SizeType,
//!     StaticPointer, Breakpoints,
//! };
//!
//! let mut cache = RegistryCache::new();
//! let registry = cache.get_or_create(&Breakpoints::default());
//! registry.apply_viewport(Size::new(1440.0, 900.0));
//!
//! let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE))
//!     .with_registry(registry.clone());
//! let resolver = AdaptivityResolver::new(env);
//! let state = resolver.activate(AdaptivityOverrides::default());
//! assert_eq!(state.size_x, SizeType::Regular);
//! assert!(state.is_desktop);
//!
//! // The window is dragged narrow; observers hear about it once.
//! let seen = Rc::new(std::cell::Cell::new(0));
//! let counter = seen.clone();
//! resolver.on_change(move |_| counter.set(counter.get() + 1));
//! registry.apply_viewport(Size::new(600.0, 900.0));
//! assert_eq!(seen.get(), 1);
//! assert_eq!(resolver.state().unwrap().size_x, SizeType::Compact);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for `kurbo`'s
//!   floating-point math.
//! - `serde`: derives `Serialize`/`Deserialize` for [`BreakpointsConfig`],
//!   [`Breakpoints`] (validated on the way in), [`AdaptivityOverrides`],
//!   [`AdaptivityState`], [`SizeType`] and [`Platform`].
//!
//! Everything here is single-threaded: shared handles are `Rc`, and state
//! changes happen through `&self` on the thread that owns the UI.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod breakpoints;
pub mod classify;
pub mod environment;
pub mod media;
pub mod overrides;
pub mod registry;
pub mod resolver;
pub mod select_mimicry;

pub use breakpoints::{BreakpointError, Breakpoints, BreakpointsConfig, ViewHeight, ViewWidth};
pub use classify::SizeType;
pub use environment::{Environment, Platform, PointerProbe, StaticPointer};
pub use media::{ListenerId, MediaCondition, MediaFeature, MediaQueryList};
pub use overrides::{AdaptivityOverrides, AdaptivityState};
pub use registry::{
    MediaQueryRegistry, QueryName, QuerySet, RegistryCache, Subscription,
    view_height_by_media_queries, view_width_by_media_queries,
};
pub use resolver::{AdaptivityResolver, ObserverId, Phase};
