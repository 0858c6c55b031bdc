// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ambient overrides and the resolved adaptivity state.
//!
//! An ancestor scope can pin any of the inputs with [`AdaptivityOverrides`].
//! Each field is an `Option`: `None` delegates to live detection, while
//! `Some(false)` or `Some(0.0)` is a real answer. Resolution merges field by
//! field, override first, and then classifies:
//!
//! ```
//! use understory_adaptivity::{AdaptivityOverrides, SizeType};
//!
//! // A modal that always renders its compact variant.
//! let scope = AdaptivityOverrides::default().with_size_x(SizeType::Compact);
//! assert!(!scope.overrides_width());
//! assert_eq!(scope.size_x, Some(SizeType::Compact));
//! ```

use crate::breakpoints::Breakpoints;
use crate::classify::{SizeType, known};
use crate::environment::{Platform, PointerProbe};

/// Values pinned by an enclosing configuration scope.
///
/// The default is empty: everything comes from live detection.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdaptivityOverrides {
    /// Viewport width in device-independent pixels.
    pub view_width: Option<f64>,
    /// Viewport height in device-independent pixels.
    pub view_height: Option<f64>,
    /// Horizontal size class, taking precedence over any width.
    pub size_x: Option<SizeType>,
    /// Vertical size class, taking precedence over any metrics.
    pub size_y: Option<SizeType>,
    /// Mouse presence.
    pub has_mouse: Option<bool>,
    /// Hover capability.
    pub has_hover: Option<bool>,
}

impl AdaptivityOverrides {
    /// Pin the viewport width.
    #[must_use]
    pub fn with_view_width(mut self, view_width: f64) -> Self {
        self.view_width = Some(view_width);
        self
    }

    /// Pin the viewport height.
    #[must_use]
    pub fn with_view_height(mut self, view_height: f64) -> Self {
        self.view_height = Some(view_height);
        self
    }

    /// Pin the horizontal size class.
    #[must_use]
    pub fn with_size_x(mut self, size_x: SizeType) -> Self {
        self.size_x = Some(size_x);
        self
    }

    /// Pin the vertical size class.
    #[must_use]
    pub fn with_size_y(mut self, size_y: SizeType) -> Self {
        self.size_y = Some(size_y);
        self
    }

    /// Pin mouse presence.
    #[must_use]
    pub fn with_has_mouse(mut self, has_mouse: bool) -> Self {
        self.has_mouse = Some(has_mouse);
        self
    }

    /// Pin hover capability.
    #[must_use]
    pub fn with_has_hover(mut self, has_hover: bool) -> Self {
        self.has_hover = Some(has_hover);
        self
    }

    /// Whether nothing is pinned.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the width is pinned, so width queries need no listening.
    pub fn overrides_width(&self) -> bool {
        self.view_width.is_some()
    }

    /// Whether the height is pinned, so height queries need no listening.
    pub fn overrides_height(&self) -> bool {
        self.view_height.is_some()
    }

    /// Combine an enclosing scope with a nested one; the nested scope's pinned
    /// fields win.
    #[must_use]
    pub fn nested(outer: Self, inner: Self) -> Self {
        Self {
            view_width: inner.view_width.or(outer.view_width),
            view_height: inner.view_height.or(outer.view_height),
            size_x: inner.size_x.or(outer.size_x),
            size_y: inner.size_y.or(outer.size_y),
            has_mouse: inner.has_mouse.or(outer.has_mouse),
            has_hover: inner.has_hover.or(outer.has_hover),
        }
    }
}

/// Locally observed viewport metrics.
///
/// A field is `None` when nothing was measured for it: the registry is
/// missing, or the matching override makes measuring pointless.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct LocalViewport {
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
}

/// The resolved adaptivity signals for one subtree.
///
/// A fresh value is produced on every resolution; compare values to detect
/// changes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptivityState {
    /// Best-known viewport width. May be a bucket stand-in rather than a
    /// measurement.
    pub view_width: f64,
    /// Best-known viewport height, with the same caveat.
    pub view_height: f64,
    /// Horizontal size class.
    pub size_x: SizeType,
    /// Vertical size class.
    pub size_y: SizeType,
    /// Whether a mouse-like pointer is present.
    pub has_mouse: bool,
    /// Whether the pointer can hover.
    pub has_hover: bool,
    /// Coarse desktop classification.
    pub is_desktop: bool,
}

impl AdaptivityState {
    /// Merge overrides over local observations and classify.
    pub(crate) fn resolve(
        breakpoints: &Breakpoints,
        overrides: &AdaptivityOverrides,
        local: LocalViewport,
        pointer: &dyn PointerProbe,
        platform: Platform,
    ) -> Self {
        let has_mouse = overrides.has_mouse.unwrap_or_else(|| pointer.has_mouse());
        let has_hover = overrides.has_hover.unwrap_or_else(|| pointer.has_hover());
        let view_width = known(overrides.view_width.or(local.width));
        let view_height = known(overrides.view_height.or(local.height));
        Self {
            view_width: view_width.unwrap_or_else(|| breakpoints.default_view_width()),
            view_height: view_height.unwrap_or_else(|| breakpoints.default_view_height()),
            size_x: overrides
                .size_x
                .unwrap_or_else(|| breakpoints.size_x(view_width)),
            size_y: overrides
                .size_y
                .unwrap_or_else(|| breakpoints.size_y(view_width, view_height, has_mouse)),
            has_mouse,
            has_hover,
            is_desktop: breakpoints.is_desktop(view_width, view_height, has_mouse, platform),
        }
    }
}
