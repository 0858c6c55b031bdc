// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classifier functions: viewport metrics to size classes.
//!
//! All three classifiers are pure and total. Metrics are passed as
//! `Option<f64>`; `None`, zero, negative and non-finite values all count as
//! *unknown*. Unknown widths and heights are replaced by
//! [`Breakpoints::default_view_width`] and [`Breakpoints::default_view_height`]
//! for the size classes, while [`Breakpoints::is_desktop`] answers `false`.

use crate::breakpoints::{Breakpoints, ViewHeight, ViewWidth};
use crate::environment::Platform;

/// Whether an axis has generous or constrained room.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SizeType {
    /// Constrained: smaller paddings, icons and chrome.
    Compact,
    /// Generous: the full-size variant.
    Regular,
}

impl SizeType {
    /// Lowercase name, as used in class-name modifiers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Regular => "regular",
        }
    }

    /// Whether this is [`SizeType::Compact`].
    pub const fn is_compact(self) -> bool {
        matches!(self, Self::Compact)
    }
}

/// Keep a metric only if it can take part in a comparison.
pub(crate) fn known(metric: Option<f64>) -> Option<f64> {
    metric.filter(|v| v.is_finite() && *v > 0.0)
}

impl Breakpoints {
    /// Width assumed when none is known: the [`ViewWidth::Mobile`] representative.
    pub fn default_view_width(&self) -> f64 {
        self.representative_width(ViewWidth::Mobile)
    }

    /// Height assumed when none is known: the [`ViewHeight::Small`] representative.
    pub fn default_view_height(&self) -> f64 {
        self.representative_height(ViewHeight::Small)
    }

    /// Horizontal size class.
    ///
    /// Compact below [`Breakpoints::small_tablet`], regular from it upward.
    pub fn size_x(&self, view_width: Option<f64>) -> SizeType {
        let width = known(view_width).unwrap_or_else(|| self.default_view_width());
        if width < self.small_tablet() {
            SizeType::Compact
        } else {
            SizeType::Regular
        }
    }

    /// Vertical size class.
    ///
    /// Compact on extra-short viewports, or on narrow viewports driven by
    /// touch.
    pub fn size_y(
        &self,
        view_width: Option<f64>,
        view_height: Option<f64>,
        has_mouse: bool,
    ) -> SizeType {
        let width = known(view_width).unwrap_or_else(|| self.default_view_width());
        let height = known(view_height).unwrap_or_else(|| self.default_view_height());
        let short = self.view_height_class(height) == ViewHeight::ExtraSmall;
        let narrow_touch = width < self.small_tablet() && !has_mouse;
        if short || narrow_touch {
            SizeType::Compact
        } else {
            SizeType::Regular
        }
    }

    /// Coarse desktop classification.
    ///
    /// Requires a platform that allows it, a known height, a width of at least
    /// [`Breakpoints::desktop_plus`], and a mouse.
    pub fn is_desktop(
        &self,
        view_width: Option<f64>,
        view_height: Option<f64>,
        has_mouse: bool,
        platform: Platform,
    ) -> bool {
        if platform.forces_non_desktop() || !has_mouse {
            return false;
        }
        match (known(view_width), known(view_height)) {
            (Some(width), Some(_)) => self.view_width_class(width) == ViewWidth::Desktop,
            _ => false,
        }
    }
}
