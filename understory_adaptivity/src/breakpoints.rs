// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breakpoint table: named thresholds that bucket viewport metrics.
//!
//! A [`Breakpoints`] value is a strictly monotonic table of pixel thresholds.
//! Widths fall into one of five [`ViewWidth`] buckets and heights into one of
//! three [`ViewHeight`] buckets. Lookups scan from the largest bucket down and
//! the first threshold that matches wins, so a value sitting exactly on a
//! threshold belongs to the larger bucket.
//!
//! The numbers themselves are configuration. Hosts that need a different set
//! build one with [`Breakpoints::new`], which rejects tables that are not
//! strictly increasing.

use thiserror::Error;

/// Coarse horizontal bucket of a viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewWidth {
    /// Narrower than [`Breakpoints::mobile`].
    SmallMobile,
    /// From [`Breakpoints::mobile`] up to [`Breakpoints::small_tablet`].
    Mobile,
    /// From [`Breakpoints::small_tablet`] up to [`Breakpoints::tablet`].
    SmallTablet,
    /// From [`Breakpoints::tablet`] up to [`Breakpoints::desktop_plus`].
    Tablet,
    /// [`Breakpoints::desktop_plus`] and wider.
    Desktop,
}

/// Coarse vertical bucket of a viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewHeight {
    /// At most [`Breakpoints::mobile_landscape_height`], e.g. a phone held sideways.
    ExtraSmall,
    /// Between the extra-small and medium thresholds.
    Small,
    /// [`Breakpoints::medium_height`] and taller.
    Medium,
}

/// Raw threshold values, in device-independent pixels.
///
/// This is the plain configuration record; it carries no guarantees until it
/// is turned into a [`Breakpoints`] with [`Breakpoints::new`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BreakpointsConfig {
    /// Lower bound of [`ViewWidth::Desktop`].
    pub desktop_plus: f64,
    /// Lower bound of [`ViewWidth::Tablet`].
    pub tablet: f64,
    /// Lower bound of [`ViewWidth::SmallTablet`].
    pub small_tablet: f64,
    /// Lower bound of [`ViewWidth::Mobile`].
    pub mobile: f64,
    /// Lower bound of [`ViewHeight::Medium`].
    pub medium_height: f64,
    /// Upper bound (inclusive) of [`ViewHeight::ExtraSmall`].
    pub mobile_landscape_height: f64,
}

impl BreakpointsConfig {
    const DEFAULT: Self = Self {
        desktop_plus: 1280.0,
        tablet: 1024.0,
        small_tablet: 768.0,
        mobile: 320.0,
        medium_height: 720.0,
        mobile_landscape_height: 415.0,
    };
}

impl Default for BreakpointsConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Error returned when a breakpoint table is not usable.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum BreakpointError {
    /// A threshold was zero, negative, NaN or infinite.
    #[error("breakpoint `{name}` must be a finite positive number of pixels, got {value}")]
    NotPositive {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Two neighbouring thresholds were equal or out of order.
    #[error("breakpoint `{lower}` ({lower_value}px) must be strictly below `{upper}` ({upper_value}px)")]
    NotMonotonic {
        /// Name of the threshold that should be smaller.
        lower: &'static str,
        /// Its value.
        lower_value: f64,
        /// Name of the threshold that should be larger.
        upper: &'static str,
        /// Its value.
        upper_value: f64,
    },
}

/// A validated, strictly monotonic breakpoint table.
///
/// `Breakpoints::default()` carries the stock thresholds:
///
/// | threshold                 | px   |
/// |---------------------------|------|
/// | `desktop_plus`            | 1280 |
/// | `tablet`                  | 1024 |
/// | `small_tablet`            | 768  |
/// | `mobile`                  | 320  |
/// | `medium_height`           | 720  |
/// | `mobile_landscape_height` | 415  |
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BreakpointsConfig", into = "BreakpointsConfig")
)]
pub struct Breakpoints {
    config: BreakpointsConfig,
}

impl Breakpoints {
    /// The stock breakpoint table.
    pub const DEFAULT: Self = Self {
        config: BreakpointsConfig::DEFAULT,
    };

    /// Validate `config` and build a table from it.
    pub fn new(config: BreakpointsConfig) -> Result<Self, BreakpointError> {
        let widths = [
            ("mobile", config.mobile),
            ("small_tablet", config.small_tablet),
            ("tablet", config.tablet),
            ("desktop_plus", config.desktop_plus),
        ];
        let heights = [
            ("mobile_landscape_height", config.mobile_landscape_height),
            ("medium_height", config.medium_height),
        ];
        for &(name, value) in widths.iter().chain(heights.iter()) {
            if !(value.is_finite() && value > 0.0) {
                return Err(BreakpointError::NotPositive { name, value });
            }
        }
        for pair in widths.windows(2).chain(heights.windows(2)) {
            let ((lower, lower_value), (upper, upper_value)) = (pair[0], pair[1]);
            if lower_value >= upper_value {
                return Err(BreakpointError::NotMonotonic {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }
        Ok(Self { config })
    }

    /// The raw threshold values.
    pub const fn config(&self) -> &BreakpointsConfig {
        &self.config
    }

    /// Lower bound of [`ViewWidth::Desktop`].
    pub const fn desktop_plus(&self) -> f64 {
        self.config.desktop_plus
    }

    /// Lower bound of [`ViewWidth::Tablet`].
    pub const fn tablet(&self) -> f64 {
        self.config.tablet
    }

    /// Lower bound of [`ViewWidth::SmallTablet`].
    pub const fn small_tablet(&self) -> f64 {
        self.config.small_tablet
    }

    /// Lower bound of [`ViewWidth::Mobile`].
    pub const fn mobile(&self) -> f64 {
        self.config.mobile
    }

    /// Lower bound of [`ViewHeight::Medium`].
    pub const fn medium_height(&self) -> f64 {
        self.config.medium_height
    }

    /// Upper bound (inclusive) of [`ViewHeight::ExtraSmall`].
    pub const fn mobile_landscape_height(&self) -> f64 {
        self.config.mobile_landscape_height
    }

    /// Bucket a viewport width.
    pub fn view_width_class(&self, width: f64) -> ViewWidth {
        let c = &self.config;
        if width >= c.desktop_plus {
            ViewWidth::Desktop
        } else if width >= c.tablet {
            ViewWidth::Tablet
        } else if width >= c.small_tablet {
            ViewWidth::SmallTablet
        } else if width >= c.mobile {
            ViewWidth::Mobile
        } else {
            ViewWidth::SmallMobile
        }
    }

    /// Bucket a viewport height.
    pub fn view_height_class(&self, height: f64) -> ViewHeight {
        let c = &self.config;
        if height >= c.medium_height {
            ViewHeight::Medium
        } else if height > c.mobile_landscape_height {
            ViewHeight::Small
        } else {
            ViewHeight::ExtraSmall
        }
    }

    /// A width that stands in for every width of `bucket`.
    ///
    /// Bounded buckets use their lower bound; [`ViewWidth::SmallMobile`] uses
    /// half of [`Breakpoints::mobile`]. The result always classifies back into
    /// `bucket`, and it is only meant for that: it is not a real measurement.
    pub fn representative_width(&self, bucket: ViewWidth) -> f64 {
        let c = &self.config;
        match bucket {
            ViewWidth::Desktop => c.desktop_plus,
            ViewWidth::Tablet => c.tablet,
            ViewWidth::SmallTablet => c.small_tablet,
            ViewWidth::Mobile => c.mobile,
            ViewWidth::SmallMobile => c.mobile / 2.0,
        }
    }

    /// A height that stands in for every height of `bucket`.
    ///
    /// [`ViewHeight::Medium`] uses its lower bound, [`ViewHeight::ExtraSmall`]
    /// its upper bound, and [`ViewHeight::Small`] the midpoint between the two.
    pub fn representative_height(&self, bucket: ViewHeight) -> f64 {
        let c = &self.config;
        match bucket {
            ViewHeight::Medium => c.medium_height,
            ViewHeight::Small => (c.mobile_landscape_height + c.medium_height) / 2.0,
            ViewHeight::ExtraSmall => c.mobile_landscape_height,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<BreakpointsConfig> for Breakpoints {
    type Error = BreakpointError;

    fn try_from(config: BreakpointsConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<Breakpoints> for BreakpointsConfig {
    fn from(breakpoints: Breakpoints) -> Self {
        breakpoints.config
    }
}
