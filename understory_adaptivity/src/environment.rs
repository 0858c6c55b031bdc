// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inputs that come from outside the adaptivity core.
//!
//! The host supplies three things: which [`Platform`] is running, a
//! [`PointerProbe`] answering mouse and hover questions, and (when a live
//! viewport exists) a shared [`MediaQueryRegistry`]. [`Environment`] bundles
//! them for a resolver.

use alloc::rc::Rc;
use core::fmt;

use tracing::debug;

use crate::breakpoints::Breakpoints;
use crate::registry::MediaQueryRegistry;

/// Operating environment, as reported by the host's platform detection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Platform {
    /// Android devices.
    Android,
    /// iOS and iPadOS devices.
    Ios,
    /// Desktop browsers and desktop shells.
    Desktop,
}

impl Platform {
    /// Look a platform up by its lowercase name (`"android"`, `"ios"`, `"desktop"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }

    /// Lowercase name of the platform.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        }
    }

    /// Whether this platform rules out a desktop classification regardless of
    /// viewport size or pointer.
    pub const fn forces_non_desktop(self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }
}

/// Pointer-capability probe.
pub trait PointerProbe {
    /// Whether a precise, mouse-like pointer is present.
    fn has_mouse(&self) -> bool;
    /// Whether the primary pointer can hover.
    fn has_hover(&self) -> bool;
}

/// A [`PointerProbe`] with fixed answers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StaticPointer {
    /// Answer for [`PointerProbe::has_mouse`].
    pub has_mouse: bool,
    /// Answer for [`PointerProbe::has_hover`].
    pub has_hover: bool,
}

impl StaticPointer {
    /// A mouse that can hover.
    pub const MOUSE: Self = Self {
        has_mouse: true,
        has_hover: true,
    };
    /// A touch screen: no mouse, no hover.
    pub const TOUCH: Self = Self {
        has_mouse: false,
        has_hover: false,
    };
}

impl PointerProbe for StaticPointer {
    fn has_mouse(&self) -> bool {
        self.has_mouse
    }

    fn has_hover(&self) -> bool {
        self.has_hover
    }
}

/// Everything a resolver reads from its surroundings.
///
/// Without a registry the environment is *headless*: there is no live
/// viewport, and resolution falls back to the classifier defaults.
#[derive(Clone)]
pub struct Environment {
    platform: Platform,
    pointer: Rc<dyn PointerProbe>,
    registry: Option<Rc<MediaQueryRegistry>>,
    breakpoints: Breakpoints,
}

impl Environment {
    /// A headless environment using the default breakpoints.
    pub fn new(platform: Platform, pointer: Rc<dyn PointerProbe>) -> Self {
        Self {
            platform,
            pointer,
            registry: None,
            breakpoints: Breakpoints::DEFAULT,
        }
    }

    /// Attach a live registry.
    ///
    /// The registry's own breakpoints take over classification: a table set
    /// with [`Environment::with_breakpoints`] only applies again once the
    /// registry is gone.
    #[must_use]
    pub fn with_registry(mut self, registry: Rc<MediaQueryRegistry>) -> Self {
        if registry.breakpoints() != &self.breakpoints {
            debug!("registry breakpoints shadow the environment's fallback table");
        }
        self.registry = Some(registry);
        self
    }

    /// Breakpoints used while no registry is attached.
    ///
    /// Ignored for classification while a registry is attached; see
    /// [`Environment::breakpoints`].
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        if self
            .registry
            .as_ref()
            .is_some_and(|registry| registry.breakpoints() != &breakpoints)
        {
            debug!("fallback breakpoints ignored while a registry is attached");
        }
        self.breakpoints = breakpoints;
        self
    }

    /// The platform in effect.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The pointer probe in effect.
    pub fn pointer(&self) -> &dyn PointerProbe {
        &*self.pointer
    }

    /// The live registry, if any.
    pub fn registry(&self) -> Option<&Rc<MediaQueryRegistry>> {
        self.registry.as_ref()
    }

    /// Whether live media queries are available.
    pub fn is_live(&self) -> bool {
        self.registry.is_some()
    }

    /// Breakpoints for classification: the registry's when attached,
    /// otherwise the fallback table from [`Environment::with_breakpoints`].
    pub fn breakpoints(&self) -> &Breakpoints {
        match &self.registry {
            Some(registry) => registry.breakpoints(),
            None => &self.breakpoints,
        }
    }

    pub(crate) fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub(crate) fn set_registry(&mut self, registry: Option<Rc<MediaQueryRegistry>>) {
        self.registry = registry;
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("platform", &self.platform)
            .field("has_mouse", &self.pointer.has_mouse())
            .field("has_hover", &self.pointer.has_hover())
            .field("registry", &self.registry)
            .field("breakpoints", &self.breakpoints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_names_round_trip() {
        for platform in [Platform::Android, Platform::Ios, Platform::Desktop] {
            assert_eq!(Platform::from_name(platform.name()), Some(platform));
        }
        assert_eq!(Platform::from_name("vkcom"), None);
    }

    #[test]
    fn only_mobile_platforms_force_non_desktop() {
        assert!(Platform::Android.forces_non_desktop());
        assert!(Platform::Ios.forces_non_desktop());
        assert!(!Platform::Desktop.forces_non_desktop());
    }

    #[test]
    fn registry_breakpoints_win_over_the_fallback() {
        use crate::breakpoints::BreakpointsConfig;

        let wide = Breakpoints::new(BreakpointsConfig {
            desktop_plus: 1440.0,
            ..BreakpointsConfig::default()
        })
        .unwrap();
        let registry = Rc::new(MediaQueryRegistry::new(&Breakpoints::DEFAULT));

        let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE))
            .with_breakpoints(wide)
            .with_registry(registry.clone());
        assert_eq!(env.breakpoints(), &Breakpoints::DEFAULT);

        // Order of the builder calls does not matter.
        let mut env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE))
            .with_registry(registry)
            .with_breakpoints(wide);
        assert_eq!(env.breakpoints(), &Breakpoints::DEFAULT);

        env.set_registry(None);
        assert_eq!(env.breakpoints(), &wide);
    }

    #[test]
    fn headless_environment_uses_own_breakpoints() {
        let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE));
        assert!(!env.is_live());
        assert_eq!(env.breakpoints(), &Breakpoints::DEFAULT);
        assert!(env.pointer().has_hover());
    }
}
