// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The adaptivity resolver: live, override-aware [`AdaptivityState`].
//!
//! An [`AdaptivityResolver`] belongs to one consumer (a mounted component or
//! subtree). It is created [`Phase::Uninitialized`]; [`AdaptivityResolver::activate`]
//! reads the overrides, measures the viewport through the registry, classifies,
//! and moves it to [`Phase::Resolved`].
//!
//! ## Listening
//!
//! While resolved, the resolver listens only to the queries whose metric is not
//! pinned: a pinned `view_width` means no width queries, a pinned `view_height`
//! means no height queries. When a query flips, the resolver re-measures; if
//! the local estimate is unchanged nothing happens, otherwise the state is
//! recomputed and observers registered with [`AdaptivityResolver::on_change`]
//! run once.
//!
//! Listeners are replaced whenever override presence or the registry changes,
//! and all of them are released by [`AdaptivityResolver::deactivate`] or on drop.
//! A flip delivered after teardown is ignored.
//!
//! ## Headless environments
//!
//! Without a registry there is nothing to measure. The resolver logs a warning
//! once and resolves with the classifier defaults for unknown metrics.
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::Size;
//! use understory_adaptivity::{
//!     AdaptivityOverrides, AdaptivityResolver, Breakpoints, Environment, MediaQueryRegistry,
//!     Platform, SizeType, StaticPointer,
//! };
//!
//! let registry = Rc::new(MediaQueryRegistry::with_viewport(
//!     &Breakpoints::default(),
//!     Size::new(375.0, 667.0),
//! ));
//! let env = Environment::new(Platform::Ios, Rc::new(StaticPointer::TOUCH))
//!     .with_registry(registry.clone());
//! let resolver = AdaptivityResolver::new(env);
//!
//! let state = resolver.activate(AdaptivityOverrides::default());
//! assert_eq!(state.size_x, SizeType::Compact);
//! assert!(!state.is_desktop);
//!
//! // The phone is rotated onto a tablet-sized viewport.
//! registry.apply_viewport(Size::new(1024.0, 768.0));
//! assert_eq!(resolver.state().unwrap().size_x, SizeType::Regular);
//! ```

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::environment::{Environment, Platform};
use crate::overrides::{AdaptivityOverrides, AdaptivityState, LocalViewport};
use crate::registry::{
    MediaQueryRegistry, QuerySet, Subscription, view_height_by_media_queries,
    view_width_by_media_queries,
};

/// Lifecycle phase of a resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not activated, or deactivated again.
    Uninitialized,
    /// Holding a state and listening for changes.
    Resolved,
}

/// Handle for removing an observer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&AdaptivityState)>;

/// Keeps one consumer's [`AdaptivityState`] in sync with its environment.
pub struct AdaptivityResolver {
    inner: Rc<Inner>,
}

struct Inner {
    environment: RefCell<Environment>,
    overrides: Cell<AdaptivityOverrides>,
    local: Cell<LocalViewport>,
    state: Cell<Option<AdaptivityState>>,
    subscription: RefCell<Option<Subscription>>,
    observers: RefCell<SmallVec<[(ObserverId, Observer); 2]>>,
    next_observer: Cell<u64>,
    warned_headless: Cell<bool>,
}

impl AdaptivityResolver {
    /// Create an uninitialized resolver.
    pub fn new(environment: Environment) -> Self {
        Self {
            inner: Rc::new(Inner {
                environment: RefCell::new(environment),
                overrides: Cell::new(AdaptivityOverrides::default()),
                local: Cell::new(LocalViewport::default()),
                state: Cell::new(None),
                subscription: RefCell::new(None),
                observers: RefCell::new(SmallVec::new()),
                next_observer: Cell::new(0),
                warned_headless: Cell::new(false),
            }),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if self.inner.state.get().is_some() {
            Phase::Resolved
        } else {
            Phase::Uninitialized
        }
    }

    /// The resolved state, or `None` while uninitialized.
    pub fn state(&self) -> Option<AdaptivityState> {
        self.inner.state.get()
    }

    /// The overrides currently applied.
    pub fn overrides(&self) -> AdaptivityOverrides {
        self.inner.overrides.get()
    }

    /// The queries currently listened to.
    pub fn subscribed_queries(&self) -> QuerySet {
        self.inner
            .subscription
            .borrow()
            .as_ref()
            .map_or(QuerySet::empty(), Subscription::queries)
    }

    /// Compute a state from the current inputs without storing it or
    /// notifying anyone.
    ///
    /// While resolved this equals [`AdaptivityResolver::state`].
    pub fn resolve(&self) -> AdaptivityState {
        let local = match self.phase() {
            Phase::Resolved => self.inner.local.get(),
            Phase::Uninitialized => self.inner.measure(),
        };
        self.inner.compute(local)
    }

    /// Mount: resolve against `overrides` and start listening.
    ///
    /// Activating an already resolved resolver behaves like
    /// [`AdaptivityResolver::set_overrides`].
    pub fn activate(&self, overrides: AdaptivityOverrides) -> AdaptivityState {
        let inner = &self.inner;
        if self.phase() == Phase::Resolved {
            self.set_overrides(overrides);
            return self.resolve();
        }
        inner.overrides.set(overrides);
        inner.warn_if_headless();
        let local = inner.measure();
        inner.local.set(local);
        let state = inner.compute(local);
        inner.state.set(Some(state));
        Inner::resubscribe(inner);
        debug!(
            size_x = state.size_x.as_str(),
            size_y = state.size_y.as_str(),
            is_desktop = state.is_desktop,
            "adaptivity resolved"
        );
        state
    }

    /// Replace the overrides.
    ///
    /// Listeners are rebuilt only when the presence of a width or height
    /// override flips; other changes just re-merge.
    pub fn set_overrides(&self, overrides: AdaptivityOverrides) {
        let inner = &self.inner;
        let previous = inner.overrides.replace(overrides);
        if self.phase() == Phase::Uninitialized {
            return;
        }
        let presence_changed = previous.overrides_width() != overrides.overrides_width()
            || previous.overrides_height() != overrides.overrides_height();
        if presence_changed {
            inner.local.set(inner.measure());
            Inner::resubscribe(inner);
        }
        inner.refresh();
    }

    /// Swap the registry, e.g. after the host rebuilt it for new breakpoints.
    ///
    /// Passing the registry already in use is a no-op.
    pub fn set_registry(&self, registry: Option<Rc<MediaQueryRegistry>>) {
        let inner = &self.inner;
        let same = match (inner.environment.borrow().registry(), &registry) {
            (Some(current), Some(next)) => Rc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        inner.environment.borrow_mut().set_registry(registry);
        if self.phase() == Phase::Uninitialized {
            return;
        }
        inner.warn_if_headless();
        inner.local.set(inner.measure());
        Inner::resubscribe(inner);
        inner.refresh();
    }

    /// Change the platform reported by the host.
    pub fn set_platform(&self, platform: Platform) {
        self.inner.environment.borrow_mut().set_platform(platform);
        if self.phase() == Phase::Resolved {
            self.inner.refresh();
        }
    }

    /// Unmount: release every listener and return to
    /// [`Phase::Uninitialized`]. Observers stay registered.
    pub fn deactivate(&self) {
        let inner = &self.inner;
        inner.state.set(None);
        let released = inner.subscription.borrow_mut().take();
        if released.is_some() {
            debug!("adaptivity listeners released");
        }
        drop(released);
    }

    /// Run `observer` with every new state. It does not run for the initial
    /// activation, only for changes after it.
    pub fn on_change(&self, observer: impl Fn(&AdaptivityState) + 'static) -> ObserverId {
        let id = ObserverId(self.inner.next_observer.get());
        self.inner.next_observer.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if `id` was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        match observers.iter().position(|(o, _)| *o == id) {
            Some(index) => {
                observers.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Drop for AdaptivityResolver {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl fmt::Debug for AdaptivityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptivityResolver")
            .field("phase", &self.phase())
            .field("state", &self.state())
            .field("overrides", &self.overrides())
            .field("subscribed", &self.subscribed_queries())
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Measure the metrics that are not pinned.
    fn measure(&self) -> LocalViewport {
        let environment = self.environment.borrow();
        let Some(registry) = environment.registry() else {
            return LocalViewport::default();
        };
        let overrides = self.overrides.get();
        let snapshot = registry.evaluate();
        let bp = registry.breakpoints();
        LocalViewport {
            width: (!overrides.overrides_width())
                .then(|| view_width_by_media_queries(bp, snapshot)),
            height: (!overrides.overrides_height())
                .then(|| view_height_by_media_queries(bp, snapshot)),
        }
    }

    fn compute(&self, local: LocalViewport) -> AdaptivityState {
        let environment = self.environment.borrow();
        AdaptivityState::resolve(
            environment.breakpoints(),
            &self.overrides.get(),
            local,
            environment.pointer(),
            environment.platform(),
        )
    }

    fn warn_if_headless(&self) {
        if self.environment.borrow().is_live() || self.warned_headless.replace(true) {
            return;
        }
        warn!(
            "adaptivity resolved without live media queries; viewport classification \
             falls back to defaults and will not follow the real screen size"
        );
    }

    /// Drop the old listeners, then listen to every unpinned dimension.
    fn resubscribe(this: &Rc<Self>) {
        drop(this.subscription.borrow_mut().take());

        let Some(registry) = this.environment.borrow().registry().cloned() else {
            return;
        };
        let overrides = this.overrides.get();
        let mut set = QuerySet::empty();
        if !overrides.overrides_width() {
            set |= QuerySet::WIDTH;
        }
        if !overrides.overrides_height() {
            set |= QuerySet::HEIGHT;
        }
        if set.is_empty() {
            debug!("all viewport metrics pinned; not listening to media queries");
            return;
        }

        let weak: Weak<Self> = Rc::downgrade(this);
        let listener = Rc::new(move |_matches: bool| {
            if let Some(inner) = weak.upgrade() {
                inner.on_media_change();
            }
        });
        let subscription = Subscription::acquire(&registry, set, listener);
        debug!(queries = ?subscription.queries(), "listening to media queries");
        *this.subscription.borrow_mut() = Some(subscription);
    }

    fn on_media_change(&self) {
        if self.state.get().is_none() || self.subscription.borrow().is_none() {
            trace!("media query change after teardown ignored");
            return;
        }
        let next = self.measure();
        if next == self.local.get() {
            trace!("media query change left the viewport estimate unchanged");
            return;
        }
        self.local.set(next);
        self.refresh();
    }

    /// Recompute the state and notify observers if it changed.
    fn refresh(&self) {
        let next = self.compute(self.local.get());
        let previous = self.state.replace(Some(next));
        if previous == Some(next) {
            return;
        }
        debug!(
            view_width = next.view_width,
            view_height = next.view_height,
            size_x = next.size_x.as_str(),
            size_y = next.size_y.as_str(),
            is_desktop = next.is_desktop,
            "adaptivity changed"
        );
        let observers: SmallVec<[Observer; 2]> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::Breakpoints;
    use crate::classify::SizeType;
    use crate::environment::StaticPointer;
    use alloc::vec::Vec;
    use kurbo::Size;

    type Live = (Rc<MediaQueryRegistry>, AdaptivityResolver);

    fn live(size: Size, pointer: StaticPointer, platform: Platform) -> Live {
        let registry = Rc::new(MediaQueryRegistry::with_viewport(&Breakpoints::default(), size));
        let env = Environment::new(platform, Rc::new(pointer)).with_registry(registry.clone());
        (registry, AdaptivityResolver::new(env))
    }

    fn desktop(width: f64, height: f64) -> Live {
        live(Size::new(width, height), StaticPointer::MOUSE, Platform::Desktop)
    }

    fn touch(width: f64, height: f64, platform: Platform) -> Live {
        live(Size::new(width, height), StaticPointer::TOUCH, platform)
    }

    fn record(resolver: &AdaptivityResolver) -> Rc<RefCell<Vec<AdaptivityState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        resolver.on_change(move |state| sink.borrow_mut().push(*state));
        seen
    }

    #[test]
    fn starts_uninitialized() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        assert_eq!(resolver.phase(), Phase::Uninitialized);
        assert!(resolver.state().is_none());
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn activation_resolves_and_listens_to_everything() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        let state = resolver.activate(AdaptivityOverrides::default());
        assert_eq!(resolver.phase(), Phase::Resolved);
        assert_eq!(state.view_width, 1280.0);
        assert_eq!(state.view_height, 720.0);
        assert_eq!(state.size_x, SizeType::Regular);
        assert_eq!(state.size_y, SizeType::Regular);
        assert!(state.is_desktop);
        assert_eq!(resolver.subscribed_queries(), QuerySet::all());
        assert_eq!(registry.listener_count(), 6);
    }

    #[test]
    fn pinned_width_skips_width_queries() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default().with_view_width(1440.0));
        assert_eq!(resolver.subscribed_queries(), QuerySet::HEIGHT);
        assert_eq!(registry.listener_count(), 2);
    }

    #[test]
    fn pinned_both_metrics_listens_to_nothing() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        let overrides = AdaptivityOverrides::default()
            .with_view_width(400.0)
            .with_view_height(800.0);
        let state = resolver.activate(overrides);
        assert!(resolver.subscribed_queries().is_empty());
        assert_eq!(registry.listener_count(), 0);
        assert_eq!(state.view_width, 400.0);
        assert_eq!(state.size_x, SizeType::Compact);
    }

    #[test]
    fn width_flip_notifies_exactly_once() {
        let (registry, resolver) = desktop(800.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        let seen = record(&resolver);

        // smallTablet -> tablet flips two queries at once.
        let flipped = registry.apply_viewport(Size::new(1100.0, 900.0));
        assert_eq!(flipped, QuerySet::SMALL_TABLET | QuerySet::TABLET);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].view_width, 1024.0);
        assert_eq!(resolver.state(), Some(seen[0]));
    }

    #[test]
    fn single_query_flip_from_host() {
        let (registry, resolver) = touch(800.0, 900.0, Platform::Android);
        resolver.activate(AdaptivityOverrides::default());
        let seen = record(&resolver);

        // Host bridging one query at a time: tablet turns on before smallTablet turns off.
        registry.query(crate::QueryName::Tablet).set_matches(true);
        registry.query(crate::QueryName::SmallTablet).set_matches(false);

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(resolver.state().map(|s| s.view_width), Some(1024.0));
    }

    #[test]
    fn unchanged_estimate_is_a_no_op() {
        let (registry, resolver) = desktop(1300.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        let seen = record(&resolver);

        // mobileLandscapeHeight stays off, mediumHeight stays on: nothing flips.
        registry.apply_viewport(Size::new(1400.0, 950.0));
        // A spurious notification with no real change.
        registry.query(crate::QueryName::DesktopPlus).notify();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn size_x_override_ignores_viewport() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        let state = resolver.activate(
            AdaptivityOverrides::default()
                .with_view_width(1440.0)
                .with_size_x(SizeType::Compact),
        );
        assert_eq!(state.size_x, SizeType::Compact);
        assert!(!resolver.subscribed_queries().intersects(QuerySet::WIDTH));

        registry.apply_viewport(Size::new(320.0, 900.0));
        assert_eq!(resolver.state().map(|s| s.size_x), Some(SizeType::Compact));
        assert_eq!(resolver.state().map(|s| s.view_width), Some(1440.0));
    }

    #[test]
    fn override_presence_flip_resubscribes() {
        let (registry, resolver) = touch(400.0, 900.0, Platform::Ios);
        resolver.activate(AdaptivityOverrides::default().with_view_width(1300.0));
        assert_eq!(resolver.subscribed_queries(), QuerySet::HEIGHT);
        assert_eq!(resolver.state().map(|s| s.view_width), Some(1300.0));

        resolver.set_overrides(AdaptivityOverrides::default());
        assert_eq!(resolver.subscribed_queries(), QuerySet::all());
        assert_eq!(registry.listener_count(), 6);
        assert_eq!(resolver.state().map(|s| s.view_width), Some(320.0));

        resolver.set_overrides(AdaptivityOverrides::default().with_view_height(500.0));
        assert_eq!(resolver.subscribed_queries(), QuerySet::WIDTH);
        assert_eq!(registry.listener_count(), 4);
    }

    #[test]
    fn value_change_without_presence_change_keeps_listeners() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default().with_has_mouse(true));
        let seen = record(&resolver);
        resolver.set_overrides(AdaptivityOverrides::default().with_has_mouse(false));
        assert_eq!(registry.listener_count(), 6);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].is_desktop);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let (_registry, resolver) = desktop(1440.0, 900.0);
        let first = resolver.activate(AdaptivityOverrides::default());
        assert_eq!(resolver.resolve(), first);
        assert_eq!(resolver.resolve(), resolver.resolve());
        resolver.set_overrides(AdaptivityOverrides::default());
        assert_eq!(resolver.state(), Some(first));
    }

    #[test]
    fn teardown_releases_and_ignores_late_events() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        let before = resolver.activate(AdaptivityOverrides::default());
        let seen = record(&resolver);

        resolver.deactivate();
        assert_eq!(registry.listener_count(), 0);
        assert_eq!(resolver.phase(), Phase::Uninitialized);

        registry.apply_viewport(Size::new(320.0, 400.0));
        for name in crate::QueryName::ALL {
            registry.query(name).notify();
        }
        assert!(seen.borrow().is_empty());
        assert_eq!(before.size_x, SizeType::Regular);
        assert!(resolver.state().is_none());
    }

    #[test]
    fn drop_releases_listeners() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        assert_eq!(registry.listener_count(), 6);
        drop(resolver);
        assert_eq!(registry.listener_count(), 0);
        registry.apply_viewport(Size::new(320.0, 400.0));
    }

    #[test]
    fn observer_may_deactivate_during_dispatch() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        let resolver = Rc::new(resolver);
        resolver.activate(AdaptivityOverrides::default());
        let count = Rc::new(Cell::new(0_u32));
        let (weak, c) = (Rc::downgrade(&resolver), count.clone());
        resolver.on_change(move |_| {
            c.set(c.get() + 1);
            if let Some(resolver) = weak.upgrade() {
                resolver.deactivate();
            }
        });

        // Flips both a width and a height query; only the first may get through.
        registry.apply_viewport(Size::new(320.0, 400.0));
        assert_eq!(count.get(), 1);
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn removed_observer_is_not_called() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        let count = Rc::new(Cell::new(0_u32));
        let c = count.clone();
        let id = resolver.on_change(move |_| c.set(c.get() + 1));
        assert!(resolver.remove_observer(id));
        assert!(!resolver.remove_observer(id));
        registry.apply_viewport(Size::new(320.0, 900.0));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn headless_degrades_to_defaults() {
        let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE));
        let resolver = AdaptivityResolver::new(env);
        let state = resolver.activate(AdaptivityOverrides::default());
        assert_eq!(state.view_width, 320.0);
        assert_eq!(state.size_x, SizeType::Compact);
        assert!(!state.is_desktop);
        assert!(resolver.subscribed_queries().is_empty());

        // Overrides still apply in full.
        resolver.set_overrides(
            AdaptivityOverrides::default()
                .with_view_width(1440.0)
                .with_view_height(900.0),
        );
        let state = resolver.state().unwrap();
        assert_eq!(state.size_x, SizeType::Regular);
        assert!(state.is_desktop);
    }

    #[test]
    fn registry_swap_moves_listeners() {
        let (old, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        let new = Rc::new(MediaQueryRegistry::with_viewport(
            &Breakpoints::default(),
            Size::new(500.0, 900.0),
        ));
        resolver.set_registry(Some(new.clone()));
        assert_eq!(old.listener_count(), 0);
        assert_eq!(new.listener_count(), 6);
        assert_eq!(resolver.state().map(|s| s.size_x), Some(SizeType::Compact));

        resolver.set_registry(Some(new.clone()));
        assert_eq!(new.listener_count(), 6);

        resolver.set_registry(None);
        assert_eq!(new.listener_count(), 0);
        assert!(resolver.subscribed_queries().is_empty());
    }

    #[test]
    fn platform_change_reclassifies() {
        let (_registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        let seen = record(&resolver);
        resolver.set_platform(Platform::Android);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].is_desktop);
    }

    #[test]
    fn reactivation_after_teardown() {
        let (registry, resolver) = desktop(1440.0, 900.0);
        resolver.activate(AdaptivityOverrides::default());
        resolver.deactivate();
        registry.apply_viewport(Size::new(320.0, 480.0));
        let state = resolver.activate(AdaptivityOverrides::default());
        assert_eq!(state.size_x, SizeType::Compact);
        assert_eq!(registry.listener_count(), 6);
    }
}
