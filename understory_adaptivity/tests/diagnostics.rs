// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics emitted through `tracing`.

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::Size;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use understory_adaptivity::{
    AdaptivityOverrides, AdaptivityResolver, Breakpoints, Environment, MediaQueryRegistry,
    Platform, StaticPointer,
};

/// Counts `WARN` events.
#[derive(Clone, Default)]
struct Warnings(Arc<AtomicUsize>);

impl Warnings {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn with_warnings(f: impl FnOnce(&Warnings)) {
    let warnings = Warnings::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());
    tracing::subscriber::with_default(subscriber, || f(&warnings));
}

#[test]
fn headless_warning_is_emitted_once_per_resolver() {
    with_warnings(|warnings| {
        let registry = Rc::new(MediaQueryRegistry::with_viewport(
            &Breakpoints::default(),
            Size::new(1440.0, 900.0),
        ));
        let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE))
            .with_registry(registry);
        let resolver = AdaptivityResolver::new(env);

        resolver.activate(AdaptivityOverrides::default());
        assert_eq!(warnings.count(), 0, "a live registry is not degraded");

        resolver.set_registry(None);
        assert_eq!(warnings.count(), 1, "losing the registry warns");

        resolver.deactivate();
        resolver.activate(AdaptivityOverrides::default());
        resolver.set_overrides(AdaptivityOverrides::default().with_view_width(500.0));
        assert_eq!(warnings.count(), 1, "the same resolver never warns twice");

        let headless = AdaptivityResolver::new(Environment::new(
            Platform::Android,
            Rc::new(StaticPointer::TOUCH),
        ));
        headless.activate(AdaptivityOverrides::default());
        headless.deactivate();
        headless.activate(AdaptivityOverrides::default());
        assert_eq!(warnings.count(), 2, "each resolver warns on its own");
    });
}

#[test]
fn live_resolution_is_quiet() {
    with_warnings(|warnings| {
        let registry = Rc::new(MediaQueryRegistry::with_viewport(
            &Breakpoints::default(),
            Size::new(375.0, 667.0),
        ));
        let env = Environment::new(Platform::Ios, Rc::new(StaticPointer::TOUCH))
            .with_registry(registry.clone());
        let resolver = AdaptivityResolver::new(env);
        resolver.activate(AdaptivityOverrides::default());
        registry.apply_viewport(Size::new(1024.0, 768.0));
        resolver.deactivate();
        assert_eq!(warnings.count(), 0, "nothing degraded");
    });
}
