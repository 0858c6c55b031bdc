// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live adaptivity: a window being resized, two consumers, one pinned scope.
//!
//! This example shows how to:
//! - share one `MediaQueryRegistry` between consumers through a `RegistryCache`,
//! - drive it with viewport sizes the way a windowing layer would,
//! - pin the horizontal size class for a subtree with `AdaptivityOverrides`,
//! - re-render a select field only when its adaptivity actually changes.
//!
//! Run:
//! - `cargo run -p understory_demos --example adaptivity_live`
//! - `RUST_LOG=debug cargo run -p understory_demos --example adaptivity_live` to also see
//!   the resolvers' subscription bookkeeping.

use std::rc::Rc;

use kurbo::Size;
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_adaptivity::select_mimicry::SelectMimicryProps;
use understory_adaptivity::{
    AdaptivityOverrides, AdaptivityResolver, Breakpoints, Environment, Platform, RegistryCache,
    SizeType, StaticPointer,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cache = RegistryCache::new();
    let registry = cache.get_or_create(&Breakpoints::default());
    registry.apply_viewport(Size::new(1440.0, 900.0));

    let env = Environment::new(Platform::Desktop, Rc::new(StaticPointer::MOUSE))
        .with_registry(registry.clone());

    // A page-level field follows the window.
    let page = AdaptivityResolver::new(env.clone());
    // A sidebar that is always laid out compactly.
    let sidebar = AdaptivityResolver::new(env);

    let field = Rc::new(SelectMimicryProps {
        placeholder: Some("Choose a city".into()),
        ..SelectMimicryProps::default()
    });

    let initial = page.activate(AdaptivityOverrides::default());
    info!(scope = "page", class = %field.render(&initial).class_name(), "initial render");
    let pinned = sidebar.activate(AdaptivityOverrides::default().with_size_x(SizeType::Compact));
    info!(scope = "sidebar", class = %field.render(&pinned).class_name(), "initial render");

    for (name, resolver) in [("page", &page), ("sidebar", &sidebar)] {
        let field = field.clone();
        resolver.on_change(move |state| {
            let view = field.render(state);
            info!(
                scope = name,
                class = %view.class_name(),
                icon = view.dropdown_icon.size(),
                is_desktop = state.is_desktop,
                "re-render"
            );
        });
    }

    for size in [
        Size::new(1300.0, 900.0),
        Size::new(1100.0, 800.0),
        Size::new(700.0, 800.0),
        Size::new(700.0, 400.0),
        Size::new(1440.0, 900.0),
    ] {
        info!(width = size.width, height = size.height, "window resized");
        registry.apply_viewport(size);
    }

    page.deactivate();
    sidebar.deactivate();
    info!(listeners = registry.listener_count(), "both resolvers unmounted");
}
