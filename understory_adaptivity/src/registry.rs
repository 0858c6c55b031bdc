// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The registry of named breakpoint queries.
//!
//! A [`MediaQueryRegistry`] owns one [`MediaQueryList`] per [`QueryName`],
//! built from a [`Breakpoints`] table:
//!
//! | name                    | query (default table)         |
//! |-------------------------|-------------------------------|
//! | `desktopPlus`           | `(min-width: 1280px)`         |
//! | `tablet`                | `(1024px <= width < 1280px)`  |
//! | `smallTablet`           | `(768px <= width < 1024px)`   |
//! | `mobile`                | `(320px <= width < 768px)`    |
//! | `mediumHeight`          | `(min-height: 720px)`         |
//! | `mobileLandscapeHeight` | `(max-height: 415px)`         |
//!
//! The width queries tile the axis from `mobile` upward with no gaps, so every
//! width at or above the mobile threshold matches exactly one of them.
//!
//! Registries are shared read-only between resolvers, so build them once per
//! query set (see [`RegistryCache`]) and hand out `Rc` clones.
//!
//! ## Driving the registry
//!
//! The host forwards viewport changes with [`MediaQueryRegistry::apply_viewport`].
//! It commits the new answer of every query before notifying anyone, so a
//! listener that reads [`MediaQueryRegistry::evaluate`] always sees one
//! coherent viewport even when several queries flip together.
//!
//! ```
//! use kurbo::Size;
//! use understory_adaptivity::{Breakpoints, MediaQueryRegistry, QueryName, QuerySet};
//!
//! let registry = MediaQueryRegistry::new(&Breakpoints::default());
//! let flipped = registry.apply_viewport(Size::new(800.0, 900.0));
//! assert_eq!(flipped, QuerySet::SMALL_TABLET | QuerySet::MEDIUM_HEIGHT);
//! assert!(registry.evaluate().contains(QueryName::SmallTablet.flag()));
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use bitflags::bitflags;
use hashbrown::HashMap;
use kurbo::Size;
use smallvec::SmallVec;

use crate::breakpoints::{Breakpoints, ViewHeight, ViewWidth};
use crate::media::{Listener, ListenerId, MediaCondition, MediaQueryList};

/// Names of the registry's queries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryName {
    /// Desktop widths and wider.
    DesktopPlus,
    /// Tablet widths.
    Tablet,
    /// Small tablet widths.
    SmallTablet,
    /// Phone widths.
    Mobile,
    /// Heights of at least a medium viewport.
    MediumHeight,
    /// Heights of a phone held sideways.
    MobileLandscapeHeight,
}

impl QueryName {
    /// Every name, width queries from widest to narrowest, then height queries.
    pub const ALL: [Self; 6] = [
        Self::DesktopPlus,
        Self::Tablet,
        Self::SmallTablet,
        Self::Mobile,
        Self::MediumHeight,
        Self::MobileLandscapeHeight,
    ];

    /// The camel-case name hosts use for this query.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DesktopPlus => "desktopPlus",
            Self::Tablet => "tablet",
            Self::SmallTablet => "smallTablet",
            Self::Mobile => "mobile",
            Self::MediumHeight => "mediumHeight",
            Self::MobileLandscapeHeight => "mobileLandscapeHeight",
        }
    }

    /// Single-member [`QuerySet`] for this name.
    pub const fn flag(self) -> QuerySet {
        match self {
            Self::DesktopPlus => QuerySet::DESKTOP_PLUS,
            Self::Tablet => QuerySet::TABLET,
            Self::SmallTablet => QuerySet::SMALL_TABLET,
            Self::Mobile => QuerySet::MOBILE,
            Self::MediumHeight => QuerySet::MEDIUM_HEIGHT,
            Self::MobileLandscapeHeight => QuerySet::MOBILE_LANDSCAPE_HEIGHT,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// A set of [`QueryName`]s.
    ///
    /// Used both to pick which queries to subscribe to and, as the result of
    /// [`MediaQueryRegistry::evaluate`], as a snapshot of which queries match.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct QuerySet: u8 {
        /// [`QueryName::DesktopPlus`].
        const DESKTOP_PLUS = 1 << 0;
        /// [`QueryName::Tablet`].
        const TABLET = 1 << 1;
        /// [`QueryName::SmallTablet`].
        const SMALL_TABLET = 1 << 2;
        /// [`QueryName::Mobile`].
        const MOBILE = 1 << 3;
        /// [`QueryName::MediumHeight`].
        const MEDIUM_HEIGHT = 1 << 4;
        /// [`QueryName::MobileLandscapeHeight`].
        const MOBILE_LANDSCAPE_HEIGHT = 1 << 5;

        /// Every query that depends on the viewport width.
        const WIDTH = Self::DESKTOP_PLUS.bits()
            | Self::TABLET.bits()
            | Self::SMALL_TABLET.bits()
            | Self::MOBILE.bits();
        /// Every query that depends on the viewport height.
        const HEIGHT = Self::MEDIUM_HEIGHT.bits() | Self::MOBILE_LANDSCAPE_HEIGHT.bits();
    }
}

impl QuerySet {
    /// The names in this set, in [`QueryName::ALL`] order.
    pub fn names(self) -> impl Iterator<Item = QueryName> {
        QueryName::ALL
            .into_iter()
            .filter(move |name| self.contains(name.flag()))
    }
}

/// Map a snapshot to a representative viewport width.
///
/// The first matching query in the order desktopPlus, tablet, smallTablet,
/// mobile picks the bucket; no match means [`ViewWidth::SmallMobile`]. The
/// number is a bucket stand-in for re-classification, not a measurement.
pub fn view_width_by_media_queries(breakpoints: &Breakpoints, snapshot: QuerySet) -> f64 {
    let bucket = if snapshot.contains(QuerySet::DESKTOP_PLUS) {
        ViewWidth::Desktop
    } else if snapshot.contains(QuerySet::TABLET) {
        ViewWidth::Tablet
    } else if snapshot.contains(QuerySet::SMALL_TABLET) {
        ViewWidth::SmallTablet
    } else if snapshot.contains(QuerySet::MOBILE) {
        ViewWidth::Mobile
    } else {
        ViewWidth::SmallMobile
    };
    breakpoints.representative_width(bucket)
}

/// Map a snapshot to a representative viewport height.
///
/// mediumHeight wins over mobileLandscapeHeight; neither means
/// [`ViewHeight::Small`].
pub fn view_height_by_media_queries(breakpoints: &Breakpoints, snapshot: QuerySet) -> f64 {
    let bucket = if snapshot.contains(QuerySet::MEDIUM_HEIGHT) {
        ViewHeight::Medium
    } else if snapshot.contains(QuerySet::MOBILE_LANDSCAPE_HEIGHT) {
        ViewHeight::ExtraSmall
    } else {
        ViewHeight::Small
    };
    breakpoints.representative_height(bucket)
}

/// One live query per [`QueryName`], built from a breakpoint table.
pub struct MediaQueryRegistry {
    breakpoints: Breakpoints,
    lists: [MediaQueryList; 6],
}

impl MediaQueryRegistry {
    /// Build the queries for `breakpoints`. Nothing matches until the host
    /// applies a viewport.
    pub fn new(breakpoints: &Breakpoints) -> Self {
        let lists = QueryName::ALL.map(|name| MediaQueryList::new(condition(breakpoints, name)));
        Self {
            breakpoints: *breakpoints,
            lists,
        }
    }

    /// Build the queries and seed them from an initial viewport without
    /// notifying anyone.
    pub fn with_viewport(breakpoints: &Breakpoints, size: Size) -> Self {
        let registry = Self::new(breakpoints);
        for list in &registry.lists {
            list.commit(list.condition().matches(size));
        }
        registry
    }

    /// The table the queries were built from.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// The live list behind `name`.
    pub fn query(&self, name: QueryName) -> &MediaQueryList {
        &self.lists[name.index()]
    }

    /// The comma-separated query strings, in [`QueryName::ALL`] order.
    ///
    /// Two registries with the same key are interchangeable.
    pub fn key(&self) -> String {
        query_key(&self.breakpoints)
    }

    /// Snapshot of which queries match right now.
    pub fn evaluate(&self) -> QuerySet {
        QueryName::ALL
            .into_iter()
            .filter(|name| self.query(*name).matches())
            .fold(QuerySet::empty(), |set, name| set | name.flag())
    }

    /// Listen for flips of one query.
    pub fn subscribe(&self, name: QueryName, listener: impl Fn(bool) + 'static) -> ListenerId {
        self.query(name).add_listener(listener)
    }

    /// Stop listening. Returns `false` if `id` was not registered on `name`.
    pub fn unsubscribe(&self, name: QueryName, id: ListenerId) -> bool {
        self.query(name).remove_listener(id)
    }

    /// Total number of listeners across all queries.
    pub fn listener_count(&self) -> usize {
        self.lists.iter().map(MediaQueryList::listener_count).sum()
    }

    /// Re-evaluate every query against a new viewport size.
    ///
    /// All answers are committed first; listeners of the queries that flipped
    /// run afterwards. Returns the set of flipped queries.
    pub fn apply_viewport(&self, size: Size) -> QuerySet {
        let mut flipped = QuerySet::empty();
        for name in QueryName::ALL {
            let list = self.query(name);
            if list.commit(list.condition().matches(size)) {
                flipped |= name.flag();
            }
        }
        for name in flipped.names() {
            self.query(name).notify();
        }
        flipped
    }
}

impl fmt::Debug for MediaQueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaQueryRegistry")
            .field("matching", &self.evaluate())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

fn condition(bp: &Breakpoints, name: QueryName) -> MediaCondition {
    match name {
        QueryName::DesktopPlus => MediaCondition::min_width(bp.desktop_plus()),
        QueryName::Tablet => MediaCondition::width_range(bp.tablet(), bp.desktop_plus()),
        QueryName::SmallTablet => MediaCondition::width_range(bp.small_tablet(), bp.tablet()),
        QueryName::Mobile => MediaCondition::width_range(bp.mobile(), bp.small_tablet()),
        QueryName::MediumHeight => MediaCondition::min_height(bp.medium_height()),
        QueryName::MobileLandscapeHeight => {
            MediaCondition::max_height(bp.mobile_landscape_height())
        }
    }
}

fn query_key(bp: &Breakpoints) -> String {
    let mut key = String::new();
    for name in QueryName::ALL {
        if !key.is_empty() {
            key.push_str(", ");
        }
        key.push_str(&alloc::format!("{}", condition(bp, name)));
    }
    key
}

/// Scoped ownership of registry listeners.
///
/// Holds one listener per subscribed query. Dropping the subscription, or
/// calling [`Subscription::release`], removes all of them.
pub struct Subscription {
    registry: Rc<MediaQueryRegistry>,
    entries: SmallVec<[(QueryName, ListenerId); 6]>,
}

impl Subscription {
    /// Register `listener` on every query in `set`.
    pub fn acquire(registry: &Rc<MediaQueryRegistry>, set: QuerySet, listener: Listener) -> Self {
        let entries = set
            .names()
            .map(|name| (name, registry.query(name).add_shared(listener.clone())))
            .collect();
        Self {
            registry: registry.clone(),
            entries,
        }
    }

    /// The queries still held.
    pub fn queries(&self) -> QuerySet {
        self.entries
            .iter()
            .fold(QuerySet::empty(), |set, (name, _)| set | name.flag())
    }

    /// The registry the listeners live on.
    pub fn registry(&self) -> &Rc<MediaQueryRegistry> {
        &self.registry
    }

    /// Remove every listener now. Safe to call more than once.
    pub fn release(&mut self) {
        for (name, id) in self.entries.drain(..) {
            self.registry.unsubscribe(name, id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("queries", &self.queries())
            .finish_non_exhaustive()
    }
}

/// Registries keyed by their query strings.
///
/// Building a registry is the expensive part and its lists are the
/// subscription handles, so every resolver configured with the same
/// breakpoints should share one.
#[derive(Debug, Default)]
pub struct RegistryCache {
    registries: HashMap<String, Rc<MediaQueryRegistry>>,
}

impl RegistryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry for `breakpoints`, building it on first use.
    pub fn get_or_create(&mut self, breakpoints: &Breakpoints) -> Rc<MediaQueryRegistry> {
        self.registries
            .entry(query_key(breakpoints))
            .or_insert_with(|| Rc::new(MediaQueryRegistry::new(breakpoints)))
            .clone()
    }

    /// Number of distinct registries held.
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    /// Whether no registry has been built yet.
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}
