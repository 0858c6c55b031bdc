// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live boolean media queries.
//!
//! A [`MediaQueryList`] holds the current answer to one [`MediaCondition`]
//! and a list of change listeners. It plays the part of a browser
//! `MediaQueryList`: the host feeds it new answers, and listeners run only
//! when the answer actually flips.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_adaptivity::media::{MediaCondition, MediaQueryList};
//!
//! let list = MediaQueryList::new(MediaCondition::min_width(1024.0));
//! assert_eq!(list.media(), "(min-width: 1024px)");
//!
//! let flips = Rc::new(Cell::new(0));
//! let seen = flips.clone();
//! list.add_listener(move |_| seen.set(seen.get() + 1));
//!
//! list.set_matches(true);
//! list.set_matches(true);
//! list.set_matches(false);
//! assert_eq!(flips.get(), 2);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::Size;
use smallvec::SmallVec;

/// Change listener. Receives the new answer.
pub type Listener = Rc<dyn Fn(bool)>;

/// Handle for removing a listener from the list that issued it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// The viewport dimension a condition looks at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MediaFeature {
    /// Viewport width.
    Width,
    /// Viewport height.
    Height,
}

impl MediaFeature {
    fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    fn of(self, size: Size) -> f64 {
        match self {
            Self::Width => size.width,
            Self::Height => size.height,
        }
    }
}

/// A range condition on one viewport dimension.
///
/// Displays in CSS media query syntax. Half-open ranges use the level 4
/// range form, e.g. `(768px <= width < 1024px)`, so fractional widths never
/// fall between two adjacent buckets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MediaCondition {
    /// Dimension being tested.
    pub feature: MediaFeature,
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Exclusive upper bound.
    pub below: Option<f64>,
}

impl MediaCondition {
    /// `(min-width: {min}px)`
    pub const fn min_width(min: f64) -> Self {
        Self {
            feature: MediaFeature::Width,
            min: Some(min),
            max: None,
            below: None,
        }
    }

    /// `({min}px <= width < {below}px)`
    pub const fn width_range(min: f64, below: f64) -> Self {
        Self {
            feature: MediaFeature::Width,
            min: Some(min),
            max: None,
            below: Some(below),
        }
    }

    /// `(min-height: {min}px)`
    pub const fn min_height(min: f64) -> Self {
        Self {
            feature: MediaFeature::Height,
            min: Some(min),
            max: None,
            below: None,
        }
    }

    /// `(max-height: {max}px)`
    pub const fn max_height(max: f64) -> Self {
        Self {
            feature: MediaFeature::Height,
            min: None,
            max: Some(max),
            below: None,
        }
    }

    /// Whether a viewport of `size` satisfies the condition.
    pub fn matches(&self, size: Size) -> bool {
        let value = self.feature.of(size);
        self.min.is_none_or(|min| value >= min)
            && self.max.is_none_or(|max| value <= max)
            && self.below.is_none_or(|below| value < below)
    }
}

impl fmt::Display for MediaCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let feature = self.feature.as_str();
        match (self.min, self.max, self.below) {
            (min, _, Some(below)) => match min {
                Some(min) => write!(f, "({min}px <= {feature} < {below}px)"),
                None => write!(f, "({feature} < {below}px)"),
            },
            (Some(min), Some(max), None) => {
                write!(f, "(min-{feature}: {min}px) and (max-{feature}: {max}px)")
            }
            (Some(min), None, None) => write!(f, "(min-{feature}: {min}px)"),
            (None, Some(max), None) => write!(f, "(max-{feature}: {max}px)"),
            (None, None, None) => write!(f, "all"),
        }
    }
}

/// A live answer to one media condition, plus its change listeners.
///
/// Lists are shared behind `Rc` and mutated through `&self`; everything runs
/// on one thread.
pub struct MediaQueryList {
    media: String,
    condition: MediaCondition,
    matches: Cell<bool>,
    listeners: RefCell<SmallVec<[(ListenerId, Listener); 4]>>,
    next_id: Cell<u64>,
}

impl MediaQueryList {
    /// Create a list that does not match yet.
    pub fn new(condition: MediaCondition) -> Self {
        Self {
            media: alloc::format!("{condition}"),
            condition,
            matches: Cell::new(false),
            listeners: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        }
    }

    /// The query string.
    pub fn media(&self) -> &str {
        &self.media
    }

    /// The condition this list answers.
    pub fn condition(&self) -> &MediaCondition {
        &self.condition
    }

    /// The current answer.
    pub fn matches(&self) -> bool {
        self.matches.get()
    }

    /// Register a change listener.
    pub fn add_listener(&self, listener: impl Fn(bool) + 'static) -> ListenerId {
        self.add_shared(Rc::new(listener))
    }

    /// Register a listener that may also be registered elsewhere.
    pub(crate) fn add_shared(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|(l, _)| *l == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Store a new answer and notify listeners if it flipped.
    ///
    /// Returns whether the answer flipped.
    pub fn set_matches(&self, matches: bool) -> bool {
        let flipped = self.commit(matches);
        if flipped {
            self.notify();
        }
        flipped
    }

    /// Re-evaluate against a viewport size and notify on a flip.
    pub fn apply(&self, size: Size) -> bool {
        self.set_matches(self.condition.matches(size))
    }

    /// Store a new answer without notifying. Returns whether it flipped.
    pub(crate) fn commit(&self, matches: bool) -> bool {
        self.matches.replace(matches) != matches
    }

    /// Run every listener with the current answer.
    ///
    /// Listeners are snapshotted first so they may add or remove listeners
    /// (including themselves) while running.
    pub(crate) fn notify(&self) {
        let snapshot: SmallVec<[Listener; 4]> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        let matches = self.matches.get();
        for listener in snapshot {
            listener(matches);
        }
    }
}

impl fmt::Debug for MediaQueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaQueryList")
            .field("media", &self.media)
            .field("matches", &self.matches.get())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}
