// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Services a host environment injects into the [`Coordinator`](crate::Coordinator).
//!
//! The coordinator never observes anything itself. A host supplies:
//!
//! - a [`Document`] for structural queries, computed styles and class lists,
//! - a [`TreeWatcher`] that reports insertions, removals and marker changes to
//!   [`Coordinator::on_mutations`](crate::Coordinator::on_mutations),
//! - two [`ElementWatcher`]s: one for content-box size, reporting to
//!   [`Coordinator::on_resize`](crate::Coordinator::on_resize), one for viewport
//!   intersection, reporting to
//!   [`Coordinator::on_intersection`](crate::Coordinator::on_intersection),
//! - [`Timers`] whose expirations are reported to
//!   [`Coordinator::on_suppression_expired`](crate::Coordinator::on_suppression_expired).
//!
//! Notifications are expected on a single thread, one callback at a time. None
//! of the watchers may report synchronously from inside `observe`/`start`.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use crate::config::Marker;

/// Type-level bundle of the services used by a [`Coordinator`](crate::Coordinator).
///
/// Implemented by a (usually zero-sized) marker type per host environment.
pub trait Host {
    /// Stable identity of an element.
    ///
    /// Used as a map key for per-element state. Two handles to the same
    /// element must compare equal.
    type Element: Clone + Eq + Hash + Debug;
    /// Structural queries, computed styles and class lists.
    type Document: Document<Element = Self::Element>;
    /// Observes insertions, removals and marker changes.
    type Tree: TreeWatcher;
    /// Observes content-box size changes.
    type Size: ElementWatcher<Self::Element>;
    /// Observes intersection with the viewport, expanded by the visibility margin.
    type Visibility: ElementWatcher<Self::Element>;
    /// Schedules suppression expiry.
    type Timers: Timers<Self::Element>;
}

/// The concrete services for a [`Host`], handed to
/// [`Coordinator::new`](crate::Coordinator::new).
pub struct Services<H: Host> {
    /// Document access.
    pub document: H::Document,
    /// Tree watcher.
    pub tree: H::Tree,
    /// Size watcher.
    pub size: H::Size,
    /// Visibility watcher.
    pub visibility: H::Visibility,
    /// Suppression timers.
    pub timers: H::Timers,
}

impl<H: Host> Debug for Services<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// A live handle to an element's computed style.
///
/// Reads must reflect the element's current computed state, not the state at
/// the time the handle was obtained.
pub trait ComputedStyle {
    /// Returns the computed value of a property, or `None` when it is unset or empty.
    fn property_value(&self, name: &str) -> Option<String>;
}

/// Document access used by the coordinator.
pub trait Document {
    /// Element identity; see [`Host::Element`].
    type Element: Clone + Eq + Hash + Debug;
    /// Computed-style handle returned by [`Document::computed_style`].
    type Style: ComputedStyle;

    /// Appends every element matching `marker` to `out`.
    ///
    /// With `root == None` the whole document is searched. Otherwise the
    /// subtree rooted at `root` is searched, `root` included.
    fn query_marked(
        &self,
        root: Option<&Self::Element>,
        marker: &Marker,
        out: &mut Vec<Self::Element>,
    );

    /// Returns `true` if the element's class list contains `class`.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Returns `true` if the element carries the attribute `name`.
    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool;

    /// Resolves a live computed-style handle, or `None` if the host cannot.
    fn computed_style(&self, element: &Self::Element) -> Option<Self::Style>;

    /// Adds `class` to the element's class list.
    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Removes `class` from the element's class list.
    fn remove_class(&mut self, element: &Self::Element, class: &str);
}

/// Structural observation of the whole document.
pub trait TreeWatcher {
    /// Begins reporting mutations.
    fn start(&mut self);
    /// Stops reporting mutations.
    fn stop(&mut self);
}

/// Per-element observation (size or visibility).
pub trait ElementWatcher<K> {
    /// Prepares the watcher; called once before any `observe`.
    fn start(&mut self) {}
    /// Stops observing every element.
    fn stop(&mut self);
    /// Begins observing `element`.
    ///
    /// The host should deliver an initial notification for the element on a
    /// later turn, as browser observers do.
    fn observe(&mut self, element: &K);
    /// Stops observing `element`.
    fn unobserve(&mut self, element: &K);
}

/// Cancellable one-shot timers.
pub trait Timers<K> {
    /// Token identifying a scheduled timer.
    type Handle;

    /// Schedules an expiry notification for `element` after `delay`.
    ///
    /// Returns `None` if the timer could not be scheduled.
    fn schedule(&mut self, element: &K, delay: Duration) -> Option<Self::Handle>;

    /// Cancels a pending timer. Cancelling a fired timer has no effect.
    fn cancel(&mut self, handle: Self::Handle);
}

/// A structural change reported by a [`TreeWatcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation<K> {
    /// A subtree rooted at this element was inserted.
    Added(K),
    /// A subtree rooted at this element was removed.
    Removed(K),
    /// The attribute carrying the marker changed on this element.
    MarkerChanged(K),
}
