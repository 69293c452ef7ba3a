// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observation-and-update coordinator.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::config::{Config, ConfigError, Marker};
use crate::guard::LoopGuard;
use crate::host::{Document, ElementWatcher, Host, Mutation, Services, Timers, TreeWatcher};
use crate::parse::parse_breakpoints;
use crate::style::StyleCache;
use crate::update::{ClassChanges, ClassList, apply_breakpoints};
use crate::visibility::VisibilityGate;

type StyleOf<H> = <<H as Host>::Document as Document>::Style;
type HandleOf<H> = <<H as Host>::Timers as Timers<<H as Host>::Element>>::Handle;

/// Keeps breakpoint classes of every marked element in sync with its content width.
///
/// The coordinator owns the per-element state (style handles, visibility,
/// parked sizes, suppression windows) and the injected [`Services`]. The host
/// forwards its observer notifications to the `on_*` methods; each call runs
/// to completion and the coordinator never calls back into the host
/// re-entrantly.
///
/// See the [crate documentation](crate) for the overall flow.
pub struct Coordinator<H: Host> {
    config: Config,
    services: Services<H>,
    styles: StyleCache<H::Element, StyleOf<H>>,
    gate: VisibilityGate<H::Element>,
    guard: LoopGuard<H::Element, HandleOf<H>>,
    running: bool,
    scratch: Vec<H::Element>,
}

/// Snapshot of a [`Coordinator`]'s bookkeeping, for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CoordinatorDebugInfo {
    /// Whether the services are started.
    pub running: bool,
    /// Tracked elements.
    pub tracked: usize,
    /// Tracked elements currently near the viewport.
    pub visible: usize,
    /// Elements with a parked resize.
    pub pending: usize,
    /// Elements inside a suppression window.
    pub suppressed: usize,
}

impl<H: Host> fmt::Debug for Coordinator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("state", &self.debug_info())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Coordinator<H> {
    /// Creates a stopped coordinator over `services`.
    pub fn new(config: Config, services: Services<H>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            services,
            styles: StyleCache::new(),
            gate: VisibilityGate::new(),
            guard: LoopGuard::new(),
            running: false,
            scratch: Vec::new(),
        })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The injected services.
    #[must_use]
    pub fn services(&self) -> &Services<H> {
        &self.services
    }

    /// The injected services, mutably.
    ///
    /// Mutating the document through this does not notify the coordinator;
    /// the host's watchers are expected to report the change.
    #[must_use]
    pub fn services_mut(&mut self) -> &mut Services<H> {
        &mut self.services
    }

    /// Starts the services and tracks every marked element already in the document.
    ///
    /// Does nothing if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.services.tree.start();
        self.services.size.start();
        self.services.visibility.start();
        self.running = true;

        let mut found = core::mem::take(&mut self.scratch);
        self.services
            .document
            .query_marked(None, self.config.marker(), &mut found);
        #[cfg(feature = "tracing")]
        tracing::debug!(found = found.len(), "initial scan");
        for element in found.drain(..) {
            self.track(element);
        }
        self.scratch = found;
    }

    /// Stops the services and drops all per-element state.
    ///
    /// Class lists are left as they are. A later [`start`](Self::start)
    /// rescans the document.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.services.tree.stop();
        self.services.size.stop();
        self.services.visibility.stop();
        self.guard.clear(&mut self.services.timers);
        self.styles.clear();
        self.gate.clear();
        self.running = false;
        #[cfg(feature = "tracing")]
        tracing::debug!("stopped");
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts tracking `element`: caches its style and registers it with the
    /// size and visibility watchers.
    ///
    /// Returns `false` if it was already tracked or the host could not resolve
    /// its computed style.
    pub fn track(&mut self, element: H::Element) -> bool {
        if self.styles.contains(&element) {
            return false;
        }
        let Some(style) = self.services.document.computed_style(&element) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(?element, "no computed style; not tracking");
            return false;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(?element, "tracking");
        self.services.size.observe(&element);
        self.services.visibility.observe(&element);
        self.styles.insert(element, style);
        true
    }

    /// Stops tracking `element`, discarding its parked size and suppression window.
    ///
    /// Returns `false` if it was not tracked.
    pub fn untrack(&mut self, element: &H::Element) -> bool {
        if self.styles.remove(element).is_none() {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?element, "untracking");
        self.services.size.unobserve(element);
        self.services.visibility.unobserve(element);
        self.gate.forget(element);
        self.guard.disarm(element, &mut self.services.timers);
        true
    }

    /// Handles a batch of structural changes from the tree watcher.
    ///
    /// - `Added`: tracks every marked element in the inserted subtree.
    /// - `Removed`: untracks every tracked element in the removed subtree.
    /// - `MarkerChanged`: tracks or untracks the element if it gained or lost
    ///   the marker. A loss inside a suppression window is kept as an echo only
    ///   when the element's own declaration toggles the marker class.
    pub fn on_mutations<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Mutation<H::Element>>,
    {
        if !self.running {
            return;
        }
        let mut found = core::mem::take(&mut self.scratch);
        for record in records {
            match record {
                Mutation::Added(root) => {
                    self.services
                        .document
                        .query_marked(Some(&root), self.config.marker(), &mut found);
                    for element in found.drain(..) {
                        self.track(element);
                    }
                }
                Mutation::Removed(root) => {
                    self.untrack(&root);
                    self.services
                        .document
                        .query_marked(Some(&root), self.config.marker(), &mut found);
                    for element in found.drain(..) {
                        self.untrack(&element);
                    }
                }
                Mutation::MarkerChanged(element) => self.reevaluate(element),
            }
        }
        self.scratch = found;
    }

    fn reevaluate(&mut self, element: H::Element) {
        let marked = self
            .config
            .marker()
            .matches(&self.services.document, &element);
        if marked {
            self.track(element);
        } else if self.guard.is_suppressed(&element) && self.declares_marker(&element) {
            #[cfg(feature = "tracing")]
            tracing::trace!(?element, "marker removed by breakpoint rule; still tracking");
        } else {
            self.untrack(&element);
        }
    }

    /// Returns `true` if the element's declaration has a rule for the marker class.
    fn declares_marker(&self, element: &H::Element) -> bool {
        let Marker::Class(marker) = self.config.marker() else {
            return false;
        };
        self.styles
            .property_value(element, self.config.property())
            .is_some_and(|declaration| {
                parse_breakpoints(&declaration).any(|rule| rule.class == marker.as_str())
            })
    }

    /// Handles content-box size notifications from the size watcher.
    ///
    /// Visible elements are updated immediately; others park their latest size
    /// until they become visible. Untracked elements are ignored.
    pub fn on_resize<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (H::Element, Size)>,
    {
        for (element, size) in entries {
            if !self.styles.contains(&element) {
                continue;
            }
            match self.gate.resized(&element, size) {
                Some(size) => {
                    self.update(&element, size);
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?element, width = size.width, "resize deferred");
                }
            }
        }
    }

    /// Handles intersection notifications from the visibility watcher.
    ///
    /// An element becoming visible applies its parked size, if any. Untracked
    /// elements are ignored.
    pub fn on_intersection<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (H::Element, bool)>,
    {
        for (element, intersecting) in entries {
            if !self.styles.contains(&element) {
                continue;
            }
            if let Some(size) = self.gate.set_intersecting(&element, intersecting) {
                #[cfg(feature = "tracing")]
                tracing::trace!(?element, width = size.width, "flushing deferred resize");
                self.update(&element, size);
            }
        }
    }

    /// Closes the suppression window of `element` after its timer fired.
    pub fn on_suppression_expired(&mut self, element: &H::Element) {
        self.guard.expire(element);
    }

    /// Applies the element's current breakpoint declaration at `content`'s width.
    ///
    /// Reads the declaration through the cached style handle, so it reflects
    /// the element's current computed style. Does nothing for untracked
    /// elements or an empty declaration. Any class change opens a suppression
    /// window for the element.
    pub fn update(&mut self, element: &H::Element, content: Size) -> ClassChanges {
        let Some(declaration) = self
            .styles
            .property_value(element, self.config.property())
        else {
            return ClassChanges::default();
        };
        let mut classes = ElementClasses {
            document: &mut self.services.document,
            element,
        };
        let changes = apply_breakpoints(&mut classes, &declaration, content.width);
        if !changes.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                ?element,
                width = content.width,
                added = changes.added,
                removed = changes.removed,
                "breakpoint classes changed"
            );
            self.guard
                .arm(element, &mut self.services.timers, self.config.suppression());
        }
        changes
    }

    /// Returns `true` if `element` is tracked.
    #[must_use]
    pub fn is_tracked(&self, element: &H::Element) -> bool {
        self.styles.contains(element)
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.styles.len()
    }

    /// Iterates over the tracked elements, in no particular order.
    pub fn tracked(&self) -> impl Iterator<Item = &H::Element> + '_ {
        self.styles.elements()
    }

    /// Returns `true` if `element` last reported intersecting the expanded viewport.
    #[must_use]
    pub fn is_visible(&self, element: &H::Element) -> bool {
        self.gate.is_visible(element)
    }

    /// The resize parked for `element` while it is off-screen.
    #[must_use]
    pub fn pending_size(&self, element: &H::Element) -> Option<Size> {
        self.gate.pending(element)
    }

    /// Returns `true` while `element` is inside a suppression window.
    #[must_use]
    pub fn is_suppressed(&self, element: &H::Element) -> bool {
        self.guard.is_suppressed(element)
    }

    /// Returns a snapshot of the coordinator's bookkeeping.
    #[must_use]
    pub fn debug_info(&self) -> CoordinatorDebugInfo {
        CoordinatorDebugInfo {
            running: self.running,
            tracked: self.styles.len(),
            visible: self.gate.visible_len(),
            pending: self.gate.pending_len(),
            suppressed: self.guard.len(),
        }
    }
}

/// Class list of one element, as seen through the document.
struct ElementClasses<'a, D: Document> {
    document: &'a mut D,
    element: &'a D::Element,
}

impl<D: Document> ClassList for ElementClasses<'_, D> {
    fn contains(&self, class: &str) -> bool {
        self.document.has_class(self.element, class)
    }

    fn add(&mut self, class: &str) {
        self.document.add_class(self.element, class);
    }

    fn remove(&mut self, class: &str) {
        self.document.remove_class(self.element, class);
    }
}
