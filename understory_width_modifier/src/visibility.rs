// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility gating of resize work.

use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::Size;

/// Tracks which elements are near the viewport and defers resizes for the rest.
///
/// A resize for a visible element passes straight through. A resize for an
/// invisible element is parked, replacing any earlier parked size, and released
/// once the element starts intersecting. At most one size is parked per element
/// however often it resizes while off-screen.
///
/// ```
/// use kurbo::Size;
/// use understory_width_modifier::VisibilityGate;
///
/// let mut gate = VisibilityGate::new();
///
/// // Off-screen: both resizes are parked, the last one wins.
/// assert_eq!(gate.resized(&1, Size::new(300.0, 10.0)), None);
/// assert_eq!(gate.resized(&1, Size::new(320.0, 10.0)), None);
///
/// // Scrolling into view releases the latest size once.
/// assert_eq!(gate.set_intersecting(&1, true), Some(Size::new(320.0, 10.0)));
/// assert_eq!(gate.pending(&1), None);
///
/// // Visible: resizes pass through.
/// assert_eq!(gate.resized(&1, Size::new(400.0, 10.0)), Some(Size::new(400.0, 10.0)));
/// ```
#[derive(Debug, Clone)]
pub struct VisibilityGate<K>
where
    K: Eq + Hash,
{
    visible: HashSet<K>,
    pending: HashMap<K, Size>,
}

impl<K> Default for VisibilityGate<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            visible: HashSet::new(),
            pending: HashMap::new(),
        }
    }
}

impl<K> VisibilityGate<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a gate with no visible elements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: HashSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Records a resize.
    ///
    /// Returns the size to apply now if `element` is visible. Otherwise parks it
    /// and returns `None`.
    pub fn resized(&mut self, element: &K, size: Size) -> Option<Size> {
        if self.visible.contains(element) {
            Some(size)
        } else {
            self.pending.insert(element.clone(), size);
            None
        }
    }

    /// Records an intersection transition.
    ///
    /// Becoming visible returns the parked size, if any, and clears it.
    pub fn set_intersecting(&mut self, element: &K, intersecting: bool) -> Option<Size> {
        if intersecting {
            self.visible.insert(element.clone());
            self.pending.remove(element)
        } else {
            self.visible.remove(element);
            None
        }
    }

    /// Drops visibility and any parked size for `element`.
    pub fn forget(&mut self, element: &K) {
        self.visible.remove(element);
        self.pending.remove(element);
    }

    /// Drops all state.
    pub fn clear(&mut self) {
        self.visible.clear();
        self.pending.clear();
    }

    /// Returns `true` if `element` last reported intersecting.
    #[must_use]
    pub fn is_visible(&self, element: &K) -> bool {
        self.visible.contains(element)
    }

    /// The size parked for `element`, if any.
    #[must_use]
    pub fn pending(&self, element: &K) -> Option<Size> {
        self.pending.get(element).copied()
    }

    /// Number of visible elements.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Number of parked sizes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(w: f64) -> Size {
        Size::new(w, 0.0)
    }

    #[test]
    fn elements_start_invisible() {
        let mut gate = VisibilityGate::new();
        assert!(!gate.is_visible(&1_u32));
        assert_eq!(gate.resized(&1, width(100.0)), None);
        assert_eq!(gate.pending(&1), Some(width(100.0)));
    }

    #[test]
    fn becoming_visible_without_parked_size_flushes_nothing() {
        let mut gate = VisibilityGate::new();
        assert_eq!(gate.set_intersecting(&1_u32, true), None);
        assert!(gate.is_visible(&1));
    }

    #[test]
    fn leaving_view_parks_later_resizes() {
        let mut gate = VisibilityGate::new();
        gate.set_intersecting(&1_u32, true);
        assert_eq!(gate.resized(&1, width(10.0)), Some(width(10.0)));

        assert_eq!(gate.set_intersecting(&1, false), None);
        assert!(!gate.is_visible(&1));
        assert_eq!(gate.resized(&1, width(20.0)), None);
        assert_eq!(gate.resized(&1, width(30.0)), None);
        assert_eq!(gate.pending_len(), 1);

        assert_eq!(gate.set_intersecting(&1, true), Some(width(30.0)));
        assert_eq!(gate.set_intersecting(&1, true), None);
    }

    #[test]
    fn forget_drops_parked_size() {
        let mut gate = VisibilityGate::new();
        gate.resized(&1_u32, width(10.0));
        gate.set_intersecting(&2, true);
        gate.forget(&1);
        gate.forget(&2);
        assert_eq!(gate.pending_len(), 0);
        assert_eq!(gate.visible_len(), 0);
        assert_eq!(gate.set_intersecting(&1, true), None);
    }

    #[test]
    fn default_gate_is_empty() {
        let mut gate: VisibilityGate<u32> = VisibilityGate::default();
        assert_eq!(gate.visible_len(), 0);
        assert_eq!(gate.resized(&1, width(10.0)), None);
    }
}
