// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element computed-style handles.

use alloc::string::String;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::host::ComputedStyle;

/// Cached computed-style handles, one per tracked element.
///
/// Resolving a computed style is expensive, so each element resolves one live
/// handle when it starts tracking and every later read goes through it. The
/// presence of an entry is what makes an element tracked.
///
/// Entries are only removed by [`StyleCache::remove`] or [`StyleCache::clear`].
/// An element that leaves the document without being untracked keeps its entry
/// (bounded by the number of elements ever tracked).
#[derive(Debug, Clone)]
pub struct StyleCache<K, S>
where
    K: Eq + Hash,
{
    styles: HashMap<K, S>,
}

impl<K, S> Default for StyleCache<K, S>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> StyleCache<K, S>
where
    K: Eq + Hash,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Stores `style` for `element`.
    ///
    /// Returns `false` and keeps the existing handle if the element already has one.
    pub fn insert(&mut self, element: K, style: S) -> bool {
        match self.styles.entry(element) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(style);
                true
            }
        }
    }

    /// Returns the handle for `element`.
    #[must_use]
    pub fn get(&self, element: &K) -> Option<&S> {
        self.styles.get(element)
    }

    /// Returns `true` if `element` has a cached handle.
    #[must_use]
    pub fn contains(&self, element: &K) -> bool {
        self.styles.contains_key(element)
    }

    /// Evicts and returns the handle for `element`.
    pub fn remove(&mut self, element: &K) -> Option<S> {
        self.styles.remove(element)
    }

    /// Evicts every handle.
    pub fn clear(&mut self) {
        self.styles.clear();
    }

    /// Number of cached handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterates over the elements with a cached handle, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = &K> + '_ {
        self.styles.keys()
    }
}

impl<K, S> StyleCache<K, S>
where
    K: Eq + Hash,
    S: ComputedStyle,
{
    /// Reads `property` through the cached handle for `element`.
    ///
    /// Returns `None` if the element is not cached or the property is unset.
    #[must_use]
    pub fn property_value(&self, element: &K, property: &str) -> Option<String> {
        self.get(element)?.property_value(property)
    }
}
