// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Short-lived suppression after class changes.

use core::hash::Hash;
use core::time::Duration;

use hashbrown::HashMap;

use crate::host::Timers;

/// Per-element suppression windows.
///
/// When the class updater changes an element's classes it arms the guard for
/// that element. Until the timer expires, a marker loss reported for the
/// element may be an echo of that change (a breakpoint rule naming the marker
/// class itself) and is not acted on in that case. Re-arming cancels the
/// previous timer, extending the window.
///
/// The guard only prevents re-evaluation loops through the tree watcher. It
/// cannot prevent resize loops: breakpoint classes must not change the
/// element's own content width.
#[derive(Debug)]
pub struct LoopGuard<K, H>
where
    K: Eq + Hash,
{
    active: HashMap<K, H>,
}

impl<K, H> Default for LoopGuard<K, H>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            active: HashMap::new(),
        }
    }
}

impl<K, H> LoopGuard<K, H>
where
    K: Clone + Eq + Hash,
{
    /// Creates a guard with no active windows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Opens (or extends) the suppression window for `element`.
    ///
    /// If `timers` cannot schedule the expiry, any open window for `element`
    /// is closed instead, since it could never expire. Returns `true` if a
    /// window is open afterwards.
    pub fn arm<T>(&mut self, element: &K, timers: &mut T, delay: Duration) -> bool
    where
        T: Timers<K, Handle = H> + ?Sized,
    {
        match timers.schedule(element, delay) {
            Some(handle) => {
                if let Some(previous) = self.active.insert(element.clone(), handle) {
                    timers.cancel(previous);
                }
                true
            }
            None => {
                self.disarm(element, timers);
                false
            }
        }
    }

    /// Closes the window for `element` after its timer fired.
    ///
    /// Returns `true` if a window was open.
    pub fn expire(&mut self, element: &K) -> bool {
        self.active.remove(element).is_some()
    }

    /// Closes the window for `element` and cancels its timer.
    ///
    /// Returns `true` if a window was open.
    pub fn disarm<T>(&mut self, element: &K, timers: &mut T) -> bool
    where
        T: Timers<K, Handle = H> + ?Sized,
    {
        match self.active.remove(element) {
            Some(handle) => {
                timers.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Closes every window and cancels every timer.
    pub fn clear<T>(&mut self, timers: &mut T)
    where
        T: Timers<K, Handle = H> + ?Sized,
    {
        for (_, handle) in self.active.drain() {
            timers.cancel(handle);
        }
    }

    /// Returns `true` while `element` is inside a suppression window.
    #[must_use]
    pub fn is_suppressed(&self, element: &K) -> bool {
        self.active.contains_key(element)
    }

    /// Number of open windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if no window is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        next: u32,
        unavailable: bool,
        scheduled: Vec<(u32, u32, Duration)>,
        cancelled: Vec<u32>,
    }

    impl Timers<u32> for Recorder {
        type Handle = u32;

        fn schedule(&mut self, element: &u32, delay: Duration) -> Option<u32> {
            if self.unavailable {
                return None;
            }
            self.next += 1;
            self.scheduled.push((self.next, *element, delay));
            Some(self.next)
        }

        fn cancel(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    const DELAY: Duration = Duration::from_millis(50);

    #[test]
    fn arm_then_expire() {
        let mut timers = Recorder::default();
        let mut guard = LoopGuard::new();

        assert!(guard.arm(&3, &mut timers, DELAY));
        assert!(guard.is_suppressed(&3));
        assert!(!guard.is_suppressed(&4));
        assert_eq!(timers.scheduled, [(1, 3, DELAY)]);

        assert!(guard.expire(&3));
        assert!(!guard.is_suppressed(&3));
        assert!(!guard.expire(&3));
        assert!(timers.cancelled.is_empty());
    }

    #[test]
    fn rearming_cancels_previous_timer() {
        let mut timers = Recorder::default();
        let mut guard = LoopGuard::new();

        guard.arm(&3, &mut timers, DELAY);
        guard.arm(&3, &mut timers, DELAY);
        assert_eq!(guard.len(), 1);
        assert_eq!(timers.cancelled, [1]);
    }

    #[test]
    fn disarm_and_clear_cancel() {
        let mut timers = Recorder::default();
        let mut guard = LoopGuard::new();

        guard.arm(&1, &mut timers, DELAY);
        guard.arm(&2, &mut timers, DELAY);
        guard.arm(&3, &mut timers, DELAY);

        assert!(guard.disarm(&2, &mut timers));
        assert!(!guard.disarm(&2, &mut timers));
        assert_eq!(timers.cancelled, [2]);

        guard.clear(&mut timers);
        assert!(guard.is_empty());
        timers.cancelled.sort_unstable();
        assert_eq!(timers.cancelled, [1, 2, 3]);
    }

    #[test]
    fn default_guard_is_empty() {
        let guard: LoopGuard<u32, u32> = LoopGuard::default();
        assert!(guard.is_empty());
        assert!(!guard.is_suppressed(&1));
    }

    #[test]
    fn failed_schedule_leaves_no_window_open() {
        let mut timers = Recorder::default();
        let mut guard = LoopGuard::new();

        timers.unavailable = true;
        assert!(!guard.arm(&3, &mut timers, DELAY));
        assert!(!guard.is_suppressed(&3));

        // A window opened earlier is closed rather than left without a timer.
        timers.unavailable = false;
        guard.arm(&3, &mut timers, DELAY);
        timers.unavailable = true;
        assert!(!guard.arm(&3, &mut timers, DELAY));
        assert!(guard.is_empty());
        assert_eq!(timers.cancelled, [1]);
    }
}
