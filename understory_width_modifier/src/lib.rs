// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_width_modifier --heading-base-level=0

//! Understory Width Modifier: container-relative breakpoint classes.
//!
//! Elements opt in with a marker (a class or an attribute) and declare named
//! width ranges in a custom property:
//!
//! ```css
//! .card {
//!     --width-modifier: card--narrow 0 400, card--medium 400 800, card--wide 800;
//! }
//! ```
//!
//! The [`Coordinator`] watches each marked element's content-box width and keeps
//! its class list in sync: a rule's class is present iff
//! `min <= width < max`. No viewport media query is involved, so the same
//! component adapts to whatever container it is placed in.
//!
//! ## Pieces
//!
//! - [`parse_breakpoints`]: declaration string → ordered [`Breakpoint`] rules.
//!   The grammar is `rule (',' rule)*` with `rule := class (min (max)?)?`,
//!   fields separated by whitespace. Missing `min` is `0`, missing `max` is
//!   unbounded, unreadable widths fall back to those defaults and empty
//!   fragments are skipped.
//! - [`StyleCache`]: one live computed-style handle per tracked element.
//! - [`LoopGuard`]: a short suppression window after each class change, during
//!   which a marker loss caused by a breakpoint rule naming the marker class is
//!   not mistaken for the element leaving.
//! - [`apply_breakpoints`]: the class updater. Rules are independent toggles;
//!   overlapping ranges apply several classes at once.
//! - [`VisibilityGate`]: resizes of elements outside the (margin-expanded)
//!   viewport are parked, latest size wins, and flushed when the element
//!   scrolls near the viewport.
//! - [`Coordinator`]: owns the per-element state and the injected [`Services`],
//!   performs the initial scan and dispatches tree, size, visibility and timer
//!   notifications.
//!
//! ## Hosts
//!
//! The coordinator does not observe anything on its own. A host implements
//! [`Host`] by naming a [`Document`], a [`TreeWatcher`], two
//! [`ElementWatcher`]s and [`Timers`], then forwards their notifications to
//! [`Coordinator::on_mutations`], [`Coordinator::on_resize`],
//! [`Coordinator::on_intersection`] and [`Coordinator::on_suppression_expired`].
//! All notifications are expected on one thread, one at a time.
//!
//! The `understory_width_modifier_web` crate provides the browser host on top
//! of `MutationObserver`, `ResizeObserver` and `IntersectionObserver`.
//!
//! ## Feedback loops
//!
//! Class changes are only reported back as marker changes, which the
//! [`LoopGuard`] absorbs. Breakpoint classes must not change the content width
//! of the element they are applied to (padding, border, `box-sizing`, or
//! intrinsic sizing of the element itself); otherwise two ranges can
//! alternate forever through the size watcher. Styling descendants is fine.
//!
//! ## Features
//!
//! - `std` (default): forwards to Kurbo's `std` feature.
//! - `libm`: forwards to Kurbo's `libm` feature for `no_std` builds.
//! - `tracing`: emits `tracing` events for tracking changes, deferred resizes
//!   and class updates.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod coordinator;
mod guard;
mod host;
mod parse;
mod style;
mod update;
mod visibility;

pub use config::{
    Config, ConfigError, DEFAULT_MARKER, DEFAULT_PROPERTY, DEFAULT_SUPPRESSION,
    DEFAULT_VISIBILITY_MARGIN, Marker,
};
pub use coordinator::{Coordinator, CoordinatorDebugInfo};
pub use guard::LoopGuard;
pub use host::{
    ComputedStyle, Document, ElementWatcher, Host, Mutation, Services, Timers, TreeWatcher,
};
pub use parse::{Breakpoint, Breakpoints, parse_breakpoints, parse_length};
pub use style::StyleCache;
pub use update::{ClassChanges, ClassList, apply_breakpoints};
pub use visibility::VisibilityGate;
