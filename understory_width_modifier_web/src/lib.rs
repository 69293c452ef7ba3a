// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_width_modifier_web --heading-base-level=0

//! Browser host for `understory_width_modifier`.
//!
//! This crate binds the width-modifier coordinator to the DOM when targeting
//! `wasm32`:
//!
//! - `MutationObserver` on the document reports insertions, removals and
//!   changes to the marker attribute (`class` for a class marker).
//! - `ResizeObserver` reports content-box sizes.
//! - `IntersectionObserver` with a `rootMargin` built from the configured
//!   visibility margin gates updates for off-screen elements.
//! - `getComputedStyle` provides the live style handle the breakpoint
//!   declaration is read through, so `var()` references are already resolved.
//! - `setTimeout`/`clearTimeout` back the suppression windows.
//!
//! # Usage
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn run() -> Result<understory_width_modifier_web::WidthModifier, wasm_bindgen::JsValue> {
//!     use understory_width_modifier::{Config, Marker};
//!
//!     let config = Config::new(Marker::class("responsive")).with_property("--breakpoints");
//!     understory_width_modifier_web::install(config)
//! }
//! ```
//!
//! The returned [`WidthModifier`] keeps observing until dropped. From
//! JavaScript, `installWidthModifier()` installs the default configuration
//! (class `width-modifier`, property `--width-modifier`) for the lifetime of
//! the page:
//!
//! ```css
//! .width-modifier.card {
//!     --width-modifier: card--narrow 0 400, card--wide 400;
//! }
//! ```
//!
//! On other targets this crate is empty.

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

#[cfg(target_arch = "wasm32")]
mod document;
#[cfg(target_arch = "wasm32")]
mod observers;

#[cfg(target_arch = "wasm32")]
pub use document::{ElementHandle, WebDocument, WebStyle};
#[cfg(target_arch = "wasm32")]
pub use observers::{WebSizeWatcher, WebTimers, WebTreeWatcher, WebVisibilityWatcher};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use understory_width_modifier::{Config, Coordinator, CoordinatorDebugInfo, Host, Marker, Services};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The browser [`Host`].
#[cfg(target_arch = "wasm32")]
#[derive(Copy, Clone, Debug)]
pub struct WebHost;

#[cfg(target_arch = "wasm32")]
impl Host for WebHost {
    type Element = ElementHandle;
    type Document = WebDocument;
    type Tree = WebTreeWatcher;
    type Size = WebSizeWatcher;
    type Visibility = WebVisibilityWatcher;
    type Timers = WebTimers;
}

/// A running coordinator bound to the window's document.
///
/// Dropping it disconnects every observer and cancels pending timers. Classes
/// already applied stay in place.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
pub struct WidthModifier {
    coordinator: Rc<RefCell<Coordinator<WebHost>>>,
}

#[cfg(target_arch = "wasm32")]
impl WidthModifier {
    /// Returns a snapshot of the coordinator's bookkeeping.
    #[must_use]
    pub fn debug_info(&self) -> CoordinatorDebugInfo {
        self.coordinator.borrow().debug_info()
    }

    /// Returns `true` if `element` is tracked.
    #[must_use]
    pub fn is_tracked(&self, element: &web_sys::Element) -> bool {
        self.coordinator
            .borrow()
            .is_tracked(&ElementHandle::new(element.clone()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for WidthModifier {
    fn drop(&mut self) {
        self.coordinator.borrow_mut().stop();
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// Starts keeping breakpoint classes in sync for the current window's document.
///
/// Tracks every marked element already present, then follows the document as
/// it changes.
///
/// # Errors
///
/// Fails if `config` is invalid, there is no window or document, or an
/// observer cannot be constructed.
#[cfg(target_arch = "wasm32")]
pub fn install(config: Config) -> Result<WidthModifier, JsValue> {
    config
        .validate()
        .map_err(|err| js_error(&err.to_string()))?;
    let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| js_error("window has no document"))?;

    let link = observers::Link::default();
    let services = Services::<WebHost> {
        document: WebDocument::new(window.clone(), document.clone()),
        tree: WebTreeWatcher::new(document, config.marker(), link.clone())?,
        size: WebSizeWatcher::new(link.clone())?,
        visibility: WebVisibilityWatcher::new(config.visibility_margin(), link.clone())?,
        timers: WebTimers::new(window, link.clone()),
    };
    let coordinator =
        Coordinator::new(config, services).map_err(|err| js_error(&err.to_string()))?;
    let coordinator = Rc::new(RefCell::new(coordinator));
    link.attach(&coordinator);
    coordinator.borrow_mut().start();

    Ok(WidthModifier { coordinator })
}

/// Installs for the lifetime of the page.
///
/// `marker` is the class marking eligible elements and `property` the custom
/// property holding their breakpoints; either defaults when omitted.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = installWidthModifier)]
pub fn install_for_page(marker: Option<String>, property: Option<String>) -> Result<(), JsValue> {
    let mut config = Config::new(marker.map(Marker::Class).unwrap_or_default());
    if let Some(property) = property {
        config = config.with_property(property);
    }
    std::mem::forget(install(config)?);
    Ok(())
}
