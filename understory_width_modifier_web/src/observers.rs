// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser observers and timers feeding the coordinator.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::Array;
use kurbo::{Insets, Size};
use understory_width_modifier::{Coordinator, ElementWatcher, Marker, Mutation, Timers, TreeWatcher};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MutationObserver, MutationObserverInit, MutationRecord, NodeList, ResizeObserver,
    ResizeObserverEntry, Window,
};

use crate::WebHost;
use crate::document::ElementHandle;

/// Route from observer callbacks back to the coordinator that owns them.
///
/// Holds a weak reference, filled in once the coordinator exists, so the
/// callbacks stored inside the coordinator do not keep it alive.
#[derive(Clone, Default)]
pub(crate) struct Link(Rc<OnceCell<Weak<RefCell<Coordinator<WebHost>>>>>);

impl Link {
    pub(crate) fn attach(&self, coordinator: &Rc<RefCell<Coordinator<WebHost>>>) {
        let _ = self.0.set(Rc::downgrade(coordinator));
    }

    fn with(&self, f: impl FnOnce(&mut Coordinator<WebHost>)) {
        if let Some(coordinator) = self.0.get().and_then(Weak::upgrade) {
            f(&mut coordinator.borrow_mut());
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Link")
            .field(&self.0.get().is_some())
            .finish()
    }
}

fn push_mutations(
    list: &NodeList,
    make: fn(ElementHandle) -> Mutation<ElementHandle>,
    out: &mut Vec<Mutation<ElementHandle>>,
) {
    for index in 0..list.length() {
        // Text and comment nodes carry no classes.
        if let Some(element) = list.item(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            out.push(make(ElementHandle::new(element)));
        }
    }
}

/// `MutationObserver` over the whole document: child lists plus the marker attribute.
pub struct WebTreeWatcher {
    observer: MutationObserver,
    target: web_sys::Document,
    init: MutationObserverInit,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl WebTreeWatcher {
    pub(crate) fn new(
        target: web_sys::Document,
        marker: &Marker,
        link: Link,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let mut mutations = Vec::new();
                for record in records.iter() {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        continue;
                    };
                    match record.type_().as_str() {
                        "childList" => {
                            push_mutations(&record.added_nodes(), Mutation::Added, &mut mutations);
                            push_mutations(
                                &record.removed_nodes(),
                                Mutation::Removed,
                                &mut mutations,
                            );
                        }
                        "attributes" => {
                            if let Some(element) =
                                record.target().and_then(|node| node.dyn_into::<Element>().ok())
                            {
                                mutations.push(Mutation::MarkerChanged(ElementHandle::new(element)));
                            }
                        }
                        _ => {}
                    }
                }
                if !mutations.is_empty() {
                    link.with(|coordinator| coordinator.on_mutations(mutations));
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        init.set_attribute_filter(&Array::of1(&JsValue::from_str(marker.watched_attribute())));

        Ok(Self {
            observer,
            target,
            init,
            _callback: callback,
        })
    }
}

impl fmt::Debug for WebTreeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebTreeWatcher").finish_non_exhaustive()
    }
}

impl TreeWatcher for WebTreeWatcher {
    fn start(&mut self) {
        let _ = self.observer.observe_with_options(&self.target, &self.init);
    }

    fn stop(&mut self) {
        self.observer.disconnect();
    }
}

/// `ResizeObserver` reporting content-box sizes.
pub struct WebSizeWatcher {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(Array, ResizeObserver)>,
}

impl WebSizeWatcher {
    pub(crate) fn new(link: Link) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, ResizeObserver)>::new(
            move |entries: Array, _observer: ResizeObserver| {
                let resized: Vec<_> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<ResizeObserverEntry>().ok())
                    .map(|entry| {
                        let rect = entry.content_rect();
                        (
                            ElementHandle::new(entry.target()),
                            Size::new(rect.width(), rect.height()),
                        )
                    })
                    .collect();
                link.with(|coordinator| coordinator.on_resize(resized));
            },
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl fmt::Debug for WebSizeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSizeWatcher").finish_non_exhaustive()
    }
}

impl ElementWatcher<ElementHandle> for WebSizeWatcher {
    fn stop(&mut self) {
        self.observer.disconnect();
    }

    fn observe(&mut self, element: &ElementHandle) {
        self.observer.observe(element.element());
    }

    fn unobserve(&mut self, element: &ElementHandle) {
        self.observer.unobserve(element.element());
    }
}

/// CSS `rootMargin` for `margin`, in top/right/bottom/left order.
pub(crate) fn root_margin(margin: Insets) -> String {
    format!(
        "{}px {}px {}px {}px",
        margin.y0, margin.x1, margin.y1, margin.x0
    )
}

/// `IntersectionObserver` against the viewport expanded by the visibility margin.
pub struct WebVisibilityWatcher {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl WebVisibilityWatcher {
    pub(crate) fn new(margin: Insets, link: Link) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let changed: Vec<_> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| (ElementHandle::new(entry.target()), entry.is_intersecting()))
                    .collect();
                link.with(|coordinator| coordinator.on_intersection(changed));
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&root_margin(margin));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl fmt::Debug for WebVisibilityWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebVisibilityWatcher")
            .finish_non_exhaustive()
    }
}

impl ElementWatcher<ElementHandle> for WebVisibilityWatcher {
    fn stop(&mut self) {
        self.observer.disconnect();
    }

    fn observe(&mut self, element: &ElementHandle) {
        self.observer.observe(element.element());
    }

    fn unobserve(&mut self, element: &ElementHandle) {
        self.observer.unobserve(element.element());
    }
}

/// `setTimeout`-backed suppression timers.
///
/// A single callback serves every timer; the element travels as the timeout
/// argument.
pub struct WebTimers {
    window: Window,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl WebTimers {
    pub(crate) fn new(window: Window, link: Link) -> Self {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |element: JsValue| {
            if let Ok(element) = element.dyn_into::<Element>() {
                let element = ElementHandle::new(element);
                link.with(|coordinator| coordinator.on_suppression_expired(&element));
            }
        });
        Self { window, callback }
    }
}

impl fmt::Debug for WebTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebTimers").finish_non_exhaustive()
    }
}

impl Timers<ElementHandle> for WebTimers {
    type Handle = i32;

    fn schedule(&mut self, element: &ElementHandle, delay: Duration) -> Option<i32> {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.callback.as_ref().unchecked_ref(),
                millis,
                element.element(),
            )
            .ok()
    }

    fn cancel(&mut self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}
