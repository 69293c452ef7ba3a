// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM access: element identity, computed styles and class lists.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use js_sys::Reflect;
use understory_width_modifier::{ComputedStyle, Document, Marker};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Element, NodeList, Window};

/// Expando property holding an element's identity.
const ID_PROPERTY: &str = "__understoryWidthModifierId";

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A DOM element with a stable identity.
///
/// The identity is stored on the element itself the first time a handle is
/// made for it, so every handle to the same element compares and hashes
/// equal. Holding a handle keeps the element alive; the coordinator drops its
/// handles when the element is untracked.
#[derive(Clone, Debug)]
pub struct ElementHandle {
    id: u32,
    element: Element,
}

impl ElementHandle {
    /// Returns the handle for `element`, assigning it an identity if needed.
    #[must_use]
    pub fn new(element: Element) -> Self {
        let key = JsValue::from_str(ID_PROPERTY);
        let id = match Reflect::get(&element, &key).ok().and_then(|v| v.as_f64()) {
            Some(id) => f64_to_u32(id),
            None => {
                let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
                let _ = Reflect::set(&element, &key, &JsValue::from(id));
                id
            }
        };
        Self { id, element }
    }

    /// The element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The identity shared by every handle to this element.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Identities are written from a u32 counter, so the stored number is always an exact u32."
)]
fn f64_to_u32(v: f64) -> u32 {
    v as u32
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementHandle {}

impl Hash for ElementHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A live `CSSStyleDeclaration` from `getComputedStyle`.
#[derive(Clone, Debug)]
pub struct WebStyle(CssStyleDeclaration);

impl ComputedStyle for WebStyle {
    fn property_value(&self, name: &str) -> Option<String> {
        let value = self.0.get_property_value(name).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// The window's document.
#[derive(Clone, Debug)]
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    /// Wraps `document`, resolving computed styles through `window`.
    #[must_use]
    pub fn new(window: Window, document: web_sys::Document) -> Self {
        Self { window, document }
    }

    /// The wrapped document.
    #[must_use]
    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }
}

/// CSS selector matching `marker`.
pub(crate) fn marker_selector(marker: &Marker) -> String {
    let name = web_sys::css::escape(marker.name());
    match marker {
        Marker::Class(_) => format!(".{name}"),
        Marker::Attribute(_) => format!("[{name}]"),
    }
}

fn push_elements(list: &NodeList, out: &mut Vec<ElementHandle>) {
    for index in 0..list.length() {
        if let Some(element) = list.item(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            out.push(ElementHandle::new(element));
        }
    }
}

impl Document for WebDocument {
    type Element = ElementHandle;
    type Style = WebStyle;

    fn query_marked(
        &self,
        root: Option<&ElementHandle>,
        marker: &Marker,
        out: &mut Vec<ElementHandle>,
    ) {
        let selector = marker_selector(marker);
        let found = match root {
            None => self.document.query_selector_all(&selector),
            Some(root) => {
                if marker.matches(self, root) {
                    out.push(root.clone());
                }
                root.element.query_selector_all(&selector)
            }
        };
        if let Ok(list) = found {
            push_elements(&list, out);
        }
    }

    fn has_class(&self, element: &ElementHandle, class: &str) -> bool {
        element.element.class_list().contains(class)
    }

    fn has_attribute(&self, element: &ElementHandle, name: &str) -> bool {
        element.element.has_attribute(name)
    }

    fn computed_style(&self, element: &ElementHandle) -> Option<WebStyle> {
        self.window
            .get_computed_style(&element.element)
            .ok()
            .flatten()
            .map(WebStyle)
    }

    fn add_class(&mut self, element: &ElementHandle, class: &str) {
        let _ = element.element.class_list().add_1(class);
    }

    fn remove_class(&mut self, element: &ElementHandle, class: &str) {
        let _ = element.element.class_list().remove_1(class);
    }
}

#[cfg(test)]
mod tests {
    use super::marker_selector;
    use understory_width_modifier::Marker;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn marker_selectors() {
        assert_eq!(
            marker_selector(&Marker::class("width-modifier")),
            ".width-modifier"
        );
        assert_eq!(
            marker_selector(&Marker::attribute("data-width")),
            "[data-width]"
        );
        assert_eq!(marker_selector(&Marker::class("a:b")), ".a\\:b");
    }
}
