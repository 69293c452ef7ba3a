// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinator configuration.

use alloc::string::String;
use core::fmt;
use core::time::Duration;

use kurbo::Insets;

use crate::host::Document;

/// Class carried by eligible elements in the default configuration.
pub const DEFAULT_MARKER: &str = "width-modifier";

/// Custom property holding the breakpoint declaration in the default configuration.
pub const DEFAULT_PROPERTY: &str = "--width-modifier";

/// Viewport expansion, in CSS pixels, applied on every side by default.
pub const DEFAULT_VISIBILITY_MARGIN: f64 = 400.0;

/// How long a class change suppresses marker re-evaluation by default.
pub const DEFAULT_SUPPRESSION: Duration = Duration::from_millis(50);

/// What makes an element eligible for tracking.
///
/// A deployment uses exactly one marker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Elements whose class list contains this class.
    Class(String),
    /// Elements carrying this attribute, whatever its value.
    Attribute(String),
}

impl Marker {
    /// A class marker.
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// An attribute marker.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// The class or attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class(name) | Self::Attribute(name) => name,
        }
    }

    /// The attribute whose changes can add or remove this marker.
    ///
    /// Tree watchers filter attribute observation to this name.
    #[must_use]
    pub fn watched_attribute(&self) -> &str {
        match self {
            Self::Class(_) => "class",
            Self::Attribute(name) => name,
        }
    }

    /// Returns `true` if `element` carries this marker.
    pub fn matches<D: Document + ?Sized>(&self, document: &D, element: &D::Element) -> bool {
        match self {
            Self::Class(name) => document.has_class(element, name),
            Self::Attribute(name) => document.has_attribute(element, name),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::Class(DEFAULT_MARKER.into())
    }
}

/// Configuration for a [`Coordinator`](crate::Coordinator).
///
/// ```
/// use core::time::Duration;
/// use kurbo::Insets;
/// use understory_width_modifier::{Config, Marker};
///
/// let config = Config::new(Marker::attribute("data-breakpoints"))
///     .with_property("--breakpoints")
///     .with_visibility_margin(Insets::uniform_xy(0.0, 400.0))
///     .with_suppression(Duration::from_millis(20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    marker: Marker,
    property: String,
    visibility_margin: Insets,
    suppression: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Marker::default())
    }
}

impl Config {
    /// Creates a configuration for `marker` with default property, margin and suppression.
    #[must_use]
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            property: DEFAULT_PROPERTY.into(),
            visibility_margin: Insets::uniform(DEFAULT_VISIBILITY_MARGIN),
            suppression: DEFAULT_SUPPRESSION,
        }
    }

    /// Sets the custom property holding the breakpoint declaration.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Sets the expansion applied to the viewport before testing intersection.
    #[must_use]
    pub fn with_visibility_margin(mut self, margin: Insets) -> Self {
        self.visibility_margin = margin;
        self
    }

    /// Sets how long a class change suppresses marker re-evaluation.
    #[must_use]
    pub fn with_suppression(mut self, suppression: Duration) -> Self {
        self.suppression = suppression;
        self
    }

    /// The eligibility marker.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// The custom property holding the breakpoint declaration.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The viewport expansion used by the visibility watcher.
    #[must_use]
    pub fn visibility_margin(&self) -> Insets {
        self.visibility_margin
    }

    /// The suppression window following a class change.
    #[must_use]
    pub fn suppression(&self) -> Duration {
        self.suppression
    }

    /// Checks that the configuration can be used by a coordinator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.marker.name();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidMarker(name.into()));
        }
        if !self.property.starts_with("--") || self.property.len() == 2 {
            return Err(ConfigError::PropertyNotCustom(self.property.clone()));
        }
        let margin = self.visibility_margin;
        if [margin.x0, margin.y0, margin.x1, margin.y1]
            .iter()
            .any(|side| !side.is_finite() || *side < 0.0)
        {
            return Err(ConfigError::InvalidMargin);
        }
        Ok(())
    }
}

/// Why a [`Config`] was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The marker name is empty or contains whitespace.
    InvalidMarker(String),
    /// The property is not a custom property (`--name`).
    PropertyNotCustom(String),
    /// A visibility margin side is negative or not finite.
    InvalidMargin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMarker(name) => write!(f, "invalid marker name {name:?}"),
            Self::PropertyNotCustom(property) => {
                write!(f, "{property:?} is not a custom property name")
            }
            Self::InvalidMargin => f.write_str("visibility margin must be finite and non-negative"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.marker(), &Marker::Class("width-modifier".into()));
        assert_eq!(config.property(), "--width-modifier");
        assert_eq!(config.visibility_margin(), Insets::uniform(400.0));
        assert_eq!(config.suppression(), Duration::from_millis(50));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn marker_names_and_watched_attributes() {
        let class = Marker::class("responsive");
        assert_eq!(class.name(), "responsive");
        assert_eq!(class.watched_attribute(), "class");

        let attribute = Marker::attribute("data-width");
        assert_eq!(attribute.name(), "data-width");
        assert_eq!(attribute.watched_attribute(), "data-width");
    }

    #[test]
    fn rejects_bad_markers() {
        assert_eq!(
            Config::new(Marker::class("")).validate(),
            Err(ConfigError::InvalidMarker(String::new()))
        );
        assert_eq!(
            Config::new(Marker::class("two words")).validate(),
            Err(ConfigError::InvalidMarker("two words".into()))
        );
    }

    #[test]
    fn rejects_non_custom_properties() {
        for property in ["width", "-x", "--"] {
            assert_eq!(
                Config::default().with_property(property).validate(),
                Err(ConfigError::PropertyNotCustom(property.into())),
                "{property} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_margins() {
        let negative = Config::default().with_visibility_margin(Insets::new(0.0, -1.0, 0.0, 0.0));
        assert_eq!(negative.validate(), Err(ConfigError::InvalidMargin));

        let infinite = Config::default().with_visibility_margin(Insets::uniform(f64::INFINITY));
        assert_eq!(infinite.validate(), Err(ConfigError::InvalidMargin));
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            ConfigError::InvalidMarker("two words".into()).to_string(),
            "invalid marker name \"two words\""
        );
        assert_eq!(
            ConfigError::PropertyNotCustom("width".into()).to_string(),
            "\"width\" is not a custom property name"
        );
    }
}
