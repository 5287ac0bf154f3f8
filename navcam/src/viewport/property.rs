//! Override/fallback camera properties.
//!
//! Every camera parameter the engine produces can be overridden by the
//! consumer. A [`ViewportProperty`] pairs an optional consumer override
//! with an engine-computed fallback; the effective value is the override
//! when present, the fallback otherwise. Overrides never expire on their
//! own — only an explicit set or clear changes them.

use crate::geo::GeoPoint;
use crate::map::{EdgeInsets, ScreenPoint};

use super::CameraOptions;

/// An optional consumer override layered over an engine-computed fallback.
#[derive(Debug, Clone, Default)]
pub struct ViewportProperty<T: Clone> {
    override_value: Option<T>,
    fallback: T,
}

impl<T: Clone> ViewportProperty<T> {
    /// Create a property with the given initial fallback and no override.
    pub fn new(fallback: T) -> Self {
        Self {
            override_value: None,
            fallback,
        }
    }

    /// Set or clear the consumer override.
    pub fn set_override(&mut self, value: Option<T>) {
        self.override_value = value;
    }

    /// Replace the engine-computed fallback.
    ///
    /// Does not affect the effective value while an override is present.
    pub(crate) fn set_fallback(&mut self, value: T) {
        self.fallback = value;
    }

    /// The effective value: the override when present, else the fallback.
    pub fn get(&self) -> T {
        self.override_value
            .clone()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Whether a consumer override is currently present.
    pub fn has_override(&self) -> bool {
        self.override_value.is_some()
    }
}

/// The six camera properties of one framing context.
///
/// The following and overview contexts each own a separate instance;
/// overrides set on one context never leak into the other.
#[derive(Debug, Clone)]
pub struct FrameProperties {
    pub center: ViewportProperty<GeoPoint>,
    pub zoom: ViewportProperty<f64>,
    pub bearing: ViewportProperty<f64>,
    pub pitch: ViewportProperty<f64>,
    pub padding: ViewportProperty<EdgeInsets>,
    pub anchor: ViewportProperty<ScreenPoint>,
}

impl FrameProperties {
    /// Create properties seeded with the fallbacks from `initial`.
    pub fn new(initial: &CameraOptions) -> Self {
        Self {
            center: ViewportProperty::new(initial.center),
            zoom: ViewportProperty::new(initial.zoom),
            bearing: ViewportProperty::new(initial.bearing),
            pitch: ViewportProperty::new(initial.pitch),
            padding: ViewportProperty::new(initial.padding),
            anchor: ViewportProperty::new(initial.anchor),
        }
    }

    /// Clear all six overrides in one step.
    pub fn clear_overrides(&mut self) {
        self.center.set_override(None);
        self.zoom.set_override(None);
        self.bearing.set_override(None);
        self.pitch.set_override(None);
        self.padding.set_override(None);
        self.anchor.set_override(None);
    }

    /// The effective camera bundle for this context.
    pub fn camera_options(&self) -> CameraOptions {
        CameraOptions {
            center: self.center.get(),
            zoom: self.zoom.get(),
            bearing: self.bearing.get(),
            pitch: self.pitch.get(),
            padding: self.padding.get(),
            anchor: self.anchor.get(),
        }
    }
}

impl Default for FrameProperties {
    fn default() -> Self {
        Self::new(&CameraOptions::default())
    }
}
