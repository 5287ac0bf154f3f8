//! Map query surface consumed by the framing engine.
//!
//! The engine never renders anything; it asks the hosting map for the few
//! facts it needs (viewport size, current camera, geometry-fitting) through
//! the [`MapQuery`] trait and computes camera parameters from the answers.
//! Hosts implement the trait over whatever rendering stack they use.

use crate::geo::GeoPoint;

/// A point in viewport coordinates (logical pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport dimensions in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    /// Create a new viewport size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Insets from each viewport edge in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    /// Create insets from individual edge values.
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Uniform insets on all four edges.
    pub fn all(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Center of the viewport rectangle remaining after these insets.
    pub fn padded_center(&self, size: ScreenSize) -> ScreenPoint {
        ScreenPoint::new(
            self.left + (size.width - self.left - self.right) / 2.0,
            self.top + (size.height - self.top - self.bottom) / 2.0,
        )
    }
}

/// Result of fitting a set of coordinates into the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Camera center that frames the coordinates.
    pub center: GeoPoint,
    /// Zoom level that frames the coordinates.
    pub zoom: f64,
}

/// The map's current camera, used for continuity between updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCameraState {
    /// Current camera center.
    pub center: GeoPoint,
    /// Current camera bearing in degrees.
    pub bearing: f64,
    /// Current camera padding.
    pub padding: EdgeInsets,
}

impl Default for MapCameraState {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            bearing: 0.0,
            padding: EdgeInsets::default(),
        }
    }
}

/// Read-only camera queries answered by the hosting map.
pub trait MapQuery {
    /// Compute the camera center and zoom that fit `points` into the
    /// padded viewport at the given bearing and pitch.
    ///
    /// Returns `None` when the fit cannot be computed (for example, while
    /// the map surface has no size yet). Callers degrade to a neutral
    /// camera.
    fn fit_coordinates(
        &self,
        points: &[GeoPoint],
        padding: EdgeInsets,
        bearing: f64,
        pitch: f64,
    ) -> Option<CameraFit>;

    /// Current viewport dimensions.
    fn viewport_size(&self) -> ScreenSize;

    /// Current camera state.
    fn camera_state(&self) -> MapCameraState;
}
