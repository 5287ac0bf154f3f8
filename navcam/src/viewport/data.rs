//! Published camera parameter bundles.

use crate::config::DEFAULT_MIN_GEO_ZOOM;
use crate::geo::GeoPoint;
use crate::map::{EdgeInsets, ScreenPoint};

/// A complete set of camera parameters for one framing context.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraOptions {
    /// Camera center.
    pub center: GeoPoint,
    /// Zoom level.
    pub zoom: f64,
    /// Bearing in degrees.
    ///
    /// May lie outside [0, 360): the value is kept numerically close to
    /// the previous camera bearing so animations take the short way
    /// around.
    pub bearing: f64,
    /// Pitch in degrees, 0 = top-down.
    pub pitch: f64,
    /// Edge insets applied when positioning the center.
    pub padding: EdgeInsets,
    /// On-screen focal point of the camera.
    pub anchor: ScreenPoint,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            zoom: DEFAULT_MIN_GEO_ZOOM,
            bearing: 0.0,
            pitch: 0.0,
            padding: EdgeInsets::default(),
            anchor: ScreenPoint::default(),
        }
    }
}

/// The camera bundles for both framing contexts, published together.
///
/// Publication is equality-gated: an [`super::FramingEngine`] only
/// notifies subscribers when a newly evaluated value differs from the
/// previous publication.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportData {
    /// Camera for the following context.
    pub camera_for_following: CameraOptions,
    /// Camera for the overview context.
    pub camera_for_overview: CameraOptions,
}
