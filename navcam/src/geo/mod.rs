//! Geodesic math for camera framing.
//!
//! Provides the distance, bearing, and line-slicing primitives the framing
//! algorithms are built on. All positions are WGS84 latitude/longitude in
//! degrees; all distances are meters; all angles are degrees.
//!
//! The line operations return `Result` because route geometry arriving from
//! external suppliers can be degenerate (empty, single-point, or truncated
//! lines). Callers decide whether to propagate or absorb those failures.

mod polyline;

pub use polyline::{decode_polyline, PolylineError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Errors that can occur during geodesic line operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// A line operation needs at least two points.
    #[error("line has {0} point(s), need at least 2")]
    InsufficientGeometry(usize),

    /// A slice started past the end of the line.
    #[error("slice start {0:.1} m is beyond the end of the line")]
    SliceBeyondLine(f64),

    /// A coordinate or distance input was NaN or infinite.
    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

/// A WGS84 geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    ///
    /// Interpolates each coordinate independently. Adequate for the short
    /// spans the framing engine blends over; not a great-circle midpoint.
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            longitude: self.longitude + (other.longitude - self.longitude) * t,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points in meters (haversine).
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial geodesic bearing from `a` to `b` in degrees, wrapped to [0, 360).
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    wrap_degrees(y.atan2(x).to_degrees())
}

/// Destination point reached by travelling `distance_m` meters from
/// `origin` along the given initial bearing.
pub fn destination(origin: &GeoPoint, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Total length of a point sequence in meters.
///
/// Returns 0.0 for lines with fewer than two points.
pub fn line_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance(&pair[0], &pair[1]))
        .sum()
}

/// Extract the sub-line between two distances measured along the line.
///
/// Both bounds are meters from the start of the line. The slice endpoints
/// are interpolated along the containing segments, so the result starts and
/// ends exactly at the requested distances (clamped to the line's extent at
/// the far end).
///
/// # Errors
///
/// - [`GeoError::InsufficientGeometry`] when the line has fewer than two
///   points.
/// - [`GeoError::SliceBeyondLine`] when `start_m` lies past the end of the
///   line.
/// - [`GeoError::NonFinite`] when a bound or coordinate is NaN or infinite.
pub fn slice_along(
    points: &[GeoPoint],
    start_m: f64,
    end_m: f64,
) -> Result<Vec<GeoPoint>, GeoError> {
    if points.len() < 2 {
        return Err(GeoError::InsufficientGeometry(points.len()));
    }
    if !start_m.is_finite() || !end_m.is_finite() {
        return Err(GeoError::NonFinite("slice bound"));
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(GeoError::NonFinite("line coordinate"));
    }

    let start_m = start_m.max(0.0);
    let end_m = end_m.max(start_m);

    let mut slice: Vec<GeoPoint> = Vec::new();
    let mut travelled = 0.0;

    for i in 0..points.len() {
        if start_m >= travelled && i == points.len() - 1 {
            break;
        }

        if travelled > start_m && slice.is_empty() {
            let overshot = start_m - travelled;
            if overshot == 0.0 {
                slice.push(points[i]);
            } else {
                let direction = bearing(&points[i], &points[i - 1]) - 180.0;
                slice.push(destination(&points[i], overshot, direction));
            }
        }

        if travelled >= end_m {
            let overshot = end_m - travelled;
            if overshot == 0.0 {
                slice.push(points[i]);
            } else {
                let direction = bearing(&points[i], &points[i - 1]) - 180.0;
                slice.push(destination(&points[i], overshot, direction));
            }
            return Ok(slice);
        }

        if travelled >= start_m {
            slice.push(points[i]);
        }

        if i == points.len() - 1 {
            return Ok(slice);
        }

        travelled += distance(&points[i], &points[i + 1]);
    }

    // The whole line is shorter than start_m.
    if travelled < start_m {
        return Err(GeoError::SliceBeyondLine(start_m));
    }

    // start_m landed exactly on the final point.
    Ok(vec![points[points.len() - 1]])
}

/// Wrap an angle into [0, 360).
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `from` to `to` in degrees, in (-180, 180].
///
/// Positive means clockwise (turning right).
pub fn shortest_rotation_diff(from: f64, to: f64) -> f64 {
    let diff = wrap_degrees(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Re-express `target` as the bearing closest to `current`.
///
/// The result is congruent to `target` modulo 360 but never more than 180°
/// away from `current`, so a camera animating between the two values takes
/// the short way around.
pub fn normalize_bearing(current: f64, target: f64) -> f64 {
    current + shortest_rotation_diff(current, target)
}
