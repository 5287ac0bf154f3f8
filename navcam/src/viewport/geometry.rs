//! Route decomposition for camera framing.
//!
//! Pure functions that turn a [`Route`] into the per-step data the framing
//! engine consumes: decoded point sequences, intersection-density
//! estimates, and post-maneuver framing point sets. Everything here is
//! recomputed from scratch on each route change and replaced wholesale —
//! no incremental mutation.

use tracing::debug;

use crate::config::{IntersectionDensityConfig, PostManeuverFramingConfig};
use crate::geo::{self, decode_polyline, GeoPoint};
use crate::route::Route;

/// Coordinate precision of the encoded step geometry.
const POLYLINE_PRECISION: u32 = 6;

/// A route decomposed into legs, steps, and decoded points.
///
/// Indices mirror the route: `legs → steps → points`. Steps with absent or
/// undecodable geometry hold an empty point sequence. Lookups with
/// out-of-range indices return empty slices, never panic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteGeometry {
    legs: Vec<Vec<Vec<GeoPoint>>>,
}

impl RouteGeometry {
    /// Decoded points of one step.
    pub fn step_points(&self, leg_index: usize, step_index: usize) -> &[GeoPoint] {
        self.legs
            .get(leg_index)
            .and_then(|steps| steps.get(step_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Concatenated points of every step strictly after `step_index`,
    /// through the end of the leg.
    pub fn points_after_step(&self, leg_index: usize, step_index: usize) -> Vec<GeoPoint> {
        match self.legs.get(leg_index) {
            Some(steps) if step_index + 1 < steps.len() => steps[step_index + 1..]
                .iter()
                .flatten()
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Concatenated points of the entire route.
    pub fn all_points(&self) -> Vec<GeoPoint> {
        self.legs.iter().flatten().flatten().copied().collect()
    }

    /// Whether the route contributed no points at all.
    pub fn is_empty(&self) -> bool {
        self.legs.iter().flatten().all(Vec::is_empty)
    }
}

/// Average spacing between significant intersections, per step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionDensity {
    steps: Vec<Vec<f64>>,
    default_m: f64,
}

impl IntersectionDensity {
    /// Average intersection spacing on one step, meters.
    ///
    /// Out-of-range indices return the minimum-distance threshold, the
    /// same value a step with no qualifying pairs holds.
    pub fn average_distance(&self, leg_index: usize, step_index: usize) -> f64 {
        self.steps
            .get(leg_index)
            .and_then(|steps| steps.get(step_index))
            .copied()
            .unwrap_or(self.default_m)
    }
}

/// Points to keep framed right after completing each step's maneuver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostManeuverFramingPoints {
    steps: Vec<Vec<Vec<GeoPoint>>>,
}

impl PostManeuverFramingPoints {
    /// Framing points for the maneuver that ends the given step.
    pub fn points(&self, leg_index: usize, step_index: usize) -> &[GeoPoint] {
        self.steps
            .get(leg_index)
            .and_then(|steps| steps.get(step_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Decode every step's polyline into a [`RouteGeometry`].
///
/// Each step decodes independently; a step with absent or invalid
/// geometry contributes an empty point sequence. Never fails.
pub fn decompose_route(route: &Route) -> RouteGeometry {
    let legs = route
        .legs
        .iter()
        .map(|leg| {
            leg.steps
                .iter()
                .map(|step| match &step.geometry {
                    Some(encoded) => match decode_polyline(encoded, POLYLINE_PRECISION) {
                        Ok(points) => points,
                        Err(error) => {
                            debug!(%error, "step geometry failed to decode, framing it as empty");
                            Vec::new()
                        }
                    },
                    None => Vec::new(),
                })
                .collect()
        })
        .collect();

    RouteGeometry { legs }
}

/// Estimate the average spacing between significant intersections on each
/// step.
///
/// For every step the point list `[step start, intersections…, step end]`
/// is walked pairwise; pairs closer than `config.min_distance_m` are
/// discarded and the rest averaged. A step where every pair is discarded
/// (or which has fewer than two points) takes the threshold itself as its
/// density.
pub fn intersection_density(
    route: &Route,
    geometry: &RouteGeometry,
    config: &IntersectionDensityConfig,
) -> IntersectionDensity {
    let steps = route
        .legs
        .iter()
        .enumerate()
        .map(|(leg_index, leg)| {
            leg.steps
                .iter()
                .enumerate()
                .map(|(step_index, step)| {
                    let step_points = geometry.step_points(leg_index, step_index);
                    step_density(step_points, &step.intersections, config.min_distance_m)
                })
                .collect()
        })
        .collect();

    IntersectionDensity {
        steps,
        default_m: config.min_distance_m,
    }
}

fn step_density(step_points: &[GeoPoint], intersections: &[GeoPoint], min_distance_m: f64) -> f64 {
    let mut points: Vec<GeoPoint> = Vec::with_capacity(intersections.len() + 2);
    if let Some(first) = step_points.first() {
        points.push(*first);
    }
    points.extend_from_slice(intersections);
    if let Some(last) = step_points.last() {
        points.push(*last);
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for pair in points.windows(2) {
        let d = geo::distance(&pair[0], &pair[1]);
        if d >= min_distance_m {
            sum += d;
            count += 1;
        }
    }

    if count == 0 {
        min_distance_m
    } else {
        sum / count as f64
    }
}

/// Collect the geometry to keep framed right after each step's maneuver.
///
/// Consecutive short steps form a compound maneuver: immediately following
/// steps whose length is at most `config.coalesce_distance_m` contribute
/// their full geometry, so back-to-back turns are framed together instead
/// of triggering a camera adjustment between them. When coalescing stops
/// before the end of the leg, a `config.slice_distance_m` prefix of the
/// first non-coalesced step is appended.
pub fn post_maneuver_framing(
    route: &Route,
    geometry: &RouteGeometry,
    config: &PostManeuverFramingConfig,
) -> PostManeuverFramingPoints {
    let steps = route
        .legs
        .iter()
        .enumerate()
        .map(|(leg_index, leg)| {
            (0..leg.steps.len())
                .map(|step_index| {
                    points_after_maneuver(leg_index, step_index, route, geometry, config)
                })
                .collect()
        })
        .collect();

    PostManeuverFramingPoints { steps }
}

fn points_after_maneuver(
    leg_index: usize,
    step_index: usize,
    route: &Route,
    geometry: &RouteGeometry,
    config: &PostManeuverFramingConfig,
) -> Vec<GeoPoint> {
    let steps = &route.legs[leg_index].steps;
    let mut points: Vec<GeoPoint> = Vec::new();

    for next_index in step_index + 1..steps.len() {
        if steps[next_index].distance_m <= config.coalesce_distance_m {
            points.extend_from_slice(geometry.step_points(leg_index, next_index));
            continue;
        }

        // Coalescing stopped; frame the entry into the next step.
        let next_points = geometry.step_points(leg_index, next_index);
        if let Ok(slice) = geo::slice_along(next_points, 0.0, config.slice_distance_m) {
            points.extend(slice);
        }
        break;
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::destination;
    use crate::route::{RouteLeg, RouteStep};

    /// Build an encoded polyline running east from `start` with vertices at
    /// the given distances (meters).
    fn encode_line_east(start: GeoPoint, offsets_m: &[f64]) -> (String, Vec<GeoPoint>) {
        let points: Vec<GeoPoint> = offsets_m
            .iter()
            .map(|d| destination(&start, *d, 90.0))
            .collect();
        (encode(&points), points)
    }

    /// Minimal precision-6 polyline encoder, test-only counterpart of
    /// `decode_polyline`.
    fn encode(points: &[GeoPoint]) -> String {
        let mut output = String::new();
        let mut prev_lat = 0i64;
        let mut prev_lon = 0i64;
        for p in points {
            let lat = (p.latitude * 1e6).round() as i64;
            let lon = (p.longitude * 1e6).round() as i64;
            encode_component(lat - prev_lat, &mut output);
            encode_component(lon - prev_lon, &mut output);
            prev_lat = lat;
            prev_lon = lon;
        }
        output
    }

    fn encode_component(value: i64, output: &mut String) {
        let mut v = if value < 0 {
            !((value as u64) << 1)
        } else {
            (value as u64) << 1
        };
        loop {
            let mut chunk = (v & 0x1f) as u8;
            v >>= 5;
            if v != 0 {
                chunk |= 0x20;
            }
            output.push((chunk + 63) as char);
            if v == 0 {
                break;
            }
        }
    }

    fn step_with_geometry(distance_m: f64, encoded: String) -> RouteStep {
        RouteStep {
            distance_m,
            geometry: Some(encoded),
            intersections: Vec::new(),
        }
    }

    fn single_leg_route(steps: Vec<RouteStep>) -> Route {
        Route {
            legs: vec![RouteLeg { steps }],
        }
    }

    #[test]
    fn decompose_round_trips_encoded_geometry() {
        let start = GeoPoint::new(48.137, 11.575);
        let (encoded, points) = encode_line_east(start, &[0.0, 200.0, 400.0]);
        let route = single_leg_route(vec![step_with_geometry(400.0, encoded)]);

        let geometry = decompose_route(&route);
        let decoded = geometry.step_points(0, 0);
        assert_eq!(decoded.len(), 3);
        for (d, p) in decoded.iter().zip(&points) {
            assert!((d.latitude - p.latitude).abs() < 1e-5);
            assert!((d.longitude - p.longitude).abs() < 1e-5);
        }
    }

    #[test]
    fn decompose_degrades_missing_and_invalid_geometry_to_empty() {
        let route = single_leg_route(vec![
            RouteStep::default(),
            step_with_geometry(100.0, "\u{1}not a polyline".to_string()),
        ]);

        let geometry = decompose_route(&route);
        assert!(geometry.step_points(0, 0).is_empty());
        assert!(geometry.step_points(0, 1).is_empty());
        assert!(geometry.is_empty());
    }

    #[test]
    fn lookups_with_out_of_range_indices_are_empty() {
        let geometry = decompose_route(&Route::default());
        assert!(geometry.step_points(3, 7).is_empty());
        assert!(geometry.points_after_step(3, 7).is_empty());
    }

    #[test]
    fn points_after_step_skips_current_step() {
        let start = GeoPoint::new(0.0, 0.0);
        let (first, _) = encode_line_east(start, &[0.0, 100.0]);
        let (second, second_points) = encode_line_east(start, &[100.0, 200.0]);
        let (third, third_points) = encode_line_east(start, &[200.0, 300.0]);
        let route = single_leg_route(vec![
            step_with_geometry(100.0, first),
            step_with_geometry(100.0, second),
            step_with_geometry(100.0, third),
        ]);

        let geometry = decompose_route(&route);
        let after = geometry.points_after_step(0, 0);
        assert_eq!(after.len(), second_points.len() + third_points.len());
        assert!(geometry.points_after_step(0, 2).is_empty());
    }

    #[test]
    fn density_averages_qualifying_pairs_only() {
        let start = GeoPoint::new(50.0, 8.0);
        let (encoded, _) = encode_line_east(start, &[0.0, 200.0]);
        // Intersections at 10 m (discarded: 10 m from start), then 50 m
        // and 130 m. Qualifying spacings: 40, 80, 70 -> average 63.3.
        let intersections = vec![
            destination(&start, 10.0, 90.0),
            destination(&start, 50.0, 90.0),
            destination(&start, 130.0, 90.0),
        ];
        let mut step = step_with_geometry(200.0, encoded);
        step.intersections = intersections;
        let route = single_leg_route(vec![step]);
        let geometry = decompose_route(&route);

        let density = intersection_density(&route, &geometry, &IntersectionDensityConfig::default());
        let average = density.average_distance(0, 0);
        assert!(
            (average - (40.0 + 80.0 + 70.0) / 3.0).abs() < 2.0,
            "unexpected average {average}"
        );
    }

    #[test]
    fn density_defaults_to_threshold_when_no_pair_qualifies() {
        let start = GeoPoint::new(50.0, 8.0);
        let (encoded, _) = encode_line_east(start, &[0.0, 15.0]);
        let route = single_leg_route(vec![step_with_geometry(15.0, encoded)]);
        let geometry = decompose_route(&route);

        let config = IntersectionDensityConfig::default();
        let density = intersection_density(&route, &geometry, &config);
        assert_eq!(density.average_distance(0, 0), config.min_distance_m);
        // Out-of-range lookups behave the same way.
        assert_eq!(density.average_distance(5, 5), config.min_distance_m);
    }

    #[test]
    fn post_maneuver_coalesces_short_steps_and_slices_the_next_long_one() {
        let start = GeoPoint::new(48.0, 11.0);
        let (current, _) = encode_line_east(start, &[0.0, 300.0]);
        // Two short steps (coalesced), then a long one (sliced).
        let (short_a, short_a_points) = encode_line_east(start, &[300.0, 400.0]);
        let (short_b, short_b_points) = encode_line_east(start, &[400.0, 480.0]);
        let (long, _) = encode_line_east(start, &[480.0, 1500.0]);

        let route = single_leg_route(vec![
            step_with_geometry(300.0, current),
            step_with_geometry(100.0, short_a),
            step_with_geometry(80.0, short_b),
            step_with_geometry(1020.0, long),
        ]);
        let geometry = decompose_route(&route);
        let config = PostManeuverFramingConfig::default();

        let framing = post_maneuver_framing(&route, &geometry, &config);
        let points = framing.points(0, 0);

        // Full geometry of both short steps.
        assert!(points.len() >= short_a_points.len() + short_b_points.len());
        assert_eq!(points[0], short_a_points[0]);
        assert_eq!(points[1], short_a_points[1]);
        assert_eq!(points[2], short_b_points[0]);

        // Plus a bounded slice into the long step.
        let slice = &points[short_a_points.len() + short_b_points.len()..];
        assert!(!slice.is_empty());
        let slice_length = crate::geo::line_distance(slice);
        assert!(
            (slice_length - config.slice_distance_m).abs() < 5.0,
            "slice length {slice_length}"
        );
    }

    #[test]
    fn post_maneuver_slices_immediately_when_next_step_is_long() {
        let start = GeoPoint::new(48.0, 11.0);
        let (current, _) = encode_line_east(start, &[0.0, 300.0]);
        let (long, _) = encode_line_east(start, &[300.0, 1300.0]);
        let route = single_leg_route(vec![
            step_with_geometry(300.0, current),
            step_with_geometry(1000.0, long),
        ]);
        let geometry = decompose_route(&route);
        let config = PostManeuverFramingConfig::default();

        let framing = post_maneuver_framing(&route, &geometry, &config);
        let points = framing.points(0, 0);
        let length = crate::geo::line_distance(points);
        assert!((length - config.slice_distance_m).abs() < 5.0);
    }

    #[test]
    fn post_maneuver_is_empty_for_the_last_step() {
        let start = GeoPoint::new(48.0, 11.0);
        let (only, _) = encode_line_east(start, &[0.0, 300.0]);
        let route = single_leg_route(vec![step_with_geometry(300.0, only)]);
        let geometry = decompose_route(&route);

        let framing =
            post_maneuver_framing(&route, &geometry, &PostManeuverFramingConfig::default());
        assert!(framing.points(0, 0).is_empty());
        assert!(framing.points(0, 9).is_empty());
    }
}
