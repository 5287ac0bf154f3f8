//! The framing engine.
//!
//! [`FramingEngine`] reacts to route, progress, location, and override
//! updates, runs the framing algorithms, and produces an immutable
//! [`ViewportData`] snapshot on demand.
//!
//! Updates are two-phase. Every mutation recomputes the fallback camera
//! bundles for both contexts immediately, but nothing becomes externally
//! visible until [`FramingEngine::evaluate`] is called, and even then the
//! publication is equality-gated. This decouples bursts of rapid input
//! (per-frame location ticks) from the cost and side effects of downstream
//! camera animation.
//!
//! Malformed input never propagates as an error: missing geometry degrades
//! to empty point sequences, stale progress is clamped, a slice failure on
//! degenerate line data abandons that tick and keeps the previous frame,
//! and a failed camera fit falls back to a neutral camera.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::{FollowingFrameConfig, NavCamConfig};
use crate::geo::{self, GeoPoint};
use crate::map::{EdgeInsets, MapQuery, ScreenPoint};
use crate::route::{Location, Route, RouteProgress};

use super::geometry::{
    decompose_route, intersection_density, post_maneuver_framing, IntersectionDensity,
    PostManeuverFramingPoints, RouteGeometry,
};
use super::property::FrameProperties;
use super::ViewportData;

/// Camera target when there is nothing to frame.
const EMPTY_FRAME_CENTER: GeoPoint = GeoPoint {
    latitude: 0.0,
    longitude: 0.0,
};

/// Receives [`ViewportData`] publications.
///
/// Observers are notified from [`FramingEngine::evaluate`] on the calling
/// thread, and receive the current value immediately upon registration.
pub trait ViewportDataObserver {
    /// Called with every newly published viewport value.
    fn viewport_data_changed(&self, viewport_data: &ViewportData);
}

/// Computes camera parameters for the following and overview contexts.
pub struct FramingEngine {
    config: NavCamConfig,
    map: Rc<dyn MapQuery>,

    route: Option<Route>,
    geometry: RouteGeometry,
    density: IntersectionDensity,
    post_maneuver: PostManeuverFramingPoints,

    current_leg: usize,
    current_step: usize,
    current_step_points: Vec<GeoPoint>,
    remaining_route_points: Vec<GeoPoint>,
    step_distance_remaining_m: f64,

    location: Option<Location>,
    additional_following: Vec<GeoPoint>,
    additional_overview: Vec<GeoPoint>,

    following: FrameProperties,
    overview: FrameProperties,

    viewport_data: ViewportData,
    observers: Vec<Rc<dyn ViewportDataObserver>>,
}

impl FramingEngine {
    /// Create an engine over the given map surface.
    ///
    /// The initial fallbacks are computed immediately from the map's
    /// current camera, so the first [`evaluate`](Self::evaluate) publishes
    /// a meaningful value even before any route or location arrives.
    pub fn new(config: NavCamConfig, map: Rc<dyn MapQuery>) -> Self {
        let mut engine = Self {
            config,
            map,
            route: None,
            geometry: RouteGeometry::default(),
            density: IntersectionDensity::default(),
            post_maneuver: PostManeuverFramingPoints::default(),
            current_leg: 0,
            current_step: 0,
            current_step_points: Vec::new(),
            remaining_route_points: Vec::new(),
            step_distance_remaining_m: f64::INFINITY,
            location: None,
            additional_following: Vec::new(),
            additional_overview: Vec::new(),
            following: FrameProperties::default(),
            overview: FrameProperties::default(),
            viewport_data: ViewportData::default(),
            observers: Vec::new(),
        };
        engine.recompute_frames();
        engine
    }

    /// The most recently published viewport value.
    pub fn viewport_data(&self) -> &ViewportData {
        &self.viewport_data
    }

    /// Replace the active route.
    ///
    /// Rebuilds all route-derived data from scratch and resets the
    /// current-step cache; the overview frames the complete route until
    /// the first progress tick arrives.
    pub fn on_route_changed(&mut self, route: Route) {
        debug!(legs = route.legs.len(), "route changed, rebuilding framing geometry");
        self.geometry = decompose_route(&route);
        self.density =
            intersection_density(&route, &self.geometry, &self.config.intersection_density);
        self.post_maneuver =
            post_maneuver_framing(&route, &self.geometry, &self.config.post_maneuver);
        self.remaining_route_points = self.geometry.all_points();
        self.route = Some(route);
        self.current_leg = 0;
        self.current_step = 0;
        self.current_step_points = Vec::new();
        self.step_distance_remaining_m = f64::INFINITY;
        self.recompute_frames();
    }

    /// Advance along the active route.
    ///
    /// A tick whose step geometry cannot be sliced is abandoned: the
    /// previous framing state stays in place unchanged.
    pub fn on_route_progress_changed(&mut self, progress: &RouteProgress) {
        let Some(route) = &self.route else {
            debug!("route progress ignored, no route is set");
            return;
        };
        let Some(step) = route.step(progress.leg_index, progress.step_index) else {
            warn!(
                leg = progress.leg_index,
                step = progress.step_index,
                "route progress indices out of range, keeping previous frame"
            );
            return;
        };
        let step_distance_m = step.distance_m;

        // Stale progress can report more distance than the step has;
        // treat it as the step start rather than extrapolating.
        let traveled = if progress.distance_traveled_m < 0.0
            || progress.distance_traveled_m > step_distance_m
        {
            0.0
        } else {
            progress.distance_traveled_m
        };
        let remaining = progress.distance_remaining_m.max(0.0);

        let lookahead = lookahead_distance(
            traveled,
            remaining,
            self.density
                .average_distance(progress.leg_index, progress.step_index),
            &self.config,
        );

        let sliced = match geo::slice_along(&progress.step_points, traveled, lookahead) {
            Ok(points) => points,
            Err(error) => {
                warn!(%error, "skipping frame update on degenerate step geometry");
                return;
            }
        };

        trace!(
            leg = progress.leg_index,
            step = progress.step_index,
            traveled,
            lookahead,
            "route progress applied"
        );

        self.current_leg = progress.leg_index;
        self.current_step = progress.step_index;
        self.current_step_points = sliced;
        self.remaining_route_points = self
            .geometry
            .points_after_step(progress.leg_index, progress.step_index);
        self.step_distance_remaining_m = remaining;
        self.recompute_frames();
    }

    /// Record the latest vehicle location.
    pub fn on_location_changed(&mut self, location: Location) {
        trace!(point = %location.point, bearing = location.bearing_deg, "location changed");
        self.location = Some(location);
        self.recompute_frames();
    }

    /// Replace the extra points that must stay inside the following frame.
    pub fn additional_points_to_frame_for_following(&mut self, points: Vec<GeoPoint>) {
        self.additional_following = points;
        self.recompute_frames();
    }

    /// Replace the extra points that must stay inside the overview frame.
    pub fn additional_points_to_frame_for_overview(&mut self, points: Vec<GeoPoint>) {
        self.additional_overview = points;
        self.recompute_frames();
    }

    /// Drop all route-derived state, keeping location and overrides.
    pub fn clear_route_data(&mut self) {
        debug!("clearing route data");
        self.route = None;
        self.geometry = RouteGeometry::default();
        self.density = IntersectionDensity::default();
        self.post_maneuver = PostManeuverFramingPoints::default();
        self.current_leg = 0;
        self.current_step = 0;
        self.current_step_points = Vec::new();
        self.remaining_route_points = Vec::new();
        self.step_distance_remaining_m = f64::INFINITY;
        self.recompute_frames();
    }

    /// Publish the current camera bundles if they changed.
    ///
    /// Mutations recompute fallbacks immediately; this is the only place a
    /// new [`ViewportData`] becomes visible to observers.
    pub fn evaluate(&mut self) {
        let data = ViewportData {
            camera_for_following: self.following.camera_options(),
            camera_for_overview: self.overview.camera_options(),
        };
        if data == self.viewport_data {
            return;
        }

        debug!(
            following_zoom = data.camera_for_following.zoom,
            overview_zoom = data.camera_for_overview.zoom,
            "publishing viewport data"
        );
        self.viewport_data = data;

        let observers = self.observers.clone();
        for observer in &observers {
            observer.viewport_data_changed(&self.viewport_data);
        }
    }

    /// Register a viewport observer and replay the current value to it.
    pub fn register_observer(&mut self, observer: Rc<dyn ViewportDataObserver>) {
        observer.viewport_data_changed(&self.viewport_data);
        self.observers.push(observer);
    }

    /// Unregister a previously registered observer.
    pub fn unregister_observer(&mut self, observer: &Rc<dyn ViewportDataObserver>) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    // ------------------------------------------------------------------
    // Overrides
    // ------------------------------------------------------------------

    /// Override (or clear the override of) the following center.
    pub fn set_following_center_override(&mut self, value: Option<GeoPoint>) {
        self.following.center.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the following zoom.
    pub fn set_following_zoom_override(&mut self, value: Option<f64>) {
        self.following.zoom.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the following bearing.
    pub fn set_following_bearing_override(&mut self, value: Option<f64>) {
        self.following.bearing.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the following pitch.
    pub fn set_following_pitch_override(&mut self, value: Option<f64>) {
        self.following.pitch.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the following padding.
    pub fn set_following_padding_override(&mut self, value: Option<EdgeInsets>) {
        self.following.padding.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the following anchor.
    pub fn set_following_anchor_override(&mut self, value: Option<ScreenPoint>) {
        self.following.anchor.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview center.
    pub fn set_overview_center_override(&mut self, value: Option<GeoPoint>) {
        self.overview.center.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview zoom.
    pub fn set_overview_zoom_override(&mut self, value: Option<f64>) {
        self.overview.zoom.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview bearing.
    pub fn set_overview_bearing_override(&mut self, value: Option<f64>) {
        self.overview.bearing.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview pitch.
    pub fn set_overview_pitch_override(&mut self, value: Option<f64>) {
        self.overview.pitch.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview padding.
    pub fn set_overview_padding_override(&mut self, value: Option<EdgeInsets>) {
        self.overview.padding.set_override(value);
        self.recompute_frames();
    }

    /// Override (or clear the override of) the overview anchor.
    pub fn set_overview_anchor_override(&mut self, value: Option<ScreenPoint>) {
        self.overview.anchor.set_override(value);
        self.recompute_frames();
    }

    /// Clear all six following overrides in one step.
    pub fn clear_following_overrides(&mut self) {
        self.following.clear_overrides();
        self.recompute_frames();
    }

    /// Clear all six overview overrides in one step.
    pub fn clear_overview_overrides(&mut self) {
        self.overview.clear_overrides();
        self.recompute_frames();
    }

    // ------------------------------------------------------------------
    // Framing algorithms
    // ------------------------------------------------------------------

    fn recompute_frames(&mut self) {
        self.recompute_following_frame();
        self.recompute_overview_frame();
    }

    fn recompute_following_frame(&mut self) {
        let map_camera = self.map.camera_state();
        let viewport = self.map.viewport_size();
        let cfg = &self.config.following;

        // Candidate point set: vehicle location, then the looked-ahead
        // remainder of the current step, then post-maneuver geometry,
        // then externally supplied points.
        let mut points: Vec<GeoPoint> = Vec::with_capacity(
            1 + self.current_step_points.len() + self.additional_following.len(),
        );
        if let Some(location) = &self.location {
            points.push(location.point);
        }
        points.extend_from_slice(&self.current_step_points);
        if cfg.frame_post_maneuver_geometry {
            points.extend_from_slice(self.post_maneuver.points(self.current_leg, self.current_step));
        }
        points.extend_from_slice(&self.additional_following);

        let heading = self.location.map(|l| l.bearing_deg);
        let target_bearing = if points.len() >= 2 {
            let point_bearing = geo::bearing(&points[0], &points[points.len() - 1]);
            match heading {
                Some(heading) if cfg.bearing_smoothing_enabled => clamp_bearing_divergence(
                    point_bearing,
                    heading,
                    cfg.max_bearing_divergence_deg,
                ),
                _ => point_bearing,
            }
        } else {
            heading.unwrap_or(map_camera.bearing)
        };
        let bearing = geo::normalize_bearing(map_camera.bearing, target_bearing);

        let pitch = pitch_from_distance_remaining(self.step_distance_remaining_m, cfg);
        let pitch_fraction = if cfg.max_pitch_deg > 0.0 {
            (pitch / cfg.max_pitch_deg).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Anchor: horizontally at the padded-viewport center, vertically
        // between the padded center (pitch 0) and the padded bottom
        // (max pitch).
        let padded_center = map_camera.padding.padded_center(viewport);
        let padded_bottom = viewport.height - map_camera.padding.bottom;
        let anchor = ScreenPoint::new(
            padded_center.x,
            padded_center.y + (padded_bottom - padded_center.y) * pitch_fraction,
        );
        let padding = EdgeInsets::new(
            anchor.y,
            anchor.x,
            viewport.height - anchor.y,
            viewport.width - anchor.x,
        );

        let fit = if points.is_empty() {
            None
        } else {
            let fit = self.map.fit_coordinates(&points, padding, bearing, pitch);
            if fit.is_none() {
                warn!("following camera fit failed, framing the neutral point");
            }
            fit
        };
        let (raw_center, raw_zoom) = match fit {
            Some(fit) => (fit.center, fit.zoom),
            None => (EMPTY_FRAME_CENTER, self.config.min_geo_zoom),
        };

        // At pitch 0 the frame centers on route geometry; at max pitch it
        // centers on the vehicle itself.
        let center = match &self.location {
            Some(location) => raw_center.lerp(&location.point, pitch_fraction),
            None => raw_center,
        };
        let zoom = raw_zoom.clamp(cfg.min_zoom, cfg.max_zoom);

        self.following.center.set_fallback(center);
        self.following.zoom.set_fallback(zoom);
        self.following.bearing.set_fallback(bearing);
        self.following.pitch.set_fallback(pitch);
        self.following.padding.set_fallback(padding);
        self.following.anchor.set_fallback(anchor);
    }

    fn recompute_overview_frame(&mut self) {
        let map_camera = self.map.camera_state();
        let viewport = self.map.viewport_size();
        let cfg = &self.config.overview;

        let mut points: Vec<GeoPoint> =
            Vec::with_capacity(1 + self.remaining_route_points.len() + self.additional_overview.len());
        if let Some(location) = &self.location {
            points.push(location.point);
        }
        points.extend_from_slice(&self.remaining_route_points);
        points.extend_from_slice(&self.additional_overview);

        // Overview always settles toward north-up, by the short way.
        let bearing = geo::normalize_bearing(map_camera.bearing, 0.0);
        let pitch = 0.0;

        // The fit honors a consumer padding override; the fallback follows
        // the map's current padding.
        self.overview.padding.set_fallback(map_camera.padding);
        let padding = self.overview.padding.get();
        let anchor = padding.padded_center(viewport);

        let fit = if points.is_empty() {
            None
        } else {
            let fit = self.map.fit_coordinates(&points, padding, bearing, pitch);
            if fit.is_none() {
                warn!("overview camera fit failed, framing the neutral point");
            }
            fit
        };
        let (center, raw_zoom) = match fit {
            Some(fit) => (fit.center, fit.zoom),
            None => (EMPTY_FRAME_CENTER, self.config.min_geo_zoom),
        };
        let zoom = raw_zoom.clamp(self.config.min_geo_zoom, cfg.max_zoom);

        self.overview.center.set_fallback(center);
        self.overview.zoom.set_fallback(zoom);
        self.overview.bearing.set_fallback(bearing);
        self.overview.pitch.set_fallback(pitch);
        self.overview.anchor.set_fallback(anchor);
    }
}

/// How far along the current step the following frame should look.
///
/// With density-scaled lookahead enabled this grows with the local
/// intersection spacing; otherwise it reaches the end of the step. The
/// result is an absolute distance from the step start, like `traveled`.
fn lookahead_distance(traveled_m: f64, remaining_m: f64, density_m: f64, config: &NavCamConfig) -> f64 {
    if config.intersection_density.lookahead_enabled {
        traveled_m + density_m * config.intersection_density.lookahead_multiplier
    } else {
        traveled_m + remaining_m
    }
}

/// Clamp a point-derived bearing to within `max_divergence_deg` of the
/// vehicle heading.
///
/// When the divergence is exceeded the output moves from the point-derived
/// bearing toward the heading by exactly the maximum, in the rotational
/// direction of the difference.
fn clamp_bearing_divergence(point_bearing: f64, heading_deg: f64, max_divergence_deg: f64) -> f64 {
    let diff = geo::shortest_rotation_diff(point_bearing, heading_deg);
    if diff.abs() > max_divergence_deg {
        geo::wrap_degrees(point_bearing + max_divergence_deg * diff.signum())
    } else {
        point_bearing
    }
}

/// Pitch as a linear ramp over the distance remaining on the current step.
///
/// At or beyond the ramp's begin distance the pitch sits at the minimum;
/// at or inside the end distance it sits at the maximum; between the two
/// it interpolates linearly.
fn pitch_from_distance_remaining(remaining_m: f64, config: &FollowingFrameConfig) -> f64 {
    let begin = config.pitch_ramp_begin_remaining_m;
    let end = config.pitch_ramp_end_remaining_m;
    if begin <= end {
        // Degenerate ramp configuration collapses to a threshold.
        return if remaining_m > begin {
            config.min_pitch_deg
        } else {
            config.max_pitch_deg
        };
    }

    let fraction = ((begin - remaining_m) / (begin - end)).clamp(0.0, 1.0);
    config.min_pitch_deg + (config.max_pitch_deg - config.min_pitch_deg) * fraction
}
