//! Engine configuration.
//!
//! All tunables live in one immutable [`NavCamConfig`] value passed at
//! construction time. Nested per-concern structs keep related knobs
//! together and carry documented defaults, so most hosts construct the
//! engine with `NavCamConfig::default()` and adjust the one or two values
//! they care about through the `with_*` builders.

use std::time::Duration;

/// Default upper zoom bound for both framing contexts.
pub const DEFAULT_MAX_ZOOM: f64 = 16.35;

/// Default lower zoom bound while following the vehicle.
pub const DEFAULT_MIN_FOLLOWING_ZOOM: f64 = 10.5;

/// Default global lower zoom bound, also used when there is nothing to
/// frame.
pub const DEFAULT_MIN_GEO_ZOOM: f64 = 2.0;

/// Default maximum divergence between the point-derived bearing and the
/// vehicle heading, in degrees.
pub const DEFAULT_MAX_BEARING_DIVERGENCE_DEG: f64 = 20.0;

/// Default pitch while far from a maneuver, in degrees.
pub const DEFAULT_MIN_PITCH_DEG: f64 = 0.0;

/// Default pitch while close to a maneuver, in degrees.
pub const DEFAULT_MAX_FOLLOWING_PITCH_DEG: f64 = 45.0;

/// Default step distance remaining at which the pitch ramp begins, meters.
pub const DEFAULT_PITCH_RAMP_BEGIN_REMAINING_M: f64 = 180.0;

/// Default step distance remaining at which the pitch ramp ends, meters.
pub const DEFAULT_PITCH_RAMP_END_REMAINING_M: f64 = 150.0;

/// Default minimum spacing for an intersection pair to count toward the
/// density average, meters.
pub const DEFAULT_INTERSECTION_MIN_DISTANCE_M: f64 = 20.0;

/// Default multiplier applied to the intersection density when computing
/// the lookahead distance.
pub const DEFAULT_LOOKAHEAD_MULTIPLIER: f64 = 5.0;

/// Default maximum step length for coalescing consecutive maneuvers,
/// meters.
pub const DEFAULT_MANEUVER_COALESCE_DISTANCE_M: f64 = 150.0;

/// Default length of the post-maneuver geometry slice appended after
/// coalescing stops, meters.
pub const DEFAULT_POST_MANEUVER_SLICE_M: f64 = 100.0;

/// Default upper duration bound for state transition animations.
pub const DEFAULT_STATE_TRANSITION_MAX_DURATION: Duration = Duration::from_millis(3500);

/// Default upper duration bound for frame update animations.
pub const DEFAULT_FRAME_UPDATE_MAX_DURATION: Duration = Duration::from_millis(1000);

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NavCamConfig {
    /// Global lower zoom bound, also the zoom used for an empty frame.
    pub min_geo_zoom: f64,
    /// Following-frame tunables.
    pub following: FollowingFrameConfig,
    /// Overview-frame tunables.
    pub overview: OverviewFrameConfig,
    /// Intersection-density lookahead tunables.
    pub intersection_density: IntersectionDensityConfig,
    /// Post-maneuver framing tunables.
    pub post_maneuver: PostManeuverFramingConfig,
    /// Camera transition durations.
    pub transitions: TransitionConfig,
}

impl Default for NavCamConfig {
    fn default() -> Self {
        Self {
            min_geo_zoom: DEFAULT_MIN_GEO_ZOOM,
            following: FollowingFrameConfig::default(),
            overview: OverviewFrameConfig::default(),
            intersection_density: IntersectionDensityConfig::default(),
            post_maneuver: PostManeuverFramingConfig::default(),
            transitions: TransitionConfig::default(),
        }
    }
}

impl NavCamConfig {
    /// Replace the following-frame configuration.
    pub fn with_following(mut self, following: FollowingFrameConfig) -> Self {
        self.following = following;
        self
    }

    /// Replace the overview-frame configuration.
    pub fn with_overview(mut self, overview: OverviewFrameConfig) -> Self {
        self.overview = overview;
        self
    }

    /// Replace the intersection-density configuration.
    pub fn with_intersection_density(mut self, density: IntersectionDensityConfig) -> Self {
        self.intersection_density = density;
        self
    }

    /// Replace the post-maneuver framing configuration.
    pub fn with_post_maneuver(mut self, post_maneuver: PostManeuverFramingConfig) -> Self {
        self.post_maneuver = post_maneuver;
        self
    }

    /// Replace the transition configuration.
    pub fn with_transitions(mut self, transitions: TransitionConfig) -> Self {
        self.transitions = transitions;
        self
    }
}

/// Tunables for the following frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowingFrameConfig {
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Whether the point-derived bearing is clamped toward the vehicle
    /// heading.
    pub bearing_smoothing_enabled: bool,
    /// Maximum divergence between the point-derived bearing and the
    /// vehicle heading, in degrees.
    pub max_bearing_divergence_deg: f64,
    /// Pitch while far from a maneuver, in degrees.
    pub min_pitch_deg: f64,
    /// Pitch while close to a maneuver, in degrees.
    pub max_pitch_deg: f64,
    /// Step distance remaining at which the pitch ramp begins, meters.
    pub pitch_ramp_begin_remaining_m: f64,
    /// Step distance remaining at which the pitch ramp ends, meters.
    ///
    /// Must be below `pitch_ramp_begin_remaining_m`; at or below this
    /// remaining distance the pitch sits at `max_pitch_deg`.
    pub pitch_ramp_end_remaining_m: f64,
    /// Whether post-maneuver geometry is appended to the frame.
    pub frame_post_maneuver_geometry: bool,
}

impl Default for FollowingFrameConfig {
    fn default() -> Self {
        Self {
            max_zoom: DEFAULT_MAX_ZOOM,
            min_zoom: DEFAULT_MIN_FOLLOWING_ZOOM,
            bearing_smoothing_enabled: true,
            max_bearing_divergence_deg: DEFAULT_MAX_BEARING_DIVERGENCE_DEG,
            min_pitch_deg: DEFAULT_MIN_PITCH_DEG,
            max_pitch_deg: DEFAULT_MAX_FOLLOWING_PITCH_DEG,
            pitch_ramp_begin_remaining_m: DEFAULT_PITCH_RAMP_BEGIN_REMAINING_M,
            pitch_ramp_end_remaining_m: DEFAULT_PITCH_RAMP_END_REMAINING_M,
            frame_post_maneuver_geometry: true,
        }
    }
}

impl FollowingFrameConfig {
    /// Set the zoom bounds.
    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the pitch ramp bounds and distances.
    pub fn with_pitch_ramp(
        mut self,
        min_pitch_deg: f64,
        max_pitch_deg: f64,
        begin_remaining_m: f64,
        end_remaining_m: f64,
    ) -> Self {
        self.min_pitch_deg = min_pitch_deg;
        self.max_pitch_deg = max_pitch_deg;
        self.pitch_ramp_begin_remaining_m = begin_remaining_m;
        self.pitch_ramp_end_remaining_m = end_remaining_m;
        self
    }

    /// Set the maximum bearing divergence.
    pub fn with_max_bearing_divergence(mut self, degrees: f64) -> Self {
        self.max_bearing_divergence_deg = degrees;
        self
    }

    /// Enable or disable bearing smoothing.
    pub fn with_bearing_smoothing(mut self, enabled: bool) -> Self {
        self.bearing_smoothing_enabled = enabled;
        self
    }

    /// Enable or disable post-maneuver geometry framing.
    pub fn with_post_maneuver_geometry(mut self, enabled: bool) -> Self {
        self.frame_post_maneuver_geometry = enabled;
        self
    }
}

/// Tunables for the overview frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewFrameConfig {
    /// Upper zoom bound.
    pub max_zoom: f64,
}

impl Default for OverviewFrameConfig {
    fn default() -> Self {
        Self {
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl OverviewFrameConfig {
    /// Set the upper zoom bound.
    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }
}

/// Tunables for intersection-density based lookahead.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionDensityConfig {
    /// Whether the lookahead distance is scaled by intersection density.
    ///
    /// When disabled, the following frame looks ahead to the end of the
    /// current step.
    pub lookahead_enabled: bool,
    /// Minimum spacing for an intersection pair to count toward the
    /// density average, meters. Steps whose pairs all fall below this
    /// threshold take the threshold itself as their density.
    pub min_distance_m: f64,
    /// Multiplier applied to the density when computing the lookahead
    /// distance.
    pub lookahead_multiplier: f64,
}

impl Default for IntersectionDensityConfig {
    fn default() -> Self {
        Self {
            lookahead_enabled: true,
            min_distance_m: DEFAULT_INTERSECTION_MIN_DISTANCE_M,
            lookahead_multiplier: DEFAULT_LOOKAHEAD_MULTIPLIER,
        }
    }
}

impl IntersectionDensityConfig {
    /// Enable or disable density-scaled lookahead.
    pub fn with_lookahead_enabled(mut self, enabled: bool) -> Self {
        self.lookahead_enabled = enabled;
        self
    }

    /// Set the minimum intersection spacing.
    pub fn with_min_distance(mut self, meters: f64) -> Self {
        self.min_distance_m = meters;
        self
    }

    /// Set the lookahead multiplier.
    pub fn with_lookahead_multiplier(mut self, multiplier: f64) -> Self {
        self.lookahead_multiplier = multiplier;
        self
    }
}

/// Tunables for post-maneuver framing geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PostManeuverFramingConfig {
    /// Steps no longer than this are coalesced into a compound maneuver,
    /// meters.
    pub coalesce_distance_m: f64,
    /// Length of the slice taken from the first non-coalesced step,
    /// meters.
    pub slice_distance_m: f64,
}

impl Default for PostManeuverFramingConfig {
    fn default() -> Self {
        Self {
            coalesce_distance_m: DEFAULT_MANEUVER_COALESCE_DISTANCE_M,
            slice_distance_m: DEFAULT_POST_MANEUVER_SLICE_M,
        }
    }
}

impl PostManeuverFramingConfig {
    /// Set the coalescing distance.
    pub fn with_coalesce_distance(mut self, meters: f64) -> Self {
        self.coalesce_distance_m = meters;
        self
    }

    /// Set the slice distance.
    pub fn with_slice_distance(mut self, meters: f64) -> Self {
        self.slice_distance_m = meters;
        self
    }
}

/// Upper duration bounds for camera animations.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionConfig {
    /// Bound for transitions between camera states.
    pub state_transition_max_duration: Duration,
    /// Bound for frame updates within a state.
    pub frame_update_max_duration: Duration,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            state_transition_max_duration: DEFAULT_STATE_TRANSITION_MAX_DURATION,
            frame_update_max_duration: DEFAULT_FRAME_UPDATE_MAX_DURATION,
        }
    }
}

impl TransitionConfig {
    /// Set the state transition duration bound.
    pub fn with_state_transition_max_duration(mut self, duration: Duration) -> Self {
        self.state_transition_max_duration = duration;
        self
    }

    /// Set the frame update duration bound.
    pub fn with_frame_update_max_duration(mut self, duration: Duration) -> Self {
        self.frame_update_max_duration = duration;
        self
    }
}
