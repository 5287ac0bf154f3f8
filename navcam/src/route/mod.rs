//! Route and trip-progress data model.
//!
//! These types are the supplier interface of the engine: a route supplier
//! hands over a [`Route`] whenever the active route changes, a progress
//! supplier ticks [`RouteProgress`] as the vehicle advances along it, and a
//! location supplier ticks [`Location`] readings.
//!
//! The model is deliberately permissive. Legs, steps, geometry, and
//! intersections may all be empty or absent; the framing layer degrades to
//! empty point sequences rather than rejecting such routes.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A routable path from origin to destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Legs between consecutive waypoints, in travel order.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

impl Route {
    /// Look up a step by leg and step index.
    pub fn step(&self, leg_index: usize, step_index: usize) -> Option<&RouteStep> {
        self.legs.get(leg_index)?.steps.get(step_index)
    }
}

/// One leg of a route, between two consecutive waypoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Maneuver-to-maneuver steps, in travel order.
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

/// One maneuver-to-maneuver step of a route leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Step length in meters.
    #[serde(default)]
    pub distance_m: f64,

    /// Encoded polyline geometry of the step (precision 6).
    ///
    /// Absent or undecodable geometry degrades to an empty point sequence.
    #[serde(default)]
    pub geometry: Option<String>,

    /// Locations of significant intersections along the step.
    #[serde(default)]
    pub intersections: Vec<GeoPoint>,
}

/// A progress tick for the step currently being travelled.
///
/// Produced by an external route-tracking navigator. `distance_traveled_m`
/// and `distance_remaining_m` refer to the current step, not the whole
/// route, and are expected to be non-negative; stale values exceeding the
/// step's length are guarded against by the framing engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteProgress {
    /// Index of the leg being travelled.
    pub leg_index: usize,
    /// Index of the step being travelled within the leg.
    pub step_index: usize,
    /// Meters already travelled on the current step.
    pub distance_traveled_m: f64,
    /// Meters left on the current step.
    pub distance_remaining_m: f64,
    /// Decoded point sequence of the current step.
    pub step_points: Vec<GeoPoint>,
}

/// A vehicle location reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Vehicle position.
    pub point: GeoPoint,
    /// Vehicle heading in degrees, clockwise from true north.
    pub bearing_deg: f64,
}

impl Location {
    /// Create a new location reading.
    pub fn new(point: GeoPoint, bearing_deg: f64) -> Self {
        Self { point, bearing_deg }
    }
}
