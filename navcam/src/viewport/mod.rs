//! Viewport framing.
//!
//! This module turns a route, live trip progress, and vehicle location
//! into camera parameter bundles for two opinionated framing contexts:
//! **following** (a forward-looking, pitched view tracking the vehicle)
//! and **overview** (the remaining route from above).
//!
//! # Architecture
//!
//! ```text
//! route/progress/location ──► FramingEngine ──► FrameProperties ──► ViewportData
//!                                  │                (fallbacks)      (published)
//!                                  └── decompose_route / density / post-maneuver
//! ```
//!
//! The [`FramingEngine`] recomputes fallbacks on every mutation and
//! publishes an equality-gated [`ViewportData`] snapshot on
//! [`FramingEngine::evaluate`]. Consumers may pin any camera property with
//! an override without stopping the engine's own computation.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use navcam::config::NavCamConfig;
//! use navcam::viewport::FramingEngine;
//!
//! let mut engine = FramingEngine::new(NavCamConfig::default(), map);
//! engine.on_route_changed(route);
//! engine.on_location_changed(location);
//! engine.evaluate(); // publishes ViewportData to observers
//! ```

mod data;
mod engine;
mod geometry;
mod property;

pub use data::{CameraOptions, ViewportData};
pub use engine::{FramingEngine, ViewportDataObserver};
pub use geometry::{
    decompose_route, intersection_density, post_maneuver_framing, IntersectionDensity,
    PostManeuverFramingPoints, RouteGeometry,
};
pub use property::{FrameProperties, ViewportProperty};
