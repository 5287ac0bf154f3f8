//! NavCam - camera viewport framing for turn-by-turn navigation.
//!
//! This library computes map camera parameters from a route, live trip
//! progress, and vehicle location, and drives animated transitions between
//! two opinionated camera modes:
//!
//! - **following**: a forward-looking, pitched view tracking the vehicle
//! - **overview**: the remaining route framed from above
//!
//! It renders nothing itself. The hosting map answers a small set of
//! queries ([`map::MapQuery`]), realizes animations
//! ([`camera::TransitionProvider`] / [`camera::AnimationEngine`]), and
//! feeds back user gestures; the library computes [`viewport::ViewportData`]
//! snapshots and requests that the host animate toward them.
//!
//! Everything runs single-threaded and synchronously on the caller's
//! thread; the only asynchrony is the host's animation clock reporting
//! back through lifecycle callbacks.

pub mod camera;
pub mod config;
pub mod geo;
pub mod map;
pub mod route;
pub mod viewport;

pub use camera::{NavigationCamera, NavigationCameraState};
pub use config::NavCamConfig;
pub use viewport::{FramingEngine, ViewportData};
