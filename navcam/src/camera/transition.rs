//! Camera transition and animation interfaces.
//!
//! The navigation camera never animates anything itself. It asks a
//! [`TransitionProvider`] for animation handles targeting a camera bundle,
//! registers them with the host's [`AnimationEngine`] so the rendering
//! loop drives them, and reacts to the lifecycle callbacks the handle
//! delivers. The provider is free to realize the animation however the
//! hosting map does; the camera only relies on the contract below.

use std::time::Duration;

use crate::config::DEFAULT_STATE_TRANSITION_MAX_DURATION;
use crate::viewport::CameraOptions;

/// Identifies one animation within the host's animation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u64);

/// Duration bounds for a requested animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Upper bound for the animation's duration. The provider may finish
    /// sooner but must not run longer.
    pub max_duration: Duration,
}

impl TransitionOptions {
    /// Create options with the given duration bound.
    pub fn new(max_duration: Duration) -> Self {
        Self { max_duration }
    }

    /// Options for an instantaneous (zero-duration) jump.
    pub fn instant() -> Self {
        Self {
            max_duration: Duration::ZERO,
        }
    }

    /// Whether these options request an instantaneous jump.
    pub fn is_instant(&self) -> bool {
        self.max_duration.is_zero()
    }
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_STATE_TRANSITION_MAX_DURATION,
        }
    }
}

/// Lifecycle callbacks for one animation.
///
/// The provider invokes `on_start` when the animation actually begins,
/// `on_cancel` if it is interrupted, and `on_end` exactly once when it
/// stops for any reason. For a cancelled animation `on_cancel` always
/// precedes `on_end`. All callbacks run on the thread driving the
/// animation engine, which must be the thread the camera is used from.
#[derive(Default)]
pub struct AnimationListener {
    pub on_start: Option<Box<dyn FnMut()>>,
    pub on_end: Option<Box<dyn FnMut()>>,
    pub on_cancel: Option<Box<dyn FnMut()>>,
}

impl AnimationListener {
    /// Create an empty listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start callback.
    pub fn with_on_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    /// Set the end callback.
    pub fn with_on_end(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Set the cancel callback.
    pub fn with_on_cancel(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }
}

/// A startable, cancellable camera animation handle.
pub trait CameraAnimation {
    /// Identifier used to register this animation with the engine.
    fn id(&self) -> AnimationId;

    /// Install the lifecycle listener. Must be called before `start`.
    fn set_listener(&mut self, listener: AnimationListener);

    /// Start the animation. The provider may deliver callbacks
    /// synchronously for zero-duration animations.
    fn start(&mut self);

    /// Cancel the animation. Cancelling an animation that already ended
    /// is a no-op.
    fn cancel(&mut self);
}

/// Builds camera animations toward framing targets.
pub trait TransitionProvider {
    /// Full transition into the following frame.
    fn transition_to_following(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation>;

    /// Full transition into the overview frame.
    fn transition_to_overview(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation>;

    /// Small update keeping an established following frame current.
    fn update_frame_for_following(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation>;

    /// Small update keeping an established overview frame current.
    fn update_frame_for_overview(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation>;
}

/// Registry the host's rendering loop uses to drive animations.
pub trait AnimationEngine {
    /// Register an animation so the rendering loop drives it.
    fn register(&self, id: AnimationId);

    /// Remove an animation from the rendering loop.
    fn unregister(&self, id: AnimationId);
}
