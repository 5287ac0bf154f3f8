//! The navigation camera state machine.
//!
//! [`NavigationCamera`] owns the [`NavigationCameraState`] and turns
//! published [`ViewportData`] snapshots into camera animations requested
//! from an external [`TransitionProvider`] and driven by an external
//! [`AnimationEngine`].
//!
//! # Design
//!
//! - At most one animation set is ever active; starting a new one first
//!   cancels and deregisters the previous one.
//! - Requesting the state the camera is already in (or transitioning to)
//!   is a no-op.
//! - `request_idle` completes synchronously: the state observably changes
//!   to `Idle` before the call returns, and the cancellation the provider
//!   reports later is idempotent with respect to state.
//! - Cancellation is not an error. A transition whose animation is
//!   cancelled settles in `Idle` instead of its terminal state, detected
//!   through the cancel callback that precedes the end callback.
//! - A user gesture on the map drops the camera to `Idle` from any
//!   non-idle state.
//!
//! All entry points, including the provider's lifecycle callbacks, must
//! run on one thread.

mod state;
mod transition;

pub use state::{NavigationCameraState, NavigationCameraStateObserver};
pub use transition::{
    AnimationEngine, AnimationId, AnimationListener, CameraAnimation, TransitionOptions,
    TransitionProvider,
};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::TransitionConfig;
use crate::viewport::{ViewportData, ViewportDataObserver};

/// The animation currently registered with the animation engine.
struct RunningAnimation {
    id: AnimationId,
    handle: Box<dyn CameraAnimation>,
}

struct CameraInner {
    state: NavigationCameraState,
    viewport_data: ViewportData,
    animation: Option<RunningAnimation>,
    /// Bumped whenever the active animation is replaced or cancelled;
    /// listener callbacks from superseded animations compare against it
    /// and back off.
    generation: u64,
    observers: Vec<Rc<dyn NavigationCameraStateObserver>>,
}

/// Drives animated transitions between the camera states.
///
/// Clonable-by-`Rc` by design: register the same instance as a
/// [`ViewportDataObserver`] on the framing engine and call the request
/// methods from UI code. All methods take `&self`; interior state is
/// mutated through the lifecycle callbacks as well as the public entry
/// points.
pub struct NavigationCamera {
    inner: Rc<RefCell<CameraInner>>,
    provider: Rc<dyn TransitionProvider>,
    engine: Rc<dyn AnimationEngine>,
    config: TransitionConfig,
}

impl NavigationCamera {
    /// Create a camera in the `Idle` state.
    pub fn new(
        provider: Rc<dyn TransitionProvider>,
        engine: Rc<dyn AnimationEngine>,
        config: TransitionConfig,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CameraInner {
                state: NavigationCameraState::Idle,
                viewport_data: ViewportData::default(),
                animation: None,
                generation: 0,
                observers: Vec::new(),
            })),
            provider,
            engine,
            config,
        }
    }

    /// The current camera state.
    pub fn state(&self) -> NavigationCameraState {
        self.inner.borrow().state
    }

    /// Request an animated transition into the following frame.
    ///
    /// No-op when the camera is already following or transitioning there.
    pub fn request_following(&self) {
        let (state, target) = {
            let inner = self.inner.borrow();
            (inner.state, inner.viewport_data.camera_for_following.clone())
        };
        if matches!(
            state,
            NavigationCameraState::TransitionToFollowing | NavigationCameraState::Following
        ) {
            debug!(%state, "following already requested, ignoring");
            return;
        }

        debug!("requesting transition to following");
        let animation = self.provider.transition_to_following(
            &target,
            TransitionOptions::new(self.config.state_transition_max_duration),
        );
        self.start_state_transition(
            animation,
            NavigationCameraState::TransitionToFollowing,
            NavigationCameraState::Following,
        );
    }

    /// Request an animated transition into the overview frame.
    ///
    /// No-op when the camera is already in overview or transitioning
    /// there.
    pub fn request_overview(&self) {
        let (state, target) = {
            let inner = self.inner.borrow();
            (inner.state, inner.viewport_data.camera_for_overview.clone())
        };
        if matches!(
            state,
            NavigationCameraState::TransitionToOverview | NavigationCameraState::Overview
        ) {
            debug!(%state, "overview already requested, ignoring");
            return;
        }

        debug!("requesting transition to overview");
        let animation = self.provider.transition_to_overview(
            &target,
            TransitionOptions::new(self.config.state_transition_max_duration),
        );
        self.start_state_transition(
            animation,
            NavigationCameraState::TransitionToOverview,
            NavigationCameraState::Overview,
        );
    }

    /// Drop to `Idle`, cancelling any running animation synchronously.
    ///
    /// The state change completes before this returns; no transition
    /// state or animation is involved.
    pub fn request_idle(&self) {
        debug!("requesting idle");
        self.cancel_running_animation();
        Self::apply_state(&self.inner, NavigationCameraState::Idle);
    }

    /// Jump instantly to the latest published frame for the current mode.
    ///
    /// Only meaningful while following or in overview; no-op otherwise.
    /// The state does not change.
    pub fn reset_frame(&self) {
        let (state, data) = {
            let inner = self.inner.borrow();
            (inner.state, inner.viewport_data.clone())
        };
        match state {
            NavigationCameraState::Following => {
                debug!("resetting following frame");
                let animation = self
                    .provider
                    .update_frame_for_following(&data.camera_for_following, TransitionOptions::instant());
                self.start_frame_update(animation);
            }
            NavigationCameraState::Overview => {
                debug!("resetting overview frame");
                let animation = self
                    .provider
                    .update_frame_for_overview(&data.camera_for_overview, TransitionOptions::instant());
                self.start_frame_update(animation);
            }
            _ => {}
        }
    }

    /// React to the user starting to move the map.
    ///
    /// Any non-idle state yields to the user and drops to `Idle`.
    pub fn on_gesture_move_begin(&self) {
        let state = self.inner.borrow().state;
        if state != NavigationCameraState::Idle {
            debug!(%state, "user gesture detected, yielding camera control");
            self.request_idle();
        }
    }

    /// Register a state observer and replay the current state to it.
    pub fn register_state_observer(&self, observer: Rc<dyn NavigationCameraStateObserver>) {
        let state = {
            let mut inner = self.inner.borrow_mut();
            inner.observers.push(Rc::clone(&observer));
            inner.state
        };
        observer.state_changed(state);
    }

    /// Unregister a previously registered state observer.
    pub fn unregister_state_observer(&self, observer: &Rc<dyn NavigationCameraStateObserver>) {
        self.inner
            .borrow_mut()
            .observers
            .retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Start a transition animation and wire its lifecycle to the state
    /// machine.
    fn start_state_transition(
        &self,
        mut animation: Box<dyn CameraAnimation>,
        transition_state: NavigationCameraState,
        terminal_state: NavigationCameraState,
    ) {
        let generation = self.cancel_running_animation();
        let canceled = Rc::new(Cell::new(false));

        let start_inner = Rc::clone(&self.inner);
        let cancel_flag = Rc::clone(&canceled);
        let end_inner = Rc::clone(&self.inner);

        animation.set_listener(
            AnimationListener::new()
                .with_on_start(move || {
                    if start_inner.borrow().generation != generation {
                        return;
                    }
                    Self::apply_state(&start_inner, transition_state);
                })
                .with_on_cancel(move || cancel_flag.set(true))
                .with_on_end(move || {
                    if end_inner.borrow().generation != generation {
                        return;
                    }
                    let end_state = if canceled.get() {
                        NavigationCameraState::Idle
                    } else {
                        terminal_state
                    };
                    Self::apply_state(&end_inner, end_state);
                }),
        );

        self.start_animation(generation, animation);
    }

    /// Start a frame-update animation; these carry no state semantics.
    fn start_frame_update(&self, mut animation: Box<dyn CameraAnimation>) {
        let generation = self.cancel_running_animation();
        animation.set_listener(AnimationListener::new());
        self.start_animation(generation, animation);
    }

    /// Register and start an animation, storing it as the active one.
    ///
    /// Providers may complete zero-duration animations synchronously
    /// inside `start()`; if a callback superseded this animation in the
    /// meantime, it is cancelled instead of stored.
    fn start_animation(&self, generation: u64, mut animation: Box<dyn CameraAnimation>) {
        let id = animation.id();
        self.engine.register(id);
        animation.start();

        let superseded = {
            let mut inner = self.inner.borrow_mut();
            if inner.generation == generation {
                inner.animation = Some(RunningAnimation {
                    id,
                    handle: animation,
                });
                None
            } else {
                Some(animation)
            }
        };
        if let Some(mut stale) = superseded {
            stale.cancel();
            self.engine.unregister(id);
        }
    }

    /// Cancel and deregister the active animation, invalidating its
    /// callbacks. Returns the generation for the next animation.
    fn cancel_running_animation(&self) -> u64 {
        let (generation, previous) = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            (inner.generation, inner.animation.take())
        };
        if let Some(mut running) = previous {
            running.handle.cancel();
            self.engine.unregister(running.id);
        }
        generation
    }

    /// Change the state and notify observers outside the borrow.
    fn apply_state(inner: &Rc<RefCell<CameraInner>>, new_state: NavigationCameraState) {
        let observers = {
            let mut guard = inner.borrow_mut();
            if guard.state == new_state {
                return;
            }
            info!(from = %guard.state, to = %new_state, "navigation camera state changed");
            guard.state = new_state;
            guard.observers.clone()
        };
        for observer in &observers {
            observer.state_changed(new_state);
        }
    }
}

impl ViewportDataObserver for NavigationCamera {
    /// Keep an established frame current as new viewport data arrives.
    ///
    /// Publications are ignored while idle or mid-transition; the stored
    /// copy still updates so the next transition targets fresh data.
    fn viewport_data_changed(&self, viewport_data: &ViewportData) {
        let state = {
            let mut inner = self.inner.borrow_mut();
            inner.viewport_data = viewport_data.clone();
            inner.state
        };

        let options = TransitionOptions::new(self.config.frame_update_max_duration);
        match state {
            NavigationCameraState::Following => {
                let animation = self
                    .provider
                    .update_frame_for_following(&viewport_data.camera_for_following, options);
                self.start_frame_update(animation);
            }
            NavigationCameraState::Overview => {
                let animation = self
                    .provider
                    .update_frame_for_overview(&viewport_data.camera_for_overview, options);
                self.start_frame_update(animation);
            }
            _ => {}
        }
    }
}
