//! Integration tests for the navigation camera state machine.
//!
//! These tests verify the complete camera flow including:
//! - transition lifecycles (start / end / cancel) and the state table
//! - the one-active-animation invariant against the animation engine
//! - gesture handling and synchronous recovery to `Idle`
//!
//! Run with: `cargo test --test camera_integration`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use navcam::camera::{
    AnimationEngine, AnimationId, AnimationListener, CameraAnimation, NavigationCamera,
    NavigationCameraState, NavigationCameraStateObserver, TransitionOptions, TransitionProvider,
};
use navcam::config::TransitionConfig;
use navcam::viewport::{CameraOptions, ViewportData, ViewportDataObserver};

// ============================================================================
// Fakes
// ============================================================================

/// What kind of animation the provider was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimationKind {
    TransitionToFollowing,
    TransitionToOverview,
    UpdateFollowing,
    UpdateOverview,
}

/// Shared handle letting the test drive one animation's lifecycle.
struct AnimationControl {
    id: AnimationId,
    kind: AnimationKind,
    target: CameraOptions,
    options: TransitionOptions,
    started: Cell<bool>,
    canceled: Cell<bool>,
    listener: RefCell<AnimationListener>,
}

impl AnimationControl {
    /// Invoke one listener slot without holding the listener borrow, so a
    /// callback may re-enter the camera.
    fn fire(&self, slot: fn(&mut AnimationListener) -> &mut Option<Box<dyn FnMut()>>) {
        let callback = slot(&mut self.listener.borrow_mut()).take();
        if let Some(mut callback) = callback {
            callback();
            let mut listener = self.listener.borrow_mut();
            *slot(&mut listener) = Some(callback);
        }
    }

    fn fire_cancel(&self) {
        self.fire(|l| &mut l.on_cancel);
    }

    fn fire_end(&self) {
        self.fire(|l| &mut l.on_end);
    }
}

/// Animation handle handed to the camera; all state lives in the control.
struct FakeAnimation {
    control: Rc<AnimationControl>,
}

impl CameraAnimation for FakeAnimation {
    fn id(&self) -> AnimationId {
        self.control.id
    }

    fn set_listener(&mut self, listener: AnimationListener) {
        *self.control.listener.borrow_mut() = listener;
    }

    fn start(&mut self) {
        self.control.started.set(true);
        // Animations begin on the next clock tick of a real engine; the
        // start callback still arrives before any end callback.
        self.control.fire(|l| &mut l.on_start);
    }

    fn cancel(&mut self) {
        self.control.canceled.set(true);
    }
}

/// Provider recording every built animation and exposing its control.
#[derive(Default)]
struct FakeProvider {
    next_id: Cell<u64>,
    built: RefCell<Vec<Rc<AnimationControl>>>,
}

impl FakeProvider {
    fn build(&self, kind: AnimationKind, target: &CameraOptions, options: TransitionOptions) -> Box<dyn CameraAnimation> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let control = Rc::new(AnimationControl {
            id: AnimationId(id),
            kind,
            target: target.clone(),
            options,
            started: Cell::new(false),
            canceled: Cell::new(false),
            listener: RefCell::new(AnimationListener::new()),
        });
        self.built.borrow_mut().push(Rc::clone(&control));
        Box::new(FakeAnimation { control })
    }

    fn built_count(&self) -> usize {
        self.built.borrow().len()
    }

    fn animation(&self, index: usize) -> Rc<AnimationControl> {
        Rc::clone(&self.built.borrow()[index])
    }

    fn last(&self) -> Rc<AnimationControl> {
        Rc::clone(self.built.borrow().last().expect("no animation built"))
    }
}

impl TransitionProvider for FakeProvider {
    fn transition_to_following(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation> {
        self.build(AnimationKind::TransitionToFollowing, target, options)
    }

    fn transition_to_overview(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation> {
        self.build(AnimationKind::TransitionToOverview, target, options)
    }

    fn update_frame_for_following(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation> {
        self.build(AnimationKind::UpdateFollowing, target, options)
    }

    fn update_frame_for_overview(
        &self,
        target: &CameraOptions,
        options: TransitionOptions,
    ) -> Box<dyn CameraAnimation> {
        self.build(AnimationKind::UpdateOverview, target, options)
    }
}

/// Records register/unregister calls in order.
#[derive(Default)]
struct FakeEngine {
    events: RefCell<Vec<(&'static str, AnimationId)>>,
}

impl AnimationEngine for FakeEngine {
    fn register(&self, id: AnimationId) {
        self.events.borrow_mut().push(("register", id));
    }

    fn unregister(&self, id: AnimationId) {
        self.events.borrow_mut().push(("unregister", id));
    }
}

/// Records every state notification.
#[derive(Default)]
struct RecordingStateObserver {
    states: RefCell<Vec<NavigationCameraState>>,
}

impl NavigationCameraStateObserver for RecordingStateObserver {
    fn state_changed(&self, state: NavigationCameraState) {
        self.states.borrow_mut().push(state);
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn make_camera() -> (NavigationCamera, Rc<FakeProvider>, Rc<FakeEngine>) {
    let provider = Rc::new(FakeProvider::default());
    let engine = Rc::new(FakeEngine::default());
    let camera = NavigationCamera::new(
        provider.clone(),
        engine.clone(),
        TransitionConfig::default(),
    );
    (camera, provider, engine)
}

/// Viewport data with distinguishable zooms per context.
fn viewport_data(following_zoom: f64, overview_zoom: f64) -> ViewportData {
    let mut data = ViewportData::default();
    data.camera_for_following.zoom = following_zoom;
    data.camera_for_overview.zoom = overview_zoom;
    data
}

/// Drive a fresh camera into `Following`.
fn following_camera() -> (NavigationCamera, Rc<FakeProvider>, Rc<FakeEngine>) {
    let (camera, provider, engine) = make_camera();
    camera.request_following();
    provider.last().fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Following);
    (camera, provider, engine)
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn starts_idle_and_replays_state_on_subscribe() {
    let (camera, _, _) = make_camera();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    let observer = Rc::new(RecordingStateObserver::default());
    camera.register_state_observer(observer.clone());
    assert_eq!(
        observer.states.borrow().as_slice(),
        &[NavigationCameraState::Idle]
    );
}

#[test]
fn transition_to_following_walks_through_the_transition_state() {
    let (camera, provider, _) = make_camera();
    let observer = Rc::new(RecordingStateObserver::default());
    camera.register_state_observer(observer.clone());

    camera.viewport_data_changed(&viewport_data(15.0, 11.0));
    camera.request_following();

    // The provider was handed the latest following bundle.
    let animation = provider.last();
    assert_eq!(animation.kind, AnimationKind::TransitionToFollowing);
    assert_eq!(animation.target.zoom, 15.0);
    assert_eq!(
        animation.options,
        TransitionOptions::new(TransitionConfig::default().state_transition_max_duration)
    );
    assert!(animation.started.get());
    assert_eq!(camera.state(), NavigationCameraState::TransitionToFollowing);

    animation.fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Following);
    assert_eq!(
        observer.states.borrow().as_slice(),
        &[
            NavigationCameraState::Idle,
            NavigationCameraState::TransitionToFollowing,
            NavigationCameraState::Following,
        ]
    );
}

#[test]
fn repeated_requests_for_the_current_mode_are_no_ops() {
    let (camera, provider, _) = make_camera();
    camera.request_following();
    assert_eq!(provider.built_count(), 1);

    // Requesting again mid-transition builds nothing.
    camera.request_following();
    assert_eq!(provider.built_count(), 1);
    assert_eq!(camera.state(), NavigationCameraState::TransitionToFollowing);

    provider.last().fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Following);

    // And again once settled.
    camera.request_following();
    assert_eq!(provider.built_count(), 1);
    assert_eq!(camera.state(), NavigationCameraState::Following);
}

#[test]
fn cancelled_transitions_settle_in_idle() {
    let (camera, provider, _) = make_camera();
    camera.request_overview();
    assert_eq!(camera.state(), NavigationCameraState::TransitionToOverview);

    // The cancel callback always precedes the end callback.
    let animation = provider.last();
    animation.fire_cancel();
    animation.fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Idle);
}

#[test]
fn request_idle_is_synchronous_from_every_state() {
    // Idle.
    let (camera, _, _) = make_camera();
    camera.request_idle();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    // TransitionToFollowing.
    let (camera, provider, _) = make_camera();
    camera.request_following();
    camera.request_idle();
    assert_eq!(camera.state(), NavigationCameraState::Idle);
    // The provider-reported cancellation arriving later changes nothing.
    let animation = provider.animation(0);
    assert!(animation.canceled.get());
    animation.fire_cancel();
    animation.fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    // Following.
    let (camera, _, _) = following_camera();
    camera.request_idle();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    // TransitionToOverview.
    let (camera, _, _) = make_camera();
    camera.request_overview();
    camera.request_idle();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    // Overview.
    let (camera, provider, _) = make_camera();
    camera.request_overview();
    provider.last().fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Overview);
    camera.request_idle();
    assert_eq!(camera.state(), NavigationCameraState::Idle);
}

#[test]
fn a_new_request_supersedes_the_running_transition() {
    let (camera, provider, engine) = make_camera();
    camera.request_following();
    let first = provider.animation(0);

    camera.request_overview();
    let second = provider.animation(1);
    assert!(first.canceled.get());
    assert_eq!(camera.state(), NavigationCameraState::TransitionToOverview);

    // The superseded animation's late callbacks cannot clobber the new
    // transition.
    first.fire_cancel();
    first.fire_end();
    assert_eq!(camera.state(), NavigationCameraState::TransitionToOverview);

    second.fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Overview);

    // One active animation set at a time: the first was deregistered
    // before the second was registered.
    let events = engine.events.borrow();
    assert_eq!(
        events.as_slice(),
        &[
            ("register", first.id),
            ("unregister", first.id),
            ("register", second.id),
        ]
    );
}

#[test]
fn publications_update_the_frame_only_in_stable_states() {
    let (camera, provider, _) = make_camera();

    // Ignored while idle.
    camera.viewport_data_changed(&viewport_data(15.0, 11.0));
    assert_eq!(provider.built_count(), 0);

    // Ignored mid-transition; the transition keeps running.
    camera.request_following();
    camera.viewport_data_changed(&viewport_data(15.5, 11.0));
    assert_eq!(provider.built_count(), 1);

    provider.last().fire_end();
    assert_eq!(camera.state(), NavigationCameraState::Following);

    // Applied once following: a non-instant frame update toward the new
    // following bundle, state unchanged.
    camera.viewport_data_changed(&viewport_data(16.0, 11.0));
    let update = provider.last();
    assert_eq!(update.kind, AnimationKind::UpdateFollowing);
    assert_eq!(update.target.zoom, 16.0);
    assert!(!update.options.is_instant());
    assert_eq!(
        update.options,
        TransitionOptions::new(TransitionConfig::default().frame_update_max_duration)
    );
    assert_eq!(camera.state(), NavigationCameraState::Following);
}

#[test]
fn overview_publications_use_the_overview_bundle() {
    let (camera, provider, _) = make_camera();
    camera.request_overview();
    provider.last().fire_end();

    camera.viewport_data_changed(&viewport_data(16.0, 12.5));
    let update = provider.last();
    assert_eq!(update.kind, AnimationKind::UpdateOverview);
    assert_eq!(update.target.zoom, 12.5);
}

#[test]
fn reset_frame_jumps_instantly_in_stable_states_only() {
    let (camera, provider, _) = following_camera();
    camera.viewport_data_changed(&viewport_data(14.5, 11.0));
    let updates_so_far = provider.built_count();

    camera.reset_frame();
    let reset = provider.last();
    assert_eq!(provider.built_count(), updates_so_far + 1);
    assert_eq!(reset.kind, AnimationKind::UpdateFollowing);
    assert_eq!(reset.target.zoom, 14.5);
    assert!(reset.options.is_instant());
    assert_eq!(camera.state(), NavigationCameraState::Following);

    // No-op while idle.
    camera.request_idle();
    camera.reset_frame();
    assert_eq!(provider.built_count(), updates_so_far + 1);
}

#[test]
fn frame_updates_replace_the_previous_animation() {
    let (camera, provider, engine) = following_camera();

    camera.viewport_data_changed(&viewport_data(14.0, 11.0));
    camera.viewport_data_changed(&viewport_data(14.5, 11.0));

    // Transition, then two updates; each start replaced its predecessor.
    assert_eq!(provider.built_count(), 3);
    assert!(provider.animation(1).canceled.get());
    assert!(!provider.animation(2).canceled.get());

    let events = engine.events.borrow();
    let unregistered: Vec<AnimationId> = events
        .iter()
        .filter(|(kind, _)| *kind == "unregister")
        .map(|(_, id)| *id)
        .collect();
    assert_eq!(unregistered, vec![provider.animation(0).id, provider.animation(1).id]);
}

#[test]
fn gestures_drop_the_camera_to_idle() {
    let (camera, provider, _) = following_camera();
    let observer = Rc::new(RecordingStateObserver::default());
    camera.register_state_observer(observer.clone());

    camera.on_gesture_move_begin();
    assert_eq!(camera.state(), NavigationCameraState::Idle);

    // Publications are ignored again after the gesture.
    camera.viewport_data_changed(&viewport_data(16.0, 11.0));
    assert_eq!(provider.built_count(), 1);

    // A gesture while already idle notifies nobody.
    camera.on_gesture_move_begin();
    assert_eq!(
        observer.states.borrow().as_slice(),
        &[NavigationCameraState::Following, NavigationCameraState::Idle]
    );
}

#[test]
fn unregistered_observers_stop_receiving_notifications() {
    let (camera, provider, _) = make_camera();
    let observer = Rc::new(RecordingStateObserver::default());
    camera.register_state_observer(observer.clone());

    let subscriber: Rc<dyn NavigationCameraStateObserver> = observer.clone();
    camera.unregister_state_observer(&subscriber);

    camera.request_following();
    provider.last().fire_end();
    assert_eq!(
        observer.states.borrow().as_slice(),
        &[NavigationCameraState::Idle]
    );
}
