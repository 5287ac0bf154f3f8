//! Camera operating states.

use std::fmt;

/// The operating state of the navigation camera.
///
/// `Idle` is both the initial state and reachable from anywhere;
/// `Following` and `Overview` are stable; the two transition states exist
/// only while an animation toward the matching stable state is running and
/// can never be requested directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationCameraState {
    /// The camera is not being managed; the user or host controls it.
    #[default]
    Idle,
    /// Animating toward the following frame.
    TransitionToFollowing,
    /// Tracking the vehicle with the following frame.
    Following,
    /// Animating toward the overview frame.
    TransitionToOverview,
    /// Framing the remaining route from above.
    Overview,
}

impl fmt::Display for NavigationCameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationCameraState::Idle => "idle",
            NavigationCameraState::TransitionToFollowing => "transition-to-following",
            NavigationCameraState::Following => "following",
            NavigationCameraState::TransitionToOverview => "transition-to-overview",
            NavigationCameraState::Overview => "overview",
        };
        f.write_str(name)
    }
}

/// Receives camera state change notifications.
///
/// Observers are notified on the calling thread and receive the current
/// state immediately upon registration.
pub trait NavigationCameraStateObserver {
    /// Called whenever the camera state changes.
    fn state_changed(&self, state: NavigationCameraState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(NavigationCameraState::default(), NavigationCameraState::Idle);
    }

    #[test]
    fn display_names_are_stable() {
        assert_eq!(NavigationCameraState::TransitionToOverview.to_string(), "transition-to-overview");
    }
}
