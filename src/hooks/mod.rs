//! Integration hooks bridging host-app event sources into the Track client.
//!
//! Each hook observes a [`tokio::sync::watch`] channel fed by the host
//! platform (notification delivery, navigation state) and reacts to every
//! change. Hooks run as plain async loops — spawn them on the runtime and
//! tear them down with a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! or by dropping the channel sender.

pub mod navigation;
pub mod notifications;

pub use navigation::{NavigationState, Route, ScreenTrackingHook};
pub use notifications::{
    DeepLinkOpener, NotificationHook, NotificationPayload, NotificationResponse,
};

/// What a hook does with a failed tracking call.
///
/// Made explicit per hook instead of baked-in defaults: the notification
/// hook runs with [`LogAndContinue`](Self::LogAndContinue) in production
/// (a tracking failure must never reach the UI), while screen tracking
/// historically let failures escape — [`Propagate`](Self::Propagate)
/// reproduces that as a clean loop exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the error from the hook's `run` loop.
    Propagate,
    /// Log the error at `warn` level and keep observing.
    LogAndContinue,
}
