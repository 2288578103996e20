//! Network abstraction for remote state notifications.
//!
//! The alarm reports detections, triggers, and rejected disarm codes to a
//! remote datastore. Delivery is best-effort: the state machine never waits
//! for it and never learns whether it succeeded.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Notifier`] | Fire-and-forget status message sink |
//!
//! # Wire Format
//!
//! The HTTP implementation (`services::notify`, `notify` feature) sends
//! each message as a `PUT`, stamped with the UTC time the request is made:
//!
//! ```text
//! PUT $SERVER
//! X-Auth-Token: $AUTH_TOKEN
//! Content-Type: text/json
//!
//! {"state":"Person detected 2024-05-01T12:00:00Z"}
//! ```

/// Message sent when motion starts the countdown.
pub const MSG_PERSON_DETECTED: &str = "Person detected";

/// Message sent when the countdown expires.
pub const MSG_ALARM_TRIGGERED: &str = "Alarm triggered!";

/// Message sent when a disarm attempt uses the wrong code.
pub const MSG_INVALID_CODE: &str = "invalid code";

/// Fire-and-forget notification sink.
///
/// Implementations must return quickly: `notify` is called from the poller
/// thread and from HTTP handlers. Anything slow (network I/O) belongs on a
/// background task fed through a bounded queue.
///
/// # Implementation Notes
///
/// - An unconfigured notifier silently drops every message
/// - Failures are logged, never returned or retried
///
/// # Example
///
/// ```rust
/// use rs_sentinel::traits::{Notifier, NoopNotifier};
///
/// let notifier = NoopNotifier;
/// notifier.notify("Person detected"); // dropped
/// ```
pub trait Notifier: Send + Sync {
    /// Hands off `message` for delivery without blocking.
    fn notify(&self, message: &str);
}

/// Notifier that drops every message.
///
/// Used when no remote endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str) {}
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

#[cfg(feature = "std")]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

#[cfg(feature = "std")]
impl<N: Notifier + ?Sized> Notifier for std::boxed::Box<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}
