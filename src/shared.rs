//! Unified shared state for the poller and the HTTP endpoint.
//!
//! `SharedAlarmState` owns the single [`AlarmStateMachine`] along with the
//! clock and notifier. The poller ticks it; the web handler disarms it and
//! reads its status. Every machine call happens under one lock, and any
//! resulting notification is handed off only after the lock is released.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_sentinel::{AlarmState, AlarmStateMachine};
//! use rs_sentinel::hal::{MockClock, MockNotifier};
//! use rs_sentinel::SharedAlarmState;
//!
//! let clock = Arc::new(MockClock::new());
//! let notifier = MockNotifier::new();
//! let state = SharedAlarmState::new(AlarmStateMachine::new(0), Arc::clone(&clock), notifier.clone());
//!
//! state.tick(true);
//! assert_eq!(state.status().state, AlarmState::CountdownActive);
//! assert_eq!(notifier.messages(), vec!["Person detected"]);
//!
//! clock.advance(1_000);
//! assert!(state.disarm("0000", "4321").is_err());
//! assert!(state.disarm("4321", "4321").is_ok());
//! assert_eq!(state.status().state, AlarmState::Disarmed);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::alarm::{AlarmEffects, AlarmStateMachine, AlarmStatus, Transition};
use crate::error::AccessDenied;
use crate::traits::{Clock, Notifier};

// ============================================================================
// Alarm Control Trait
// ============================================================================

/// Access to the alarm from request handlers.
///
/// Lets the HTTP layer work with any clock/notifier combination without
/// carrying their type parameters.
pub trait AlarmControl: Send + Sync {
    /// Snapshot of the current state.
    fn status(&self) -> AlarmStatus;

    /// Current timestamp in milliseconds.
    fn now_ms(&self) -> u64;

    /// Attempt a disarm, reporting a rejected code as a notification.
    fn disarm(&self, submitted: &str, expected: &str) -> Result<Transition, AccessDenied>;
}

// ============================================================================
// Shared Alarm State
// ============================================================================

/// The alarm machine plus its collaborators, safe to share across threads.
///
/// # Thread Safety
///
/// - Uses `Mutex` (not `RwLock`): the poller writes on every tick, so reads
///   gain nothing from shared locking.
/// - The clock is read before the lock is taken; the notifier is called
///   after it is dropped. A slow notifier never stalls the poller or a
///   concurrent request.
/// - A poisoned lock is recovered; the machine has no partially-applied
///   updates to fear.
pub struct SharedAlarmState<C: Clock, N: Notifier> {
    machine: Mutex<AlarmStateMachine>,
    clock: C,
    notifier: N,
}

impl<C: Clock, N: Notifier> SharedAlarmState<C, N> {
    /// Wrap a machine with the clock that drives it and the notifier that
    /// reports its changes.
    pub fn new(machine: AlarmStateMachine, clock: C, notifier: N) -> Self {
        Self {
            machine: Mutex::new(machine),
            clock,
            notifier,
        }
    }

    /// Current timestamp in milliseconds.
    ///
    /// All callers share this time base.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The clock driving this state.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The notifier receiving this state's messages.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Access the machine under the lock.
    ///
    /// The closure pattern keeps the lock from being held across await
    /// points or notifier calls.
    pub fn with_machine<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut AlarmStateMachine) -> R,
    {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Feed one motion reading to the machine.
    ///
    /// Returns the effects so the caller can render the display line; the
    /// notification, if any, has already been handed to the notifier.
    pub fn tick(&self, motion_present: bool) -> AlarmEffects {
        let now_ms = self.now_ms();
        let effects = self.with_machine(|machine| machine.tick(motion_present, now_ms));

        if let Some(message) = effects.notification {
            self.notifier.notify(message);
        }
        effects
    }

    /// Attempt a disarm with `submitted` against `expected`.
    ///
    /// A mismatch leaves the state unchanged and sends the invalid-code
    /// notification.
    pub fn disarm(&self, submitted: &str, expected: &str) -> Result<Transition, AccessDenied> {
        let now_ms = self.now_ms();
        let result = self.with_machine(|machine| machine.disarm(submitted, expected, now_ms));

        match &result {
            Ok(transition) => {
                tracing::info!(from = transition.from.as_str(), "alarm disarmed");
            }
            Err(denied) => {
                tracing::warn!("disarm rejected: {}", denied);
                self.notifier.notify(denied.notification());
            }
        }
        result
    }

    /// Read-only snapshot.
    pub fn status(&self) -> AlarmStatus {
        let now_ms = self.now_ms();
        self.lock().status(now_ms)
    }

    fn lock(&self) -> MutexGuard<'_, AlarmStateMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C, N> AlarmControl for SharedAlarmState<C, N>
where
    C: Clock + Send + Sync,
    N: Notifier,
{
    fn status(&self) -> AlarmStatus {
        SharedAlarmState::status(self)
    }

    fn now_ms(&self) -> u64 {
        SharedAlarmState::now_ms(self)
    }

    fn disarm(&self, submitted: &str, expected: &str) -> Result<Transition, AccessDenied> {
        SharedAlarmState::disarm(self, submitted, expected)
    }
}
