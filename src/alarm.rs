//! Alarm state machine driven by motion readings and elapsed time.
//!
//! This module provides [`AlarmStateMachine`], the central component that
//! decides when a detection becomes an alarm and when the system re-arms.
//!
//! # State Machine
//!
//! ```text
//!            motion               > countdown
//!   Idle ───────────► Countdown ────────────► Triggered
//!    ▲                    │                      │
//!    │                    │ disarm               │ > cooldown
//!    │                    ▼                      │
//!    │  > cooldown    Disarmed ◄─── disarm ──────┤
//!    └────────────────────┘                      │
//!    └───────────────────────────────────────────┘
//! ```
//!
//! `disarm` with the right code moves any state to `Disarmed`. Motion is
//! only looked at while `Idle`; every other state runs on its timer.
//!
//! # Side Effects
//!
//! The machine does no I/O. Each call returns an [`AlarmEffects`]
//! describing the display update and notification (at most one of each)
//! that the caller should apply once the new state is committed.
//!
//! # Example
//!
//! ```rust
//! use rs_sentinel::{AlarmState, AlarmStateMachine};
//!
//! let mut alarm = AlarmStateMachine::new(0);
//!
//! let effects = alarm.tick(true, 0);
//! assert_eq!(alarm.state(), AlarmState::CountdownActive);
//! assert_eq!(effects.notification, Some("Person detected"));
//!
//! // Still counting down after 29 seconds
//! alarm.tick(false, 29_000);
//! assert_eq!(alarm.state(), AlarmState::CountdownActive);
//!
//! // Fires after 30 seconds
//! alarm.tick(false, 31_000);
//! assert_eq!(alarm.state(), AlarmState::AlarmTriggered);
//!
//! // Disarm with the right code
//! alarm.disarm("4321", "4321", 35_000).unwrap();
//! assert_eq!(alarm.state(), AlarmState::Disarmed);
//! ```

use crate::error::AccessDenied;
use crate::traits::{fit_line, DisplayLine, Rgb, MSG_ALARM_TRIGGERED, MSG_PERSON_DETECTED};

/// Status line while nothing is pending.
pub const MSG_MONITORING: &str = "Monitoring...";

/// The four mutually exclusive alarm states.
///
/// # Default
///
/// Defaults to [`Idle`](Self::Idle), the startup state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlarmState {
    /// No motion detected, nothing pending.
    #[default]
    Idle,
    /// Motion detected; the grace period is running.
    CountdownActive,
    /// The grace period expired without a disarm.
    AlarmTriggered,
    /// An operator disarmed the system; new motion is ignored.
    Disarmed,
}

impl AlarmState {
    /// Returns the state as a snake_case string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_sentinel::AlarmState;
    ///
    /// assert_eq!(AlarmState::Idle.as_str(), "idle");
    /// assert_eq!(AlarmState::CountdownActive.as_str(), "countdown_active");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlarmState::Idle => "idle",
            AlarmState::CountdownActive => "countdown_active",
            AlarmState::AlarmTriggered => "alarm_triggered",
            AlarmState::Disarmed => "disarmed",
        }
    }

    /// Returns `true` if new motion would start a countdown.
    #[inline]
    pub const fn is_armed(&self) -> bool {
        matches!(self, AlarmState::Idle)
    }
}

/// Lengths of the countdown and cool-down windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlarmTiming {
    /// Grace period between detection and alarm, in milliseconds.
    pub countdown_ms: u64,
    /// Quiet period after an alarm or disarm before re-arming, in milliseconds.
    pub cooldown_ms: u64,
}

impl AlarmTiming {
    /// 30 second countdown.
    pub const DEFAULT_COUNTDOWN_MS: u64 = 30_000;
    /// 120 second cool-down.
    pub const DEFAULT_COOLDOWN_MS: u64 = 120_000;
}

impl Default for AlarmTiming {
    fn default() -> Self {
        Self {
            countdown_ms: Self::DEFAULT_COUNTDOWN_MS,
            cooldown_ms: Self::DEFAULT_COOLDOWN_MS,
        }
    }
}

/// A committed state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State before the change.
    pub from: AlarmState,
    /// State after the change.
    pub to: AlarmState,
    /// When the new state was entered.
    pub at_ms: u64,
}

/// A fitted status line and its color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayUpdate {
    /// Text padded or truncated to the display width.
    pub line: DisplayLine,
    /// Backlight/color hint.
    pub color: Rgb,
}

impl DisplayUpdate {
    /// Fits `text` to the display and pairs it with `color`.
    pub fn new(text: &str, color: Rgb) -> Self {
        Self {
            line: fit_line(text),
            color,
        }
    }

    /// The "Monitoring..." heartbeat line.
    pub fn monitoring() -> Self {
        Self::new(MSG_MONITORING, Rgb::NORMAL)
    }

    /// The line text without trailing padding.
    pub fn text(&self) -> &str {
        self.line.trim_end()
    }
}

/// Side effects produced by one [`tick`](AlarmStateMachine::tick) or
/// [`disarm`](AlarmStateMachine::disarm) call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlarmEffects {
    /// The transition that was committed, if any.
    pub transition: Option<Transition>,
    /// Line to render, if any.
    pub display: Option<DisplayUpdate>,
    /// Message to send, if any.
    pub notification: Option<&'static str>,
}

impl AlarmEffects {
    fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if the call changed state.
    pub fn changed(&self) -> bool {
        self.transition.is_some()
    }
}

/// Snapshot of the machine for UI/API.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::{AlarmState, AlarmStateMachine};
///
/// let alarm = AlarmStateMachine::new(1_000);
/// let status = alarm.status(4_000);
/// assert_eq!(status.state, AlarmState::Idle);
/// assert_eq!(status.elapsed_ms, 3_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmStatus {
    /// Current state.
    pub state: AlarmState,
    /// When the current state was entered.
    pub state_entered_at_ms: u64,
    /// Time spent in the current state.
    pub elapsed_ms: u64,
}

/// The alarm state machine.
///
/// Holds one [`AlarmState`] and the time it was entered. All elapsed-time
/// comparisons use that single timestamp.
///
/// # Thread Safety
///
/// The machine itself is not thread-safe. The poller and the HTTP handler
/// share it through [`SharedAlarmState`], which serializes every call
/// behind one lock.
///
/// [`SharedAlarmState`]: crate::SharedAlarmState
#[derive(Clone, Debug)]
pub struct AlarmStateMachine {
    state: AlarmState,
    state_entered_at_ms: u64,
    timing: AlarmTiming,
}

impl AlarmStateMachine {
    /// Create a machine in `Idle` with the default windows.
    pub fn new(now_ms: u64) -> Self {
        Self::with_timing(AlarmTiming::default(), now_ms)
    }

    /// Create a machine in `Idle` with custom windows.
    pub fn with_timing(timing: AlarmTiming, now_ms: u64) -> Self {
        Self {
            state: AlarmState::Idle,
            state_entered_at_ms: now_ms,
            timing,
        }
    }

    /// Advance the machine - call every poll interval.
    ///
    /// Timeouts of the timed states are checked before new motion, so a
    /// stray reading can never re-arm a countdown, an alarm, or a disarm
    /// window. While `Idle` with no motion the heartbeat line is redrawn;
    /// the timed states produce nothing until they expire.
    pub fn tick(&mut self, motion_present: bool, now_ms: u64) -> AlarmEffects {
        let elapsed = self.elapsed_ms(now_ms);

        match self.state {
            AlarmState::AlarmTriggered => {
                if elapsed > self.timing.cooldown_ms {
                    let transition = self.enter(AlarmState::Idle, now_ms);
                    AlarmEffects {
                        transition: Some(transition),
                        display: Some(DisplayUpdate::monitoring()),
                        notification: None,
                    }
                } else {
                    AlarmEffects::none()
                }
            }

            AlarmState::Disarmed => {
                if elapsed > self.timing.cooldown_ms {
                    let transition = self.enter(AlarmState::Idle, now_ms);
                    AlarmEffects {
                        transition: Some(transition),
                        display: None,
                        notification: None,
                    }
                } else {
                    AlarmEffects::none()
                }
            }

            AlarmState::CountdownActive => {
                if elapsed > self.timing.countdown_ms {
                    let transition = self.enter(AlarmState::AlarmTriggered, now_ms);
                    AlarmEffects {
                        transition: Some(transition),
                        display: Some(DisplayUpdate::new(MSG_ALARM_TRIGGERED, Rgb::ALERT)),
                        notification: Some(MSG_ALARM_TRIGGERED),
                    }
                } else {
                    AlarmEffects::none()
                }
            }

            AlarmState::Idle if motion_present => {
                let transition = self.enter(AlarmState::CountdownActive, now_ms);
                AlarmEffects {
                    transition: Some(transition),
                    display: Some(DisplayUpdate::new(MSG_PERSON_DETECTED, Rgb::ALERT)),
                    notification: Some(MSG_PERSON_DETECTED),
                }
            }

            AlarmState::Idle => AlarmEffects {
                transition: None,
                display: Some(DisplayUpdate::monitoring()),
                notification: None,
            },
        }
    }

    /// Attempt to disarm with `submitted`.
    ///
    /// On a match the machine enters `Disarmed` at `now_ms` from any state,
    /// restarting the window if it was already disarmed. On a mismatch the
    /// state is untouched and [`AccessDenied`] is returned; the caller
    /// reports [`AccessDenied::notification`].
    pub fn disarm(
        &mut self,
        submitted: &str,
        expected: &str,
        now_ms: u64,
    ) -> Result<Transition, AccessDenied> {
        if !codes_match(submitted, expected) {
            return Err(AccessDenied);
        }
        Ok(self.enter(AlarmState::Disarmed, now_ms))
    }

    /// Get the current state
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Get the time the current state was entered
    pub fn state_entered_at_ms(&self) -> u64 {
        self.state_entered_at_ms
    }

    /// Get the configured windows
    pub fn timing(&self) -> AlarmTiming {
        self.timing
    }

    /// Time spent in the current state at `now_ms`.
    ///
    /// Saturates at zero if `now_ms` is behind the entry time.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_entered_at_ms)
    }

    /// Get a snapshot for UI/API
    pub fn status(&self, now_ms: u64) -> AlarmStatus {
        AlarmStatus {
            state: self.state,
            state_entered_at_ms: self.state_entered_at_ms,
            elapsed_ms: self.elapsed_ms(now_ms),
        }
    }

    fn enter(&mut self, to: AlarmState, now_ms: u64) -> Transition {
        let from = self.state;
        self.state = to;
        self.state_entered_at_ms = now_ms;
        tracing::info!(from = from.as_str(), to = to.as_str(), at_ms = now_ms, "alarm transition");
        Transition {
            from,
            to,
            at_ms: now_ms,
        }
    }
}

/// Compares two codes without stopping at the first differing byte.
fn codes_match(submitted: &str, expected: &str) -> bool {
    let a = submitted.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u64 = 1_000;

    // =========================================================================
    // AlarmState Tests
    // =========================================================================

    #[test]
    fn state_default_is_idle() {
        assert_eq!(AlarmState::default(), AlarmState::Idle);
    }

    #[test]
    fn state_as_str() {
        assert_eq!(AlarmState::Idle.as_str(), "idle");
        assert_eq!(AlarmState::CountdownActive.as_str(), "countdown_active");
        assert_eq!(AlarmState::AlarmTriggered.as_str(), "alarm_triggered");
        assert_eq!(AlarmState::Disarmed.as_str(), "disarmed");
    }

    #[test]
    fn only_idle_is_armed() {
        assert!(AlarmState::Idle.is_armed());
        assert!(!AlarmState::CountdownActive.is_armed());
        assert!(!AlarmState::AlarmTriggered.is_armed());
        assert!(!AlarmState::Disarmed.is_armed());
    }

    // =========================================================================
    // tick() Tests
    // =========================================================================

    #[test]
    fn idle_without_motion_shows_heartbeat() {
        let mut alarm = AlarmStateMachine::new(0);
        let effects = alarm.tick(false, 5 * S);

        assert_eq!(alarm.state(), AlarmState::Idle);
        assert!(!effects.changed());
        assert_eq!(effects.display, Some(DisplayUpdate::monitoring()));
        assert_eq!(effects.notification, None);
    }

    #[test]
    fn motion_starts_countdown_at_now() {
        let mut alarm = AlarmStateMachine::new(0);
        let effects = alarm.tick(true, 7 * S);

        assert_eq!(alarm.state(), AlarmState::CountdownActive);
        assert_eq!(alarm.state_entered_at_ms(), 7 * S);
        assert_eq!(
            effects.transition,
            Some(Transition {
                from: AlarmState::Idle,
                to: AlarmState::CountdownActive,
                at_ms: 7 * S,
            })
        );
        let display = effects.display.unwrap();
        assert_eq!(display.text(), "Person detected");
        assert_eq!(display.color, Rgb::ALERT);
        assert_eq!(effects.notification, Some("Person detected"));
    }

    #[test]
    fn countdown_holds_through_window() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);

        for t in [1, 10, 29, 30] {
            let effects = alarm.tick(t % 2 == 0, t * S);
            assert_eq!(alarm.state(), AlarmState::CountdownActive, "t={t}s");
            assert_eq!(effects, AlarmEffects::default());
        }
        assert_eq!(alarm.state_entered_at_ms(), 0);
    }

    #[test]
    fn countdown_expiry_triggers_alarm() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);
        let effects = alarm.tick(false, 30 * S + 1);

        assert_eq!(alarm.state(), AlarmState::AlarmTriggered);
        assert_eq!(alarm.state_entered_at_ms(), 30 * S + 1);
        let display = effects.display.unwrap();
        assert_eq!(display.line.as_str(), "Alarm triggered!");
        assert_eq!(display.color, Rgb::ALERT);
        assert_eq!(effects.notification, Some("Alarm triggered!"));
    }

    #[test]
    fn triggered_ignores_motion_until_cooldown() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);
        alarm.tick(false, 31 * S);

        for t in [32, 60, 151] {
            let effects = alarm.tick(true, t * S);
            assert_eq!(alarm.state(), AlarmState::AlarmTriggered, "t={t}s");
            assert_eq!(effects, AlarmEffects::default());
        }
    }

    #[test]
    fn triggered_resets_after_cooldown() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);
        alarm.tick(false, 31 * S);
        let effects = alarm.tick(true, 151 * S + 1);

        assert_eq!(alarm.state(), AlarmState::Idle);
        assert_eq!(effects.display, Some(DisplayUpdate::monitoring()));
        assert_eq!(effects.notification, None);
    }

    #[test]
    fn reset_takes_priority_over_motion() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);
        alarm.tick(false, 31 * S);

        // The reset tick consumes the call; motion is only seen next tick
        alarm.tick(true, 200 * S);
        assert_eq!(alarm.state(), AlarmState::Idle);
        alarm.tick(true, 200 * S + 20);
        assert_eq!(alarm.state(), AlarmState::CountdownActive);
    }

    #[test]
    fn disarmed_ignores_motion_in_window() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.disarm("4321", "4321", 10 * S).unwrap();

        let effects = alarm.tick(true, 130 * S);
        assert_eq!(alarm.state(), AlarmState::Disarmed);
        assert_eq!(effects, AlarmEffects::default());
    }

    #[test]
    fn disarmed_resets_silently() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.disarm("4321", "4321", 10 * S).unwrap();

        let effects = alarm.tick(false, 130 * S + 1);
        assert_eq!(alarm.state(), AlarmState::Idle);
        assert!(effects.changed());
        assert_eq!(effects.display, None);
        assert_eq!(effects.notification, None);
    }

    #[test]
    fn custom_timing_windows() {
        let timing = AlarmTiming {
            countdown_ms: 500,
            cooldown_ms: 1_000,
        };
        let mut alarm = AlarmStateMachine::with_timing(timing, 0);
        alarm.tick(true, 0);
        alarm.tick(false, 501);
        assert_eq!(alarm.state(), AlarmState::AlarmTriggered);
        alarm.tick(false, 1_501);
        assert_eq!(alarm.state(), AlarmState::Idle);
        assert_eq!(alarm.timing(), timing);
    }

    #[test]
    fn clock_behind_entry_saturates() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 10 * S);
        let effects = alarm.tick(false, 5 * S);
        assert_eq!(alarm.state(), AlarmState::CountdownActive);
        assert_eq!(alarm.elapsed_ms(5 * S), 0);
        assert!(!effects.changed());
    }

    // =========================================================================
    // disarm() Tests
    // =========================================================================

    #[test]
    fn wrong_code_is_denied_without_change() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 0);

        let result = alarm.disarm("0000", "4321", 5 * S);
        assert_eq!(result, Err(AccessDenied));
        assert_eq!(alarm.state(), AlarmState::CountdownActive);
        assert_eq!(alarm.state_entered_at_ms(), 0);
    }

    #[test]
    fn code_prefix_is_denied() {
        let mut alarm = AlarmStateMachine::new(0);
        assert_eq!(alarm.disarm("432", "4321", 0), Err(AccessDenied));
        assert_eq!(alarm.disarm("43210", "4321", 0), Err(AccessDenied));
        assert_eq!(alarm.disarm("", "4321", 0), Err(AccessDenied));
    }

    #[test]
    fn correct_code_disarms_from_every_state() {
        let setups: [fn(&mut AlarmStateMachine); 4] = [
            |_| {},
            |a| {
                a.tick(true, 0);
            },
            |a| {
                a.tick(true, 0);
                a.tick(false, 31 * S);
            },
            |a| {
                let _ = a.disarm("4321", "4321", 0);
            },
        ];

        for setup in setups {
            let mut alarm = AlarmStateMachine::new(0);
            setup(&mut alarm);
            let from = alarm.state();
            let transition = alarm.disarm("4321", "4321", 40 * S).unwrap();
            assert_eq!(transition.from, from);
            assert_eq!(alarm.state(), AlarmState::Disarmed);
            assert_eq!(alarm.state_entered_at_ms(), 40 * S);
        }
    }

    #[test]
    fn codes_match_compares_whole_string() {
        assert!(codes_match("4321", "4321"));
        assert!(!codes_match("4322", "4321"));
        assert!(!codes_match("1234", "4321"));
        assert!(codes_match("", ""));
    }

    // =========================================================================
    // Status Tests
    // =========================================================================

    #[test]
    fn status_reports_elapsed() {
        let mut alarm = AlarmStateMachine::new(0);
        alarm.tick(true, 2 * S);
        let status = alarm.status(12 * S);
        assert_eq!(status.state, AlarmState::CountdownActive);
        assert_eq!(status.state_entered_at_ms, 2 * S);
        assert_eq!(status.elapsed_ms, 10 * S);
    }
}
