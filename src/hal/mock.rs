//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and network traits,
//! enabling development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockMotionSensor`] | [`MotionSensor`] | Settable motion level or scripted readings |
//! | [`MockDisplay`] | [`AlarmDisplay`] | Records rendered lines |
//! | [`MockNotifier`] | [`Notifier`] | Captures sent messages (requires `std`) |
//!
//! # Example
//!
//! ```rust
//! use rs_sentinel::{AlarmState, AlarmStateMachine};
//! use rs_sentinel::hal::{MockClock, MockMotionSensor};
//! use rs_sentinel::traits::{Clock, MotionSensor};
//!
//! let clock = MockClock::new();
//! let mut sensor = MockMotionSensor::new();
//! let mut alarm = AlarmStateMachine::new(clock.now_ms());
//!
//! sensor.set_motion(true);
//! alarm.tick(sensor.read_motion().unwrap(), clock.now_ms());
//! assert_eq!(alarm.state(), AlarmState::CountdownActive);
//! ```
//!
//! [`Clock`]: crate::traits::Clock
//! [`MotionSensor`]: crate::traits::MotionSensor
//! [`AlarmDisplay`]: crate::traits::AlarmDisplay
//! [`Notifier`]: crate::traits::Notifier

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::traits::{AlarmDisplay, Clock, MotionSensor, Rgb};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock clock for testing.
///
/// Time only moves when you move it. Uses an atomic so one clock can be
/// shared (by reference or `Arc`) between a test and the code under test.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::hal::MockClock;
/// use rs_sentinel::traits::Clock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: AtomicU64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock clock starting at `ms`.
    pub fn starting_at(ms: u64) -> Self {
        Self {
            current_ms: AtomicU64::new(ms),
        }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the current time in whole seconds.
    pub fn set_secs(&self, secs: u64) {
        self.set(secs * 1000);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

/// Mock motion sensor for testing.
///
/// Returns scripted readings first (FIFO), then the current level.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::hal::MockMotionSensor;
/// use rs_sentinel::traits::MotionSensor;
///
/// let mut sensor = MockMotionSensor::new();
/// sensor.queue_reading(true);
/// sensor.queue_reading(false);
///
/// assert_eq!(sensor.read_motion(), Ok(true));
/// assert_eq!(sensor.read_motion(), Ok(false));
/// assert_eq!(sensor.read_motion(), Ok(false)); // level
///
/// sensor.fail_next_read();
/// assert!(sensor.read_motion().is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockMotionSensor {
    /// Level returned once the script is exhausted.
    pub motion: bool,
    /// Number of reads so far.
    pub read_count: usize,
    scripted: VecDeque<bool>,
    fail_next: bool,
}

/// Error returned by [`MockMotionSensor`] after [`fail_next_read`](MockMotionSensor::fail_next_read).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockSensorFault;

impl core::fmt::Display for MockSensorFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("mock sensor fault")
    }
}

impl MockMotionSensor {
    /// Creates a sensor reporting no motion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the steady motion level.
    pub fn set_motion(&mut self, motion: bool) {
        self.motion = motion;
    }

    /// Queues a one-off reading.
    pub fn queue_reading(&mut self, motion: bool) {
        self.scripted.push_back(motion);
    }

    /// Makes the next read fail.
    pub fn fail_next_read(&mut self) {
        self.fail_next = true;
    }
}

impl MotionSensor for MockMotionSensor {
    type Error = MockSensorFault;

    fn read_motion(&mut self) -> Result<bool, MockSensorFault> {
        self.read_count += 1;
        if core::mem::take(&mut self.fail_next) {
            return Err(MockSensorFault);
        }
        Ok(self.scripted.pop_front().unwrap_or(self.motion))
    }
}

/// Mock display for testing.
///
/// Tracks every line shown so tests can assert on the full history.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::hal::MockDisplay;
/// use rs_sentinel::traits::{AlarmDisplay, Rgb};
///
/// let mut display = MockDisplay::new();
/// display.init().unwrap();
/// display.show("Monitoring...   ", Rgb::NORMAL).unwrap();
///
/// assert_eq!(display.last_text(), Some("Monitoring..."));
/// assert_eq!(display.shown.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDisplay {
    /// Every line passed to `show()`, in order.
    pub shown: Vec<(String, Rgb)>,
    /// Whether init() was called.
    pub initialized: bool,
    /// Number of times clear() was called.
    pub clear_count: usize,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last line shown, without trailing padding.
    pub fn last_text(&self) -> Option<&str> {
        self.shown.last().map(|(line, _)| line.trim_end())
    }

    /// The color of the last line shown.
    pub fn last_color(&self) -> Option<Rgb> {
        self.shown.last().map(|(_, color)| *color)
    }

    /// How many times `text` was shown.
    pub fn count(&self, text: &str) -> usize {
        self.shown
            .iter()
            .filter(|(line, _)| line.trim_end() == text)
            .count()
    }
}

impl AlarmDisplay for MockDisplay {
    type Error = ();

    fn init(&mut self) -> Result<(), ()> {
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ()> {
        self.clear_count += 1;
        Ok(())
    }

    fn show(&mut self, line: &str, color: Rgb) -> Result<(), ()> {
        self.shown.push((String::from(line), color));
        Ok(())
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock notifier for testing.
///
/// Captures every message. Clones share the same log, so a test can keep
/// one handle while the code under test owns another.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::hal::MockNotifier;
/// use rs_sentinel::traits::Notifier;
///
/// let notifier = MockNotifier::new();
/// let handle = notifier.clone();
/// handle.notify("Person detected");
///
/// assert_eq!(notifier.messages(), vec!["Person detected".to_string()]);
/// ```
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct MockNotifier {
    sent: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(feature = "std")]
impl MockNotifier {
    /// Creates a notifier with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far.
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// How many times `message` was sent.
    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| *m == message).count()
    }

    /// Forgets all captured messages.
    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(feature = "std")]
impl crate::traits::Notifier for MockNotifier {
    fn notify(&self, message: &str) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(String::from(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starting_at() {
        let clock = MockClock::starting_at(250);
        assert_eq!(clock.now_ms(), 250);
        clock.set_secs(3);
        assert_eq!(clock.now_ms(), 3_000);
    }

    #[test]
    fn sensor_script_then_level() {
        let mut sensor = MockMotionSensor::new();
        sensor.set_motion(true);
        sensor.queue_reading(false);

        assert_eq!(sensor.read_motion(), Ok(false));
        assert_eq!(sensor.read_motion(), Ok(true));
        assert_eq!(sensor.read_count, 2);
    }

    #[test]
    fn sensor_failure_is_one_shot() {
        let mut sensor = MockMotionSensor::new();
        sensor.fail_next_read();
        assert_eq!(sensor.read_motion(), Err(MockSensorFault));
        assert_eq!(sensor.read_motion(), Ok(false));
    }

    #[test]
    fn display_history() {
        let mut display = MockDisplay::new();
        display.show("Person detected ", Rgb::ALERT).unwrap();
        display.show("Monitoring...   ", Rgb::NORMAL).unwrap();
        display.show("Monitoring...   ", Rgb::NORMAL).unwrap();

        assert_eq!(display.count("Monitoring..."), 2);
        assert_eq!(display.count("Person detected"), 1);
        assert_eq!(display.last_color(), Some(Rgb::NORMAL));
        display.clear().unwrap();
        assert_eq!(display.clear_count, 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn notifier_clones_share_log() {
        use crate::traits::Notifier;

        let notifier = MockNotifier::new();
        let other = notifier.clone();
        other.notify("a");
        notifier.notify("b");
        assert_eq!(notifier.messages(), vec!["a", "b"]);
        assert_eq!(other.count("a"), 1);
        notifier.clear();
        assert!(other.messages().is_empty());
    }
}
