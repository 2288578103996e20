//! Background sensor poller that drives the alarm.
//!
//! The poller owns the motion sensor and the display. Each step reads the
//! sensor, ticks the shared state, and renders whatever line the tick
//! produced. Because only the poller ticks, only the poller draws, so the
//! display needs no lock of its own.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//! use rs_sentinel::AlarmStateMachine;
//! use rs_sentinel::hal::{MockClock, MockDisplay, MockMotionSensor, MockNotifier};
//! use rs_sentinel::{Poller, SharedAlarmState};
//!
//! let state = Arc::new(SharedAlarmState::new(
//!     AlarmStateMachine::new(0),
//!     MockClock::new(),
//!     MockNotifier::new(),
//! ));
//! let poller = Poller::new(Arc::clone(&state), MockMotionSensor::new(), MockDisplay::new())
//!     .with_interval(Duration::from_millis(5));
//!
//! let stop = Arc::new(AtomicBool::new(false));
//! let handle = poller.spawn(Arc::clone(&stop)).unwrap();
//!
//! std::thread::sleep(Duration::from_millis(20));
//! stop.store(true, Ordering::SeqCst);
//! assert!(handle.join().unwrap().is_ok());
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::alarm::AlarmEffects;
use crate::config::MAX_POLL_INTERVAL_MS;
use crate::traits::{AlarmDisplay, Clock, MotionSensor, Notifier};

use crate::shared::SharedAlarmState;

/// Default time between sensor reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Name given to the poller thread.
pub const POLLER_THREAD_NAME: &str = "alarm-poller";

/// Periodic sensor reader and display driver.
pub struct Poller<S, D, C, N>
where
    S: MotionSensor,
    D: AlarmDisplay,
    C: Clock,
    N: Notifier,
{
    state: Arc<SharedAlarmState<C, N>>,
    sensor: S,
    display: D,
    interval: Duration,
}

impl<S, D, C, N> Poller<S, D, C, N>
where
    S: MotionSensor,
    S::Error: Debug,
    D: AlarmDisplay,
    D::Error: Debug,
    C: Clock,
    N: Notifier,
{
    /// Create a poller over an initialized sensor and display.
    ///
    /// Uses [`DEFAULT_POLL_INTERVAL`].
    pub fn new(state: Arc<SharedAlarmState<C, N>>, sensor: S, display: D) -> Self {
        Self {
            state,
            sensor,
            display,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the time between reads.
    ///
    /// Clamped to 1..=100 ms so a detection is never noticed late.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.clamp(
            Duration::from_millis(1),
            Duration::from_millis(MAX_POLL_INTERVAL_MS as u64),
        );
        self
    }

    /// Get the poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Get a reference to the sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Get a mutable reference to the sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Get a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Read the sensor once, tick, and render.
    ///
    /// A failed sensor read is returned to the caller. A failed display
    /// write is logged and otherwise ignored.
    pub fn step(&mut self) -> Result<AlarmEffects, S::Error> {
        let motion = self.sensor.read_motion()?;
        let effects = self.state.tick(motion);

        if let Some(update) = &effects.display {
            if let Err(e) = self.display.show(&update.line, update.color) {
                tracing::warn!(error = ?e, "display update failed");
            }
        }
        Ok(effects)
    }

    /// Poll until `stop` is set or the sensor fails.
    ///
    /// The display is cleared on the way out either way.
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<(), S::Error> {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "poller started");

        let result = self.poll_loop(stop);

        if let Err(e) = &result {
            tracing::error!(error = ?e, "motion sensor read failed; poller stopping");
        }
        if let Err(e) = self.display.clear() {
            tracing::warn!(error = ?e, "display clear failed");
        }
        tracing::info!("poller stopped");
        result
    }

    fn poll_loop(&mut self, stop: &AtomicBool) -> Result<(), S::Error> {
        while !stop.load(Ordering::SeqCst) {
            self.step()?;
            thread::sleep(self.interval);
        }
        Ok(())
    }

    /// Run on a dedicated thread named [`POLLER_THREAD_NAME`].
    pub fn spawn(mut self, stop: Arc<AtomicBool>) -> std::io::Result<JoinHandle<Result<(), S::Error>>>
    where
        S: Send + 'static,
        S::Error: Send + 'static,
        D: Send + 'static,
        C: Send + Sync + 'static,
        N: 'static,
    {
        thread::Builder::new()
            .name(POLLER_THREAD_NAME.into())
            .spawn(move || self.run_until(&stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmState, AlarmStateMachine};
    use crate::hal::{MockClock, MockDisplay, MockMotionSensor, MockNotifier, MockSensorFault};
    use crate::traits::Rgb;

    type TestPoller = Poller<MockMotionSensor, MockDisplay, Arc<MockClock>, MockNotifier>;

    fn poller() -> (Arc<MockClock>, MockNotifier, TestPoller) {
        let clock = Arc::new(MockClock::new());
        let notifier = MockNotifier::new();
        let state = Arc::new(SharedAlarmState::new(
            AlarmStateMachine::new(0),
            Arc::clone(&clock),
            notifier.clone(),
        ));
        let poller = Poller::new(state, MockMotionSensor::new(), MockDisplay::new());
        (clock, notifier, poller)
    }

    #[test]
    fn interval_is_clamped() {
        let (_, _, p) = poller();
        assert_eq!(p.interval(), DEFAULT_POLL_INTERVAL);

        let p = p.with_interval(Duration::from_secs(1));
        assert_eq!(p.interval(), Duration::from_millis(100));

        let p = p.with_interval(Duration::ZERO);
        assert_eq!(p.interval(), Duration::from_millis(1));
    }

    #[test]
    fn step_renders_tick_output() {
        let (clock, notifier, mut p) = poller();

        p.step().unwrap();
        assert_eq!(p.display().last_text(), Some("Monitoring..."));
        assert_eq!(p.display().last_color(), Some(Rgb::NORMAL));

        p.sensor_mut().set_motion(true);
        clock.set(1_000);
        let effects = p.step().unwrap();
        assert!(effects.changed());
        assert_eq!(p.display().last_text(), Some("Person detected"));
        assert_eq!(p.display().last_color(), Some(Rgb::ALERT));
        assert_eq!(notifier.messages(), vec!["Person detected"]);
    }

    #[test]
    fn countdown_draws_nothing_until_expiry() {
        let (clock, _, mut p) = poller();
        p.sensor_mut().set_motion(true);
        p.step().unwrap();
        let drawn = p.display().shown.len();

        for t in (1_000..=30_000).step_by(1_000) {
            clock.set(t);
            p.step().unwrap();
        }
        assert_eq!(p.display().shown.len(), drawn);

        clock.set(30_001);
        p.step().unwrap();
        assert_eq!(p.display().last_text(), Some("Alarm triggered!"));
    }

    #[test]
    fn sensor_error_is_returned() {
        let (_, _, mut p) = poller();
        p.sensor_mut().fail_next_read();
        assert_eq!(p.step().unwrap_err(), MockSensorFault);
        assert_eq!(p.state.status().state, AlarmState::Idle);
    }

    #[test]
    fn run_until_stops_on_sensor_error_and_clears() {
        let (_, _, mut p) = poller();
        p.sensor_mut().fail_next_read();
        let stop = AtomicBool::new(false);

        assert_eq!(p.run_until(&stop), Err(MockSensorFault));
        assert_eq!(p.display().clear_count, 1);
    }

    #[test]
    fn run_until_returns_immediately_when_stopped() {
        let (_, _, mut p) = poller();
        let stop = AtomicBool::new(true);

        assert!(p.run_until(&stop).is_ok());
        assert_eq!(p.sensor().read_count, 0);
        assert_eq!(p.display().clear_count, 1);
    }

    #[test]
    fn spawned_thread_is_named_and_stoppable() {
        let (_, _, p) = poller();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = p.with_interval(Duration::from_millis(1)).spawn(Arc::clone(&stop)).unwrap();

        assert_eq!(handle.thread().name(), Some(POLLER_THREAD_NAME));
        thread::sleep(Duration::from_millis(10));
        stop.store(true, Ordering::SeqCst);
        assert!(handle.join().unwrap().is_ok());
    }
}
