//! Hardware abstraction traits for the motion sensor and the time source.
//!
//! This module defines the hardware inputs the alarm controller depends on,
//! so the state machine can run on different platforms (ESP32, Linux boards,
//! desktop mocks).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`MotionSensor`] | PIR motion-present input |
//! | [`Clock`] | Monotonic time source for `no_std` environments |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rs_sentinel::traits::MotionSensor;
//! use rs_sentinel::hal::MockMotionSensor;
//!
//! let mut sensor = MockMotionSensor::new();
//! assert_eq!(sensor.read_motion(), Ok(false));
//!
//! sensor.set_motion(true);
//! assert_eq!(sensor.read_motion(), Ok(true));
//! ```

/// Motion sensor trait - abstracts a PIR (passive infrared) detector.
///
/// Implement this trait for your sensor hardware. The alarm poller reads
/// it once per tick; the reading is a plain level, not an edge.
///
/// # Implementation Notes
///
/// - Return `Ok(true)` while motion is present
/// - Reads must not block; they are called on every poll interval
/// - A read error is treated as fatal by the poller
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_sentinel::traits::MotionSensor;
///
/// struct MyPir { /* gpio handle */ }
///
/// impl MotionSensor for MyPir {
///     type Error = ();
///
///     fn read_motion(&mut self) -> Result<bool, ()> {
///         // Read the PIR output pin...
///         Ok(false)
///     }
/// }
/// ```
pub trait MotionSensor {
    /// Error type for sensor reads.
    type Error;

    /// Returns `true` if motion is currently detected.
    fn read_motion(&mut self) -> Result<bool, Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for the alarm timing windows.
/// On desktop, this wraps `std::time::Instant`. On embedded, use a
/// hardware timer.
///
/// # Example
///
/// ```rust
/// use rs_sentinel::traits::Clock;
/// use rs_sentinel::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(feature = "std")]
impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    struct StuckSensor {
        level: bool,
        reads: usize,
    }

    impl MotionSensor for StuckSensor {
        type Error = ();

        fn read_motion(&mut self) -> Result<bool, ()> {
            self.reads += 1;
            Ok(self.level)
        }
    }

    #[test]
    fn clock_by_reference() {
        let clock = FixedClock(42);
        let by_ref = &clock;
        assert_eq!(by_ref.now_ms(), 42);
    }

    #[cfg(feature = "std")]
    #[test]
    fn clock_through_arc() {
        let clock = std::sync::Arc::new(FixedClock(7));
        assert_eq!(clock.now_ms(), 7);
    }

    #[test]
    fn sensor_reports_level() {
        let mut sensor = StuckSensor {
            level: true,
            reads: 0,
        };
        assert_eq!(sensor.read_motion(), Ok(true));
        assert_eq!(sensor.read_motion(), Ok(true));
        assert_eq!(sensor.reads, 2);
    }
}
