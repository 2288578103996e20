//! Error types for the alarm controller.
//!
//! - [`AccessDenied`]: a disarm attempt used the wrong code. Recovered
//!   locally; the HTTP endpoint never surfaces it.
//! - [`NotifyError`]: a notification could not be queued or delivered.
//!   Always non-fatal.
//! - [`ConfigError`]: a configuration variable is unusable. The binaries
//!   refuse to start.
//! - [`HardwareInitError`]: a device could not be brought up at startup.
//!   The binaries exit with [`HARDWARE_INIT_EXIT_CODE`].

use crate::traits::MSG_INVALID_CODE;

/// Process exit status when required hardware is unavailable at startup.
pub const HARDWARE_INIT_EXIT_CODE: u8 = 2;

/// A disarm attempt was rejected because the code did not match.
///
/// The state machine is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("access denied: disarm code mismatch")]
pub struct AccessDenied;

impl AccessDenied {
    /// The notification reported for a rejected code.
    pub const fn notification(&self) -> &'static str {
        MSG_INVALID_CODE
    }
}

/// Why a notification was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// `SERVER` or `AUTH_TOKEN` is not set.
    #[error("notification endpoint not configured")]
    NotConfigured,
    /// The delivery queue is full; the message was dropped.
    #[error("notification queue full")]
    QueueFull,
    /// The delivery task has stopped.
    #[error("notification channel closed")]
    Closed,
    /// The request failed or timed out.
    #[cfg(feature = "notify")]
    #[error("notification transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("notification rejected with HTTP {0}")]
    Status(u16),
}

/// A configuration variable could not be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The value does not fit the field that stores it.
    #[error("{key} is longer than {max} bytes")]
    TooLong {
        /// Variable name
        key: &'static str,
        /// Capacity of the field
        max: usize,
    },
}

/// A device failed to initialize at startup.
#[derive(Debug, thiserror::Error)]
pub enum HardwareInitError {
    /// The motion sensor could not be opened or probed.
    #[error("motion sensor unavailable: {0}")]
    Sensor(heapless::String<128>),
    /// The display could not be initialized.
    #[error("display unavailable: {0}")]
    Display(heapless::String<128>),
    /// The running platform is not supported.
    #[error("unsupported platform")]
    UnsupportedPlatform,
}

impl HardwareInitError {
    /// Builds a [`HardwareInitError::Sensor`] from any displayable cause.
    pub fn sensor(cause: impl core::fmt::Display) -> Self {
        Self::Sensor(truncated(cause))
    }

    /// Builds a [`HardwareInitError::Display`] from any displayable cause.
    pub fn display(cause: impl core::fmt::Display) -> Self {
        Self::Display(truncated(cause))
    }
}

fn truncated(cause: impl core::fmt::Display) -> heapless::String<128> {
    use core::fmt::Write;

    struct Capped(heapless::String<128>);

    impl Write for Capped {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            for c in s.chars() {
                if self.0.push(c).is_err() {
                    break;
                }
            }
            Ok(())
        }
    }

    let mut capped = Capped(heapless::String::new());
    let _ = write!(capped, "{}", cause);
    capped.0
}
