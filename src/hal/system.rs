//! Desktop/Linux implementations.
//!
//! - [`MonotonicClock`]: milliseconds since construction
//! - [`SysfsMotionSensor`]: PIR wired to a GPIO exported through sysfs
//! - [`ConsoleDisplay`]: logs status lines instead of drawing them

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::HardwareInitError;
use crate::traits::{AlarmDisplay, Clock, MotionSensor, Rgb};

/// Clock counting milliseconds from its creation.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Starts counting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Why a sysfs GPIO read failed.
#[derive(Debug, thiserror::Error)]
pub enum SysfsReadError {
    /// The value file could not be read.
    #[error("reading {}: {}", .path.display(), .source)]
    Io {
        /// Value file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// The file held something other than `0` or `1`.
    #[error("unexpected GPIO value {0:?}")]
    BadValue(String),
}

/// PIR sensor read from a sysfs GPIO `value` file.
///
/// The pin must already be exported and configured as an input.
#[derive(Debug)]
pub struct SysfsMotionSensor {
    path: PathBuf,
    active_low: bool,
}

impl SysfsMotionSensor {
    /// Open the value file at `path` and probe it once.
    ///
    /// Fails if the file is missing, unreadable, or does not hold a GPIO
    /// level, so a wiring problem stops startup instead of the poller.
    pub fn open(path: impl AsRef<Path>, active_low: bool) -> Result<Self, HardwareInitError> {
        let mut sensor = Self {
            path: path.as_ref().to_path_buf(),
            active_low,
        };
        sensor.read_motion().map_err(HardwareInitError::sensor)?;
        tracing::info!(path = %sensor.path.display(), active_low, "motion sensor ready");
        Ok(sensor)
    }

    /// The value file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MotionSensor for SysfsMotionSensor {
    type Error = SysfsReadError;

    fn read_motion(&mut self) -> Result<bool, SysfsReadError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| SysfsReadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let level = match raw.trim() {
            "1" => true,
            "0" => false,
            other => return Err(SysfsReadError::BadValue(other.to_string())),
        };
        Ok(level != self.active_low)
    }
}

/// Display that writes each status line to the log.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    last: Option<(String, Rgb)>,
}

impl ConsoleDisplay {
    /// Creates a console display.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlarmDisplay for ConsoleDisplay {
    type Error = core::convert::Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        tracing::info!("console display ready");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.last = None;
        tracing::info!("display cleared");
        Ok(())
    }

    fn show(&mut self, line: &str, color: Rgb) -> Result<(), Self::Error> {
        // The idle heartbeat redraws every tick
        let unchanged = self
            .last
            .as_ref()
            .is_some_and(|(text, c)| text == line && *c == color);
        if !unchanged {
            tracing::info!(line = line.trim_end(), color = %format!("#{:06x}", color.to_hex()), "display");
            self.last = Some((line.to_string(), color));
        }
        Ok(())
    }
}
