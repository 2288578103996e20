//! Concrete [`crate::traits`] implementations.
//!
//! | Module | Sensor | Display | Clock | Needs |
//! |--------|--------|---------|-------|-------|
//! | `mock` | scripted readings | line history | settable | not `esp32` (except tests) |
//! | `system` | sysfs GPIO value file | log output | `Instant` | `std` |
//! | `esp32` | PIR on GPIO4 | SSD1306 OLED | `esp_timer` | `esp32` |

// MockClock needs 64-bit atomics, which the ESP32-C3 lacks
#[cfg(any(test, not(feature = "esp32")))]
pub mod mock;

#[cfg(feature = "std")]
pub mod system;

#[cfg(feature = "esp32")]
pub mod esp32;

#[cfg(any(test, not(feature = "esp32")))]
pub use mock::*;

#[cfg(feature = "std")]
pub use system::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
