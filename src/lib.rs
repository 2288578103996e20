//! # rs-sentinel
//!
//! A motion-sensor security alarm controller with a local status display,
//! remote notifications, and an HTTP disarm endpoint.
//!
//! ## Features
//!
//! - **Alarm state machine**: Idle, countdown, alarm, and disarmed states driven
//!   by motion readings and two timing windows (30 s countdown, 120 s cool-down)
//! - **Hardware abstraction**: Traits for the motion sensor, clock, and display
//! - **Remote notifications**: Fire-and-forget HTTP `PUT` with a UTC timestamp
//! - **Disarm endpoint**: `GET /alarm?code=...` that never reveals whether the
//!   code matched
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and notification abstractions
//! - `alarm` - The pure state machine; returns effects instead of doing I/O
//! - `shared` - Thread-safe wrapper applying those effects
//! - `poller` - Background sensor loop that drives the machine
//! - `services` - HTTP endpoint and notifier (feature-gated)
//! - `hal` - Concrete implementations (mock for testing, system for Linux,
//!   esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_sentinel::{
//!     AlarmState, AlarmStateMachine, SharedAlarmState,
//!     hal::{MockClock, MockNotifier},
//! };
//!
//! let clock = MockClock::new();
//! let notifier = MockNotifier::new();
//! let alarm = SharedAlarmState::new(AlarmStateMachine::new(0), &clock, notifier.clone());
//!
//! // Motion starts the countdown
//! alarm.tick(true);
//! assert_eq!(alarm.status().state, AlarmState::CountdownActive);
//!
//! // 30 s later the alarm fires
//! clock.set(30_001);
//! alarm.tick(false);
//! assert_eq!(alarm.status().state, AlarmState::AlarmTriggered);
//!
//! // The right code disarms it
//! alarm.disarm("4321", "4321").unwrap();
//! assert_eq!(
//!     notifier.messages(),
//!     vec!["Person detected", "Alarm triggered!"],
//! );
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Alarm state machine and its timing windows.
pub mod alarm;
/// Error types shared by the library and binaries.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Core traits for hardware and notification abstraction.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// Query string helpers for routerless HTTP servers.
pub mod parsing;

/// Thread-safe shared alarm state.
#[cfg(feature = "std")]
pub mod shared;

/// Background sensor poller.
#[cfg(feature = "std")]
pub mod poller;

/// Network services for the HTTP endpoint and notifications (feature-gated).
#[cfg(any(feature = "web", feature = "notify"))]
pub mod services;

// Re-exports for convenience
pub use alarm::{
    AlarmEffects, AlarmState, AlarmStateMachine, AlarmStatus, AlarmTiming, DisplayUpdate,
    Transition, MSG_MONITORING,
};
pub use error::{
    AccessDenied, ConfigError, HardwareInitError, NotifyError, HARDWARE_INIT_EXIT_CODE,
};
pub use traits::{
    // Display
    fit_line,
    AlarmDisplay,
    // Hardware
    Clock,
    DisplayLine,
    MotionSensor,
    // Notifications
    NoopNotifier,
    Notifier,
    Rgb,
    MSG_ALARM_TRIGGERED,
    MSG_INVALID_CODE,
    MSG_PERSON_DETECTED,
};

// Config re-exports
pub use config::{
    AccessConfig, AlarmConfig, Config, NotifyConfig, SensorConfig, WebConfig, WifiConfig,
};

#[cfg(feature = "std")]
pub use poller::Poller;
#[cfg(feature = "std")]
pub use shared::{AlarmControl, SharedAlarmState};
