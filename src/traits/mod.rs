//! Trait definitions for hardware abstraction, display output, and notifications.
//!
//! This module defines the core abstractions that allow rs-sentinel to:
//! - Run on different hardware (ESP32, Linux boards, desktop mock)
//! - Render status on different displays
//! - Report state changes through different transports
//!
//! # Submodules
//!
//! - `hardware`: Motion sensor, clock
//! - `display`: Status line rendering and color hints
//! - `network`: Remote notification sink
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`MotionSensor`]: PIR motion input
//! - [`Clock`]: Time source for `no_std` environments
//! - [`AlarmDisplay`]: One-line status display
//! - [`Notifier`]: Fire-and-forget remote notification

pub mod display;
pub mod hardware;
pub mod network;

pub use display::*;
pub use hardware::*;
pub use network::*;
