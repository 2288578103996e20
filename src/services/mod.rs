//! Network services: HTTP control endpoint and remote notifications.
//!
//! - `web` feature: Axum-based HTTP server with the disarm endpoint, a JSON
//!   status endpoint, and the status page
//! - `notify` feature: non-blocking HTTP notifier backed by a tokio task
//!
//! Both attach to the single [`SharedAlarmState`](crate::SharedAlarmState)
//! that the poller ticks:
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_sentinel::services::{run_server_with_state, HttpNotifier, WebServerConfig};
//!
//! let notifier = HttpNotifier::spawn(&config.notify)?;
//! let state = Arc::new(SharedAlarmState::new(machine, clock, notifier));
//!
//! run_server_with_state(state, WebServerConfig::from_config(&config), shutdown).await?;
//! ```

#[cfg(feature = "web")]
pub mod api;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "notify")]
pub mod notify;

// Re-exports
#[cfg(feature = "web")]
pub use api::*;

#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "notify")]
pub use notify::*;
