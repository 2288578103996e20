//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_sentinel::config::{AccessConfig, Config, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.access.code.as_str(), "4321");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_access(AccessConfig::default().with_code("9876"))
//!     .with_web(WebConfig::default().with_port(8080));
//! ```
//!
//! # Environment
//!
//! [`Config::from_lookup`] applies these variables on top of the defaults:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CODE` | [`AccessConfig::code`] |
//! | `SERVER` | [`NotifyConfig::server`] |
//! | `AUTH_TOKEN` | [`NotifyConfig::auth_token`] |
//! | `PORT` | [`WebConfig::port`] |
//! | `MOTION_SENSOR_PATH` | [`SensorConfig::path`] |
//! | `POLL_INTERVAL_MS` | [`AlarmConfig::poll_interval_ms`] |

use heapless::String as HString;

use crate::alarm::AlarmTiming;
use crate::error::ConfigError;

/// Maximum length for short config strings (codes, tokens, SSIDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (URLs, paths)
pub const MAX_LONG_STRING: usize = 256;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Default disarm code when `CODE` is unset
pub const DEFAULT_ACCESS_CODE: &str = "4321";

/// Slowest poll interval that still resolves the alarm windows
pub const MAX_POLL_INTERVAL_MS: u32 = 100;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn bounded<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    // Stop at the last char boundary that fits
    for c in s.chars() {
        if hs.push(c).is_err() {
            break;
        }
    }
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    bounded(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    bounded(s)
}

/// Copy the value of variable `key`, rejecting it if it does not fit.
fn exact<const N: usize>(key: &'static str, value: &str) -> Result<HString<N>, ConfigError> {
    let mut hs = HString::new();
    hs.push_str(value).map_err(|()| ConfigError::TooLong { key, max: N })?;
    Ok(hs)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Alarm timing and poll rate
    pub alarm: AlarmConfig,
    /// Disarm code
    pub access: AccessConfig,
    /// Remote notification endpoint
    pub notify: NotifyConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// Motion sensor wiring
    pub sensor: SensorConfig,
    /// WiFi connection configuration (ESP32)
    pub wifi: WifiConfig,
}

impl Config {
    /// Set alarm configuration
    pub fn with_alarm(mut self, alarm: AlarmConfig) -> Self {
        self.alarm = alarm;
        self
    }

    /// Set access configuration
    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.access = access;
        self
    }

    /// Set notification configuration
    pub fn with_notify(mut self, notify: NotifyConfig) -> Self {
        self.notify = notify;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set sensor configuration
    pub fn with_sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = sensor;
        self
    }

    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Apply variables from `lookup` on top of the defaults.
    ///
    /// Unset or unparsable numbers keep their default. An empty `SERVER`
    /// or `AUTH_TOKEN` counts as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooLong`] when a string variable does not fit
    /// its field. A shortened code or token would never match the real one.
    pub fn from_lookup<F, S>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();

        if let Some(code) = lookup("CODE") {
            config.access.code = exact("CODE", code.as_ref())?;
        }
        if let Some(server) = lookup("SERVER") {
            config.notify.server = exact("SERVER", server.as_ref().trim())?;
        }
        if let Some(token) = lookup("AUTH_TOKEN") {
            config.notify.auth_token = exact("AUTH_TOKEN", token.as_ref().trim())?;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.as_ref().trim().parse().ok()) {
            config.web = config.web.with_port(port);
        }
        if let Some(path) = lookup("MOTION_SENSOR_PATH") {
            config.sensor.path = exact("MOTION_SENSOR_PATH", path.as_ref())?;
        }
        if let Some(ms) = lookup("POLL_INTERVAL_MS").and_then(|p| p.as_ref().trim().parse().ok()) {
            config.alarm = config.alarm.with_poll_interval_ms(ms);
        }

        Ok(config)
    }

    /// Build configuration from the process environment.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

// ============================================================================
// Alarm Config
// ============================================================================

/// Alarm timing configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmConfig {
    /// Grace period between detection and alarm, in milliseconds
    pub countdown_ms: u32,
    /// Quiet period after an alarm or disarm, in milliseconds
    pub cooldown_ms: u32,
    /// Poller interval in milliseconds (1..=100)
    pub poll_interval_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            countdown_ms: AlarmTiming::DEFAULT_COUNTDOWN_MS as u32,
            cooldown_ms: AlarmTiming::DEFAULT_COOLDOWN_MS as u32,
            poll_interval_ms: 20,
        }
    }
}

impl AlarmConfig {
    /// Set the countdown window
    pub fn with_countdown_ms(mut self, ms: u32) -> Self {
        self.countdown_ms = ms;
        self
    }

    /// Set the cool-down window
    pub fn with_cooldown_ms(mut self, ms: u32) -> Self {
        self.cooldown_ms = ms;
        self
    }

    /// Set the poll interval, clamped to 1..=100 ms
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms.clamp(1, MAX_POLL_INTERVAL_MS);
        self
    }

    /// The windows as used by the state machine
    pub fn timing(&self) -> AlarmTiming {
        AlarmTiming {
            countdown_ms: self.countdown_ms as u64,
            cooldown_ms: self.cooldown_ms as u64,
        }
    }
}

// ============================================================================
// Access Config
// ============================================================================

/// Disarm code configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessConfig {
    /// The shared static disarm code
    pub code: ShortString,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            code: short_string(DEFAULT_ACCESS_CODE),
        }
    }
}

impl AccessConfig {
    /// Set the disarm code, truncated to [`MAX_SHORT_STRING`] bytes
    pub fn with_code(mut self, code: &str) -> Self {
        self.code = short_string(code);
        self
    }
}

// ============================================================================
// Notify Config
// ============================================================================

/// Remote notification endpoint configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotifyConfig {
    /// Datastore URL receiving `PUT` requests (empty = disabled)
    pub server: LongString,
    /// Value of the `X-Auth-Token` header (empty = disabled)
    pub auth_token: ShortString,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u32,
    /// Messages buffered before new ones are dropped
    pub queue_depth: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            server: LongString::new(),
            auth_token: ShortString::new(),
            timeout_ms: 3_000,
            queue_depth: 16,
        }
    }
}

impl NotifyConfig {
    /// Set the endpoint URL
    pub fn with_server(mut self, server: &str) -> Self {
        self.server = long_string(server.trim());
        self
    }

    /// Set the auth token
    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = short_string(token.trim());
        self
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the queue depth (at least 1)
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Check if both the endpoint and the token are configured
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty() && !self.auth_token.is_empty()
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_permissive: false,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Sensor Config
// ============================================================================

/// Motion sensor configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorConfig {
    /// GPIO value file on Linux boards
    pub path: LongString,
    /// Whether the PIR output is active low
    pub active_low: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            // PIR on digital pin D4
            path: long_string("/sys/class/gpio/gpio4/value"),
            active_low: false,
        }
    }
}

impl SensorConfig {
    /// Set the GPIO value file path
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = long_string(path);
        self
    }

    /// Set the input polarity
    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            connect_timeout_ms: 30_000,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
