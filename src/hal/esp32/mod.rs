//! ESP32-C3 SuperMini alarm hardware.
//!
//! An HC-SR501 PIR module on GPIO4 and an optional SSD1306 OLED on I2C.
//! WiFi and the HTTP server are gated behind the `wifi` and `esp32-http`
//! features. GPIO numbers are collected in [`pins`].

mod clock;
mod motion;

pub use clock::Esp32Clock;
pub use motion::Esp32MotionSensor;

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "display")]
pub use display::{DisplayError, Esp32Display};

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "esp32-http")]
mod http;
#[cfg(feature = "esp32-http")]
pub use http::Esp32HttpServer;

/// SuperMini wiring used by `esp32_main`.
pub mod pins {
    /// HC-SR501 OUT
    pub const PIR_OUT: i32 = 4;

    /// OLED SDA; the onboard LED on this pin flickers with bus traffic
    pub const I2C_SDA: i32 = 8;

    /// OLED SCL; shared with the BOOT strap
    pub const I2C_SCL: i32 = 9;

    /// SSD1306 address with SA0 low
    pub const OLED_I2C_ADDR: u8 = 0x3C;
}
