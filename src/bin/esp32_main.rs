//! ESP32-C3 SuperMini motion alarm.
//!
//! This is the main entry point for the physical alarm. It polls the PIR
//! sensor on GPIO4, drives the alarm state machine, and:
//! - Renders the status line to the OLED display (if enabled)
//! - Serves the disarm endpoint and status page (if enabled)
//!
//! # Configuration
//!
//! The board has no process environment, so settings are read at compile
//! time from the same variable names the desktop daemon uses (`CODE`,
//! `PORT`, `POLL_INTERVAL_MS`) plus `WIFI_SSID` and `WIFI_PASSWORD`.
//!
//! # Build
//!
//! ```bash
//! # Sensor only (status goes to the serial log)
//! cargo build --release --no-default-features --features esp32
//!
//! # With display
//! cargo build --release --no-default-features --features esp32,display
//!
//! # Full (display + WiFi + HTTP)
//! WIFI_SSID=home WIFI_PASSWORD=secret CODE=2468 \
//!     cargo build --release --no-default-features --features esp32,display,esp32-http
//! ```

use esp_idf_hal::peripherals::Peripherals;
use rs_sentinel::hal::esp32::{pins, Esp32Clock, Esp32MotionSensor};
use rs_sentinel::{
    AlarmDisplay, AlarmStateMachine, Clock, Config, HardwareInitError, NoopNotifier, Poller,
    SharedAlarmState, WifiConfig, HARDWARE_INIT_EXIT_CODE,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the main thread checks the poller and the WiFi link.
const SUPERVISE_INTERVAL: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    tracing_subscriber::fmt().with_target(false).init();
    tracing::info!("rs-sentinel starting");

    let config = Config::from_lookup(compile_time_var)?.with_wifi(
        WifiConfig::default()
            .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
            .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
    );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Motion sensor (HC-SR501 on GPIO4)
    // =========================================================================
    let pir = Esp32MotionSensor::new(peripherals.pins.gpio4, config.sensor.active_low)
        .map_err(HardwareInitError::sensor)
        .unwrap_or_else(|e| hardware_failure(e));
    tracing::info!(gpio = pins::PIR_OUT, "PIR sensor ready");

    // =========================================================================
    // Display (SSD1306 on GPIO8/9), serial log without the display feature
    // =========================================================================
    #[cfg(feature = "display")]
    let mut display = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::prelude::*;
        use rs_sentinel::hal::esp32::Esp32Display;

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8, // SDA
            peripherals.pins.gpio9, // SCL
            &I2cConfig::new().baudrate(400.kHz().into()),
        )
        .map_err(HardwareInitError::display)
        .unwrap_or_else(|e| hardware_failure(e));
        tracing::info!(sda = pins::I2C_SDA, scl = pins::I2C_SCL, "OLED bus ready");
        Esp32Display::new(i2c)
    };

    #[cfg(not(feature = "display"))]
    let mut display = rs_sentinel::hal::ConsoleDisplay::new();

    if let Err(e) = display.init() {
        hardware_failure(HardwareInitError::display(e));
    }

    // =========================================================================
    // Alarm state
    // =========================================================================
    let clock = Esp32Clock::new();
    let machine = AlarmStateMachine::with_timing(config.alarm.timing(), clock.now_ms());
    // TODO: report state changes through esp_idf_svc::http::client once TLS certificates are bundled
    let state = Arc::new(SharedAlarmState::new(machine, clock, NoopNotifier));

    // =========================================================================
    // WiFi (required for HTTP)
    // =========================================================================
    #[cfg(feature = "wifi")]
    let mut wifi = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use rs_sentinel::hal::esp32::Esp32Wifi;

        if config.wifi.is_configured() {
            let sysloop = EspSystemEventLoop::take()?;
            let nvs = EspDefaultNvsPartition::take()?;

            match Esp32Wifi::new(peripherals.modem, sysloop, Some(nvs), &config.wifi) {
                Ok(wifi) => Some(wifi),
                Err(e) => {
                    tracing::warn!(error = %e, "wifi unavailable; running offline");
                    None
                }
            }
        } else {
            tracing::info!("wifi not configured (set WIFI_SSID/WIFI_PASSWORD)");
            None
        }
    };

    // =========================================================================
    // HTTP server (disarm endpoint + status page)
    // =========================================================================
    #[cfg(feature = "esp32-http")]
    let _server = {
        use rs_sentinel::hal::esp32::Esp32HttpServer;

        if wifi.is_some() && config.web.enabled {
            Some(Esp32HttpServer::new(&config, Arc::clone(&state))?)
        } else {
            None
        }
    };

    // =========================================================================
    // Poller thread (runs until the sensor fails)
    // =========================================================================
    let poller = Poller::new(state, pir, display)
        .with_interval(Duration::from_millis(config.alarm.poll_interval_ms.into()))
        .spawn(Arc::new(AtomicBool::new(false)))?;

    // =========================================================================
    // Supervision loop
    // =========================================================================
    while !poller.is_finished() {
        thread::sleep(SUPERVISE_INTERVAL);

        #[cfg(feature = "wifi")]
        if let Some(link) = wifi.as_mut() {
            if let Err(e) = link.ensure_connected() {
                tracing::warn!(error = %e, "wifi rejoin failed");
            }
        }
    }

    match poller.join() {
        Ok(result) => result.map_err(|e| anyhow::anyhow!("motion sensor failed: {e:?}")),
        Err(_) => anyhow::bail!("poller thread panicked"),
    }
}

fn compile_time_var(key: &str) -> Option<&'static str> {
    match key {
        "CODE" => option_env!("CODE"),
        "PORT" => option_env!("PORT"),
        "POLL_INTERVAL_MS" => option_env!("POLL_INTERVAL_MS"),
        _ => None,
    }
}

fn hardware_failure(e: HardwareInitError) -> ! {
    tracing::error!(error = %e, "hardware initialization failed");
    std::process::exit(HARDWARE_INIT_EXIT_CODE.into())
}
