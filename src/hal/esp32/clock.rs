use crate::traits::Clock;

/// Milliseconds since boot from the ESP-IDF high resolution timer.
///
/// The timer is monotonic and keeps running across WiFi reconnects, so
/// every alarm window is measured on it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// The board's boot-relative clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    fn now_ms(&self) -> u64 {
        // SAFETY: esp_timer is started by the IDF before app_main
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        u64::try_from(micros).unwrap_or(0) / 1_000
    }
}
