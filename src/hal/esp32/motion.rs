//! HC-SR501 PIR motion sensor implementation for ESP32.
//!
//! The PIR module drives its OUT pin high while it sees motion. The pin is
//! sampled directly; the module's own retrigger timer does the debouncing.
//!
//! # Wiring
//!
//! - OUT → GPIO4
//! - VCC → 5V
//! - GND → GND

use crate::traits::MotionSensor;
use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

/// PIR motion sensor on a GPIO input.
///
/// # Example
///
/// ```ignore
/// use rs_sentinel::hal::esp32::Esp32MotionSensor;
/// use rs_sentinel::traits::MotionSensor;
///
/// let peripherals = Peripherals::take()?;
/// let mut pir = Esp32MotionSensor::new(peripherals.pins.gpio4, false)?;
///
/// if pir.read_motion()? {
///     tracing::info!("motion");
/// }
/// ```
pub struct Esp32MotionSensor<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, Input>,
    active_low: bool,
}

impl<'d, P> Esp32MotionSensor<'d, P>
where
    P: InputPin + OutputPin,
{
    /// Configures `pin` as an input.
    ///
    /// An active-high module gets a pull-down so a disconnected sensor
    /// reads as "no motion".
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        pin: impl Peripheral<P = P> + 'd,
        active_low: bool,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(if active_low { Pull::Up } else { Pull::Down })?;

        Ok(Self { pin, active_low })
    }
}

impl<P> MotionSensor for Esp32MotionSensor<'_, P>
where
    P: InputPin + OutputPin,
{
    type Error = core::convert::Infallible;

    fn read_motion(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_high() != self.active_low)
    }
}
