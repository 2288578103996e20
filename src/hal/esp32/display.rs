//! SSD1306 OLED display implementation for ESP32.
//!
//! Shows the alarm status line on a 128x64 monochrome panel. The panel has
//! no color, so the alert color is rendered as an inverted (lit) banner.
//!
//! # Wiring
//!
//! - SDA → GPIO8 (also has onboard LED)
//! - SCL → GPIO9 (also shared with BOOT button)
//! - VCC → 3.3V
//! - GND → GND

use crate::traits::{AlarmDisplay, Rgb};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};
use esp_idf_hal::i2c::I2cDriver;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

/// SSD1306 display type alias for cleaner code.
type DisplayDriver<'d> = Ssd1306<
    I2CInterface<I2cDriver<'d>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// SSD1306 OLED display for ESP32.
///
/// # Display Layout
///
/// ```text
/// ┌────────────────────────────┐
/// │ SENTINEL                   │  Title
/// │████████████████████████████│
/// │█ Person detected          █│  Status banner (lit when alerting)
/// │████████████████████████████│
/// └────────────────────────────┘
/// ```
pub struct Esp32Display<'d> {
    display: DisplayDriver<'d>,
}

impl<'d> Esp32Display<'d> {
    /// Creates a new display instance.
    ///
    /// # Arguments
    ///
    /// * `i2c` - I2C driver configured for GPIO8/9
    pub fn new(i2c: I2cDriver<'d>) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, super::pins::OLED_I2C_ADDR);
        let display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self { display }
    }
}

impl AlarmDisplay for Esp32Display<'_> {
    type Error = DisplayError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.display.init()?;
        self.clear()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.display.clear(BinaryColor::Off)?;
        self.display.flush()?;
        Ok(())
    }

    fn show(&mut self, line: &str, color: Rgb) -> Result<(), Self::Error> {
        self.display.clear(BinaryColor::Off)?;

        let title_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::new("SENTINEL", Point::new(4, 10), title_style).draw(&mut self.display)?;

        let alert = color == Rgb::ALERT;
        let (banner, ink) = if alert {
            (BinaryColor::On, BinaryColor::Off)
        } else {
            (BinaryColor::Off, BinaryColor::On)
        };

        Rectangle::new(Point::new(0, 22), Size::new(128, 24))
            .into_styled(PrimitiveStyle::with_fill(banner))
            .draw(&mut self.display)?;

        // 16 glyphs of 6px fit in 96px; indent to center on 128px
        let text_style = MonoTextStyle::new(&FONT_6X10, ink);
        Text::new(line, Point::new(16, 37), text_style).draw(&mut self.display)?;

        self.display.flush()?;
        Ok(())
    }
}

/// Display error type.
#[derive(Debug)]
pub struct DisplayError;

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SSD1306 I2C error")
    }
}

impl From<display_interface::DisplayError> for DisplayError {
    fn from(_: display_interface::DisplayError) -> Self {
        DisplayError
    }
}
