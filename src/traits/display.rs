//! Display abstraction for alarm status output.
//!
//! This module defines the [`AlarmDisplay`] trait for rendering a single
//! status line to a character LCD, OLED, or the console. The line is always
//! fitted to [`DISPLAY_WIDTH`] characters before it reaches the sink.

use heapless::String as HString;

/// Visible characters on one display line.
pub const DISPLAY_WIDTH: usize = 16;

/// Byte capacity of a [`DisplayLine`].
///
/// Sized for the worst case of [`DISPLAY_WIDTH`] four-byte characters.
pub const DISPLAY_LINE_CAPACITY: usize = DISPLAY_WIDTH * 4;

/// A status line padded or truncated to exactly [`DISPLAY_WIDTH`] characters.
pub type DisplayLine = HString<DISPLAY_LINE_CAPACITY>;

/// 24-bit RGB backlight/color hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Magenta, used for detections and alarms.
    pub const ALERT: Rgb = Rgb::from_hex(0xff00ff);

    /// Blue, used while monitoring.
    pub const NORMAL: Rgb = Rgb::from_hex(0x0000ff);

    /// Splits a `0xRRGGBB` value into channels.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_sentinel::traits::Rgb;
    ///
    /// let c = Rgb::from_hex(0x12ab34);
    /// assert_eq!((c.r, c.g, c.b), (0x12, 0xab, 0x34));
    /// ```
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex & 0xff0000) >> 16) as u8,
            g: ((hex & 0x00ff00) >> 8) as u8,
            b: (hex & 0x0000ff) as u8,
        }
    }

    /// Packs the channels back into `0xRRGGBB`.
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Fits `text` to exactly [`DISPLAY_WIDTH`] characters.
///
/// Longer text is cut at a character boundary; shorter text is padded
/// with spaces so stale characters from a previous line are overwritten.
///
/// # Examples
///
/// ```
/// use rs_sentinel::traits::fit_line;
///
/// assert_eq!(fit_line("Monitoring...").as_str(), "Monitoring...   ");
/// assert_eq!(fit_line("Intruder in the hallway").as_str(), "Intruder in the ");
/// ```
pub fn fit_line(text: &str) -> DisplayLine {
    let mut line = DisplayLine::new();
    let mut count = 0;
    for c in text.chars().take(DISPLAY_WIDTH) {
        // capacity covers DISPLAY_WIDTH chars of any width
        let _ = line.push(c);
        count += 1;
    }
    while count < DISPLAY_WIDTH {
        let _ = line.push(' ');
        count += 1;
    }
    line
}

/// Display trait for rendering alarm status.
///
/// Implementors provide hardware-specific rendering for displays like
/// an RGB-backlit character LCD, an SSD1306 OLED, or a console logger.
///
/// # Example
///
/// ```ignore
/// use rs_sentinel::traits::{AlarmDisplay, Rgb};
///
/// struct MyLcd { /* ... */ }
///
/// impl AlarmDisplay for MyLcd {
///     type Error = ();
///
///     fn init(&mut self) -> Result<(), ()> { Ok(()) }
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn show(&mut self, line: &str, color: Rgb) -> Result<(), ()> {
///         // Move cursor home, write line, set backlight...
///         Ok(())
///     }
/// }
/// ```
pub trait AlarmDisplay {
    /// Error type for display operations.
    type Error;

    /// Initializes the display hardware.
    ///
    /// Called once at startup, before the poller starts.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clears the display.
    ///
    /// Called once more when the poller shuts down.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Shows a status line with a color hint.
    ///
    /// `line` has already been fitted with [`fit_line`]; sinks write it as-is.
    fn show(&mut self, line: &str, color: Rgb) -> Result<(), Self::Error>;
}
