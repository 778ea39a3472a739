//! Pixel color type and HSV helpers.
//!
//! Colors are passed through to the hardware untouched: 8 bits per channel,
//! with an optional white channel for RGBW strips (zero on RGB strips).
//!
//! Hues handed to [`hsv`] use the 0-180 device convention, where 180 is a full
//! turn of the color wheel.

use palette::{FromColor, Hsv, Srgb};

/// An 8-bit RGB(W) pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl Color {
    /// All channels off.
    pub const OFF: Color = Color::rgbw(0, 0, 0, 0);

    /// Creates a 3-channel color (white channel off).
    #[inline]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgbw(red, green, blue, 0)
    }

    /// Creates a 4-channel color.
    #[inline]
    pub const fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Returns true if every channel is zero.
    #[inline]
    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

impl From<Srgb<u8>> for Color {
    fn from(color: Srgb<u8>) -> Self {
        Color::rgb(color.red, color.green, color.blue)
    }
}

impl From<Srgb<f32>> for Color {
    fn from(color: Srgb<f32>) -> Self {
        color.into_format::<u8>().into()
    }
}

/// Degrees of the color wheel per device hue unit.
const DEGREES_PER_HUE: f32 = 2.0;

/// Creates a color from a device hue (0-180, wraps), saturation and value (0.0-1.0).
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Color {
    let mut degrees = (hue * DEGREES_PER_HUE) % 360.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    let hsv = Hsv::new(degrees, saturation, value);
    Srgb::<f32>::from_color(hsv).into()
}

/// Creates a fully saturated color at the given device hue and brightness.
#[inline]
pub fn hue(hue: f32, brightness: f32) -> Color {
    hsv(hue, 1.0, brightness)
}
