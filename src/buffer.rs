//! Shared pixel storage for all strips.

use crate::color::Color;
use core::ops::Range;
use heapless::Vec;

/// Destination for engine pixel writes, addressed by absolute buffer index.
pub trait PixelSink {
    /// Sets one pixel.
    fn set(&mut self, index: usize, color: Color);

    /// Sets every pixel in `range`.
    fn fill(&mut self, range: Range<usize>, color: Color) {
        for index in range {
            self.set(index, color);
        }
    }
}

/// Errors raised while sizing a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// The buffer was already sized.
    AlreadySized,

    /// The requested length exceeds the buffer capacity.
    CapacityExceeded { requested: usize, capacity: usize },
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferError::AlreadySized => write!(f, "pixel buffer was already sized"),
            BufferError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "pixel buffer of {} LEDs exceeds capacity of {}",
                requested, capacity
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferError {}

/// A flat, ordered store of pixel colors.
///
/// Sized exactly once; every pixel starts off.
#[derive(Debug, Clone)]
pub struct PixelBuffer<const MAX_LEDS: usize> {
    pixels: Vec<Color, MAX_LEDS>,
    sized: bool,
}

impl<const MAX_LEDS: usize> PixelBuffer<MAX_LEDS> {
    /// Creates an unsized buffer.
    pub const fn new() -> Self {
        Self {
            pixels: Vec::new(),
            sized: false,
        }
    }

    /// Sizes the buffer to `length` pixels, all off.
    ///
    /// # Errors
    /// * `AlreadySized` - Called a second time
    /// * `CapacityExceeded` - `length` is larger than `MAX_LEDS`
    pub fn resize(&mut self, length: usize) -> Result<(), BufferError> {
        if self.sized {
            return Err(BufferError::AlreadySized);
        }

        self.pixels
            .resize(length, Color::OFF)
            .map_err(|_| BufferError::CapacityExceeded {
                requested: length,
                capacity: MAX_LEDS,
            })?;
        self.sized = true;
        Ok(())
    }

    /// Returns true once [`resize`](Self::resize) succeeded.
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns the pixels of `range`, or an empty slice if it is out of bounds.
    pub fn range(&self, range: Range<usize>) -> &[Color] {
        self.pixels.get(range).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.pixels.get(index).copied()
    }
}

impl<const MAX_LEDS: usize> Default for PixelBuffer<MAX_LEDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_LEDS: usize> PixelSink for PixelBuffer<MAX_LEDS> {
    fn set(&mut self, index: usize, color: Color) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn fill(&mut self, range: Range<usize>, color: Color) {
        if let Some(pixels) = self.pixels.get_mut(range) {
            pixels.fill(color);
        }
    }
}
