use crate::buffer::{BufferError, PixelBuffer, PixelSink};
use crate::color::Color;
use crate::device::{DeviceError, StripDevice};
use crate::engine;
use crate::request::AnimationRequest;
use crate::strip::{Strip, StripId, StripState};
use crate::time::{TimeInstant, TimeSource};
use heapless::Vec;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A strip was registered before the pixel buffer was sized.
    BufferNotSized,

    /// Sizing the pixel buffer failed.
    Buffer(BufferError),

    /// Strips must have at least one LED.
    ZeroLengthStrip,

    /// The strip does not fit inside the pixel buffer.
    StripOutOfBounds {
        index_offset: usize,
        length: usize,
        buffer_len: usize,
    },

    /// The strip shares buffer indices with an already registered strip.
    OverlappingStrip(StripId),

    /// The registry is full and cannot accept more strips.
    RegistryFull,

    /// The specified strip ID does not exist in the registry.
    InvalidStripId(StripId),

    /// The pixel index is outside the strip.
    PixelOutOfRange { id: StripId, index: usize },

    /// The device refused the operation.
    Device(DeviceError),
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryError::BufferNotSized => {
                write!(f, "pixel buffer must be sized before registering strips")
            }
            RegistryError::Buffer(err) => write!(f, "buffer error: {}", err),
            RegistryError::ZeroLengthStrip => write!(f, "strip length must be non-zero"),
            RegistryError::StripOutOfBounds {
                index_offset,
                length,
                buffer_len,
            } => write!(
                f,
                "strip at offset {} with {} LEDs exceeds buffer of {} LEDs",
                index_offset, length, buffer_len
            ),
            RegistryError::OverlappingStrip(id) => {
                write!(f, "strip overlaps strip {}", id.0)
            }
            RegistryError::RegistryFull => {
                write!(f, "registry is full, cannot add more strips")
            }
            RegistryError::InvalidStripId(id) => {
                write!(f, "strip ID {} does not exist in registry", id.0)
            }
            RegistryError::PixelOutOfRange { id, index } => {
                write!(f, "pixel {} is outside strip {}", index, id.0)
            }
            RegistryError::Device(err) => write!(f, "device error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

impl From<BufferError> for RegistryError {
    fn from(err: BufferError) -> Self {
        RegistryError::Buffer(err)
    }
}

impl From<DeviceError> for RegistryError {
    fn from(err: DeviceError) -> Self {
        RegistryError::Device(err)
    }
}

struct StripEntry<I: TimeInstant> {
    strip: Strip,
    state: StripState<I>,
    request: Option<AnimationRequest>,
}

/// Owns the strips, their pixel buffer and the output device.
///
/// Strips are registered once, in order, after the buffer was sized. Each
/// [`tick`](Self::tick) steps every strip with an active request through the
/// engine and flushes the device once.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `D` - Output device
/// * `MAX_STRIPS` - Maximum number of strips this registry can hold
/// * `MAX_LEDS` - Capacity of the shared pixel buffer
pub struct StripRegistry<'t, I, T, D, const MAX_STRIPS: usize, const MAX_LEDS: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    D: StripDevice,
{
    time_source: &'t T,
    device: D,
    buffer: PixelBuffer<MAX_LEDS>,
    strips: Vec<StripEntry<I>, MAX_STRIPS>,
}

impl<'t, I, T, D, const MAX_STRIPS: usize, const MAX_LEDS: usize>
    StripRegistry<'t, I, T, D, MAX_STRIPS, MAX_LEDS>
where
    I: TimeInstant,
    T: TimeSource<I>,
    D: StripDevice,
{
    /// Creates an empty registry with an unsized pixel buffer.
    pub fn new(device: D, time_source: &'t T) -> Self {
        Self {
            time_source,
            device,
            buffer: PixelBuffer::new(),
            strips: Vec::new(),
        }
    }

    /// Sizes the shared pixel buffer to the total LED count of all strips.
    ///
    /// Must be called exactly once, before the first [`register`](Self::register).
    pub fn size_buffer(&mut self, total_leds: usize) -> Result<(), RegistryError> {
        self.buffer.resize(total_leds)?;
        debug!("pixel buffer sized to {} LEDs", total_leds);
        Ok(())
    }

    /// Registers a strip covering `length` LEDs starting at `index_offset`.
    ///
    /// The strip starts dark, with no active request.
    ///
    /// # Errors
    /// * `BufferNotSized` - [`size_buffer`](Self::size_buffer) was not called
    /// * `ZeroLengthStrip` - `length` is zero
    /// * `StripOutOfBounds` - The strip does not fit in the buffer
    /// * `OverlappingStrip` - The range intersects a registered strip
    /// * `RegistryFull` - `MAX_STRIPS` strips are already registered
    /// * `Device` - The device could not attach the strip
    pub fn register(
        &mut self,
        index_offset: usize,
        length: usize,
        inverted: bool,
    ) -> Result<StripId, RegistryError> {
        if !self.buffer.is_sized() {
            return Err(RegistryError::BufferNotSized);
        }

        if length == 0 {
            return Err(RegistryError::ZeroLengthStrip);
        }

        let buffer_len = self.buffer.len();
        if index_offset
            .checked_add(length)
            .is_none_or(|end| end > buffer_len)
        {
            return Err(RegistryError::StripOutOfBounds {
                index_offset,
                length,
                buffer_len,
            });
        }

        if self.strips.is_full() {
            return Err(RegistryError::RegistryFull);
        }

        let id = StripId(self.strips.len());
        let strip = Strip::new(id, index_offset, length, inverted);

        if let Some(existing) = self.strips.iter().find(|e| e.strip.overlaps(&strip)) {
            return Err(RegistryError::OverlappingStrip(existing.strip.id()));
        }

        self.device.attach(&strip)?;

        let baseline = AnimationRequest::StaticColor(Color::OFF);
        let entry = StripEntry {
            strip,
            state: StripState::new(&strip, &baseline, self.time_source.now()),
            request: None,
        };
        if self.strips.push(entry).is_err() {
            return Err(RegistryError::RegistryFull);
        }

        debug!(
            "registered strip {} at offset {} with {} LEDs",
            id.0, index_offset, length
        );
        Ok(id)
    }

    /// Makes `request` the active request of one strip.
    ///
    /// A change of kind resets the strip's progress and draws a first frame on
    /// a cleared strip. A change of parameters keeps the progress and repaints the
    /// current frame with the new parameters. Re-sending the active request
    /// does nothing.
    pub fn set_active_request(
        &mut self,
        id: StripId,
        request: AnimationRequest,
    ) -> Result<(), RegistryError> {
        let now = self.time_source.now();
        let entry = self
            .strips
            .get_mut(id.0)
            .ok_or(RegistryError::InvalidStripId(id))?;

        let previous_kind = entry.request.as_ref().map(AnimationRequest::kind);
        let kind_changed = previous_kind != Some(request.kind());
        if kind_changed {
            debug!("strip {} switched to {:?}", id.0, request.kind());
            entry.state.reset(&entry.strip, &request, now);
            self.buffer.fill(entry.strip.range(), Color::OFF);
        }

        if entry.request.as_ref() == Some(&request) {
            return Ok(());
        }
        self.device.request_changed(&entry.strip, &request);

        if self.device.renders(&request) {
            if kind_changed {
                engine::step(&entry.strip, &mut entry.state, &request, now, &mut self.buffer);
            } else {
                // New parameters are painted without advancing the progress;
                // only tick moves the pattern on.
                let mut preview = entry.state;
                engine::step(&entry.strip, &mut preview, &request, now, &mut self.buffer);
            }
            self.device
                .apply(&entry.strip, self.buffer.range(entry.strip.range()));
        }

        entry.request = Some(request);
        Ok(())
    }

    /// Sets the same request on every registered strip.
    pub fn set_default_request(&mut self, request: AnimationRequest) -> Result<(), RegistryError> {
        for index in 0..self.strips.len() {
            self.set_active_request(StripId(index), request.clone())?;
        }
        Ok(())
    }

    /// Drops the strip's active request and turns it off.
    pub fn clear_request(&mut self, id: StripId) -> Result<(), RegistryError> {
        let entry = self
            .strips
            .get_mut(id.0)
            .ok_or(RegistryError::InvalidStripId(id))?;

        entry.request = None;
        self.buffer.fill(entry.strip.range(), Color::OFF);
        self.device.request_cleared(&entry.strip);
        Ok(())
    }

    /// Writes one pixel directly, outside of the animation loop.
    ///
    /// `index` is relative to the strip's first LED. A strip with an active
    /// rendered request paints over the pixel on its next step.
    pub fn set_pixel(
        &mut self,
        id: StripId,
        index: usize,
        color: Color,
    ) -> Result<(), RegistryError> {
        let entry = self
            .strips
            .get(id.0)
            .ok_or(RegistryError::InvalidStripId(id))?;

        if index >= entry.strip.len() {
            return Err(RegistryError::PixelOutOfRange { id, index });
        }

        let absolute = entry.strip.index_offset() + index;
        self.buffer.set(absolute, color);
        self.device.set_pixel(absolute, color);
        Ok(())
    }

    /// Runs one control cycle.
    ///
    /// Steps every strip with an active request the device wants rendered, in
    /// registration order, then flushes the device once.
    pub fn tick(&mut self) {
        for entry in self.strips.iter_mut() {
            let Some(request) = entry.request.as_ref() else {
                continue;
            };
            if !self.device.renders(request) {
                continue;
            }

            let now = self.time_source.now();
            engine::step(&entry.strip, &mut entry.state, request, now, &mut self.buffer);
            self.device
                .apply(&entry.strip, self.buffer.range(entry.strip.range()));
        }

        self.device.flush(self.buffer.as_slice());
    }

    /// Returns the geometry of the specified strip.
    pub fn strip(&self, id: StripId) -> Option<&Strip> {
        self.strips.get(id.0).map(|e| &e.strip)
    }

    /// Returns the animation progress of the specified strip.
    pub fn state(&self, id: StripId) -> Option<&StripState<I>> {
        self.strips.get(id.0).map(|e| &e.state)
    }

    /// Returns the active request of the specified strip.
    pub fn active_request(&self, id: StripId) -> Option<&AnimationRequest> {
        self.strips.get(id.0).and_then(|e| e.request.as_ref())
    }

    /// Returns the whole pixel buffer.
    pub fn pixels(&self) -> &[Color] {
        self.buffer.as_slice()
    }

    /// Returns the pixels owned by the specified strip.
    pub fn strip_pixels(&self, id: StripId) -> Option<&[Color]> {
        self.strip(id).map(|strip| self.buffer.range(strip.range()))
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Returns the number of registered strips.
    pub fn len(&self) -> usize {
        self.strips.len()
    }

    /// Returns true if no strip is registered.
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Iterates over all strips in registration order.
    pub fn strips(&self) -> impl Iterator<Item = &Strip> {
        self.strips.iter().map(|e| &e.strip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{LedWriter, SoftwareDevice};
    use crate::time::TimeDuration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        const ZERO: Self = TestDuration(0);

        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            TestDuration(millis)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0.saturating_sub(earlier.0))
        }
    }

    struct FixedTime;

    impl TimeSource<TestInstant> for FixedTime {
        fn now(&self) -> TestInstant {
            TestInstant(0)
        }
    }

    struct NullWriter;

    impl LedWriter for NullWriter {
        fn write(&mut self, _pixels: &[Color]) {}
    }

    type Registry<'t> =
        StripRegistry<'t, TestInstant, FixedTime, SoftwareDevice<NullWriter>, 2, 16>;

    #[test]
    fn register_requires_sized_buffer() {
        let time = FixedTime;
        let mut registry = Registry::new(SoftwareDevice::new(NullWriter), &time);
        assert_eq!(
            registry.register(0, 4, false),
            Err(RegistryError::BufferNotSized)
        );
    }

    #[test]
    fn ids_follow_registration_order() {
        let time = FixedTime;
        let mut registry = Registry::new(SoftwareDevice::new(NullWriter), &time);
        registry.size_buffer(8).unwrap();
        assert_eq!(registry.register(0, 4, false), Ok(StripId(0)));
        assert_eq!(registry.register(4, 4, true), Ok(StripId(1)));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.register(0, 1, false),
            Err(RegistryError::RegistryFull)
        );
    }
}
