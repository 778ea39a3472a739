//! Hardware backends for strip output.
//!
//! Two backends produce the same visible result in different ways:
//!
//! - [`SoftwareDevice`] lets the engine paint every pattern into the shared
//!   pixel buffer and transmits the whole buffer once per tick.
//! - [`FirmwareDevice`] hands recurring patterns to animation slots on a
//!   bus-connected LED controller with one command per change, and only
//!   streams colors for patterns the controller cannot run by itself.
//!
//! [`AnyDevice`] picks one of them at runtime from a [`DeviceConfig`].

use crate::color::Color;
use crate::config::{Backend, DeviceConfig};
use crate::request::{AnimationRequest, BounceMode};
use crate::strip::{Strip, StripId};
use heapless::Vec;

/// Number of animation slots a controller provides.
pub const MAX_ANIMATION_SLOTS: usize = 8;

/// Trait for abstracting the raw pixel transmitter (SPI, RMT, PIO, ...).
pub trait LedWriter {
    /// Transmits the whole pixel buffer to the hardware.
    ///
    /// Handle any hardware errors internally - this method cannot fail.
    fn write(&mut self, pixels: &[Color]);
}

/// Trait for abstracting the command channel to a bus-connected LED controller.
pub trait AnimationBus {
    /// Sends one command. Bus errors are the implementor's concern.
    fn send(&mut self, command: ControllerCommand);
}

/// An animation the controller firmware can run on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NativeAnimation {
    /// Whole range toggling between the color and off.
    Strobe { color: Color, speed: f32 },

    /// Scanning block ("Larson scanner").
    Larson {
        color: Color,
        speed: f32,
        size: usize,
        bounce: BounceMode,
        reverse: bool,
    },

    /// Growing and receding fill.
    ColorFlow {
        color: Color,
        speed: f32,
        reverse: bool,
    },

    /// Rotating hue gradient.
    Rainbow {
        brightness: f32,
        speed: f32,
        reverse: bool,
    },
}

/// Commands understood by a bus-connected LED controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerCommand {
    /// Sets `count` LEDs starting at `start` to one color.
    SetLeds {
        color: Color,
        start: usize,
        count: usize,
    },

    /// Runs an animation in a slot over `count` LEDs starting at `start`.
    Animate {
        slot: u8,
        animation: NativeAnimation,
        start: usize,
        count: usize,
    },

    /// Stops the animation running in a slot.
    ClearAnimation { slot: u8 },
}

/// Errors raised by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Every controller animation slot is already assigned.
    SlotsExhausted,
}

impl core::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeviceError::SlotsExhausted => write!(
                f,
                "all {} controller animation slots are in use",
                MAX_ANIMATION_SLOTS
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DeviceError {}

/// Trait for abstracting how computed patterns reach the strips.
pub trait StripDevice {
    /// Called once when a strip is registered.
    fn attach(&mut self, strip: &Strip) -> Result<(), DeviceError>;

    /// Called whenever a strip's active request changes, kind or parameters.
    fn request_changed(&mut self, strip: &Strip, request: &AnimationRequest);

    /// Called when a strip's active request is dropped and the strip goes dark.
    fn request_cleared(&mut self, strip: &Strip);

    /// Returns true if the engine must compute `request` every tick.
    fn renders(&self, request: &AnimationRequest) -> bool;

    /// Called after the engine computed `pixels` for `strip`.
    fn apply(&mut self, strip: &Strip, pixels: &[Color]);

    /// Called after a single pixel was written at absolute `index`.
    fn set_pixel(&mut self, index: usize, color: Color);

    /// Called once at the end of every tick with the whole buffer.
    fn flush(&mut self, pixels: &[Color]);
}

/// Software backend: the engine paints everything, the buffer is streamed out.
pub struct SoftwareDevice<W: LedWriter> {
    writer: W,
}

impl<W: LedWriter> SoftwareDevice<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

impl<W: LedWriter> StripDevice for SoftwareDevice<W> {
    fn attach(&mut self, _strip: &Strip) -> Result<(), DeviceError> {
        Ok(())
    }

    fn request_changed(&mut self, _strip: &Strip, _request: &AnimationRequest) {}

    fn request_cleared(&mut self, _strip: &Strip) {}

    fn renders(&self, _request: &AnimationRequest) -> bool {
        true
    }

    fn apply(&mut self, _strip: &Strip, _pixels: &[Color]) {}

    fn set_pixel(&mut self, _index: usize, _color: Color) {}

    fn flush(&mut self, pixels: &[Color]) {
        self.writer.write(pixels);
    }
}

/// Per-strip controller slot bookkeeping.
#[derive(Debug, Clone, Copy)]
struct SlotBinding {
    strip: StripId,
    slot: u8,
    animating: bool,
}

/// Firmware backend: recurring patterns run inside the controller.
pub struct FirmwareDevice<B: AnimationBus> {
    bus: B,
    slots: Vec<SlotBinding, MAX_ANIMATION_SLOTS>,
}

impl<B: AnimationBus> FirmwareDevice<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            slots: Vec::new(),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Returns the animation slot assigned to `strip`, if attached.
    pub fn slot(&self, strip: StripId) -> Option<u8> {
        self.binding(strip).map(|b| b.slot)
    }

    fn binding(&self, strip: StripId) -> Option<&SlotBinding> {
        self.slots.iter().find(|b| b.strip == strip)
    }

    fn binding_mut(&mut self, strip: StripId) -> Option<&mut SlotBinding> {
        self.slots.iter_mut().find(|b| b.strip == strip)
    }

    /// Maps a request onto the controller's own animations.
    fn native(strip: &Strip, request: &AnimationRequest) -> Option<NativeAnimation> {
        let reverse = strip.effective_invert(request);
        match request {
            AnimationRequest::Blink { color, speed } => Some(NativeAnimation::Strobe {
                color: *color,
                speed: *speed,
            }),
            AnimationRequest::Breathe {
                color,
                count,
                speed,
                bounce,
                ..
            } => Some(NativeAnimation::Larson {
                color: *color,
                speed: *speed,
                size: *count,
                bounce: *bounce,
                reverse,
            }),
            AnimationRequest::ColorFlow { color, speed, .. } => Some(NativeAnimation::ColorFlow {
                color: *color,
                speed: *speed,
                reverse,
            }),
            AnimationRequest::Rainbow {
                brightness, speed, ..
            } => Some(NativeAnimation::Rainbow {
                brightness: *brightness,
                speed: *speed,
                reverse,
            }),
            AnimationRequest::StaticColor(_) | AnimationRequest::SectionColor { .. } => None,
        }
    }

    /// Stops the strip's slot animation if one is running.
    fn stop_animation(&mut self, strip: &Strip) {
        let Some(binding) = self.binding_mut(strip.id()) else {
            return;
        };
        if !binding.animating {
            return;
        }
        binding.animating = false;
        let slot = binding.slot;
        self.bus.send(ControllerCommand::ClearAnimation { slot });
    }
}

impl<B: AnimationBus> StripDevice for FirmwareDevice<B> {
    fn attach(&mut self, strip: &Strip) -> Result<(), DeviceError> {
        // Slots are handed out in registration order and never reclaimed.
        let slot = self.slots.len() as u8;
        self.slots
            .push(SlotBinding {
                strip: strip.id(),
                slot,
                animating: false,
            })
            .map_err(|_| {
                warn!("no animation slot left for strip {}", strip.id().0);
                DeviceError::SlotsExhausted
            })?;
        debug!("strip {} bound to animation slot {}", strip.id().0, slot);
        Ok(())
    }

    fn request_changed(&mut self, strip: &Strip, request: &AnimationRequest) {
        let start = strip.index_offset();
        let count = strip.len();

        match Self::native(strip, request) {
            Some(animation) => {
                let Some(binding) = self.binding_mut(strip.id()) else {
                    return;
                };
                binding.animating = true;
                let slot = binding.slot;
                self.bus.send(ControllerCommand::Animate {
                    slot,
                    animation,
                    start,
                    count,
                });
            }
            None => {
                self.stop_animation(strip);
                if let AnimationRequest::StaticColor(color) = request {
                    self.bus.send(ControllerCommand::SetLeds {
                        color: *color,
                        start,
                        count,
                    });
                }
            }
        }
    }

    fn request_cleared(&mut self, strip: &Strip) {
        self.stop_animation(strip);
        self.bus.send(ControllerCommand::SetLeds {
            color: Color::OFF,
            start: strip.index_offset(),
            count: strip.len(),
        });
    }

    fn renders(&self, request: &AnimationRequest) -> bool {
        matches!(request, AnimationRequest::SectionColor { .. })
    }

    fn apply(&mut self, strip: &Strip, pixels: &[Color]) {
        // One command per run of equal colors.
        let mut start = 0;
        while start < pixels.len() {
            let color = pixels[start];
            let run = pixels[start..]
                .iter()
                .take_while(|pixel| **pixel == color)
                .count();
            self.bus.send(ControllerCommand::SetLeds {
                color,
                start: strip.index_offset() + start,
                count: run,
            });
            start += run;
        }
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        self.bus.send(ControllerCommand::SetLeds {
            color,
            start: index,
            count: 1,
        });
    }

    fn flush(&mut self, _pixels: &[Color]) {}
}

/// Either backend, chosen at runtime.
pub enum AnyDevice<W: LedWriter, B: AnimationBus> {
    Software(SoftwareDevice<W>),
    Firmware(FirmwareDevice<B>),
}

impl<W: LedWriter, B: AnimationBus> AnyDevice<W, B> {
    /// Builds the backend selected by `config`.
    ///
    /// Replay runs always get the software backend: controller animations
    /// cannot be replayed and consumers need the computed pixel stream.
    pub fn from_config(config: DeviceConfig, writer: W, bus: B) -> Self {
        match config.effective_backend() {
            Backend::Software => AnyDevice::Software(SoftwareDevice::new(writer)),
            Backend::Firmware => AnyDevice::Firmware(FirmwareDevice::new(bus)),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            AnyDevice::Software(_) => Backend::Software,
            AnyDevice::Firmware(_) => Backend::Firmware,
        }
    }
}

impl<W: LedWriter, B: AnimationBus> StripDevice for AnyDevice<W, B> {
    fn attach(&mut self, strip: &Strip) -> Result<(), DeviceError> {
        match self {
            AnyDevice::Software(device) => device.attach(strip),
            AnyDevice::Firmware(device) => device.attach(strip),
        }
    }

    fn request_changed(&mut self, strip: &Strip, request: &AnimationRequest) {
        match self {
            AnyDevice::Software(device) => device.request_changed(strip, request),
            AnyDevice::Firmware(device) => device.request_changed(strip, request),
        }
    }

    fn request_cleared(&mut self, strip: &Strip) {
        match self {
            AnyDevice::Software(device) => device.request_cleared(strip),
            AnyDevice::Firmware(device) => device.request_cleared(strip),
        }
    }

    fn renders(&self, request: &AnimationRequest) -> bool {
        match self {
            AnyDevice::Software(device) => device.renders(request),
            AnyDevice::Firmware(device) => device.renders(request),
        }
    }

    fn apply(&mut self, strip: &Strip, pixels: &[Color]) {
        match self {
            AnyDevice::Software(device) => device.apply(strip, pixels),
            AnyDevice::Firmware(device) => device.apply(strip, pixels),
        }
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        match self {
            AnyDevice::Software(device) => device.set_pixel(index, color),
            AnyDevice::Firmware(device) => device.set_pixel(index, color),
        }
    }

    fn flush(&mut self, pixels: &[Color]) {
        match self {
            AnyDevice::Software(device) => device.flush(pixels),
            AnyDevice::Firmware(device) => device.flush(pixels),
        }
    }
}
