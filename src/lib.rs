#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`AnimationRequest`**: The pattern a strip should show (static color, blink, breathe, color flow, rainbow, sections)
//! - **`Strip`**: Immutable geometry of one strip: offset into the shared buffer, length, inversion
//! - **`StripState`**: Per-strip animation progress (blink phase, scan head, flow fill, rainbow hue)
//! - **`engine::step`**: Computes one frame of a request on a strip
//! - **`PixelBuffer`**: Flat pixel storage shared by all strips, each owning a disjoint range
//! - **`StripDevice`**: Trait for backends; `SoftwareDevice` streams the buffer, `FirmwareDevice` drives controller animation slots
//! - **`StripRegistry`**: Owns strips, buffer and device; call `tick()` once per control cycle
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Colors are 8-bit RGB(W) values passed through to the hardware unchanged.

#[macro_use]
mod fmt;

pub mod buffer;
pub mod color;
pub mod config;
pub mod device;
pub mod engine;
pub mod registry;
pub mod request;
pub mod strip;
pub mod time;

pub use buffer::{BufferError, PixelBuffer, PixelSink};
pub use color::Color;
pub use config::{Backend, DeviceConfig, RunMode};
pub use device::{
    AnimationBus, AnyDevice, ControllerCommand, DeviceError, FirmwareDevice, LedWriter,
    MAX_ANIMATION_SLOTS, NativeAnimation, SoftwareDevice, StripDevice,
};
pub use registry::{RegistryError, StripRegistry};
pub use request::{AnimationKind, AnimationRequest, BounceMode, MAX_SECTIONS, RequestError};
pub use strip::{Strip, StripId, StripState};
pub use time::{TimeDuration, TimeInstant, TimeSource};

/// All channels off.
pub const COLOR_OFF: Color = Color::OFF;
