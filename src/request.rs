//! Animation requests: the complete command surface of the engine.

use crate::color::Color;
use heapless::Vec;

/// Maximum number of sections a [`AnimationRequest::SectionColor`] can carry.
pub const MAX_SECTIONS: usize = 16;

/// Ordered section colors.
pub type SectionColors = Vec<Color, MAX_SECTIONS>;

/// Where a scanning block restarts once it reaches the end of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BounceMode {
    /// Wrap exactly at the strip edge.
    #[default]
    None,

    /// Let the whole block exit before restarting.
    Back,

    /// Let half of the block exit before restarting.
    Center,
}

impl BounceMode {
    /// Extra LEDs the scan head may travel past the strip edge.
    #[inline]
    pub fn overshoot(&self, count: usize) -> usize {
        match self {
            BounceMode::None => 0,
            BounceMode::Back => count,
            BounceMode::Center => count / 2,
        }
    }
}

/// A requested pattern with its parameters.
///
/// Speeds and brightness are normalized to `0.0..=1.0`. A speed of `s` holds
/// each position for `1 - s` seconds. Values outside that range are not
/// validated.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationRequest {
    /// Whole strip in one color.
    StaticColor(Color),

    /// Whole strip toggles between the color and off.
    Blink { color: Color, speed: f32 },

    /// A block of `count` LEDs scanning along the strip.
    Breathe {
        color: Color,
        count: usize,
        speed: f32,
        invert: bool,
        bounce: BounceMode,
    },

    /// A fill growing from one end of the strip and then receding.
    ColorFlow {
        color: Color,
        speed: f32,
        invert: bool,
    },

    /// A rotating hue gradient across the strip.
    Rainbow {
        brightness: f32,
        speed: f32,
        invert: bool,
    },

    /// Equal-width sections, one color each. The last section absorbs the
    /// remainder of the integer division.
    SectionColor { colors: SectionColors, invert: bool },
}

/// Fieldless discriminant of an [`AnimationRequest`].
///
/// Strip progress is reset when the kind changes, not when parameters do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationKind {
    StaticColor,
    Blink,
    Breathe,
    ColorFlow,
    Rainbow,
    SectionColor,
}

impl AnimationRequest {
    /// Builds a section request from a color list.
    ///
    /// # Errors
    /// * `EmptySections` - No colors were given
    /// * `CapacityExceeded` - More than [`MAX_SECTIONS`] colors were given
    pub fn sections(colors: &[Color], invert: bool) -> Result<Self, RequestError> {
        if colors.is_empty() {
            return Err(RequestError::EmptySections);
        }

        let colors =
            SectionColors::from_slice(colors).map_err(|_| RequestError::CapacityExceeded)?;

        Ok(AnimationRequest::SectionColor { colors, invert })
    }

    /// Returns the kind of this request.
    pub fn kind(&self) -> AnimationKind {
        match self {
            AnimationRequest::StaticColor(_) => AnimationKind::StaticColor,
            AnimationRequest::Blink { .. } => AnimationKind::Blink,
            AnimationRequest::Breathe { .. } => AnimationKind::Breathe,
            AnimationRequest::ColorFlow { .. } => AnimationKind::ColorFlow,
            AnimationRequest::Rainbow { .. } => AnimationKind::Rainbow,
            AnimationRequest::SectionColor { .. } => AnimationKind::SectionColor,
        }
    }

    /// Returns the request's own direction flag (false for kinds without one).
    pub fn invert(&self) -> bool {
        match self {
            AnimationRequest::Breathe { invert, .. }
            | AnimationRequest::ColorFlow { invert, .. }
            | AnimationRequest::Rainbow { invert, .. }
            | AnimationRequest::SectionColor { invert, .. } => *invert,
            AnimationRequest::StaticColor(_) | AnimationRequest::Blink { .. } => false,
        }
    }
}

/// Request validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// No section colors provided.
    EmptySections,

    /// Section capacity exceeded.
    CapacityExceeded,
}

impl core::fmt::Display for RequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RequestError::EmptySections => {
                write!(f, "section request must have at least one color")
            }
            RequestError::CapacityExceeded => {
                write!(f, "section request exceeds {} colors", MAX_SECTIONS)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RequestError {}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn sections_rejects_empty_list() {
        assert_eq!(
            AnimationRequest::sections(&[], false),
            Err(RequestError::EmptySections)
        );
    }

    #[test]
    fn sections_rejects_too_many_colors() {
        let colors = [RED; MAX_SECTIONS + 1];
        assert_eq!(
            AnimationRequest::sections(&colors, false),
            Err(RequestError::CapacityExceeded)
        );
    }

    #[test]
    fn kind_ignores_parameters() {
        let slow = AnimationRequest::Blink {
            color: RED,
            speed: 0.1,
        };
        let fast = AnimationRequest::Blink {
            color: Color::OFF,
            speed: 0.9,
        };
        assert_ne!(slow, fast);
        assert_eq!(slow.kind(), fast.kind());
    }

    #[test]
    fn bounce_overshoot_matches_mode() {
        assert_eq!(BounceMode::None.overshoot(5), 0);
        assert_eq!(BounceMode::Back.overshoot(5), 5);
        assert_eq!(BounceMode::Center.overshoot(5), 2);
    }
}
