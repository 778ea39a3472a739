//! Strip geometry and per-strip animation progress.

use crate::request::AnimationRequest;
use crate::time::TimeInstant;
use core::ops::Range;

/// An identifier for a strip within a registry.
///
/// Assigned by the registry in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripId(pub usize);

impl From<usize> for StripId {
    fn from(id: usize) -> Self {
        StripId(id)
    }
}

impl From<StripId> for usize {
    fn from(id: StripId) -> Self {
        id.0
    }
}

/// Immutable geometry of one strip inside the shared pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Strip {
    id: StripId,
    index_offset: usize,
    length: usize,
    inverted: bool,
}

impl Strip {
    /// Creates strip geometry. Use [`StripRegistry::register`] to get a
    /// validated strip with a unique id.
    ///
    /// [`StripRegistry::register`]: crate::StripRegistry::register
    pub fn new(id: StripId, index_offset: usize, length: usize, inverted: bool) -> Self {
        Self {
            id,
            index_offset,
            length,
            inverted,
        }
    }

    pub fn id(&self) -> StripId {
        self.id
    }

    /// First buffer index owned by this strip.
    pub fn index_offset(&self) -> usize {
        self.index_offset
    }

    /// Number of LEDs; never zero.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Buffer indices owned by this strip.
    pub fn range(&self) -> Range<usize> {
        self.index_offset..self.index_offset + self.length
    }

    /// Returns true if the two strips share at least one buffer index.
    pub fn overlaps(&self, other: &Strip) -> bool {
        self.index_offset < other.index_offset + other.length
            && other.index_offset < self.index_offset + self.length
    }

    /// Strip inversion combined with the request's own direction flag.
    pub fn effective_invert(&self, request: &AnimationRequest) -> bool {
        self.inverted ^ request.invert()
    }
}

/// Mutable animation progress of one strip.
///
/// Only the engine mutates it, and only during the owning strip's step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripState<I: TimeInstant> {
    pub(crate) last_change: I,
    pub(crate) scan_head: i64,
    pub(crate) flow_progress: i32,
    pub(crate) flow_reversed: bool,
    pub(crate) rainbow_base_hue: f32,
    pub(crate) toggle: bool,
}

impl<I: TimeInstant> StripState<I> {
    /// Creates the baseline state for `request` on `strip`.
    pub fn new(strip: &Strip, request: &AnimationRequest, now: I) -> Self {
        let scan_head = if strip.effective_invert(request) {
            strip.index_offset + strip.length
        } else {
            strip.index_offset
        };

        Self {
            last_change: now,
            scan_head: scan_head as i64,
            flow_progress: 0,
            flow_reversed: false,
            rainbow_base_hue: 0.0,
            toggle: true,
        }
    }

    /// Puts every progress field back to the baseline for `request`.
    pub fn reset(&mut self, strip: &Strip, request: &AnimationRequest, now: I) {
        *self = Self::new(strip, request, now);
    }

    /// Instant of the last blink toggle or scan/flow move.
    pub fn last_change(&self) -> I {
        self.last_change
    }

    /// Absolute buffer index of the leading LED of the scanning block.
    pub fn scan_head(&self) -> i64 {
        self.scan_head
    }

    /// Number of filled LEDs in a color flow.
    pub fn flow_progress(&self) -> i32 {
        self.flow_progress
    }

    /// True while a color flow is receding.
    pub fn flow_reversed(&self) -> bool {
        self.flow_reversed
    }

    /// Device hue (0-180) of the first LED in a rainbow.
    pub fn rainbow_base_hue(&self) -> f32 {
        self.rainbow_base_hue
    }

    /// Blink phase: true while the color is shown.
    pub fn toggle(&self) -> bool {
        self.toggle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn overlapping_ranges_are_detected() {
        let a = Strip::new(StripId(0), 0, 10, false);
        let b = Strip::new(StripId(1), 9, 5, false);
        let c = Strip::new(StripId(2), 10, 5, false);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn effective_invert_combines_strip_and_request() {
        let strip = Strip::new(StripId(0), 0, 10, true);
        let forward = AnimationRequest::ColorFlow {
            color: Color::OFF,
            speed: 0.5,
            invert: false,
        };
        let backward = AnimationRequest::ColorFlow {
            color: Color::OFF,
            speed: 0.5,
            invert: true,
        };
        assert!(strip.effective_invert(&forward));
        assert!(!strip.effective_invert(&backward));
    }
}
