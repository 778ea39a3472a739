//! Shared test infrastructure for rgb-strip-animator integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use rgb_strip_animator::{
    AnimationBus, Color, ControllerCommand, LedWriter, PixelSink, TimeDuration, TimeInstant,
    TimeSource,
};
use std::ops::Range;

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: TestDuration) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + duration.0));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Hardware
// ============================================================================

/// Mock pixel transmitter that records every flushed frame
#[derive(Default)]
pub struct MockWriter {
    frames: Vec<Vec<Color>>,
}

impl MockWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<Color>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[Color]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl LedWriter for MockWriter {
    fn write(&mut self, pixels: &[Color]) {
        self.frames.push(pixels.to_vec());
    }
}

/// Mock controller bus that records every command
#[derive(Default)]
pub struct MockBus {
    commands: Vec<ControllerCommand>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[ControllerCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<ControllerCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AnimationBus for MockBus {
    fn send(&mut self, command: ControllerCommand) {
        self.commands.push(command);
    }
}

/// Pixel sink backed by a plain vector that records every written index
pub struct RecordingSink {
    pub pixels: Vec<Color>,
    pub writes: Vec<usize>,
}

impl RecordingSink {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Color::OFF; len],
            writes: Vec::new(),
        }
    }

    /// Indices of lit pixels
    pub fn lit(&self) -> Vec<usize> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_off())
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns true if every write so far landed inside `range`
    pub fn writes_within(&self, range: Range<usize>) -> bool {
        self.writes.iter().all(|i| range.contains(i))
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl PixelSink for RecordingSink {
    fn set(&mut self, index: usize, color: Color) {
        self.writes.push(index);
        self.pixels[index] = color;
    }
}

// ============================================================================
// Test Colors
// ============================================================================

pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);
pub const WHITE: Color = Color::rgbw(0, 0, 0, 255);
