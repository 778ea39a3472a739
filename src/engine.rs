//! Per-tick pattern computation.
//!
//! [`step`] is the single entry point: given a strip, its progress state, the
//! active request and the current time, it writes the strip's pixels for one
//! tick into a [`PixelSink`] and advances the state. It never writes outside
//! `strip.range()` and never fails.
//!
//! Time-based patterns move at most one position per step, however much time
//! passed since the previous one. A stalled control loop resumes where it left
//! off instead of jumping ahead.

use crate::buffer::PixelSink;
use crate::color::{self, Color};
use crate::request::{AnimationRequest, BounceMode};
use crate::strip::{Strip, StripState};
use crate::time::{TimeInstant, interval_elapsed};

/// Device hue units in a full rainbow turn.
const HUE_RANGE: f32 = 180.0;

/// Base hue advance per tick at full speed.
const RAINBOW_HUE_STEP: f32 = 8.0;

/// Computes one frame of `request` on `strip`.
pub fn step<I, S>(
    strip: &Strip,
    state: &mut StripState<I>,
    request: &AnimationRequest,
    now: I,
    sink: &mut S,
) where
    I: TimeInstant,
    S: PixelSink + ?Sized,
{
    let invert = strip.effective_invert(request);

    match request {
        AnimationRequest::StaticColor(color) => sink.fill(strip.range(), *color),
        AnimationRequest::Blink { color, speed } => blink(strip, state, *color, *speed, now, sink),
        AnimationRequest::Breathe {
            color,
            count,
            speed,
            bounce,
            ..
        } => breathe(
            strip, state, *color, *count, *speed, invert, *bounce, now, sink,
        ),
        AnimationRequest::ColorFlow { color, speed, .. } => {
            color_flow(strip, state, *color, *speed, invert, now, sink)
        }
        AnimationRequest::Rainbow {
            brightness, speed, ..
        } => rainbow(strip, state, *brightness, *speed, invert, sink),
        AnimationRequest::SectionColor { colors, .. } => sections(strip, colors, invert, sink),
    }
}

fn blink<I: TimeInstant, S: PixelSink + ?Sized>(
    strip: &Strip,
    state: &mut StripState<I>,
    color: Color,
    speed: f32,
    now: I,
    sink: &mut S,
) {
    if interval_elapsed(state.last_change, now, speed) {
        state.toggle = !state.toggle;
        state.last_change = now;
    }

    let color = if state.toggle { color } else { Color::OFF };
    sink.fill(strip.range(), color);
}

#[allow(clippy::too_many_arguments)]
fn breathe<I: TimeInstant, S: PixelSink + ?Sized>(
    strip: &Strip,
    state: &mut StripState<I>,
    color: Color,
    count: usize,
    speed: f32,
    invert: bool,
    bounce: BounceMode,
    now: I,
    sink: &mut S,
) {
    let offset = strip.index_offset() as i64;
    let length = strip.len() as i64;
    let overshoot = i64::try_from(bounce.overshoot(count)).unwrap_or(i64::MAX);
    let count = i64::try_from(count).unwrap_or(i64::MAX);

    if interval_elapsed(state.last_change, now, speed) {
        state.scan_head = state
            .scan_head
            .saturating_add(if invert { -1 } else { 1 });
        state.last_change = now;
    }

    if invert && state.scan_head < offset.saturating_add(overshoot) {
        state.scan_head = offset + length;
    } else if !invert && state.scan_head >= (offset + length).saturating_add(overshoot) {
        state.scan_head = offset;
    }

    sink.fill(strip.range(), Color::OFF);

    // Only block positions that land in the visible or wrappable range draw.
    let visible = offset..offset + length;
    let wrappable = offset - length..offset;
    let first = state.scan_head.saturating_sub(offset + length - 1).max(0);
    let last = state
        .scan_head
        .saturating_sub(offset - length)
        .saturating_add(1)
        .min(count);
    for i in first..last {
        let candidate = state.scan_head - i;
        if visible.contains(&candidate) {
            sink.set(candidate as usize, color);
        } else if wrappable.contains(&candidate) {
            // Bouncing blocks leave the strip instead of wrapping around.
            let truncate = match bounce {
                BounceMode::None => false,
                BounceMode::Back => true,
                BounceMode::Center => i > count / 2,
            };
            if truncate {
                break;
            }
            sink.set((candidate + length) as usize, color);
        }
    }
}

fn color_flow<I: TimeInstant, S: PixelSink + ?Sized>(
    strip: &Strip,
    state: &mut StripState<I>,
    color: Color,
    speed: f32,
    invert: bool,
    now: I,
    sink: &mut S,
) {
    let length = strip.len() as i32;

    sink.fill(strip.range(), Color::OFF);

    if interval_elapsed(state.last_change, now, speed) {
        state.flow_progress += if state.flow_reversed { -1 } else { 1 };
        state.last_change = now;

        if state.flow_progress >= length {
            state.flow_reversed = !state.flow_reversed;
            state.flow_progress -= 1;
        } else if state.flow_progress < 0 {
            state.flow_reversed = !state.flow_reversed;
            state.flow_progress += 1;
        }
    }

    let filled = state.flow_progress.clamp(0, length) as usize;
    let start = strip.index_offset();
    let end = start + strip.len();
    if invert {
        sink.fill(end - filled..end, color);
    } else {
        sink.fill(start..start + filled, color);
    }
}

fn rainbow<I: TimeInstant, S: PixelSink + ?Sized>(
    strip: &Strip,
    state: &mut StripState<I>,
    brightness: f32,
    speed: f32,
    invert: bool,
    sink: &mut S,
) {
    let length = strip.len();

    for led in 0..length {
        // Integer spread: strips longer than 180 LEDs repeat hues.
        let spread = ((led * 180 / length) % 180) as f32;
        let hue = (state.rainbow_base_hue + spread) % 360.0;
        sink.set(strip.index_offset() + led, color::hue(hue, brightness));
    }

    let delta = speed * RAINBOW_HUE_STEP;
    let next = if invert {
        state.rainbow_base_hue - delta
    } else {
        state.rainbow_base_hue + delta
    };
    state.rainbow_base_hue = wrap_hue(next);
}

fn sections<S: PixelSink + ?Sized>(strip: &Strip, colors: &[Color], invert: bool, sink: &mut S) {
    let n = colors.len();
    if n == 0 {
        return;
    }

    let length = strip.len();
    let offset = strip.index_offset();
    let per_section = length / n;

    for i in 0..n {
        let start = per_section * i;
        let end = if i == n - 1 {
            length
        } else {
            per_section * (i + 1)
        };
        let color = colors[if invert { n - 1 - i } else { i }];
        sink.fill(offset + start..offset + end, color);
    }
}

/// Wraps a device hue into `[0, 180)`.
fn wrap_hue(hue: f32) -> f32 {
    let wrapped = hue % HUE_RANGE;
    if wrapped < 0.0 {
        wrapped + HUE_RANGE
    } else {
        wrapped
    }
}
