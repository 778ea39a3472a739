//! Time abstraction traits for platform-agnostic timing.
//!
//! The engine only ever asks how much time passed since the last pattern
//! move, so the traits are kept to that surface. Implement them for your
//! platform's clock (e.g. `embassy_time::Instant`, a hardware timer tick or a
//! simulated clock in tests).

/// Trait for abstracting time sources.
///
/// Must be monotonic. The registry reads it once per strip per tick.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Converts duration to microseconds.
    ///
    /// Override this for clocks finer than a millisecond; the default only
    /// has millisecond resolution.
    fn as_micros(&self) -> u64 {
        self.as_millis().saturating_mul(1000)
    }
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Implementations should saturate to `ZERO` if `earlier` is in the future.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Converts a normalized animation speed into the hold interval between moves.
///
/// `speed = 1.0` yields a zero interval (move on every tick that sees time
/// advance), `speed = 0.0` yields one second. Rounded to the nearest
/// microsecond.
#[inline]
pub(crate) fn interval_micros(speed: f32) -> u64 {
    let speed = speed.clamp(0.0, 1.0);
    ((1.0 - speed) * 1_000_000.0 + 0.5) as u64
}

/// Returns true once strictly more than the speed's interval has passed.
#[inline]
pub(crate) fn interval_elapsed<I: TimeInstant>(last: I, now: I, speed: f32) -> bool {
    now.duration_since(last).as_micros() > interval_micros(speed)
}
