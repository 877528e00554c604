use std::time::{Duration, Instant};

/// A trait for measuring elapsed time relative to a specific starting point.
///
/// The recorder arms an implementation when a recording starts and reads it
/// back when the recording stops to derive the trip duration. Keeping the
/// clock behind a trait lets tests drive the duration deterministically.
///
/// The underlying time source should be monotonic so the measured duration
/// is not affected by system clock adjustments.
pub trait ElapsedTimeSource {
    /// Marks the current moment as the starting point for elapsed time measurement.
    ///
    /// Calling this method resets the starting point. Any subsequent calls to
    /// [`elapsed_time`](Self::elapsed_time) will return the duration since this moment.
    fn start(&mut self);

    /// Returns the duration that has passed since the last call to [`start`](Self::start).
    ///
    /// Returns [`Duration::ZERO`] if the source was never started.
    fn elapsed_time(&self) -> Duration;
}

/// An [`ElapsedTimeSource`] implementation backed by a monotonic clock.
///
/// This source is unaffected by system clock adjustments, making it the
/// production choice for measuring recording durations.
pub struct MonotonicTimeSource {
    start: Option<Instant>,
}

impl MonotonicTimeSource {
    pub fn new() -> Self {
        MonotonicTimeSource { start: None }
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ElapsedTimeSource for MonotonicTimeSource {
    /// Stores the current instant as the new starting point.
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Returns the [`Duration`] elapsed since this time source was started.
    fn elapsed_time(&self) -> Duration {
        self.start.map_or(Duration::ZERO, |time| time.elapsed())
    }
}
