use std::time::{Duration, Instant};

use crate::animation::frame::{Frame, text_to_frames};
use crate::foundation::core::elapsed_since;
use crate::foundation::error::SegResult;

pub const DEFAULT_MARQUEE_DELAY: Duration = Duration::from_millis(500);

/// A window of `size` tubes sliding over a longer message.
///
/// When the message fits and `freeze` is non-zero, the whole message is held for `freeze`
/// instead of scrolling.
#[derive(Debug, Clone)]
pub struct MarqueeAnimation {
    frames: Vec<Frame>,
    size: usize,
    delay: Duration,
    freeze: Duration,
    index: Option<usize>,
    start: Option<Instant>,
}

impl PartialEq for MarqueeAnimation {
    fn eq(&self, other: &Self) -> bool {
        self.frames == other.frames
            && self.size == other.size
            && self.delay == other.delay
            && self.freeze == other.freeze
    }
}

impl MarqueeAnimation {
    pub fn new(frames: Vec<Frame>, size: usize) -> Self {
        Self {
            frames,
            size,
            delay: DEFAULT_MARQUEE_DELAY,
            freeze: Duration::ZERO,
            index: None,
            start: None,
        }
    }

    pub fn from_text(text: &str, size: usize) -> SegResult<Self> {
        Ok(Self::new(text_to_frames(text)?, size))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Ignored when the message is wider than the window.
    pub fn with_freeze(mut self, freeze: Duration) -> Self {
        self.freeze = if self.frames.len() <= self.size {
            freeze
        } else {
            Duration::ZERO
        };
        self
    }

    fn frozen(&self) -> bool {
        !self.freeze.is_zero()
    }

    fn steps(&self, elapsed: Duration) -> usize {
        if self.delay.is_zero() {
            return self.frames.len();
        }
        (elapsed.as_nanos() / self.delay.as_nanos()) as usize
    }

    pub fn reset(&mut self) {
        self.index = None;
        self.start = None;
    }

    pub fn length(&self) -> Duration {
        if self.frozen() {
            return self.freeze;
        }
        let steps = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        self.delay.saturating_mul(steps)
    }

    pub fn tube_count(&self) -> usize {
        self.size
    }

    pub fn code(&self) -> String {
        let from = self.index.unwrap_or(0).min(self.frames.len());
        let window = &self.frames[from..(from + self.size).min(self.frames.len())];
        let mut out = String::new();
        for f in window {
            f.write_code(&mut out);
        }
        for _ in window.len()..self.size {
            Frame::BLANK.write_code(&mut out);
        }
        out
    }

    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        let start = *self.start.get_or_insert(now);
        if self.frozen() {
            return self.index.replace(0).is_none();
        }

        let next = self.steps(elapsed_since(start, now));
        if next > self.frames.len() || self.index == Some(next) {
            return false;
        }
        self.index = Some(next);
        true
    }

    /// Done once the message has scrolled off, or once `freeze` has elapsed.
    pub fn done(&self, now: Instant) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        let elapsed = elapsed_since(start, now);
        if self.frozen() {
            elapsed >= self.freeze
        } else {
            self.steps(elapsed) >= self.frames.len()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/marquee.rs"]
mod tests;
