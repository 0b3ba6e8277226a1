use std::ops::Add;
use std::time::{Duration, Instant};

use crate::animation::cursor::{SliceCursor, TimedSlice};
use crate::animation::frame::Frame;
use crate::foundation::error::{SegError, SegResult};

/// Gap inserted by [`TubeSequence::concat`] when the left side has fewer than two slices.
pub const DEFAULT_GAP: Duration = Duration::from_secs(1);

/// Timed frames for a single tube.
#[derive(Debug, Clone, Default)]
pub struct TubeSequence {
    slices: Vec<TimedSlice<Frame>>,
    cursor: SliceCursor,
}

impl PartialEq for TubeSequence {
    fn eq(&self, other: &Self) -> bool {
        self.slices == other.slices
    }
}

impl TubeSequence {
    pub fn new(slices: Vec<TimedSlice<Frame>>) -> Self {
        Self {
            slices,
            cursor: SliceCursor::default(),
        }
    }

    /// A single blank slice lasting `length`.
    pub fn blank(length: Duration) -> Self {
        Self::new(vec![(length, Frame::BLANK)])
    }

    /// Evenly spaced frames, each shown for `delay`.
    pub fn timed(frames: impl IntoIterator<Item = Frame>, delay: Duration) -> SegResult<Self> {
        let slices: Vec<_> = frames.into_iter().map(|f| (delay, f)).collect();
        if slices.is_empty() {
            return Err(SegError::animation(
                "cannot make a timed sequence without at least one frame",
            ));
        }
        Ok(Self::new(slices))
    }

    pub fn slices(&self) -> &[TimedSlice<Frame>] {
        &self.slices
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    pub fn frame_count(&self) -> usize {
        self.slices.len()
    }

    pub fn remaining(&self) -> usize {
        self.slices.len().saturating_sub(self.cursor.index())
    }

    pub fn done(&self) -> bool {
        self.cursor.done(self.slices.len())
    }

    pub fn length(&self) -> Duration {
        self.slices.iter().map(|(d, _)| *d).sum()
    }

    pub fn current_frame(&self) -> Option<Frame> {
        self.slices.get(self.cursor.index()).map(|(_, f)| *f)
    }

    /// The leading slices that start within `length` of the beginning.
    pub fn frames_through_time(&self, length: Duration) -> &[TimedSlice<Frame>] {
        let mut start = Duration::ZERO;
        let count = self
            .slices
            .iter()
            .take_while(|(d, _)| {
                let shown = start < length;
                start += *d;
                shown
            })
            .count();
        &self.slices[..count]
    }

    /// The frame to show if it changed since the last call, advancing over elapsed slices.
    pub fn pop_frame(&mut self, now: Instant) -> Option<Frame> {
        let idx = self.cursor.advance(&self.slices, now)?;
        Some(self.slices[idx].1)
    }

    /// Append `other`'s slices directly after the last slice. Rewinds the cursor.
    pub fn append(&mut self, other: &TubeSequence) {
        self.slices.extend_from_slice(&other.slices);
        self.reset();
    }

    /// Sequence playing `self`, then `other` after a gap equal to `self`'s last inter-slice
    /// delay (or [`DEFAULT_GAP`]). The gap holds `self`'s final frame.
    pub fn concat(&self, other: &TubeSequence) -> TubeSequence {
        let mut slices = self.slices.clone();
        let n = slices.len();
        let gap = if n >= 2 { slices[n - 2].0 } else { DEFAULT_GAP };
        if let Some(last) = slices.last_mut() {
            last.0 = last.0.saturating_add(gap);
        }
        slices.extend_from_slice(&other.slices);
        Self::new(slices)
    }

    pub fn repeat(&self, times: usize) -> TubeSequence {
        Self::new(self.slices.repeat(times))
    }

    /// Repeat by a fractional factor: the integer part repeats whole, the remainder adds the
    /// slices that would start within that fraction of the length.
    pub fn scaled(&self, factor: f64) -> SegResult<TubeSequence> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(SegError::animation(format!(
                "invalid repeat factor {factor}"
            )));
        }
        let whole = factor.trunc();
        let mut out = self.repeat(whole as usize);
        let rest = self.length().mul_f64(factor - whole);
        out.slices
            .extend_from_slice(self.frames_through_time(rest));
        Ok(out)
    }
}

impl Add for TubeSequence {
    type Output = TubeSequence;

    fn add(self, rhs: TubeSequence) -> TubeSequence {
        self.concat(&rhs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequence.rs"]
mod tests;
