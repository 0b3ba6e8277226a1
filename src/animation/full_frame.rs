use std::time::{Duration, Instant};

use crate::animation::cursor::{SliceCursor, TimedSlice};
use crate::animation::frame::FullFrame;
use crate::animation::sequence::DEFAULT_GAP;
use crate::foundation::error::{SegError, SegResult};

/// One timeline of pre-composed full frames.
#[derive(Debug, Clone, Default)]
pub struct FullFrameAnimation {
    slices: Vec<TimedSlice<FullFrame>>,
    tubes: usize,
    cursor: SliceCursor,
    current: FullFrame,
}

impl PartialEq for FullFrameAnimation {
    fn eq(&self, other: &Self) -> bool {
        self.slices == other.slices
    }
}

impl FullFrameAnimation {
    /// Frames narrower than the widest one are padded with blanks.
    pub fn new(slices: Vec<TimedSlice<FullFrame>>) -> Self {
        let tubes = slices.iter().map(|(_, f)| f.len()).max().unwrap_or(0);
        let slices = slices
            .into_iter()
            .map(|(d, f)| (d, f.fit(tubes)))
            .collect();
        Self {
            slices,
            tubes,
            cursor: SliceCursor::default(),
            current: FullFrame::blank(tubes),
        }
    }

    pub fn timed(frames: impl IntoIterator<Item = FullFrame>, delay: Duration) -> SegResult<Self> {
        let slices: Vec<_> = frames.into_iter().map(|f| (delay, f)).collect();
        if slices.is_empty() {
            return Err(SegError::animation(
                "cannot make a timed animation without at least one frame",
            ));
        }
        Ok(Self::new(slices))
    }

    pub fn slices(&self) -> &[TimedSlice<FullFrame>] {
        &self.slices
    }

    pub fn frame_count(&self) -> usize {
        self.slices.len()
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
        self.current = FullFrame::blank(self.tubes);
    }

    pub fn length(&self) -> Duration {
        self.slices.iter().map(|(d, _)| *d).sum()
    }

    pub fn tube_count(&self) -> usize {
        self.tubes
    }

    pub fn current_frame(&self) -> &FullFrame {
        &self.current
    }

    pub fn code(&self) -> String {
        self.current.code()
    }

    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        match self.cursor.advance(&self.slices, now) {
            Some(idx) => {
                self.current = self.slices[idx].1.clone();
                true
            }
            None => false,
        }
    }

    pub fn done(&self) -> bool {
        self.cursor.done(self.slices.len())
    }

    /// Play `self`, then `other` after `self`'s last inter-slice delay (or one second).
    pub fn concat(&self, other: &FullFrameAnimation) -> FullFrameAnimation {
        let mut slices = self.slices.clone();
        let n = slices.len();
        let gap = if n >= 2 { slices[n - 2].0 } else { DEFAULT_GAP };
        if let Some(last) = slices.last_mut() {
            last.0 = last.0.saturating_add(gap);
        }
        slices.extend(other.slices.iter().cloned());
        Self::new(slices)
    }

    pub fn repeat(&self, times: usize) -> FullFrameAnimation {
        let slices = (0..times).flat_map(|_| self.slices.iter().cloned()).collect();
        Self::new(slices)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/full_frame.rs"]
mod tests;
