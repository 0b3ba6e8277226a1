use std::time::{Duration, Instant};

use crate::animation::frame::{Frame, FullFrame};
use crate::animation::sequence::TubeSequence;
use crate::foundation::error::{SegError, SegResult};

/// Independent per-tube sequences sampled together.
#[derive(Debug, Clone, Default)]
pub struct TubeAnimation {
    tubes: Vec<TubeSequence>,
    current: Vec<Frame>,
}

impl PartialEq for TubeAnimation {
    fn eq(&self, other: &Self) -> bool {
        self.tubes == other.tubes
    }
}

impl TubeAnimation {
    pub fn new(tubes: Vec<TubeSequence>) -> Self {
        let current = vec![Frame::BLANK; tubes.len()];
        Self { tubes, current }
    }

    /// Pad every sequence with a blank tail so all reach the longest length.
    pub fn equalize(tubes: &mut [TubeSequence]) {
        let longest = longest(tubes);
        for seq in tubes.iter_mut() {
            let diff = longest - seq.length();
            if !diff.is_zero() {
                seq.append(&TubeSequence::blank(diff));
            }
        }
    }

    /// Stretch every tube by repetition to the longest tube's length times `extend`.
    pub fn equalized(tubes: Vec<TubeSequence>, extend: f64) -> SegResult<Self> {
        let target = longest(&tubes).as_secs_f64() * extend;
        let tubes = tubes
            .iter()
            .map(|seq| {
                let len = seq.length().as_secs_f64();
                if len == 0.0 {
                    return Err(SegError::animation(
                        "cannot stretch a tube sequence of zero length",
                    ));
                }
                seq.scaled(target / len)
            })
            .collect::<SegResult<Vec<_>>>()?;
        Ok(Self::new(tubes))
    }

    pub fn tubes(&self) -> &[TubeSequence] {
        &self.tubes
    }

    pub fn reset(&mut self) {
        for seq in &mut self.tubes {
            seq.reset();
        }
        self.current.fill(Frame::BLANK);
    }

    /// Longest tube.
    pub fn length(&self) -> Duration {
        longest(&self.tubes)
    }

    pub fn tube_count(&self) -> usize {
        self.current.len()
    }

    pub fn current_frames(&self) -> FullFrame {
        FullFrame::new(self.current.clone())
    }

    pub fn code(&self) -> String {
        self.current_frames().code()
    }

    /// Pull a frame from every tube; true when any tube changed.
    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        let mut updated = false;
        for (slot, seq) in self.current.iter_mut().zip(&mut self.tubes) {
            if let Some(frame) = seq.pop_frame(now) {
                *slot = frame;
                updated = true;
            }
        }
        updated
    }

    pub fn done(&self) -> bool {
        self.tubes.iter().all(TubeSequence::done)
    }

    /// Play `self`, then `other`, tube by tube. Missing tubes on either side are blank.
    pub fn concat(&self, other: &TubeAnimation) -> TubeAnimation {
        let mut left = self.tubes.clone();
        Self::equalize(&mut left);
        let pad = longest(&left);
        let mut right = other.tubes.clone();

        if right.len() > left.len() {
            left.resize_with(right.len(), || TubeSequence::blank(pad));
        } else {
            right.resize_with(left.len(), TubeSequence::default);
        }

        for (l, r) in left.iter_mut().zip(&right) {
            l.append(r);
        }
        Self::new(left)
    }
}

fn longest(tubes: &[TubeSequence]) -> Duration {
    tubes
        .iter()
        .map(TubeSequence::length)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tube.rs"]
mod tests;
