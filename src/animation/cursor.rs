use std::time::{Duration, Instant};

/// A value shown for a fixed duration.
pub type TimedSlice<T> = (Duration, T);

/// Position inside a list of timed slices.
///
/// The first [`advance`](SliceCursor::advance) anchors the timeline at `now` and shows slice 0.
/// Later calls step over every slice whose end has passed; each slice is anchored at the
/// previous slice's end rather than at the sampling instant, so late ticks do not accumulate
/// drift.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SliceCursor {
    index: usize,
    slice_start: Option<Instant>,
}

impl SliceCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn started(&self) -> bool {
        self.slice_start.is_some()
    }

    pub fn done(&self, len: usize) -> bool {
        self.index >= len
    }

    /// Returns the index of the newly visible slice, or `None` when nothing changed.
    pub fn advance<T>(&mut self, slices: &[TimedSlice<T>], now: Instant) -> Option<usize> {
        if self.done(slices.len()) {
            return None;
        }
        let Some(mut start) = self.slice_start else {
            self.slice_start = Some(now);
            return Some(self.index);
        };

        let before = self.index;
        while let Some((duration, _)) = slices.get(self.index) {
            let end = start + *duration;
            if now < end {
                break;
            }
            start = end;
            self.index += 1;
        }
        self.slice_start = Some(start);

        (self.index != before && self.index < slices.len()).then_some(self.index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/cursor.rs"]
mod tests;
