//! Time-indexed animation model.
//!
//! Every animation is sampled with an explicit `now`; [`Animation::update_frame_set`] reports
//! whether the visible frame changed since the previous sample and [`Animation::code`] returns
//! the command string for what is currently visible.

pub mod combo;
pub(crate) mod cursor;
pub mod frame;
pub mod full_frame;
pub mod library;
pub mod looped;
pub mod marquee;
pub mod sequence;
pub mod tube;

use std::time::{Duration, Instant};

pub use combo::ComboAnimation;
pub use cursor::TimedSlice;
pub use frame::{Frame, FullFrame, escape_text, text_to_frames};
pub use full_frame::FullFrameAnimation;
pub use looped::LoopedAnimation;
pub use marquee::MarqueeAnimation;
pub use sequence::TubeSequence;
pub use tube::TubeAnimation;

/// Any playable animation.
///
/// Equality compares timelines only; playback position is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Animation {
    /// No tubes, always done.
    #[default]
    Empty,
    Tube(TubeAnimation),
    FullFrame(FullFrameAnimation),
    Combo(ComboAnimation),
    Marquee(MarqueeAnimation),
    Looped(Box<LoopedAnimation>),
}

impl Animation {
    /// Rewind to the beginning; the next sample re-anchors the timeline.
    pub fn reset(&mut self) {
        match self {
            Self::Empty => {}
            Self::Tube(a) => a.reset(),
            Self::FullFrame(a) => a.reset(),
            Self::Combo(a) => a.reset(),
            Self::Marquee(a) => a.reset(),
            Self::Looped(a) => a.reset(),
        }
    }

    pub fn length(&self) -> Duration {
        match self {
            Self::Empty => Duration::ZERO,
            Self::Tube(a) => a.length(),
            Self::FullFrame(a) => a.length(),
            Self::Combo(a) => a.length(),
            Self::Marquee(a) => a.length(),
            Self::Looped(a) => a.length(),
        }
    }

    pub fn tube_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Tube(a) => a.tube_count(),
            Self::FullFrame(a) => a.tube_count(),
            Self::Combo(a) => a.tube_count(),
            Self::Marquee(a) => a.tube_count(),
            Self::Looped(a) => a.tube_count(),
        }
    }

    /// Command string for the currently visible frame set.
    pub fn code(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Tube(a) => a.code(),
            Self::FullFrame(a) => a.code(),
            Self::Combo(a) => a.code(),
            Self::Marquee(a) => a.code(),
            Self::Looped(a) => a.code(),
        }
    }

    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        match self {
            Self::Empty => false,
            Self::Tube(a) => a.update_frame_set(now),
            Self::FullFrame(a) => a.update_frame_set(now),
            Self::Combo(a) => a.update_frame_set(now),
            Self::Marquee(a) => a.update_frame_set(now),
            Self::Looped(a) => a.update_frame_set(now),
        }
    }

    pub fn done(&self, now: Instant) -> bool {
        match self {
            Self::Empty => true,
            Self::Tube(a) => a.done(),
            Self::FullFrame(a) => a.done(),
            Self::Combo(a) => a.done(now),
            Self::Marquee(a) => a.done(now),
            Self::Looped(a) => a.done(),
        }
    }

    pub fn looped(self) -> Animation {
        LoopedAnimation::new(self).into()
    }
}

impl From<TubeAnimation> for Animation {
    fn from(a: TubeAnimation) -> Self {
        Self::Tube(a)
    }
}

impl From<FullFrameAnimation> for Animation {
    fn from(a: FullFrameAnimation) -> Self {
        Self::FullFrame(a)
    }
}

impl From<ComboAnimation> for Animation {
    fn from(a: ComboAnimation) -> Self {
        Self::Combo(a)
    }
}

impl From<MarqueeAnimation> for Animation {
    fn from(a: MarqueeAnimation) -> Self {
        Self::Marquee(a)
    }
}

impl From<LoopedAnimation> for Animation {
    fn from(a: LoopedAnimation) -> Self {
        Self::Looped(Box::new(a))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/mod.rs"]
mod tests;
