//! Ready-made animations.

use std::time::Duration;

use crate::animation::frame::{Frame, FullFrame};
use crate::animation::full_frame::FullFrameAnimation;
use crate::animation::looped::LoopedAnimation;
use crate::animation::sequence::TubeSequence;
use crate::animation::tube::TubeAnimation;
use crate::animation::Animation;
use crate::foundation::core::secs;
use crate::foundation::error::{SegError, SegResult};

/// Static text shown once.
pub fn text_animation(text: &str) -> SegResult<Animation> {
    Ok(FullFrameAnimation::new(vec![(Duration::ZERO, FullFrame::from_text(text)?)]).into())
}

/// One message after another, each held for `delay`.
pub fn text_sequence(msgs: &[&str], delay: Duration, looped: bool) -> SegResult<Animation> {
    let frames = msgs
        .iter()
        .map(|m| FullFrame::from_text(m))
        .collect::<SegResult<Vec<_>>>()?;
    let anim: Animation = FullFrameAnimation::timed(frames, delay)?.into();
    Ok(if looped { anim.looped() } else { anim })
}

/// A single segment rotating around the tube, `rate` steps per second.
pub fn spin_sequence(rate: f64) -> SegResult<TubeSequence> {
    if rate.is_nan() || rate <= 0.0 {
        return Err(SegError::animation(format!("invalid spin rate {rate}")));
    }
    let frames = (7..14).map(|bit| Frame::raw(1 << bit)).chain([Frame::raw(1 << 6)]);
    TubeSequence::timed(frames, secs(1.0 / rate)?)
}

/// [`spin_sequence`] on `tubes` tubes at once.
pub fn spin_animation(rate: f64, tubes: usize, looped: bool) -> SegResult<Animation> {
    let seq = spin_sequence(rate)?;
    let anim = TubeAnimation::new(vec![seq; tubes]);
    Ok(if looped {
        LoopedAnimation::new(anim).into()
    } else {
        anim.into()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/animation/library.rs"]
mod tests;
