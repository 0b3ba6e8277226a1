use std::time::{Duration, Instant};

use crate::animation::Animation;
use crate::animation::sequence::TubeSequence;
use crate::animation::tube::TubeAnimation;
use crate::foundation::core::elapsed_since;
use crate::foundation::error::{SegError, SegResult};
use crate::foundation::math::lcm_all;

/// Loop-period precision used by [`LoopedAnimation::normalized`].
const PERIOD_STEP_MS: u128 = 100;

/// Restarts its base animation whenever it finishes.
///
/// Without a loop budget it never reports done.
#[derive(Debug, Clone)]
pub struct LoopedAnimation {
    base: Animation,
    loops: Option<u32>,
    loops_done: u32,
    delay: Duration,
    ended_at: Option<Instant>,
}

impl PartialEq for LoopedAnimation {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.loops == other.loops && self.delay == other.delay
    }
}

impl LoopedAnimation {
    pub fn new(base: impl Into<Animation>) -> Self {
        Self {
            base: base.into(),
            loops: None,
            loops_done: 0,
            delay: Duration::ZERO,
            ended_at: None,
        }
    }

    /// Stop after `loops` passes.
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = Some(loops);
        self
    }

    /// Hold the last frame for `delay` before restarting.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Loop tubes that share a common period: each tube is repeated until all of them end
    /// together, with lengths rounded to 100 ms.
    pub fn normalized(tubes: Vec<TubeSequence>) -> SegResult<Self> {
        let steps: Vec<u64> = tubes
            .iter()
            .map(|t| (t.length().as_millis() / PERIOD_STEP_MS) as u64)
            .collect();
        if steps.contains(&0) {
            return Err(SegError::animation(
                "cannot normalize tube sequences shorter than 100ms",
            ));
        }
        let period = lcm_all(&steps)
            .ok_or_else(|| SegError::animation("loop period is too large to normalize"))?;
        let tubes = tubes
            .iter()
            .zip(&steps)
            .map(|(t, &n)| {
                let times = usize::try_from(period / n)
                    .map_err(|_| SegError::animation("loop period is too large to normalize"))?;
                Ok(t.repeat(times))
            })
            .collect::<SegResult<Vec<_>>>()?;
        Ok(Self::new(TubeAnimation::new(tubes)))
    }

    pub fn base(&self) -> &Animation {
        &self.base
    }

    pub fn loops_done(&self) -> u32 {
        self.loops_done
    }

    pub fn reset(&mut self) {
        self.base.reset();
        self.loops_done = 0;
        self.ended_at = None;
    }

    /// Length of one pass.
    pub fn length(&self) -> Duration {
        self.base.length()
    }

    pub fn tube_count(&self) -> usize {
        self.base.tube_count()
    }

    pub fn code(&self) -> String {
        self.base.code()
    }

    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        if self.done() {
            return false;
        }
        if self.base.update_frame_set(now) {
            return true;
        }
        if !self.base.done(now) {
            return false;
        }

        let ended = match self.ended_at {
            Some(t) => t,
            None => {
                self.loops_done += 1;
                self.ended_at = Some(now);
                now
            }
        };
        if self.done() || elapsed_since(ended, now) < self.delay {
            return false;
        }
        self.base.reset();
        self.ended_at = None;
        self.base.update_frame_set(now)
    }

    pub fn done(&self) -> bool {
        self.loops.is_some_and(|n| self.loops_done >= n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/looped.rs"]
mod tests;
