use std::time::{Duration, Instant};

use crate::animation::Animation;

/// Animations placed side by side, each driving its own range of tubes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComboAnimation {
    parts: Vec<Animation>,
}

impl ComboAnimation {
    pub fn new(parts: Vec<Animation>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[Animation] {
        &self.parts
    }

    pub fn reset(&mut self) {
        for part in &mut self.parts {
            part.reset();
        }
    }

    pub fn length(&self) -> Duration {
        self.parts
            .iter()
            .map(Animation::length)
            .max()
            .unwrap_or_default()
    }

    pub fn tube_count(&self) -> usize {
        self.parts.iter().map(Animation::tube_count).sum()
    }

    pub fn code(&self) -> String {
        self.parts.iter().map(Animation::code).collect()
    }

    /// Every part is sampled, even after an earlier one reported a change.
    pub fn update_frame_set(&mut self, now: Instant) -> bool {
        self.parts
            .iter_mut()
            .fold(false, |changed, part| part.update_frame_set(now) | changed)
    }

    pub fn done(&self, now: Instant) -> bool {
        self.parts.iter().all(|p| p.done(now))
    }
}
