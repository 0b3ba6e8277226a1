use crate::animation::Animation;
use crate::foundation::error::SegResult;

/// A source of animations that the scheduler can put on the display.
pub trait Program: Send {
    fn name(&self) -> &str;

    /// Produce the animation to show now, or `None` to keep showing the previous one.
    fn make_animation(&mut self) -> SegResult<Option<Animation>>;

    /// Called whenever the program (re)gains the display.
    fn reset(&mut self) {}

    /// Whether the program has something to show. Unready programs are skipped by the schedule.
    fn ready(&self) -> bool {
        true
    }

    /// Whether the program has finished and the display should go idle.
    fn done(&self) -> bool {
        false
    }

    /// Whether a foreground program wants to take over the display right now.
    fn interrupt(&self) -> bool {
        false
    }
}

/// A program plus the last animation it handed out.
pub struct ProgramSlot {
    program: Box<dyn Program>,
    last: Option<Animation>,
}

impl ProgramSlot {
    pub fn new(program: Box<dyn Program>) -> Self {
        Self {
            program,
            last: None,
        }
    }

    pub fn name(&self) -> &str {
        self.program.name()
    }

    pub fn program(&self) -> &dyn Program {
        self.program.as_ref()
    }

    /// Ask the program for a new animation. Returns true when it differs from the last one.
    pub fn update(&mut self) -> SegResult<bool> {
        match self.program.make_animation()? {
            Some(next) if self.last.as_ref() != Some(&next) => {
                self.last = Some(next);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// The animation returned by the last successful [`update`](Self::update).
    pub fn animation(&self) -> Option<&Animation> {
        self.last.as_ref()
    }

    /// Reset the program and forget its last animation, so the next update reinstalls it.
    pub fn reset(&mut self) {
        self.program.reset();
        self.last = None;
    }

    pub fn ready(&self) -> bool {
        self.program.ready()
    }

    pub fn done(&self) -> bool {
        self.program.done()
    }

    pub fn interrupt(&self) -> bool {
        self.program.interrupt()
    }
}

impl std::fmt::Debug for ProgramSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramSlot")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Plays a fixed animation.
///
/// A `once` program reports done after its animation has been handed out; otherwise it keeps
/// the display until the schedule moves on.
#[derive(Debug, Clone)]
pub struct AnimationProgram {
    name: String,
    animation: Animation,
    once: bool,
    shown: bool,
}

impl AnimationProgram {
    pub fn new(name: impl Into<String>, animation: impl Into<Animation>) -> Self {
        Self {
            name: name.into(),
            animation: animation.into(),
            once: false,
            shown: false,
        }
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

impl Program for AnimationProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_animation(&mut self) -> SegResult<Option<Animation>> {
        self.shown = true;
        Ok(Some(self.animation.clone()))
    }

    fn reset(&mut self) {
        self.shown = false;
    }

    fn done(&self) -> bool {
        self.once && self.shown
    }
}

/// A program backed by a closure.
pub struct FnProgram<F> {
    name: String,
    make: F,
}

impl<F> FnProgram<F>
where
    F: FnMut() -> SegResult<Option<Animation>> + Send,
{
    pub fn new(name: impl Into<String>, make: F) -> Self {
        Self {
            name: name.into(),
            make,
        }
    }
}

impl<F> Program for FnProgram<F>
where
    F: FnMut() -> SegResult<Option<Animation>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn make_animation(&mut self) -> SegResult<Option<Animation>> {
        (self.make)()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/program.rs"]
mod tests;
