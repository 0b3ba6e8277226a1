use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::animation::Animation;
use crate::encode::sink::CommandSink;
use crate::foundation::error::SegResult;
use crate::foundation::worker::PollingWorker;

/// Default interval between render ticks.
pub const DEFAULT_RENDER_PERIOD: Duration = Duration::from_millis(50);

struct AssemblerState {
    animation: Option<Animation>,
    sink: Box<dyn CommandSink>,
}

/// Samples the installed animation on a fixed cadence and forwards visible changes to a sink.
///
/// [`Assembler::animation_done`] is a lock-free read of a flag the render tick refreshes; it may
/// lag the animation by up to one period.
pub struct Assembler {
    worker: PollingWorker<AssemblerState>,
    done: Arc<AtomicBool>,
    period: Duration,
}

impl Assembler {
    pub fn new(sink: impl CommandSink + 'static) -> Self {
        Self::with_boxed_sink(Box::new(sink))
    }

    pub fn with_boxed_sink(sink: Box<dyn CommandSink>) -> Self {
        Self {
            worker: PollingWorker::new(
                "segtube-assembler",
                AssemblerState {
                    animation: None,
                    sink,
                },
            ),
            done: Arc::new(AtomicBool::new(true)),
            period: DEFAULT_RENDER_PERIOD,
        }
    }

    /// Interval between render ticks. Takes effect on the next [`start`](Self::start).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the render thread.
    pub fn start(&self) -> SegResult<()> {
        info!(period_ms = self.period.as_millis() as u64, "starting assembler");
        let done = Arc::clone(&self.done);
        self.worker
            .start(self.period, move |state| render_tick(state, &done, Instant::now()))
    }

    /// Stop and join the render thread. Later calls are no-ops.
    pub fn stop(&self) {
        self.worker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    pub fn is_shutdown(&self) -> bool {
        self.worker.is_shutdown()
    }

    /// Install `animation` from its beginning.
    pub fn set_animation(&self, mut animation: Animation) {
        animation.reset();
        self.worker.with_state(|s| {
            self.done
                .store(animation.done(Instant::now()), Ordering::Relaxed);
            s.animation = Some(animation);
        });
    }

    /// Remove the installed animation. The display keeps its last command.
    pub fn clear(&self) {
        self.worker.with_state(|s| {
            s.animation = None;
            self.done.store(true, Ordering::Relaxed);
        });
    }

    /// Restart the installed animation from its beginning.
    pub fn rerun(&self) {
        self.worker.with_state(|s| {
            if let Some(a) = s.animation.as_mut() {
                a.reset();
                self.done.store(a.done(Instant::now()), Ordering::Relaxed);
            }
        });
    }

    /// True when nothing is installed or the installed animation has finished.
    pub fn animation_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Run one render tick on the calling thread.
    pub fn render_once(&self, now: Instant) {
        self.worker.with_state(|s| render_tick(s, &self.done, now));
    }

    /// Copy of the installed animation.
    pub fn current(&self) -> Option<Animation> {
        self.worker.with_state(|s| s.animation.clone())
    }
}

fn render_tick(state: &mut AssemblerState, done: &AtomicBool, now: Instant) {
    let Some(animation) = state.animation.as_mut() else {
        done.store(true, Ordering::Relaxed);
        return;
    };
    if animation.update_frame_set(now) {
        let cmd = animation.code();
        if let Err(e) = state.sink.send(&cmd) {
            warn!(error = %e, cmd = %cmd, "failed to send command");
        }
    }
    done.store(animation.done(now), Ordering::Relaxed);
}

#[cfg(test)]
#[path = "../../tests/unit/render/assembler.rs"]
mod tests;
