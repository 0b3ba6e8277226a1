use std::cmp::Ordering;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::foundation::error::{SegError, SegResult};
use crate::foundation::worker::{PollingWorker, Waker};
use crate::render::Assembler;
use crate::schedule::cron::CronExpr;
use crate::schedule::program::{Program, ProgramSlot};

/// Default interval between scheduler ticks.
pub const DEFAULT_SCHEDULER_PERIOD: Duration = Duration::from_millis(100);
/// Default look-ahead within which a due slot takes over the display.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(1);

/// Index of a program in the list handed to [`Scheduler::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// Run `program` whenever `cron` fires, outranking lower `priority` entries due at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub cron: CronExpr,
    pub priority: i32,
    pub program: ProgramId,
}

impl ScheduleEntry {
    pub fn new(cron: &str, priority: i32, program: ProgramId) -> SegResult<Self> {
        Ok(Self {
            cron: CronExpr::parse(cron)?,
            priority,
            program,
        })
    }
}

/// The next occurrence of one entry.
///
/// Ordered soonest first, then by higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub at: DateTime<Local>,
    pub priority: i32,
    pub program: ProgramId,
}

impl Ord for TimeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| self.program.cmp(&other.program))
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Decides which program owns the display.
pub trait Schedule: Send {
    /// The program to switch to at `now`, or `None` to keep `active`.
    fn select(
        &mut self,
        now: DateTime<Local>,
        active: Option<ProgramId>,
        programs: &[ProgramSlot],
    ) -> Option<ProgramId>;

    /// The program to fall back to once the active one is done.
    fn idle(&self) -> Option<ProgramId>;

    /// Next slot of every entry whose program is ready, soonest first.
    fn upcoming(&self, _now: DateTime<Local>, _programs: &[ProgramSlot]) -> Vec<TimeSlot> {
        Vec::new()
    }

    /// Every program the schedule refers to.
    fn referenced(&self) -> Vec<ProgramId>;
}

/// One program that always owns the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleProgramSchedule {
    program: ProgramId,
}

impl SingleProgramSchedule {
    pub fn new(program: ProgramId) -> Self {
        Self { program }
    }
}

impl Schedule for SingleProgramSchedule {
    fn select(
        &mut self,
        _now: DateTime<Local>,
        active: Option<ProgramId>,
        _programs: &[ProgramSlot],
    ) -> Option<ProgramId> {
        active.is_none().then_some(self.program)
    }

    fn idle(&self) -> Option<ProgramId> {
        Some(self.program)
    }

    fn referenced(&self) -> Vec<ProgramId> {
        vec![self.program]
    }
}

/// Cron-driven arbitration between programs.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    entries: Vec<ScheduleEntry>,
    default: Option<ProgramId>,
    tolerance: Duration,
    slot: Option<TimeSlot>,
}

impl CronSchedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries,
            default: None,
            tolerance: DEFAULT_TOLERANCE,
            slot: None,
        }
    }

    /// Program shown when nothing is active and after the active program is done.
    pub fn with_default(mut self, program: ProgramId) -> Self {
        self.default = Some(program);
        self
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    fn slots(&self, now: DateTime<Local>, programs: &[ProgramSlot]) -> Vec<TimeSlot> {
        self.entries
            .iter()
            .filter(|e| programs.get(e.program.0).is_some_and(ProgramSlot::ready))
            .filter_map(|e| {
                Some(TimeSlot {
                    at: e.cron.next_after(&now)?,
                    priority: e.priority,
                    program: e.program,
                })
            })
            .collect()
    }

    fn within_tolerance(&self, slot: &TimeSlot, now: DateTime<Local>) -> bool {
        match (slot.at - now).to_std() {
            Ok(ahead) => ahead <= self.tolerance,
            Err(_) => true,
        }
    }
}

impl Schedule for CronSchedule {
    fn select(
        &mut self,
        now: DateTime<Local>,
        active: Option<ProgramId>,
        programs: &[ProgramSlot],
    ) -> Option<ProgramId> {
        let winner = self.slots(now, programs).into_iter().min();
        let Some(active) = active else {
            return self.default.or(winner.map(|s| s.program));
        };

        let slot = winner?;
        if self.within_tolerance(&slot, now) && self.slot != Some(slot) && slot.program != active {
            self.slot = Some(slot);
            return Some(slot.program);
        }
        None
    }

    fn idle(&self) -> Option<ProgramId> {
        self.default
    }

    fn upcoming(&self, now: DateTime<Local>, programs: &[ProgramSlot]) -> Vec<TimeSlot> {
        let mut slots = self.slots(now, programs);
        slots.sort();
        slots
    }

    fn referenced(&self) -> Vec<ProgramId> {
        self.entries
            .iter()
            .map(|e| e.program)
            .chain(self.default)
            .collect()
    }
}

struct SchedulerState {
    programs: Vec<ProgramSlot>,
    schedule: Box<dyn Schedule>,
    active: Option<ProgramId>,
    foreground: Option<ProgramSlot>,
    /// The foreground replaced the active program's animation on the display.
    preempted: bool,
    assembler: Arc<Assembler>,
}

impl SchedulerState {
    fn name(&self, id: ProgramId) -> &str {
        self.programs.get(id.0).map_or("?", ProgramSlot::name)
    }

    fn check_schedule(&mut self, now: DateTime<Local>) -> bool {
        let Some(next) = self.schedule.select(now, self.active, &self.programs) else {
            return false;
        };
        let Some(slot) = self.programs.get_mut(next.0) else {
            return false;
        };
        info!(program = slot.name(), "switching program");
        slot.reset();
        self.active = Some(next);
        true
    }

    fn tick(&mut self, now: DateTime<Local>) {
        let switched = self.check_schedule(now);
        let interrupting = self.foreground.as_ref().is_some_and(ProgramSlot::interrupt);
        if switched || interrupting || self.assembler.animation_done() {
            self.poll(interrupting);
        }
    }

    fn poll(&mut self, foreground: bool) {
        if foreground {
            let Some(slot) = self.foreground.as_mut() else {
                return;
            };
            self.preempted = true;
            if poll_guarded(slot, &self.assembler) {
                self.preempted = false;
                self.go_idle();
                self.poll(false);
            }
            return;
        }

        let Some(slot) = self.active.and_then(|id| self.programs.get_mut(id.0)) else {
            return;
        };
        if std::mem::take(&mut self.preempted) {
            slot.reset();
        }
        if poll_guarded(slot, &self.assembler) {
            self.go_idle();
        }
    }

    fn go_idle(&mut self) {
        self.active = self.schedule.idle();
        if let Some(id) = self.active {
            info!(program = self.name(id), "going idle");
            if let Some(slot) = self.programs.get_mut(id.0) {
                slot.reset();
            }
        }
    }
}

/// Poll `slot`, containing its errors and panics. Returns true when the display should go idle.
fn poll_guarded(slot: &mut ProgramSlot, assembler: &Assembler) -> bool {
    match catch_unwind(AssertUnwindSafe(|| poll_program(slot, assembler))) {
        Ok(Ok(finished)) => finished,
        Ok(Err(e)) => {
            warn!(program = slot.name(), error = %e, "program failed");
            true
        }
        Err(_) => {
            error!(program = slot.name(), "program panicked");
            true
        }
    }
}

fn poll_program(slot: &mut ProgramSlot, assembler: &Assembler) -> SegResult<bool> {
    if slot.done() {
        assembler.clear();
        slot.reset();
        return Ok(true);
    }
    if slot.update()?
        && let Some(animation) = slot.animation()
    {
        assembler.set_animation(animation.clone());
    }
    Ok(false)
}

/// Arbitrates which program's animation the assembler shows.
pub struct Scheduler {
    worker: PollingWorker<SchedulerState>,
    period: Duration,
}

impl Scheduler {
    /// Schedule `programs`, addressed by their index, with `schedule`.
    pub fn new(
        assembler: Arc<Assembler>,
        programs: Vec<Box<dyn Program>>,
        schedule: impl Schedule + 'static,
    ) -> SegResult<Self> {
        if let Some(bad) = schedule
            .referenced()
            .into_iter()
            .find(|id| id.0 >= programs.len())
        {
            return Err(SegError::schedule(format!(
                "schedule refers to program #{} but only {} are defined",
                bad.0,
                programs.len()
            )));
        }

        Ok(Self {
            worker: PollingWorker::new(
                "segtube-scheduler",
                SchedulerState {
                    programs: programs.into_iter().map(ProgramSlot::new).collect(),
                    schedule: Box::new(schedule),
                    active: None,
                    foreground: None,
                    preempted: false,
                    assembler,
                },
            ),
            period: DEFAULT_SCHEDULER_PERIOD,
        })
    }

    /// Keep `program` on the display permanently.
    pub fn single(assembler: Arc<Assembler>, program: Box<dyn Program>) -> Self {
        Self {
            worker: PollingWorker::new(
                "segtube-scheduler",
                SchedulerState {
                    programs: vec![ProgramSlot::new(program)],
                    schedule: Box::new(SingleProgramSchedule::new(ProgramId(0))),
                    active: None,
                    foreground: None,
                    preempted: false,
                    assembler,
                },
            ),
            period: DEFAULT_SCHEDULER_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Program polled ahead of the schedule whenever it raises [`Program::interrupt`].
    pub fn with_foreground(self, program: Box<dyn Program>) -> Self {
        self.worker
            .with_state(|s| s.foreground = Some(ProgramSlot::new(program)));
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the scheduler thread.
    #[tracing::instrument(skip(self))]
    pub fn start(&self) -> SegResult<()> {
        let now = Local::now();
        for slot in self.upcoming(now) {
            info!(
                at = %slot.at.format("%Y-%m-%d %H:%M"),
                priority = slot.priority,
                program = self.program_name(slot.program).as_deref().unwrap_or("?"),
                "upcoming slot"
            );
        }
        self.worker
            .start(self.period, |state| state.tick(Local::now()))
    }

    /// Stop and join the scheduler thread. Later calls are no-ops.
    pub fn stop(&self) {
        self.worker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    pub fn is_shutdown(&self) -> bool {
        self.worker.is_shutdown()
    }

    /// Handle that wakes the scheduler loop immediately, e.g. after an input event.
    pub fn waker(&self) -> Waker {
        self.worker.waker()
    }

    /// Run one scheduler tick at `now` on the calling thread.
    pub fn tick(&self, now: DateTime<Local>) {
        self.worker.with_state(|s| s.tick(now));
    }

    /// Apply the schedule at `now` without polling. Returns true when the active program changed.
    pub fn check_schedule(&self, now: DateTime<Local>) -> bool {
        self.worker.with_state(|s| s.check_schedule(now))
    }

    /// Next slot of every entry whose program is ready, soonest first.
    pub fn upcoming(&self, now: DateTime<Local>) -> Vec<TimeSlot> {
        self.worker
            .with_state(|s| s.schedule.upcoming(now, &s.programs))
    }

    pub fn active_program(&self) -> Option<String> {
        self.worker
            .with_state(|s| s.active.map(|id| s.name(id).to_owned()))
    }

    pub fn program_name(&self, id: ProgramId) -> Option<String> {
        self.worker
            .with_state(|s| s.programs.get(id.0).map(|p| p.name().to_owned()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
