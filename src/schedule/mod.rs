//! Which program owns the display, and when.

pub mod cron;
pub mod program;
pub mod scheduler;

pub use cron::CronExpr;
pub use program::{AnimationProgram, FnProgram, Program, ProgramSlot};
pub use scheduler::{
    CronSchedule, DEFAULT_SCHEDULER_PERIOD, DEFAULT_TOLERANCE, ProgramId, Schedule, ScheduleEntry,
    Scheduler, SingleProgramSchedule, TimeSlot,
};
