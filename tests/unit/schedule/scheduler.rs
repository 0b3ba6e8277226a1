use super::*;
use crate::animation::Animation;
use crate::animation::library::text_animation;
use crate::encode::sink::RecordingSink;
use crate::schedule::program::{AnimationProgram, FnProgram};
use chrono::{TimeDelta, TimeZone};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::thread;
use std::time::Instant;

fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
}

fn text(t: &str) -> Animation {
    text_animation(t).unwrap()
}

fn show(name: &str) -> Box<dyn Program> {
    Box::new(AnimationProgram::new(name, text(name)))
}

fn assembler() -> (RecordingSink, Arc<Assembler>) {
    let rec = RecordingSink::new();
    (rec.clone(), Arc::new(Assembler::new(rec)))
}

/// Render twice so a single-frame animation is emitted and finishes.
fn play_out(asm: &Assembler) {
    let t0 = Instant::now();
    asm.render_once(t0);
    asm.render_once(t0 + Duration::from_millis(1));
    assert!(asm.animation_done());
}

fn a_and_b() -> CronSchedule {
    CronSchedule::new(vec![
        ScheduleEntry::new("*/5 * * * *", 1, ProgramId(0)).unwrap(),
        ScheduleEntry::new("*/1 * * * *", 2, ProgramId(1)).unwrap(),
    ])
}

#[test]
fn time_slots_order_by_time_then_priority() {
    let t = local(12, 5, 0);
    let low = TimeSlot {
        at: t,
        priority: 1,
        program: ProgramId(0),
    };
    let high = TimeSlot {
        priority: 2,
        program: ProgramId(1),
        ..low
    };
    let later = TimeSlot {
        at: t + TimeDelta::minutes(1),
        priority: 9,
        ..low
    };
    let mut slots = vec![later, low, high];
    slots.sort();
    assert_eq!(slots, vec![high, low, later]);
}

#[test]
fn higher_priority_wins_when_due_together() {
    let (_rec, asm) = assembler();
    let sched = Scheduler::new(
        asm.clone(),
        vec![show("A"), show("B")],
        a_and_b().with_default(ProgramId(0)),
    )
    .unwrap();

    let upcoming = sched.upcoming(local(12, 4, 30));
    assert_eq!(upcoming[0].program, ProgramId(1));
    assert_eq!(upcoming[0].at, local(12, 5, 0));

    sched.tick(local(12, 4, 30));
    assert_eq!(sched.active_program().as_deref(), Some("A"));
    assert_eq!(asm.current(), Some(text("A")));

    // Two seconds ahead is outside the default tolerance.
    sched.tick(local(12, 4, 58));
    assert_eq!(sched.active_program().as_deref(), Some("A"));

    sched.tick(local(12, 4, 59) + TimeDelta::milliseconds(500));
    assert_eq!(sched.active_program().as_deref(), Some("B"));
    assert_eq!(asm.current(), Some(text("B")));
}

#[test]
fn adopts_the_winner_without_a_default() {
    let (_rec, asm) = assembler();
    let sched = Scheduler::new(asm.clone(), vec![show("A"), show("B")], a_and_b()).unwrap();
    assert!(sched.check_schedule(local(12, 4, 30)));
    assert_eq!(sched.active_program().as_deref(), Some("B"));
    assert!(!sched.check_schedule(local(12, 4, 31)));
}

#[test]
fn unready_programs_are_skipped() {
    struct Sleepy;
    impl Program for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }
        fn make_animation(&mut self) -> SegResult<Option<Animation>> {
            Ok(None)
        }
        fn ready(&self) -> bool {
            false
        }
    }

    let (_rec, asm) = assembler();
    let sleepy: Box<dyn Program> = Box::new(Sleepy);
    let sched = Scheduler::new(asm, vec![show("A"), sleepy], a_and_b()).unwrap();
    let upcoming = sched.upcoming(local(12, 4, 30));
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].program, ProgramId(0));
}

#[test]
fn finished_program_hands_back_to_default() {
    let (rec, asm) = assembler();
    let once: Box<dyn Program> = Box::new(AnimationProgram::new("B", text("B")).once());
    let sched = Scheduler::new(
        asm.clone(),
        vec![show("A"), once],
        a_and_b().with_default(ProgramId(0)),
    )
    .unwrap();

    sched.tick(local(12, 4, 30));
    sched.tick(local(12, 4, 59) + TimeDelta::milliseconds(500));
    assert_eq!(sched.active_program().as_deref(), Some("B"));
    play_out(&asm);

    // B is done: the display clears and the default takes over.
    sched.tick(local(12, 5, 0) + TimeDelta::milliseconds(200));
    assert_eq!(sched.active_program().as_deref(), Some("A"));
    assert!(asm.current().is_none());

    sched.tick(local(12, 5, 0) + TimeDelta::milliseconds(300));
    assert_eq!(asm.current(), Some(text("A")));
    asm.render_once(Instant::now());
    assert_eq!(rec.last().as_deref(), Some("A"));
}

#[test]
fn failing_program_goes_idle() {
    let (_rec, asm) = assembler();
    let broken: Box<dyn Program> = Box::new(FnProgram::new("broken", || {
        Err(SegError::animation("feed unavailable"))
    }));
    let sched = Scheduler::new(
        asm,
        vec![show("A"), broken],
        a_and_b().with_default(ProgramId(0)),
    )
    .unwrap();

    sched.tick(local(12, 4, 30));
    sched.tick(local(12, 4, 59) + TimeDelta::milliseconds(500));
    assert_eq!(sched.active_program().as_deref(), Some("A"));
}

#[test]
fn panicking_program_goes_idle() {
    let (_rec, asm) = assembler();
    let panicky: Box<dyn Program> = Box::new(FnProgram::new(
        "panicky",
        || -> SegResult<Option<Animation>> { panic!("bad frame data") },
    ));
    let sched = Scheduler::new(
        asm,
        vec![show("A"), panicky],
        a_and_b().with_default(ProgramId(0)),
    )
    .unwrap();

    sched.tick(local(12, 4, 30));
    sched.tick(local(12, 4, 59) + TimeDelta::milliseconds(500));
    assert_eq!(sched.active_program().as_deref(), Some("A"));

    // The scheduler is still usable afterwards.
    sched.tick(local(12, 5, 30));
    assert_eq!(sched.active_program().as_deref(), Some("A"));
}

struct Menu {
    open: Arc<AtomicBool>,
}

impl Program for Menu {
    fn name(&self) -> &str {
        "menu"
    }

    fn make_animation(&mut self) -> SegResult<Option<Animation>> {
        Ok(Some(text("MENU")))
    }

    fn interrupt(&self) -> bool {
        self.open.load(AtomicOrdering::SeqCst)
    }
}

#[test]
fn foreground_interrupt_takes_over_and_returns() {
    let (_rec, asm) = assembler();
    let open = Arc::new(AtomicBool::new(false));
    let sched = Scheduler::single(asm.clone(), show("A")).with_foreground(Box::new(Menu {
        open: Arc::clone(&open),
    }));

    sched.tick(local(9, 0, 0));
    assert_eq!(asm.current(), Some(text("A")));

    open.store(true, AtomicOrdering::SeqCst);
    sched.tick(local(9, 0, 1));
    assert_eq!(asm.current(), Some(text("MENU")));

    open.store(false, AtomicOrdering::SeqCst);
    play_out(&asm);
    sched.tick(local(9, 0, 2));
    assert_eq!(asm.current(), Some(text("A")));
}

/// Shows its menu once, then fails on every later poll.
struct FlakyMenu {
    polls: usize,
}

impl Program for FlakyMenu {
    fn name(&self) -> &str {
        "flaky-menu"
    }

    fn make_animation(&mut self) -> SegResult<Option<Animation>> {
        self.polls += 1;
        if self.polls > 1 {
            return Err(SegError::animation("menu tree unavailable"));
        }
        Ok(Some(text("MENU")))
    }

    fn interrupt(&self) -> bool {
        true
    }
}

#[test]
fn failing_foreground_goes_idle() {
    let (_rec, asm) = assembler();
    let sched =
        Scheduler::single(asm.clone(), show("A")).with_foreground(Box::new(FlakyMenu { polls: 0 }));

    sched.tick(local(9, 0, 0));
    assert_eq!(asm.current(), Some(text("MENU")));

    sched.tick(local(9, 0, 1));
    assert_eq!(sched.active_program().as_deref(), Some("A"));
    assert_eq!(asm.current(), Some(text("A")));

    sched.tick(local(9, 0, 2));
    assert_eq!(asm.current(), Some(text("A")));
}

#[test]
fn rejects_unknown_program_ids() {
    let (_rec, asm) = assembler();
    let err = Scheduler::new(
        asm,
        vec![show("A")],
        CronSchedule::new(vec![]).with_default(ProgramId(3)),
    )
    .err()
    .unwrap();
    assert!(err.to_string().starts_with("schedule error:"));
}

#[test]
fn scheduler_thread_installs_the_program() {
    let rec = RecordingSink::new();
    let asm = Arc::new(Assembler::new(rec.clone()).with_period(Duration::from_millis(5)));
    asm.start().unwrap();
    let sched = Scheduler::single(asm.clone(), show("HELLO")).with_period(Duration::from_millis(5));
    sched.start().unwrap();
    assert!(sched.is_running());

    let deadline = Instant::now() + Duration::from_secs(5);
    while rec.last().is_none() && Instant::now() < deadline {
        sched.waker().wake();
        thread::sleep(Duration::from_millis(5));
    }
    sched.stop();
    asm.stop();
    assert!(sched.is_shutdown());
    assert_eq!(rec.last().as_deref(), Some("HELLO"));
}
