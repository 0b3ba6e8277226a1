use super::*;
use crate::animation::frame::{Frame, FullFrame};
use crate::animation::full_frame::FullFrameAnimation;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn two_frames() -> FullFrameAnimation {
    FullFrameAnimation::timed(
        [
            FullFrame::from_text("A").unwrap(),
            FullFrame::from_text("B").unwrap(),
        ],
        ms(100),
    )
    .unwrap()
}

#[test]
fn never_done_without_budget() {
    let mut anim = LoopedAnimation::new(two_frames());
    let t0 = Instant::now();
    for step in 0..100 {
        anim.update_frame_set(t0 + ms(step * 37));
        assert!(!anim.done());
    }
    assert!(anim.loops_done() > 5);
}

#[test]
fn restarts_at_end_of_base() {
    let mut anim = LoopedAnimation::new(two_frames());
    let t0 = Instant::now();
    assert!(anim.update_frame_set(t0));
    assert!(anim.update_frame_set(t0 + ms(100)));
    assert_eq!(anim.code(), "B");
    assert!(anim.update_frame_set(t0 + ms(200)));
    assert_eq!(anim.code(), "A");
    assert_eq!(anim.loops_done(), 1);
}

#[test]
fn inter_loop_delay_holds_last_frame() {
    let mut anim = LoopedAnimation::new(two_frames()).with_delay(ms(500));
    let t0 = Instant::now();
    anim.update_frame_set(t0);
    anim.update_frame_set(t0 + ms(100));
    assert!(!anim.update_frame_set(t0 + ms(200)));
    assert!(!anim.update_frame_set(t0 + ms(699)));
    assert_eq!(anim.code(), "B");
    assert!(anim.update_frame_set(t0 + ms(700)));
    assert_eq!(anim.code(), "A");
}

#[test]
fn loop_budget_ends_the_animation() {
    let mut anim = LoopedAnimation::new(two_frames()).with_loops(2);
    let t0 = Instant::now();
    let mut step = 0;
    while !anim.done() && step < 50 {
        anim.update_frame_set(t0 + ms(step * 50));
        step += 1;
    }
    assert!(anim.done());
    assert_eq!(anim.loops_done(), 2);
    assert!(!anim.update_frame_set(t0 + ms(10_000)));

    anim.reset();
    assert!(!anim.done());
}

#[test]
fn normalized_tubes_share_a_period() {
    let a = TubeSequence::timed([Frame::raw(1), Frame::raw(2)], ms(100)).unwrap();
    let b = TubeSequence::timed([Frame::raw(4), Frame::raw(8), Frame::raw(16)], ms(100)).unwrap();
    let anim = LoopedAnimation::normalized(vec![a, b]).unwrap();
    assert_eq!(anim.length(), ms(600));
    let Animation::Tube(tubes) = anim.base() else {
        panic!("expected a tube animation");
    };
    assert!(tubes.tubes().iter().all(|t| t.length() == ms(600)));

    let tiny = TubeSequence::blank(ms(50));
    assert!(LoopedAnimation::normalized(vec![tiny]).is_err());
}
