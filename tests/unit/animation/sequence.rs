use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn abc() -> TubeSequence {
    let frames = "ABC".chars().map(|c| Frame::text(c).unwrap());
    TubeSequence::timed(frames, ms(100)).unwrap()
}

#[test]
fn pop_frame_is_idempotent_within_a_slice() {
    let mut seq = abc();
    let t0 = Instant::now();
    assert_eq!(seq.pop_frame(t0), Some(Frame::text('A').unwrap()));
    for step in [0, 10, 50, 99] {
        assert_eq!(seq.pop_frame(t0 + ms(step)), None);
    }
    assert_eq!(seq.pop_frame(t0 + ms(100)), Some(Frame::text('B').unwrap()));
    assert_eq!(seq.pop_frame(t0 + ms(150)), None);
    assert_eq!(seq.remaining(), 2);
}

#[test]
fn sequence_finishes_after_its_length() {
    let mut seq = abc();
    let t0 = Instant::now();
    seq.pop_frame(t0);
    assert!(!seq.done());
    assert_eq!(seq.pop_frame(t0 + ms(300)), None);
    assert!(seq.done());
    assert_eq!(seq.current_frame(), None);

    seq.reset();
    assert!(!seq.done());
    assert_eq!(seq.current_frame(), Some(Frame::text('A').unwrap()));
}

#[test]
fn empty_sequence_is_done() {
    assert!(TubeSequence::default().done());
    assert!(TubeSequence::timed(Vec::new(), ms(1)).is_err());
}

#[test]
fn length_sums_durations() {
    assert_eq!(abc().length(), ms(300));
    assert_eq!(TubeSequence::blank(ms(42)).length(), ms(42));
}

#[test]
fn concat_inserts_last_delay() {
    let joined = abc() + abc();
    assert_eq!(joined.frame_count(), 6);
    assert_eq!(joined.length(), ms(700));
    assert_eq!(joined.slices()[2].0, ms(200));
}

#[test]
fn concat_short_left_uses_default_gap() {
    let one = TubeSequence::blank(ms(100));
    let joined = one.concat(&abc());
    assert_eq!(joined.length(), ms(100) + DEFAULT_GAP + ms(300));
}

#[test]
fn append_has_no_gap() {
    let mut seq = abc();
    seq.append(&abc());
    assert_eq!(seq.length(), ms(600));
}

#[test]
fn repeat_and_scale() {
    assert_eq!(abc().repeat(2).frame_count(), 6);
    assert_eq!(abc().repeat(0).frame_count(), 0);

    let scaled = abc().scaled(1.5).unwrap();
    // 1.5 * 300ms: one full pass plus the slices starting before 150ms.
    assert_eq!(scaled.frame_count(), 5);
    assert!(abc().scaled(-1.0).is_err());
    assert!(abc().scaled(f64::NAN).is_err());
}

#[test]
fn frames_through_time_counts_started_slices() {
    let seq = abc();
    assert_eq!(seq.frames_through_time(Duration::ZERO).len(), 0);
    assert_eq!(seq.frames_through_time(ms(1)).len(), 1);
    assert_eq!(seq.frames_through_time(ms(100)).len(), 1);
    assert_eq!(seq.frames_through_time(ms(101)).len(), 2);
    assert_eq!(seq.frames_through_time(ms(1000)).len(), 3);
}

#[test]
fn equality_ignores_cursor() {
    let mut a = abc();
    a.pop_frame(Instant::now());
    assert_eq!(a, abc());
}
