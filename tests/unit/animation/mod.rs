use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn blink(text: &str, delay: u64) -> Animation {
    FullFrameAnimation::timed(
        [FullFrame::from_text(text).unwrap(), FullFrame::blank(text.len())],
        ms(delay),
    )
    .unwrap()
    .into()
}

#[test]
fn empty_is_always_done() {
    let mut a = Animation::Empty;
    let now = Instant::now();
    assert!(a.done(now));
    assert!(!a.update_frame_set(now));
    assert_eq!(a.code(), "");
    assert_eq!(a.tube_count(), 0);
}

#[test]
fn combo_updates_every_part() {
    let mut combo: Animation = ComboAnimation::new(vec![blink("AB", 100), blink("C", 50)]).into();
    let t0 = Instant::now();
    assert_eq!(combo.tube_count(), 3);
    assert!(combo.update_frame_set(t0));
    assert_eq!(combo.code(), "ABC");

    assert!(combo.update_frame_set(t0 + ms(50)));
    assert_eq!(combo.code(), "AB ");
    assert!(!combo.done(t0 + ms(100)));

    assert!(combo.update_frame_set(t0 + ms(100)));
    assert_eq!(combo.code(), "   ");
    combo.update_frame_set(t0 + ms(200));
    assert!(combo.done(t0 + ms(200)));
}

#[test]
fn equality_ignores_playback_state() {
    let mut a = blink("HI", 100);
    a.update_frame_set(Instant::now());
    assert_eq!(a, blink("HI", 100));
    assert_ne!(a, blink("HO", 100));
    assert_eq!(a.clone().looped(), blink("HI", 100).looped());
}

#[test]
fn reset_replays_from_start() {
    let mut a = blink("HI", 100);
    let t0 = Instant::now();
    a.update_frame_set(t0);
    a.update_frame_set(t0 + ms(500));
    assert!(a.done(t0 + ms(500)));
    a.reset();
    assert!(!a.done(t0 + ms(500)));
    assert!(a.update_frame_set(t0 + ms(600)));
    assert_eq!(a.code(), "HI");
}
