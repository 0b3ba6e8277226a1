use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn first_advance_shows_slice_zero() {
    let slices = [(ms(100), 'a'), (ms(100), 'b')];
    let mut c = SliceCursor::default();
    assert!(!c.started());
    let t0 = Instant::now();
    assert_eq!(c.advance(&slices, t0), Some(0));
    assert!(c.started());
    assert_eq!(c.advance(&slices, t0 + ms(50)), None);
    assert_eq!(c.advance(&slices, t0 + ms(100)), Some(1));
    assert_eq!(c.advance(&slices, t0 + ms(199)), None);
    assert_eq!(c.advance(&slices, t0 + ms(200)), None);
    assert!(c.done(slices.len()));
}

#[test]
fn late_tick_skips_elapsed_slices() {
    let slices = [(ms(10), 'a'), (ms(10), 'b'), (ms(10), 'c'), (ms(10), 'd')];
    let mut c = SliceCursor::default();
    let t0 = Instant::now();
    c.advance(&slices, t0);
    assert_eq!(c.advance(&slices, t0 + ms(25)), Some(2));
    // Anchored at 20ms, not 25ms.
    assert_eq!(c.advance(&slices, t0 + ms(30)), Some(3));
}

#[test]
fn reset_rewinds() {
    let slices = [(ms(1), ())];
    let mut c = SliceCursor::default();
    let t0 = Instant::now();
    c.advance(&slices, t0);
    c.advance(&slices, t0 + ms(5));
    assert!(c.done(1));
    c.reset();
    assert_eq!(c.index(), 0);
    assert_eq!(c.advance(&slices, t0 + ms(10)), Some(0));
}

#[test]
fn empty_slices_never_advance() {
    let slices: [(Duration, ()); 0] = [];
    let mut c = SliceCursor::default();
    assert_eq!(c.advance(&slices, Instant::now()), None);
    assert!(c.done(0));
}
