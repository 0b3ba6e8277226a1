use super::*;

#[test]
fn gcd_basics() {
    assert_eq!(gcd(12, 18), 6);
    assert_eq!(gcd(7, 0), 7);
    assert_eq!(gcd(0, 7), 7);
}

#[test]
fn lcm_folds_pairwise() {
    assert_eq!(lcm(4, 6), Some(12));
    // A product/gcd shortcut would give 48 here.
    assert_eq!(lcm_all(&[4, 6, 8]), Some(24));
    assert_eq!(lcm_all(&[5]), Some(5));
    assert_eq!(lcm_all(&[]), None);
}

#[test]
fn lcm_reports_overflow() {
    assert_eq!(lcm(u64::MAX, u64::MAX - 1), None);
}
