//! Integer helpers for loop-period normalization.

pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple of two values; `None` on overflow.
///
/// `lcm(0, x)` is `0`.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Least common multiple of every value, `None` for an empty slice or on overflow.
pub fn lcm_all(nums: &[u64]) -> Option<u64> {
    let (&first, rest) = nums.split_first()?;
    rest.iter().try_fold(first, |acc, &n| lcm(acc, n))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
