//! Level derivation from experience.
//!
//! The progression curve is quadratic: reaching level `n` costs
//! `50 * n * (n + 1)` experience in total, which inverts to the square-root
//! formula below.

/// Level for a given experience value.
///
/// `floor((sqrt(2500 + 200 * experience) - 50) / 100)`, computed as a
/// floating-point square root truncated toward zero before the integer
/// division. Experience is validated to `[0, 10_000_000]` upstream, so the
/// intermediate never overflows and truncation equals floor.
pub fn level_for(experience: i32) -> i32 {
    let step = ((2500.0 + 200.0 * f64::from(experience)).sqrt() - 50.0) as i32;
    step / 100
}

/// Experience remaining until the next level:
/// `50 * (level + 1) * (level + 2) - experience`.
///
/// Non-negative whenever `level == level_for(experience)`; a negative result
/// would mean the two fields drifted apart, which is an internal invariant
/// violation rather than a user error.
pub fn until_next_level(experience: i32, level: i32) -> i32 {
    let remaining = 50 * (level + 1) * (level + 2) - experience;
    debug_assert!(
        remaining >= 0,
        "until_next_level went negative: experience={experience} level={level}"
    );
    remaining
}
