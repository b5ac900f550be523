//! Keyword placement
//!
//! Maps a lookup keyword to the point whose owner stores the keyword's files.
//! The mapping is a plain digit sum so that every peer derives the same point
//! without coordination.

use super::zone::{HEIGHT_MAX, WIDTH_MAX};

/// Base-36 value of a character, or -1 for anything that is not alphanumeric.
fn char_value(c: char) -> f64 {
    c.to_digit(36).map(f64::from).unwrap_or(-1.0)
}

fn digit_sum(keyword: &str, start: usize, modulus: f64) -> f64 {
    let sum: f64 = keyword.chars().skip(start).step_by(2).map(char_value).sum();
    sum.rem_euclid(modulus)
}

/// Returns the `(x, y)` point a keyword hashes to.
///
/// `x` sums the characters at odd positions, `y` those at even positions.
pub fn keyword_point(keyword: &str) -> (f64, f64) {
    (
        digit_sum(keyword, 1, WIDTH_MAX),
        digit_sum(keyword, 0, HEIGHT_MAX),
    )
}
