//! Linear interpolation, including wrap-around interpolation on a circle.
//!
//! # Examples
//!
//! ```
//! use u_inventory::lerp::{lerp, lerp_degrees};
//!
//! assert_eq!(lerp(0, 100, 0.25), 25);
//! assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
//!
//! // 350° to 10° goes through 0°, not through 180°.
//! assert!((lerp_degrees(350.0, 10.0, 0.5) - 0.0).abs() < 1e-9);
//! ```

use std::f64::consts::TAU;

/// Types that can be interpolated by a factor `t`.
///
/// `t = 0` yields `self`, `t = 1` yields `to`. Values outside `[0, 1]`
/// extrapolate.
pub trait Lerp: Sized {
    /// Returns the value a fraction `t` of the way from `self` to `to`.
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + t * (to - self)
    }
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f64) -> Self {
        Lerp::lerp(self as f64, to as f64, t) as f32
    }
}

// Integer results round half up and saturate at the type's bounds.
impl Lerp for i32 {
    fn lerp(self, to: Self, t: f64) -> Self {
        // Every i32 and every difference of two is exact in f64.
        let from = self as f64;
        (from + t * (to as f64 - from) + 0.5).floor() as i32
    }
}

impl Lerp for i64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        let diff = to as i128 - self as i128;
        let step = (t * diff as f64 + 0.5).floor() as i128;
        (self as i128 + step).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/// Interpolates from `from` to `to` by `t`.
pub fn lerp<T: Lerp>(from: T, to: T, t: f64) -> T {
    from.lerp(to, t)
}

/// Remainder of `a / b` in `[0, b)` for positive `b`.
pub fn positive_remainder(a: f64, b: f64) -> f64 {
    let r = a.rem_euclid(b);
    // rem_euclid may round up to exactly `b` for tiny negative `a`.
    if r >= b {
        0.0
    } else {
        r
    }
}

/// Interpolates between two positions on a circle of circumference
/// `period`, taking the shorter way around. The result lies in
/// `[0, period)`.
///
/// When both ways are equally long the path goes upwards from `from`.
pub fn lerp_loop(period: f64, from: f64, to: f64, t: f64) -> f64 {
    let mut from = positive_remainder(from, period);
    let mut to = positive_remainder(to, period);
    if (to - from).abs() > period / 2.0 {
        if to < from {
            to += period;
        } else {
            from += period;
        }
    }
    positive_remainder(Lerp::lerp(from, to, t), period)
}

/// [`lerp_loop`] over degrees, result in `[0, 360)`.
pub fn lerp_degrees(from: f64, to: f64, t: f64) -> f64 {
    lerp_loop(360.0, from, to, t)
}

/// [`lerp_loop`] over radians, result in `[0, 2π)`.
pub fn lerp_radians(from: f64, to: f64, t: f64) -> f64 {
    lerp_loop(TAU, from, to, t)
}
