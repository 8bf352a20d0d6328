//! The [`MonoList`] trait and the lookups built on it.

/// A non-empty sequence that is monotonically non-decreasing or
/// non-increasing.
///
/// Implementors provide indexed access, length and direction; nearest-value
/// lookup and stepping are provided on top.
pub trait MonoList {
    /// Value at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    fn get(&self, i: usize) -> f64;

    /// `1` if increasing, `-1` if decreasing, `0` if all values are equal.
    fn sign(&self) -> i32;

    /// Number of values. Never zero.
    fn len(&self) -> usize;

    /// Always `false`: monotonic lists hold at least one value.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the value closest to `value`.
    ///
    /// When `value` sits exactly between two entries, the later index wins on
    /// an increasing list and the earlier one on a decreasing list.
    ///
    /// ```text
    ///             result=1
    ///               |
    /// Index:  | 0   | 1   | 2   | 3   |
    /// Values: | 1.0 | 2.0 | 3.0 | 4.0 |
    ///                 ^
    ///             value=2.4
    /// ```
    fn nearest_index(&self, value: f64) -> usize {
        let n = self.len();
        let ascending = self.sign() >= 0;

        // First index not lying before `value` in list direction.
        let (mut lo, mut hi) = (0, n);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let v = self.get(mid);
            let before = if ascending { v < value } else { v > value };
            if before {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo == 0 {
            return 0;
        }
        if lo == n {
            return n - 1;
        }

        let (left, right) = (lo - 1, lo);
        let left_gap = (value - self.get(left)).abs();
        let right_gap = (self.get(right) - value).abs();
        if left_gap < right_gap {
            left
        } else if left_gap > right_gap || ascending {
            right
        } else {
            left
        }
    }

    /// The value closest to `value`.
    fn nearest_value(&self, value: f64) -> f64 {
        self.get(self.nearest_index(value))
    }

    /// Steps `offset` entries from the entry nearest to `value`, in the
    /// direction of increasing values, clamping at both ends.
    fn offset_value(&self, value: f64, offset: i64) -> f64 {
        let step = offset.saturating_mul(self.sign() as i64);
        let i = (self.nearest_index(value) as i64).saturating_add(step);
        self.get(clamp_index(i, self.len()))
    }

    /// The next larger entry after the one nearest to `value`, or the last
    /// entry at the top end.
    fn next_value(&self, value: f64) -> f64 {
        self.offset_value(value, 1)
    }

    /// The next smaller entry before the one nearest to `value`, or the
    /// first entry at the bottom end.
    fn previous_value(&self, value: f64) -> f64 {
        self.offset_value(value, -1)
    }

    /// Copies all values into a vector.
    fn to_vec(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

/// Direction of the first strict change, or `0` if there is none.
pub(crate) fn find_sign(len: usize, get: impl Fn(usize) -> f64) -> i32 {
    (1..len)
        .map(|i| signum(get(i) - get(i - 1)))
        .find(|&s| s != 0)
        .unwrap_or(0)
}

/// Returns `true` if no step goes against `sign`.
pub(crate) fn is_mono(sign: i32, values: &[f64]) -> bool {
    values.windows(2).all(|w| {
        let s = signum(w[1] - w[0]);
        s == 0 || s == sign
    })
}

fn signum(d: f64) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sign() {
        let inc = [3.0, 3.0, 4.0, 5.0];
        let dec = [5.0, 5.0, 4.0, 3.0];
        let flat = [1.0, 1.0, 1.0];
        assert_eq!(find_sign(inc.len(), |i| inc[i]), 1);
        assert_eq!(find_sign(dec.len(), |i| dec[i]), -1);
        assert_eq!(find_sign(flat.len(), |i| flat[i]), 0);
        assert_eq!(find_sign(1, |_| 1.0), 0);
    }

    #[test]
    fn test_is_mono() {
        assert!(is_mono(1, &[1.0, 1.0, 2.0, 3.0]));
        assert!(is_mono(-1, &[3.0, 2.0, 2.0]));
        assert!(!is_mono(1, &[1.0, 3.0, 2.0]));
        assert!(is_mono(0, &[2.0, 2.0]));
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-3, 5), 0);
        assert_eq!(clamp_index(2, 5), 2);
        assert_eq!(clamp_index(9, 5), 4);
    }
}
