//! Monotonic list backed by owned values.

use super::types::{find_sign, is_mono, MonoList};
use crate::error::{Error, Result};

/// A [`MonoList`] holding its values in memory.
///
/// Construction validates that the values are non-empty, free of NaN and
/// monotonic in one direction.
///
/// # Examples
///
/// ```
/// use u_inventory::monolist::{MonoList, StaticMonoList};
///
/// let zoom = StaticMonoList::from_vec(vec![0.5, 1.0, 2.0, 4.0]).unwrap();
/// assert_eq!(zoom.nearest_value(1.3), 1.0);
/// assert_eq!(zoom.next_value(1.3), 2.0);
/// assert_eq!(zoom.next_value(9.0), 4.0);
///
/// assert!(StaticMonoList::from_vec(vec![1.0, 3.0, 2.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct StaticMonoList {
    values: Vec<f64>,
    sign: i32,
}

impl StaticMonoList {
    /// Builds a list from `values`.
    pub fn from_vec(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::invalid("monotonic list must not be empty"));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(Error::invalid("monotonic list must not contain NaN"));
        }
        let sign = find_sign(values.len(), |i| values[i]);
        if !is_mono(sign, &values) {
            return Err(Error::invalid("values are not monotonic"));
        }
        Ok(Self { values, sign })
    }

    /// Builds a list of `len` values computed by `f(index)`.
    pub fn from_fn(len: usize, f: impl Fn(usize) -> f64) -> Result<Self> {
        Self::from_vec((0..len).map(f).collect())
    }

    /// `0, 1, 2, ..., len - 1`.
    pub fn linear(len: usize) -> Result<Self> {
        Self::from_fn(len, |i| i as f64)
    }

    /// `e^0, e^1, ..., e^(len - 1)`.
    pub fn exp(len: usize) -> Result<Self> {
        Self::from_fn(len, |i| (i as f64).exp())
    }

    /// `0, 1, 4, ..., (len - 1)^2`.
    pub fn squared(len: usize) -> Result<Self> {
        Self::from_fn(len, |i| (i * i) as f64)
    }

    /// `len` samples of `f` taken at evenly spaced points between
    /// `f_inv(min)` and `f_inv(max)`.
    ///
    /// `f_inv` must be the inverse of `f`, so the list starts at `min` and
    /// approaches `max` with spacing shaped by `f`.
    pub fn mapped(
        len: usize,
        min: f64,
        max: f64,
        f: impl Fn(f64) -> f64,
        f_inv: impl Fn(f64) -> f64,
    ) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid("monotonic list must not be empty"));
        }
        let x_min = f_inv(min);
        let x_step = (f_inv(max) - x_min) / len as f64;
        Self::from_fn(len, |i| f(i as f64 * x_step + x_min))
    }

    /// The values as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl MonoList for StaticMonoList {
    fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    fn sign(&self) -> i32 {
        self.sign
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl TryFrom<Vec<f64>> for StaticMonoList {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_vec(values)
    }
}

impl From<StaticMonoList> for Vec<f64> {
    fn from(list: StaticMonoList) -> Self {
        list.values
    }
}
