//! Monotonic list computed on demand.

use std::fmt;

use super::types::{find_sign, MonoList};
use crate::error::{Error, Result};

/// A [`MonoList`] whose values are computed from their index on each access.
///
/// Nothing is stored besides the generator, so very long lists cost no
/// memory. Monotonicity is the generator's responsibility; only the
/// direction is probed at construction.
pub struct LazyMonoList {
    len: usize,
    sign: i32,
    f: Box<dyn Fn(usize) -> f64 + Send + Sync>,
}

impl LazyMonoList {
    /// Creates a list of `len` values given by `f(index)`.
    pub fn new<F>(len: usize, f: F) -> Result<Self>
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        if len == 0 {
            return Err(Error::invalid("monotonic list must not be empty"));
        }
        let sign = find_sign(len, &f);
        Ok(Self {
            len,
            sign,
            f: Box::new(f),
        })
    }

    /// `0, 1, 2, ..., len - 1`.
    pub fn linear(len: usize) -> Result<Self> {
        Self::new(len, |i| i as f64)
    }

    /// `e^0, e^1, ..., e^(len - 1)`.
    pub fn exp(len: usize) -> Result<Self> {
        Self::new(len, |i| (i as f64).exp())
    }

    /// `0, 1, 4, ..., (len - 1)^2`.
    pub fn squared(len: usize) -> Result<Self> {
        Self::new(len, |i| (i * i) as f64)
    }
}

impl MonoList for LazyMonoList {
    fn get(&self, i: usize) -> f64 {
        assert!(
            i < self.len,
            "index out of bounds: the len is {} but the index is {}",
            self.len,
            i
        );
        (self.f)(i)
    }

    fn sign(&self) -> i32 {
        self.sign
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Debug for LazyMonoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMonoList")
            .field("len", &self.len)
            .field("sign", &self.sign)
            .finish_non_exhaustive()
    }
}
