//! Multidimensional range dispatch.
//!
//! [`parallel_for`] calls a functor once for every index tuple of an
//! [`MDRangePolicy`]. With the `parallel` feature the range is split across
//! the rayon thread pool and every split works on its own clone of the
//! functor; otherwise the range is walked on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::maybe_sync::MaybeSendSync;
use crate::{Result, ViewError, MAX_RANK};

/// Half-open rectangular range `begin..end` over `N` dimensions.
///
/// Linear positions enumerate the range in row-major order: the last
/// dimension varies fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MDRangePolicy<const N: usize> {
    begin: [usize; N],
    end: [usize; N],
    len: usize,
}

impl<const N: usize> MDRangePolicy<N> {
    /// Range from `begin` (inclusive) to `end` (exclusive).
    ///
    /// # Errors
    /// Returns [`ViewError::InvalidRange`] if `begin > end` in any dimension,
    /// and [`ViewError::ExtentOverflow`] if the number of tuples overflows
    /// `usize`.
    pub fn new(begin: [usize; N], end: [usize; N]) -> Result<Self> {
        const { assert!(N >= 1 && N <= MAX_RANK, "range rank must be between 1 and 8") };
        let mut len = 1usize;
        for dim in 0..N {
            if begin[dim] > end[dim] {
                return Err(ViewError::InvalidRange {
                    dim,
                    begin: begin[dim],
                    end: end[dim],
                });
            }
            len = len
                .checked_mul(end[dim] - begin[dim])
                .ok_or_else(|| ViewError::ExtentOverflow(end.to_vec()))?;
        }
        Ok(Self { begin, end, len })
    }

    /// Range from the origin to `end`.
    ///
    /// # Panics
    /// Panics if the number of tuples overflows `usize`.
    pub fn from_extents(end: [usize; N]) -> Self {
        const { assert!(N >= 1 && N <= MAX_RANK, "range rank must be between 1 and 8") };
        let len = end
            .iter()
            .try_fold(1usize, |acc, &e| acc.checked_mul(e));
        match len {
            Some(len) => Self {
                begin: [0; N],
                end,
                len,
            },
            None => panic!("range {:?} has more tuples than fit in usize", end),
        }
    }

    #[inline]
    pub fn begin(&self) -> &[usize; N] {
        &self.begin
    }

    #[inline]
    pub fn end(&self) -> &[usize; N] {
        &self.end
    }

    /// Number of index tuples in the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index tuple at row-major position `linear`.
    ///
    /// # Panics
    /// Panics if `linear >= self.len()`.
    #[inline]
    pub fn index_of(&self, linear: usize) -> [usize; N] {
        assert!(
            linear < self.len,
            "linear index {} out of bounds for range of {} tuples",
            linear,
            self.len
        );
        let mut rem = linear;
        let mut index = [0usize; N];
        for dim in (0..N).rev() {
            let extent = self.end[dim] - self.begin[dim];
            index[dim] = self.begin[dim] + rem % extent;
            rem /= extent;
        }
        index
    }
}

/// Call `functor` once for every index tuple of `policy`.
///
/// Returns once every call has completed, so writes made by the functor are
/// visible to the caller afterwards. Calls for distinct tuples may run
/// concurrently and in any order; the functor must only write elements that
/// no other tuple writes.
///
/// `label` names the kernel in the logs.
pub fn parallel_for<const N: usize, F>(label: &str, policy: &MDRangePolicy<N>, functor: F)
where
    F: Fn([usize; N]) + Clone + MaybeSendSync,
{
    if policy.is_empty() {
        tracing::debug!(label, "skipping kernel over empty range");
        return;
    }

    #[cfg(feature = "parallel")]
    {
        tracing::debug!(
            label,
            len = policy.len(),
            rank = N,
            threads = rayon::current_num_threads(),
            "dispatching parallel kernel"
        );
        (0..policy.len())
            .into_par_iter()
            .for_each_with(functor, |f, linear| f(policy.index_of(linear)));
    }

    #[cfg(not(feature = "parallel"))]
    {
        tracing::debug!(label, len = policy.len(), rank = N, "dispatching sequential kernel");
        for linear in 0..policy.len() {
            functor(policy.index_of(linear));
        }
    }
}
