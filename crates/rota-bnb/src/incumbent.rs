// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Incumbent management for branch-and-bound
//!
//! Declares `IncumbentStore<T>`, a minimal interface to read/update the best
//! known objective (the pruning threshold) and publish new solutions during
//! search. This abstracts over local (single-threaded) and shared (parallel)
//! use.
//!
//! Implementations
//! - `NoSharedIncumbent<T>`: local only. `initial_threshold = T::MIN`,
//!   `tighten(x) = x`, and `on_solution_found` is a no-op.
//! - `SharedIncumbentAdapter<'a, T>`: wraps `rota_search::incumbent::SharedIncumbent<T>`
//!   together with the rank of the job it serves.
//!
//! Ranks
//!
//! Ties on the objective are won by the lower rank. The adapter therefore
//! reports a shared objective found by a higher-ranked job as one less than
//! its value, so this job still accepts an equal solution of its own.

use rota_model::solution::Solution;
use rota_search::{incumbent::SharedIncumbent, num::SolverNumeric};
use std::marker::PhantomData;

/// Trait for managing incumbent solutions in a branch-and-bound solver.
///
/// The threshold is the objective a new solution has to exceed to be
/// accepted. Nodes whose optimistic bound does not exceed it are pruned.
pub trait IncumbentStore<T>
where
    T: SolverNumeric,
{
    /// Returns the threshold to start the search with.
    fn initial_threshold(&self) -> T;
    /// Synchronizes the local threshold with the shared incumbent.
    fn tighten(&self, current_local_best: T) -> T;
    /// Notifies the store that a new improving solution has been found.
    fn on_solution_found(&self, solution: &Solution<T>);
}

/// An `IncumbentStore` implementation that does not share the incumbent
/// solution between different solver instances.
#[repr(transparent)]
pub struct NoSharedIncumbent<T>(PhantomData<T>);

impl<T> Default for NoSharedIncumbent<T>
where
    T: SolverNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NoSharedIncumbent<T>
where
    T: SolverNumeric,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> IncumbentStore<T> for NoSharedIncumbent<T>
where
    T: SolverNumeric,
{
    #[inline(always)]
    fn initial_threshold(&self) -> T {
        T::min_value()
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: T) -> T {
        current_local_best
    }

    #[inline(always)]
    fn on_solution_found(&self, _: &Solution<T>) {}
}

/// An `IncumbentStore` implementation that shares the incumbent between
/// the jobs of a parallel solve using a `SharedIncumbent`.
#[derive(Debug, Clone)]
pub struct SharedIncumbentAdapter<'a, T> {
    inner: &'a SharedIncumbent<T>,
    rank: usize,
}

impl<'a, T> SharedIncumbentAdapter<'a, T> {
    /// Creates a new adapter for the job with the given rank.
    #[inline(always)]
    pub fn new(inner: &'a SharedIncumbent<T>, rank: usize) -> Self {
        Self { inner, rank }
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.rank
    }
}

impl<'a, T> SharedIncumbentAdapter<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    fn shared_threshold(&self) -> T {
        let best = self.inner.best_objective();
        if best == i64::MIN {
            return T::min_value();
        }

        let threshold = if self.inner.best_rank() <= self.rank {
            best
        } else {
            best - 1
        };
        T::from_i64(threshold).unwrap_or_else(T::min_value)
    }
}

impl<'a, T> IncumbentStore<T> for SharedIncumbentAdapter<'a, T>
where
    T: SolverNumeric,
{
    #[inline(always)]
    fn initial_threshold(&self) -> T {
        self.shared_threshold()
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: T) -> T {
        self.shared_threshold().max(current_local_best)
    }

    #[inline(always)]
    fn on_solution_found(&self, solution: &Solution<T>) {
        self.inner.try_install(solution, self.rank);
    }
}
