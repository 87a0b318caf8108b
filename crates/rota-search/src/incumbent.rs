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

//! # Shared Incumbent (Best Solution Holder)
//!
//! A concurrent container for the best solution discovered so far. It exposes
//! the best objective and the rank of the job that produced it through atomics
//! for lock-free pruning hints, and stores the actual `Solution<T>` behind a
//! `Mutex` as the source of truth.
//!
//! We maximize. A candidate replaces the incumbent if its objective is higher,
//! or if the objective is equal and it comes from a lower-ranked job. Ranks
//! follow the sequential exploration order, so the winner does not depend on
//! which thread finishes first.
//!
//! ## Usage
//!
//! ```rust
//! use rota_search::incumbent::SharedIncumbent;
//! use rota_model::solution::Solution;
//!
//! let inc: SharedIncumbent<i64> = SharedIncumbent::new();
//! assert!(inc.try_install(&Solution::new(8, Vec::new()), 3));
//! assert!(inc.try_install(&Solution::new(8, Vec::new()), 1));
//! assert!(!inc.try_install(&Solution::new(8, Vec::new()), 2));
//! assert_eq!(inc.best_objective(), 8);
//! assert_eq!(inc.best_rank(), 1);
//! ```

use num_traits::{PrimInt, Signed};
use rota_model::solution::Solution;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicI64, AtomicUsize, Ordering},
};

/// A concurrent holder for the best (incumbent) solution found during search.
///
/// Sentinels: `best_objective` starts at `i64::MIN` and `best_rank` at
/// `usize::MAX`, meaning "no solution installed yet".
///
/// Writers hold the mutex and publish the rank before the objective, both with
/// `Release`. A reader that observes an objective with `Acquire` therefore sees
/// a rank at least as recent. Pairing a stale objective with a newer rank can
/// only under-estimate the incumbent, which makes pruning weaker, never wrong.
#[derive(Debug)]
pub struct SharedIncumbent<T> {
    best_objective: AtomicI64,
    best_rank: AtomicUsize,
    solution: Mutex<Option<(usize, Solution<T>)>>,
}

impl<T> Default for SharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_solution() {
            write!(
                f,
                "Incumbent(best_objective: {}, rank: {})",
                self.best_objective(),
                self.best_rank()
            )
        } else {
            write!(f, "Incumbent(none)")
        }
    }
}

impl<T> SharedIncumbent<T> {
    /// Creates a new shared incumbent with no solution installed.
    #[inline]
    pub fn new() -> Self {
        SharedIncumbent {
            best_objective: AtomicI64::new(i64::MIN),
            best_rank: AtomicUsize::new(usize::MAX),
            solution: Mutex::new(None),
        }
    }

    /// Returns the best objective, or `i64::MIN` if there is none.
    #[inline]
    pub fn best_objective(&self) -> i64 {
        self.best_objective.load(Ordering::Acquire)
    }

    /// Returns the rank of the job that produced the incumbent, or
    /// `usize::MAX` if there is none.
    #[inline]
    pub fn best_rank(&self) -> usize {
        self.best_rank.load(Ordering::Acquire)
    }

    /// Returns `true` once any solution has been installed.
    #[inline]
    pub fn has_solution(&self) -> bool {
        self.best_rank() != usize::MAX
    }

    /// Returns a snapshot of the current incumbent solution, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Solution<T>>
    where
        T: Clone,
    {
        let guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|(_, solution)| solution.clone())
    }

    /// Attempts to install `candidate`, found by the job of the given rank.
    /// Returns `true` if the candidate became the new incumbent.
    pub fn try_install(&self, candidate: &Solution<T>, rank: usize) -> bool
    where
        T: PrimInt + Signed + Into<i64>,
    {
        let candidate_objective: i64 = candidate.objective_value().into();

        // The objective only ever grows, so a lower value can be rejected early.
        if candidate_objective < self.best_objective() {
            return false;
        }

        let mut guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((current_rank, current)) = guard.as_ref() {
            let current_objective: i64 = current.objective_value().into();
            let better = candidate_objective > current_objective
                || (candidate_objective == current_objective && rank < *current_rank);
            if !better {
                return false;
            }
        }

        *guard = Some((rank, candidate.clone()));
        self.best_rank.store(rank, Ordering::Release);
        self.best_objective
            .store(candidate_objective, Ordering::Release);

        true
    }
}
