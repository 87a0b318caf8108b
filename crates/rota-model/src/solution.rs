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

use crate::{
    index::{ShiftIndex, WorkerIndex},
    model::Model,
};
use num_traits::{PrimInt, Signed};

/// A rule of the model that a `Solution` breaks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolutionViolation {
    #[error("solution covers {actual} shifts but the model has {expected}")]
    ShiftCountMismatch { expected: usize, actual: usize },
    #[error("{worker} assigned to {shift} does not exist in the model")]
    UnknownWorker {
        worker: WorkerIndex,
        shift: ShiftIndex,
    },
    #[error("{worker} is not available for {shift}")]
    Unavailable {
        worker: WorkerIndex,
        shift: ShiftIndex,
    },
    #[error("{worker} works {assigned} hours but has capacity {capacity}")]
    CapacityExceeded {
        worker: WorkerIndex,
        assigned: i64,
        capacity: i64,
    },
    #[error("{worker} is assigned to the forbidden pair {first} and {second}")]
    ForbiddenPair {
        worker: WorkerIndex,
        first: ShiftIndex,
        second: ShiftIndex,
    },
    #[error("reported objective {reported} differs from assigned hours {actual}")]
    ObjectiveMismatch { reported: i64, actual: i64 },
}

/// A complete assignment of workers to shifts.
///
/// The layout is a Structure of Arrays indexed by `ShiftIndex`: entry `s` is
/// the worker covering shift `s`. Exactly one worker per shift is therefore
/// structural.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<T> {
    /// The total assigned hours.
    objective_value: T,

    /// `shift_workers[s]` is the worker assigned to shift `s`.
    shift_workers: Vec<WorkerIndex>,
}

impl<T> Solution<T>
where
    T: PrimInt + Signed + Copy,
{
    /// Constructs a new `Solution`.
    #[inline]
    pub fn new(objective_value: T, shift_workers: Vec<WorkerIndex>) -> Self {
        Self {
            objective_value,
            shift_workers,
        }
    }

    /// Returns the worker assigned to a specific shift.
    ///
    /// # Panics
    ///
    /// Panics if `shift_index` is out of bounds.
    #[inline]
    pub fn worker_for_shift(&self, shift_index: ShiftIndex) -> WorkerIndex {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `Solution::worker_for_shift` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        self.shift_workers[index]
    }

    /// Returns the number of shifts in this solution.
    #[inline]
    pub fn num_shifts(&self) -> usize {
        self.shift_workers.len()
    }

    /// Returns the total objective value of this solution.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Returns the assigned worker of every shift.
    #[inline]
    pub fn shift_workers(&self) -> &[WorkerIndex] {
        &self.shift_workers
    }

    /// Returns the shifts assigned to a worker, in shift index order.
    pub fn shifts_for_worker(&self, worker_index: WorkerIndex) -> impl Iterator<Item = ShiftIndex> + '_ {
        self.shift_workers
            .iter()
            .enumerate()
            .filter(move |(_, w)| **w == worker_index)
            .map(|(s, _)| ShiftIndex::new(s))
    }

    /// Checks this solution against every rule of `model`.
    ///
    /// # Errors
    ///
    /// Returns the first `SolutionViolation` encountered, checking in order
    /// the shift count, availability, forbidden pairs, capacities and the
    /// reported objective.
    pub fn verify(&self, model: &Model<T>) -> Result<(), SolutionViolation> {
        if self.num_shifts() != model.num_shifts() {
            return Err(SolutionViolation::ShiftCountMismatch {
                expected: model.num_shifts(),
                actual: self.num_shifts(),
            });
        }

        let mut worker_hours = vec![0i64; model.num_workers()];
        let mut actual = 0i64;
        for (s, &worker) in self.shift_workers.iter().enumerate() {
            let shift = ShiftIndex::new(s);
            if worker.get() >= model.num_workers() {
                return Err(SolutionViolation::UnknownWorker { worker, shift });
            }
            if !model.is_available(worker, shift) {
                return Err(SolutionViolation::Unavailable { worker, shift });
            }
            let hours = model.shift_hours(shift).to_i64().unwrap_or(i64::MAX);
            worker_hours[worker.get()] = worker_hours[worker.get()].saturating_add(hours);
            actual = actual.saturating_add(hours);
        }

        for (s, &worker) in self.shift_workers.iter().enumerate() {
            let shift = ShiftIndex::new(s);
            if let Some(&partner) = model
                .forbidden_partners(shift)
                .iter()
                .find(|&&p| p >= shift && self.shift_workers[p.get()] == worker)
            {
                return Err(SolutionViolation::ForbiddenPair {
                    worker,
                    first: shift,
                    second: partner,
                });
            }
        }

        for (w, &assigned) in worker_hours.iter().enumerate() {
            let worker = WorkerIndex::new(w);
            let capacity = model.worker_capacity(worker).to_i64().unwrap_or(i64::MAX);
            if assigned > capacity {
                return Err(SolutionViolation::CapacityExceeded {
                    worker,
                    assigned,
                    capacity,
                });
            }
        }

        let reported = self.objective_value.to_i64().unwrap_or(i64::MIN);
        if reported != actual {
            return Err(SolutionViolation::ObjectiveMismatch { reported, actual });
        }

        Ok(())
    }
}

impl<T> std::fmt::Display for Solution<T>
where
    T: PrimInt + Signed + Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        writeln!(f)?;

        if self.num_shifts() == 0 {
            writeln!(f, "   (No shifts assigned)")?;
            return Ok(());
        }

        writeln!(f, "   {:<10} | {:<10}", "Shift", "Worker")?;
        writeln!(f, "   {:-<10}-+-{:-<10}", "", "")?;
        for (s, worker) in self.shift_workers.iter().enumerate() {
            writeln!(f, "   {:<10} | {:<10}", s, worker.get())?;
        }

        Ok(())
    }
}
