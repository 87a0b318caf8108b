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

//! Search state for the shift assignment branch-and-bound.
//!
//! `SearchState` holds the partial assignment explored by the search: the
//! value of every decision variable plus the aggregates the propagator and
//! the bound need in O(1):
//! - per-shift count of candidates not yet excluded,
//! - per-shift covering worker (a `FixedBitSet` marks covered shifts),
//! - per-worker assigned hours,
//! - the current objective and the hours of still uncovered shifts.
//!
//! The state is only mutated through `SearchTrail`, which records every
//! change so it can be undone on backtrack. The crate-private mutators below
//! are the primitive operations the trail replays.
//!
//! Invariants (debug-checked):
//! - `num_covered <= num_shifts`
//! - `current_objective + uncovered_hours == model.total_hours()`
//! - a covered shift has exactly one variable at `One`.

use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, Signed};
use rota_model::{
    index::{ShiftIndex, VariableIndex, WorkerIndex},
    model::Model,
    solution::Solution,
};

/// The value of a binary decision variable in a partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableValue {
    #[default]
    Unfixed,
    Zero,
    One,
}

impl std::fmt::Display for VariableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableValue::Unfixed => write!(f, "?"),
            VariableValue::Zero => write!(f, "0"),
            VariableValue::One => write!(f, "1"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchState<T> {
    values: Vec<VariableValue>,
    shift_remaining: Vec<usize>,
    shift_workers: Vec<WorkerIndex>,
    covered_shifts: FixedBitSet,
    worker_hours: Vec<T>,
    current_objective: T,
    uncovered_hours: T,
    num_covered: usize,
}

impl<T> SearchState<T>
where
    T: PrimInt + Signed,
{
    /// Creates the root state for `model`: every variable unfixed, every
    /// shift uncovered and all hours still open.
    pub fn new(model: &Model<T>) -> Self {
        let num_shifts = model.num_shifts();
        let shift_remaining = (0..num_shifts)
            .map(|s| model.shift_variables(ShiftIndex::new(s)).len())
            .collect();

        Self {
            values: vec![VariableValue::Unfixed; model.num_variables()],
            shift_remaining,
            shift_workers: vec![WorkerIndex::new(0); num_shifts],
            covered_shifts: FixedBitSet::with_capacity(num_shifts),
            worker_hours: vec![T::zero(); model.num_workers()],
            current_objective: T::zero(),
            uncovered_hours: model.total_hours(),
            num_covered: 0,
        }
    }

    #[inline]
    pub fn num_shifts(&self) -> usize {
        self.shift_remaining.len()
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.worker_hours.len()
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    /// Returns the value of the specified variable.
    ///
    /// # Panics
    ///
    /// Panics if `variable_index` is not in `0..num_variables()`.
    #[inline]
    pub fn value(&self, variable_index: VariableIndex) -> VariableValue {
        let index = variable_index.get();
        debug_assert!(
            index < self.num_variables(),
            "called `SearchState::value` with variable index out of bounds: the len is {} but the index is {}",
            self.num_variables(),
            index
        );

        self.values[index]
    }

    #[inline]
    pub fn is_unfixed(&self, variable_index: VariableIndex) -> bool {
        self.value(variable_index) == VariableValue::Unfixed
    }

    /// Returns the number of candidates of a shift that are not excluded.
    /// For a covered shift this counts the covering variable.
    #[inline]
    pub fn remaining_candidates(&self, shift_index: ShiftIndex) -> usize {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `SearchState::remaining_candidates` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        self.shift_remaining[index]
    }

    #[inline]
    pub fn is_covered(&self, shift_index: ShiftIndex) -> bool {
        self.covered_shifts.contains(shift_index.get())
    }

    /// Returns the worker covering the shift, if any.
    #[inline]
    pub fn covering_worker(&self, shift_index: ShiftIndex) -> Option<WorkerIndex> {
        if self.is_covered(shift_index) {
            Some(self.shift_workers[shift_index.get()])
        } else {
            None
        }
    }

    /// Returns the hours currently assigned to a worker.
    ///
    /// # Panics
    ///
    /// Panics if `worker_index` is not in `0..num_workers()`.
    #[inline]
    pub fn worker_hours(&self, worker_index: WorkerIndex) -> T {
        let index = worker_index.get();
        debug_assert!(
            index < self.num_workers(),
            "called `SearchState::worker_hours` with worker index out of bounds: the len is {} but the index is {}",
            self.num_workers(),
            index
        );

        self.worker_hours[index]
    }

    /// Returns the capacity a worker has left, which is negative once the
    /// worker is over its cap.
    #[inline]
    pub fn remaining_capacity(&self, model: &Model<T>, worker_index: WorkerIndex) -> T {
        model.worker_capacity(worker_index) - self.worker_hours(worker_index)
    }

    #[inline]
    pub fn current_objective(&self) -> T {
        self.current_objective
    }

    /// Returns the summed hours of shifts that are not covered yet.
    #[inline]
    pub fn uncovered_hours(&self) -> T {
        self.uncovered_hours
    }

    #[inline]
    pub fn num_covered(&self) -> usize {
        self.num_covered
    }

    /// Returns `true` once every shift is covered.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_covered == self.num_shifts()
    }

    /// Iterates the shifts that are not covered yet, in index order.
    pub fn uncovered_shifts(&self) -> impl Iterator<Item = ShiftIndex> + '_ {
        self.covered_shifts
            .zeroes()
            .take_while(move |&s| s < self.num_shifts())
            .map(ShiftIndex::new)
    }

    pub(crate) fn set_one(
        &mut self,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
        hours: T,
    ) {
        debug_assert!(
            self.is_unfixed(variable_index),
            "called `SearchState::set_one` with variable {} which is already fixed",
            variable_index
        );
        debug_assert!(
            !self.is_covered(shift_index),
            "called `SearchState::set_one` with shift {} which is already covered",
            shift_index
        );

        let w = worker_index.get();
        self.values[variable_index.get()] = VariableValue::One;
        self.covered_shifts.insert(shift_index.get());
        self.shift_workers[shift_index.get()] = worker_index;
        self.worker_hours[w] = self.worker_hours[w] + hours;
        self.current_objective = self.current_objective + hours;
        self.uncovered_hours = self.uncovered_hours - hours;
        self.num_covered += 1;
    }

    pub(crate) fn unset_one(
        &mut self,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
        hours: T,
    ) {
        debug_assert_eq!(self.value(variable_index), VariableValue::One);

        let w = worker_index.get();
        self.values[variable_index.get()] = VariableValue::Unfixed;
        self.covered_shifts.set(shift_index.get(), false);
        self.worker_hours[w] = self.worker_hours[w] - hours;
        self.current_objective = self.current_objective - hours;
        self.uncovered_hours = self.uncovered_hours + hours;
        self.num_covered -= 1;
    }

    pub(crate) fn set_zero(&mut self, variable_index: VariableIndex, shift_index: ShiftIndex) {
        debug_assert!(
            self.is_unfixed(variable_index),
            "called `SearchState::set_zero` with variable {} which is already fixed",
            variable_index
        );

        self.values[variable_index.get()] = VariableValue::Zero;
        self.shift_remaining[shift_index.get()] -= 1;
    }

    pub(crate) fn unset_zero(&mut self, variable_index: VariableIndex, shift_index: ShiftIndex) {
        debug_assert_eq!(self.value(variable_index), VariableValue::Zero);

        self.values[variable_index.get()] = VariableValue::Unfixed;
        self.shift_remaining[shift_index.get()] += 1;
    }
}

impl<T> std::fmt::Display for SearchState<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchState(covered: {}/{}, objective: {}, uncovered_hours: {})",
            self.num_covered,
            self.shift_remaining.len(),
            self.current_objective,
            self.uncovered_hours
        )
    }
}

/// Raised when converting a state that still has uncovered shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteAssignment {
    pub uncovered: usize,
}

impl std::fmt::Display for IncompleteAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assignment leaves {} shifts uncovered", self.uncovered)
    }
}

impl std::error::Error for IncompleteAssignment {}

impl<T> TryFrom<&SearchState<T>> for Solution<T>
where
    T: PrimInt + Signed,
{
    type Error = IncompleteAssignment;

    fn try_from(state: &SearchState<T>) -> Result<Self, Self::Error> {
        if !state.is_complete() {
            return Err(IncompleteAssignment {
                uncovered: state.num_shifts() - state.num_covered(),
            });
        }

        Ok(Solution::new(
            state.current_objective(),
            state.shift_workers.clone(),
        ))
    }
}
