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

use crate::state::{SearchState, VariableValue};
use num_traits::{PrimInt, Signed};
use rota_model::index::{ShiftIndex, VariableIndex, WorkerIndex};

/// One fixing. `hours` is what a `One` added to the worker, zero otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct TrailEntry<T> {
    hours: T,
    variable_index: VariableIndex,
    worker_index: WorkerIndex,
    shift_index: ShiftIndex,
    value: VariableValue,
}

/// A linear undo log with frame markers for efficient backtracking.
///
/// `SearchTrail` records every variable fixing applied to `SearchState` along with
/// frame boundaries, enabling O(k) rollback of k fixings when backtracking a frame.
/// Typical usage:
/// 1. Call `push_frame()` before expanding a node,
/// 2. Fix variables through `fix_one`/`fix_zero` (the propagator does this),
/// 3. On prune or completion, call `backtrack(state)` to restore the state to the start of the frame.
///
/// Fixings made without an open frame belong to the root and are only
/// discarded by `reset`.
#[derive(Debug, Clone)]
pub struct SearchTrail<T> {
    /// The linear history of all changes made to the state.
    entries: Vec<TrailEntry<T>>,
    /// `frames[i]` stores the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl<T> Default for SearchTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchTrail<T> {
    /// Creates a new, empty `SearchTrail`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a new `SearchTrail` preallocating space for a model with
    /// `num_variables` variables and `num_shifts` shifts.
    ///
    /// Every variable is fixed at most once per branch, and every decision
    /// level covers one shift, so this reserves:
    /// - `num_variables` capacity for entries,
    /// - `num_shifts + 1` capacity for frames.
    #[inline]
    pub fn preallocated(num_variables: usize, num_shifts: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_variables),
            frames: Vec::with_capacity(num_shifts + 1),
        }
    }

    /// Ensures the trail has capacity for the given problem size.
    pub fn ensure_capacity(&mut self, num_variables: usize, num_shifts: usize) {
        if self.entries.capacity() < num_variables {
            self.entries
                .reserve(num_variables - self.entries.len());
        }
        if self.frames.capacity() < num_shifts + 1 {
            self.frames.reserve((num_shifts + 1) - self.frames.len());
        }
    }

    /// Returns the number of entries in the trail.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if there are no frames tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pushes a new frame onto the trail.
    /// This marks the start of a new decision level.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Clears all entries and frames. The state is not touched.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    /// Returns the memory in bytes held by the trail buffers.
    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<TrailEntry<T>>()
            + self.frames.capacity() * std::mem::size_of::<usize>()
    }
}

impl<T> SearchTrail<T>
where
    T: PrimInt + Signed,
{
    /// Fixes a variable to `One` and records the change.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the variable is not unfixed or the shift is
    /// already covered.
    #[inline]
    pub fn fix_one(
        &mut self,
        state: &mut SearchState<T>,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
        hours: T,
    ) {
        state.set_one(variable_index, worker_index, shift_index, hours);
        self.entries.push(TrailEntry {
            hours,
            variable_index,
            worker_index,
            shift_index,
            value: VariableValue::One,
        });
    }

    /// Fixes a variable to `Zero` and records the change.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the variable is not unfixed.
    #[inline]
    pub fn fix_zero(
        &mut self,
        state: &mut SearchState<T>,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
    ) {
        state.set_zero(variable_index, shift_index);
        self.entries.push(TrailEntry {
            hours: T::zero(),
            variable_index,
            worker_index,
            shift_index,
            value: VariableValue::Zero,
        });
    }

    /// Undoes every fixing of the top frame in reverse order and pops the frame.
    /// Returns `false` if there was no frame to backtrack.
    pub fn backtrack(&mut self, state: &mut SearchState<T>) -> bool {
        let Some(start) = self.frames.pop() else {
            return false;
        };

        while self.entries.len() > start {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            match entry.value {
                VariableValue::One => state.unset_one(
                    entry.variable_index,
                    entry.worker_index,
                    entry.shift_index,
                    entry.hours,
                ),
                VariableValue::Zero => state.unset_zero(entry.variable_index, entry.shift_index),
                VariableValue::Unfixed => {}
            }
        }

        true
    }
}

impl<T> std::fmt::Display for SearchTrail<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::model::{Model, ModelBuilder};

    type IntegerType = i64;

    fn model() -> Model<IntegerType> {
        let mut b = ModelBuilder::new();
        b.add_workers(["A", "B"])
            .add_shifts(["S1", "S2"])
            .set_worker_capacity("A", 10)
            .set_worker_capacity("B", 10)
            .set_shift_hours("S1", 4)
            .set_shift_hours("S2", 6);
        for w in ["A", "B"] {
            for s in ["S1", "S2"] {
                b.set_availability(w, s, true);
            }
        }
        b.build().unwrap()
    }

    #[test]
    fn test_backtrack_restores_state() {
        let m = model();
        let mut st = SearchState::new(&m);
        let mut trail = SearchTrail::preallocated(m.num_variables(), m.num_shifts());
        let (a, b) = (WorkerIndex::new(0), WorkerIndex::new(1));
        let (s1, s2) = (ShiftIndex::new(0), ShiftIndex::new(1));

        trail.push_frame();
        trail.fix_one(&mut st, m.variable(a, s1).unwrap(), a, s1, 4);
        trail.fix_zero(&mut st, m.variable(b, s1).unwrap(), b, s1);
        assert_eq!(trail.num_entries(), 2);
        assert_eq!(trail.depth(), 1);

        trail.push_frame();
        trail.fix_one(&mut st, m.variable(b, s2).unwrap(), b, s2, 6);
        assert!(st.is_complete());
        assert_eq!(st.current_objective(), 10);
        assert_eq!(trail.depth(), 2);

        assert!(trail.backtrack(&mut st));
        assert!(!st.is_covered(s2));
        assert_eq!(st.current_objective(), 4);
        assert_eq!(st.worker_hours(b), 0);

        assert!(trail.backtrack(&mut st));
        assert_eq!(st.num_covered(), 0);
        assert_eq!(st.remaining_candidates(s1), 2);
        assert_eq!(st.uncovered_hours(), 10);
        assert!(trail.is_empty());
        assert!(!trail.backtrack(&mut st));
    }

    #[test]
    fn test_root_entries_survive_backtrack_until_reset() {
        let m = model();
        let mut st = SearchState::new(&m);
        let mut trail = SearchTrail::new();
        let (a, s1) = (WorkerIndex::new(0), ShiftIndex::new(0));

        trail.fix_zero(&mut st, m.variable(a, s1).unwrap(), a, s1);
        trail.push_frame();
        assert!(trail.backtrack(&mut st));
        assert_eq!(st.remaining_candidates(s1), 1);
        assert_eq!(trail.num_entries(), 1);

        trail.reset();
        assert_eq!(trail.num_entries(), 0);
        assert_eq!(trail.to_string(), "SearchTrail(entries: 0, frames: 0)");
    }
}
