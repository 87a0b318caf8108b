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

use crate::state::SearchState;
use num_traits::{PrimInt, Signed};
use rota_model::{
    index::{ShiftIndex, VariableIndex, WorkerIndex},
    model::Model,
};
use std::iter::FusedIterator;

/// A decision to let a worker take a shift, i.e. to fix the variable
/// `(worker, shift)` to one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decision {
    variable_index: VariableIndex,
    worker_index: WorkerIndex,
    shift_index: ShiftIndex,
}

impl Decision {
    #[inline(always)]
    pub const fn new(
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
    ) -> Self {
        Self {
            variable_index,
            worker_index,
            shift_index,
        }
    }

    /// Creates the decision for `(worker, shift)`, or `None` if the worker
    /// is not available for the shift.
    #[inline]
    pub fn try_new<T>(
        model: &Model<T>,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
    ) -> Option<Self>
    where
        T: PrimInt + Signed,
    {
        let variable_index = model.variable(worker_index, shift_index)?;
        Some(Self::new(variable_index, worker_index, shift_index))
    }

    #[inline(always)]
    pub const fn variable_index(&self) -> VariableIndex {
        self.variable_index
    }

    #[inline(always)]
    pub const fn worker_index(&self) -> WorkerIndex {
        self.worker_index
    }

    #[inline(always)]
    pub const fn shift_index(&self) -> ShiftIndex {
        self.shift_index
    }
}

impl Ord for Decision {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.shift_index
            .cmp(&other.shift_index)
            .then(self.worker_index.cmp(&other.worker_index))
    }
}

impl PartialOrd for Decision {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision(worker: {}, shift: {})",
            self.worker_index, self.shift_index
        )
    }
}

/// Produces the children of a search node.
///
/// A builder picks one uncovered shift and yields one decision per candidate
/// worker. The search pushes the decisions onto a LIFO stack, so builders
/// yield them in reverse preference order: the last decision yielded is
/// explored first. Yielding nothing means the node has no children.
pub trait DecisionBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>: Iterator<Item = Decision> + FusedIterator + 'a
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str;

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        search_state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::model::ModelBuilder;

    type IntegerType = i64;

    #[test]
    fn test_try_new_respects_availability() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["A", "B"])
            .add_shift("S")
            .set_shift_hours("S", 2)
            .set_worker_capacity("A", 2)
            .set_worker_capacity("B", 2)
            .set_availability("B", "S", true);
        let m = b.build().unwrap();

        assert!(Decision::try_new(&m, WorkerIndex::new(0), ShiftIndex::new(0)).is_none());
        let d = Decision::try_new(&m, WorkerIndex::new(1), ShiftIndex::new(0)).unwrap();
        assert_eq!(d.worker_index(), WorkerIndex::new(1));
        assert_eq!(d.shift_index(), ShiftIndex::new(0));
        assert_eq!(Some(d.variable_index()), m.variable(WorkerIndex::new(1), ShiftIndex::new(0)));
        assert_eq!(
            d.to_string(),
            "Decision(worker: WorkerIndex(1), shift: ShiftIndex(0))"
        );
    }

    #[test]
    fn test_ordering_is_shift_major() {
        let a = Decision::new(VariableIndex::new(5), WorkerIndex::new(2), ShiftIndex::new(0));
        let b = Decision::new(VariableIndex::new(1), WorkerIndex::new(0), ShiftIndex::new(1));
        let c = Decision::new(VariableIndex::new(3), WorkerIndex::new(1), ShiftIndex::new(1));
        let mut v = vec![c, b, a];
        v.sort();
        assert_eq!(v, vec![a, b, c]);
    }
}
