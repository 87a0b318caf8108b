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

//! Input order branching
//!
//! Branches on the first uncovered shift in input order and tries its
//! candidate workers in input order. It carries no heuristic and serves as
//! a baseline for `MostConstrainedShiftBuilder`.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use rota_model::model::Model;

#[derive(Debug, Clone, Default)]
pub struct InputOrderBuilder {
    decision_queue: Vec<Decision>,
}

impl InputOrderBuilder {
    pub fn new() -> Self {
        Self {
            decision_queue: Vec::new(),
        }
    }

    pub fn preallocated(num_workers: usize) -> Self {
        Self {
            decision_queue: Vec::with_capacity(num_workers),
        }
    }
}

impl<T> DecisionBuilder<T> for InputOrderBuilder
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = std::iter::Copied<std::iter::Rev<std::slice::Iter<'a, Decision>>>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "InputOrderBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        self.decision_queue.clear();

        if let Some(shift_index) = state.uncovered_shifts().next() {
            self.decision_queue.extend(
                model
                    .shift_variables(shift_index)
                    .iter()
                    .filter(|&&v| state.is_unfixed(v))
                    .map(|&v| Decision::new(v, model.variable_worker(v), shift_index)),
            );
        }

        self.decision_queue.iter().rev().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::{
        index::{ShiftIndex, WorkerIndex},
        model::ModelBuilder,
    };

    type IntegerType = i64;

    #[test]
    fn test_first_shift_workers_in_input_order() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["B", "A"])
            .add_shifts(["S1", "S2"])
            .set_shift_hours("S1", 1)
            .set_shift_hours("S2", 1)
            .set_worker_capacity("A", 5)
            .set_worker_capacity("B", 5);
        for w in ["A", "B"] {
            b.set_availability(w, "S1", true)
                .set_availability(w, "S2", true);
        }
        let m = b.build().unwrap();
        let st = SearchState::new(&m);

        let mut builder = InputOrderBuilder::preallocated(2);
        let mut ds: Vec<_> = builder.next_decision(&m, &st).collect();
        ds.reverse();
        assert_eq!(ds.len(), 2);
        assert!(ds.iter().all(|d| d.shift_index() == ShiftIndex::new(0)));
        assert_eq!(ds[0].worker_index(), WorkerIndex::new(0));
        assert_eq!(ds[1].worker_index(), WorkerIndex::new(1));
        assert_eq!(
            <InputOrderBuilder as DecisionBuilder<IntegerType>>::name(&builder),
            "InputOrderBuilder"
        );
    }
}
