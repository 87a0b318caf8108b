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

//! Most constrained shift (MRV) branching
//!
//! Picks the uncovered shift with the fewest remaining candidate workers.
//! A shift with few options is the most likely to fail, so trying it first
//! exposes dead ends near the root.
//!
//! Strategy:
//! 1. Scan every uncovered shift and count its remaining candidates.
//! 2. Choose the minimum. Ties go to the shift with more hours, then to the
//!    lexicographically smaller shift id.
//! 3. Order the candidate workers by remaining capacity (descending), then by
//!    worker id (ascending).
//!
//! Decisions are yielded in reverse of that order, so the preferred worker is
//! on top of the search stack.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use rota_model::{index::ShiftIndex, model::Model};
use std::cmp::Ordering;

#[derive(Debug, Clone, Default)]
pub struct MostConstrainedShiftBuilder {
    decision_queue: Vec<Decision>,
}

impl MostConstrainedShiftBuilder {
    pub fn new() -> Self {
        Self {
            decision_queue: Vec::new(),
        }
    }

    /// Pre-allocates the decision buffer. A shift never has more than
    /// `num_workers` candidates.
    pub fn preallocated(num_workers: usize) -> Self {
        Self {
            decision_queue: Vec::with_capacity(num_workers),
        }
    }

    /// Returns the uncovered shift to branch on, or `None` if every shift is
    /// covered.
    pub fn select_shift<T>(model: &Model<T>, state: &SearchState<T>) -> Option<ShiftIndex>
    where
        T: PrimInt + Signed,
    {
        state.uncovered_shifts().min_by(|&a, &b| {
            state
                .remaining_candidates(a)
                .cmp(&state.remaining_candidates(b))
                .then_with(|| model.shift_hours(b).cmp(&model.shift_hours(a)))
                .then_with(|| model.shift_id(a).cmp(model.shift_id(b)))
        })
    }
}

impl<T> DecisionBuilder<T> for MostConstrainedShiftBuilder
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = std::iter::Copied<std::iter::Rev<std::slice::Iter<'a, Decision>>>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "MostConstrainedShiftBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        self.decision_queue.clear();

        if let Some(shift_index) = Self::select_shift(model, state) {
            for &variable_index in model.shift_variables(shift_index) {
                if state.is_unfixed(variable_index) {
                    let worker_index = model.variable_worker(variable_index);
                    self.decision_queue
                        .push(Decision::new(variable_index, worker_index, shift_index));
                }
            }

            self.decision_queue.sort_unstable_by(|a, b| {
                let ca = state.remaining_capacity(model, a.worker_index());
                let cb = state.remaining_capacity(model, b.worker_index());
                match cb.cmp(&ca) {
                    Ordering::Equal => model
                        .worker_id(a.worker_index())
                        .cmp(model.worker_id(b.worker_index())),
                    other => other,
                }
            });
        }

        self.decision_queue.iter().rev().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{propagate::Propagator, trail::SearchTrail};
    use rota_model::{
        index::{ShiftIndex, WorkerIndex},
        model::ModelBuilder,
    };

    type IntegerType = i64;

    fn next(
        builder: &mut MostConstrainedShiftBuilder,
        m: &Model<IntegerType>,
        st: &SearchState<IntegerType>,
    ) -> Vec<(String, String)> {
        let mut out: Vec<_> = builder
            .next_decision(m, st)
            .map(|d| {
                (
                    m.worker_id(d.worker_index()).to_string(),
                    m.shift_id(d.shift_index()).to_string(),
                )
            })
            .collect();
        out.reverse();
        out
    }

    #[test]
    fn test_picks_fewest_candidates() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["A", "B", "C"])
            .add_shifts(["wide", "narrow"])
            .set_shift_hours("wide", 9)
            .set_shift_hours("narrow", 1);
        for w in ["A", "B", "C"] {
            b.set_worker_capacity(w, 10)
                .set_availability(w, "wide", true);
        }
        b.set_availability("B", "narrow", true)
            .set_availability("C", "narrow", true);
        let m = b.build().unwrap();
        let st = SearchState::new(&m);

        let mut builder = MostConstrainedShiftBuilder::preallocated(m.num_workers());
        assert_eq!(
            next(&mut builder, &m, &st),
            vec![
                ("B".to_string(), "narrow".to_string()),
                ("C".to_string(), "narrow".to_string())
            ]
        );
    }

    #[test]
    fn test_ties_prefer_more_hours_then_smaller_id() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["A", "B"])
            .add_shifts(["z", "y", "x"])
            .set_shift_hours("z", 5)
            .set_shift_hours("y", 3)
            .set_shift_hours("x", 5)
            .set_worker_capacity("A", 20)
            .set_worker_capacity("B", 20);
        for w in ["A", "B"] {
            for s in ["z", "y", "x"] {
                b.set_availability(w, s, true);
            }
        }
        let m = b.build().unwrap();
        let st = SearchState::new(&m);

        let shift = MostConstrainedShiftBuilder::select_shift(&m, &st).unwrap();
        assert_eq!(m.shift_id(shift), "x");
    }

    #[test]
    fn test_workers_ordered_by_remaining_capacity_then_id() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["C", "B", "A"])
            .add_shifts(["S1", "S2"])
            .set_shift_hours("S1", 2)
            .set_shift_hours("S2", 2)
            .set_worker_capacity("C", 5)
            .set_worker_capacity("B", 5)
            .set_worker_capacity("A", 3);
        for w in ["A", "B", "C"] {
            b.set_availability(w, "S1", true)
                .set_availability(w, "S2", true);
        }
        let m = b.build().unwrap();
        let st = SearchState::new(&m);

        let mut builder = MostConstrainedShiftBuilder::new();
        let order: Vec<_> = next(&mut builder, &m, &st)
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_skips_excluded_candidates_and_covered_shifts() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["A", "B"])
            .add_shifts(["S1", "S2"])
            .set_shift_hours("S1", 4)
            .set_shift_hours("S2", 4)
            .set_worker_capacity("A", 4)
            .set_worker_capacity("B", 8);
        for w in ["A", "B"] {
            b.set_availability(w, "S1", true)
                .set_availability(w, "S2", true);
        }
        let m = b.build().unwrap();
        let mut st = SearchState::new(&m);
        let mut trail = SearchTrail::new();
        let mut propagator = Propagator::new();
        propagator.initialize(&m, &mut st, &mut trail).unwrap();

        let a_s1 = m.variable(WorkerIndex::new(0), ShiftIndex::new(0)).unwrap();
        propagator.assign(&m, &mut st, &mut trail, a_s1).unwrap();

        // A is full now, so S2 only has B left and the unit rule covered it.
        assert!(st.is_complete());
        let mut builder = MostConstrainedShiftBuilder::new();
        assert!(next(&mut builder, &m, &st).is_empty());
    }
}
