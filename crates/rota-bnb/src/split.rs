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

//! Root splitting
//!
//! Propagates the root of the search tree and applies the branching rule
//! once. Each child of the root becomes an independent job that the parallel
//! orchestrator can hand to a `BnbSolver` as a fixed assignment.
//!
//! Jobs are returned in the order the sequential search would explore them,
//! so the position of a job is its rank in the shared incumbent.

use crate::{
    branching::decision::DecisionBuilder,
    propagate::{Contradiction, Propagator},
    state::SearchState,
    trail::SearchTrail,
};
use num_traits::{PrimInt, Signed};
use rota_model::{fixed::FixedAssignment, model::Model, solution::Solution};

/// The state of the search tree after the root has been propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSplit<T> {
    /// Propagation at the root derived a contradiction.
    Infeasible(Contradiction),
    /// Propagation alone covered every shift.
    Solved(Solution<T>),
    /// The children of the root in exploration order.
    Branches(Vec<FixedAssignment>),
}

impl<T> RootSplit<T> {
    /// Returns the number of jobs this split produces.
    #[inline]
    pub fn num_jobs(&self) -> usize {
        match self {
            RootSplit::Branches(branches) => branches.len(),
            _ => 0,
        }
    }
}

impl<T> std::fmt::Display for RootSplit<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootSplit::Infeasible(contradiction) => {
                write!(f, "RootSplit::Infeasible({})", contradiction)
            }
            RootSplit::Solved(solution) => {
                write!(f, "RootSplit::Solved(objective: {})", solution.objective_value())
            }
            RootSplit::Branches(branches) => {
                write!(f, "RootSplit::Branches({})", branches.len())
            }
        }
    }
}

/// Propagates the root of `model` and branches it once with `builder`.
///
/// The builder yields its decisions in reverse preference order, the order
/// in which they are pushed onto the search stack. They are reversed here so
/// that the first branch is the one the sequential search explores first.
pub fn split_root<T, B>(model: &Model<T>, builder: &mut B) -> RootSplit<T>
where
    T: PrimInt + Signed,
    B: DecisionBuilder<T>,
{
    let mut state = SearchState::new(model);
    let mut trail = SearchTrail::preallocated(model.num_variables(), model.num_shifts());
    let mut propagator = Propagator::preallocated(model.num_variables());

    if let Err(contradiction) = propagator.initialize(model, &mut state, &mut trail) {
        return RootSplit::Infeasible(contradiction);
    }

    if state.is_complete() {
        return match Solution::try_from(&state) {
            Ok(solution) => RootSplit::Solved(solution),
            Err(_) => unreachable!("a complete search state always converts to a solution"),
        };
    }

    let mut branches: Vec<FixedAssignment> = builder
        .next_decision(model, &state)
        .map(|decision| FixedAssignment::new(decision.worker_index(), decision.shift_index()))
        .collect();
    branches.reverse();

    RootSplit::Branches(branches)
}
