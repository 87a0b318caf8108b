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

//! Constraint propagation for the shift assignment model
//!
//! `Propagator` keeps the search state consistent with the three hard
//! constraints of the model after every fixing and runs to a fixed point.
//!
//! Rules, applied to queued fixings in FIFO order:
//! - `(w, s) = 1`: every other candidate of `s` becomes 0 (exact cover),
//!   every variable of `w` on a shift forbidden together with `s` becomes 0,
//!   the hours of `w` must not exceed its capacity, and every still open
//!   variable of `w` whose shift no longer fits the remaining capacity
//!   becomes 0.
//! - `(w, s) = 0`: an uncovered shift without candidates is a contradiction,
//!   and an uncovered shift with a single candidate forces that candidate to 1.
//!
//! Every fixing goes through `SearchTrail`, so the caller undoes a failed
//! propagation by backtracking the frame it opened before calling in.

use crate::{
    state::{SearchState, VariableValue},
    trail::SearchTrail,
};
use num_traits::{PrimInt, Signed};
use rota_model::{
    index::{ShiftIndex, VariableIndex, WorkerIndex},
    model::Model,
};
use std::collections::VecDeque;

/// The kind of a contradiction, without the indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContradictionReason {
    ShiftUncoverable,
    CapacityExceeded,
    ForbiddenPairViolated,
}

impl std::fmt::Display for ContradictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContradictionReason::ShiftUncoverable => write!(f, "ShiftUncoverable"),
            ContradictionReason::CapacityExceeded => write!(f, "CapacityExceeded"),
            ContradictionReason::ForbiddenPairViolated => write!(f, "ForbiddenPairViolated"),
        }
    }
}

/// Proof that the current partial assignment cannot be extended to a
/// feasible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contradiction {
    /// An uncovered shift has no candidate worker left.
    ShiftUncoverable { shift: ShiftIndex },
    /// Fixing `worker` to `shift` pushed the worker past its capacity.
    CapacityExceeded { worker: WorkerIndex, shift: ShiftIndex },
    /// `worker` would take two shifts that are forbidden together.
    ForbiddenPairViolated {
        worker: WorkerIndex,
        first: ShiftIndex,
        second: ShiftIndex,
    },
}

impl Contradiction {
    #[inline]
    pub fn reason(&self) -> ContradictionReason {
        match self {
            Contradiction::ShiftUncoverable { .. } => ContradictionReason::ShiftUncoverable,
            Contradiction::CapacityExceeded { .. } => ContradictionReason::CapacityExceeded,
            Contradiction::ForbiddenPairViolated { .. } => {
                ContradictionReason::ForbiddenPairViolated
            }
        }
    }
}

impl std::fmt::Display for Contradiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contradiction::ShiftUncoverable { shift } => {
                write!(f, "ShiftUncoverable(shift: {})", shift)
            }
            Contradiction::CapacityExceeded { worker, shift } => {
                write!(f, "CapacityExceeded(worker: {}, shift: {})", worker, shift)
            }
            Contradiction::ForbiddenPairViolated {
                worker,
                first,
                second,
            } => write!(
                f,
                "ForbiddenPairViolated(worker: {}, first: {}, second: {})",
                worker, first, second
            ),
        }
    }
}

impl std::error::Error for Contradiction {}

#[derive(Debug, Clone, Default)]
pub struct Propagator {
    queue: VecDeque<VariableIndex>,
}

impl Propagator {
    #[inline]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Creates a propagator whose queue holds `num_variables` fixings
    /// without reallocating.
    #[inline]
    pub fn preallocated(num_variables: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(num_variables),
        }
    }

    /// Returns the number of fixings still waiting to be propagated.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Propagates the root of the search.
    ///
    /// Excludes every variable that can never be one: shifts that are
    /// forbidden together with themselves, and shifts whose hours exceed the
    /// worker's capacity on their own. Then applies the unit rule to every
    /// shift and propagates to a fixed point.
    pub fn initialize<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        self.queue.clear();

        for s in 0..model.num_shifts() {
            let shift_index = ShiftIndex::new(s);
            if model.shift_variables(shift_index).is_empty() {
                return Err(Contradiction::ShiftUncoverable { shift: shift_index });
            }
        }

        for v in 0..model.num_variables() {
            let variable_index = VariableIndex::new(v);
            if !state.is_unfixed(variable_index) {
                continue;
            }

            let worker_index = model.variable_worker(variable_index);
            let shift_index = model.variable_shift(variable_index);
            if model.is_self_forbidden(shift_index)
                || model.shift_hours(shift_index) > model.worker_capacity(worker_index)
            {
                self.exclude_variable(state, trail, variable_index, worker_index, shift_index);
            }
        }

        for s in 0..model.num_shifts() {
            let result = self.check_shift(model, state, trail, ShiftIndex::new(s));
            if result.is_err() {
                self.queue.clear();
                return result;
            }
        }

        self.run(model, state, trail)
    }

    /// Fixes `variable_index` to one and propagates to a fixed point.
    ///
    /// Fixing a variable that is already one is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the variable was already fixed to zero. Callers check
    /// `SearchState::value` first.
    pub fn assign<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        variable_index: VariableIndex,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        match state.value(variable_index) {
            VariableValue::One => return Ok(()),
            VariableValue::Zero => panic!(
                "called `Propagator::assign` with variable {} which is already fixed to zero",
                variable_index
            ),
            VariableValue::Unfixed => {}
        }

        let worker_index = model.variable_worker(variable_index);
        let shift_index = model.variable_shift(variable_index);
        self.assign_variable(model, state, trail, variable_index, worker_index, shift_index);
        self.run(model, state, trail)
    }

    /// Fixes `variable_index` to zero and propagates to a fixed point.
    ///
    /// Excluding a variable that is already zero is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the variable was already fixed to one.
    pub fn exclude<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        variable_index: VariableIndex,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        match state.value(variable_index) {
            VariableValue::Zero => return Ok(()),
            VariableValue::One => panic!(
                "called `Propagator::exclude` with variable {} which is already fixed to one",
                variable_index
            ),
            VariableValue::Unfixed => {}
        }

        let worker_index = model.variable_worker(variable_index);
        let shift_index = model.variable_shift(variable_index);
        self.exclude_variable(state, trail, variable_index, worker_index, shift_index);
        self.run(model, state, trail)
    }

    #[inline]
    fn assign_variable<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
    ) where
        T: PrimInt + Signed,
    {
        let hours = model.shift_hours(shift_index);
        trail.fix_one(state, variable_index, worker_index, shift_index, hours);
        self.queue.push_back(variable_index);
    }

    #[inline]
    fn exclude_variable<T>(
        &mut self,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        variable_index: VariableIndex,
        worker_index: WorkerIndex,
        shift_index: ShiftIndex,
    ) where
        T: PrimInt + Signed,
    {
        trail.fix_zero(state, variable_index, worker_index, shift_index);
        self.queue.push_back(variable_index);
    }

    fn run<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        while let Some(variable_index) = self.queue.pop_front() {
            let result = match state.value(variable_index) {
                VariableValue::One => self.on_one(model, state, trail, variable_index),
                VariableValue::Zero => {
                    let shift_index = model.variable_shift(variable_index);
                    self.check_shift(model, state, trail, shift_index)
                }
                VariableValue::Unfixed => Ok(()),
            };

            if result.is_err() {
                self.queue.clear();
                return result;
            }
        }

        Ok(())
    }

    fn on_one<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        variable_index: VariableIndex,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        let worker_index = model.variable_worker(variable_index);
        let shift_index = model.variable_shift(variable_index);

        let remaining = state.remaining_capacity(model, worker_index);
        if remaining < T::zero() {
            return Err(Contradiction::CapacityExceeded {
                worker: worker_index,
                shift: shift_index,
            });
        }

        for &other in model.shift_variables(shift_index) {
            if other != variable_index && state.is_unfixed(other) {
                self.exclude_variable(state, trail, other, model.variable_worker(other), shift_index);
            }
        }

        for &partner in model.forbidden_partners(shift_index) {
            if partner == shift_index {
                return Err(Contradiction::ForbiddenPairViolated {
                    worker: worker_index,
                    first: shift_index,
                    second: partner,
                });
            }

            let Some(partner_variable) = model.variable(worker_index, partner) else {
                continue;
            };
            match state.value(partner_variable) {
                VariableValue::Unfixed => {
                    self.exclude_variable(state, trail, partner_variable, worker_index, partner)
                }
                VariableValue::One => {
                    return Err(Contradiction::ForbiddenPairViolated {
                        worker: worker_index,
                        first: shift_index.min(partner),
                        second: shift_index.max(partner),
                    });
                }
                VariableValue::Zero => {}
            }
        }

        for &open in model.worker_variables(worker_index) {
            if !state.is_unfixed(open) {
                continue;
            }
            let open_shift = model.variable_shift(open);
            if model.shift_hours(open_shift) > remaining {
                self.exclude_variable(state, trail, open, worker_index, open_shift);
            }
        }

        Ok(())
    }

    fn check_shift<T>(
        &mut self,
        model: &Model<T>,
        state: &mut SearchState<T>,
        trail: &mut SearchTrail<T>,
        shift_index: ShiftIndex,
    ) -> Result<(), Contradiction>
    where
        T: PrimInt + Signed,
    {
        if state.is_covered(shift_index) {
            return Ok(());
        }

        match state.remaining_candidates(shift_index) {
            0 => Err(Contradiction::ShiftUncoverable { shift: shift_index }),
            1 => {
                let last = model
                    .shift_variables(shift_index)
                    .iter()
                    .copied()
                    .find(|&v| state.is_unfixed(v));
                if let Some(variable_index) = last {
                    let worker_index = model.variable_worker(variable_index);
                    self.assign_variable(
                        model,
                        state,
                        trail,
                        variable_index,
                        worker_index,
                        shift_index,
                    );
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::model::ModelBuilder;

    type IntegerType = i64;

    struct Fixture {
        model: Model<IntegerType>,
        state: SearchState<IntegerType>,
        trail: SearchTrail<IntegerType>,
        propagator: Propagator,
    }

    impl Fixture {
        fn new(model: Model<IntegerType>) -> Self {
            let state = SearchState::new(&model);
            let trail = SearchTrail::preallocated(model.num_variables(), model.num_shifts());
            let propagator = Propagator::preallocated(model.num_variables());
            Self {
                model,
                state,
                trail,
                propagator,
            }
        }

        fn var(&self, w: &str, s: &str) -> VariableIndex {
            let w = self.model.worker_index(w).unwrap();
            let s = self.model.shift_index(s).unwrap();
            self.model.variable(w, s).unwrap()
        }

        fn shift(&self, s: &str) -> ShiftIndex {
            self.model.shift_index(s).unwrap()
        }

        fn worker(&self, w: &str) -> WorkerIndex {
            self.model.worker_index(w).unwrap()
        }

        fn initialize(&mut self) -> Result<(), Contradiction> {
            self.propagator
                .initialize(&self.model, &mut self.state, &mut self.trail)
        }

        fn assign(&mut self, w: &str, s: &str) -> Result<(), Contradiction> {
            let v = self.var(w, s);
            self.propagator
                .assign(&self.model, &mut self.state, &mut self.trail, v)
        }

        fn exclude(&mut self, w: &str, s: &str) -> Result<(), Contradiction> {
            let v = self.var(w, s);
            self.propagator
                .exclude(&self.model, &mut self.state, &mut self.trail, v)
        }

        fn value(&self, w: &str, s: &str) -> VariableValue {
            self.state.value(self.var(w, s))
        }
    }

    fn builder(
        workers: &[(&str, IntegerType)],
        shifts: &[(&str, IntegerType)],
        available: &[(&str, &str)],
    ) -> ModelBuilder<IntegerType> {
        let mut b = ModelBuilder::new();
        for &(w, cap) in workers {
            b.add_worker(w).set_worker_capacity(w, cap);
        }
        for &(s, h) in shifts {
            b.add_shift(s).set_shift_hours(s, h);
        }
        for &(w, s) in available {
            b.set_availability(w, s, true);
        }
        b
    }

    #[test]
    fn test_initialize_detects_shift_without_candidates() {
        let b = builder(&[("A", 10)], &[("S1", 1), ("S2", 1)], &[("A", "S1")]);
        let mut f = Fixture::new(b.build().unwrap());
        assert_eq!(
            f.initialize(),
            Err(Contradiction::ShiftUncoverable {
                shift: ShiftIndex::new(1)
            })
        );
    }

    #[test]
    fn test_initialize_excludes_oversized_shifts_and_forces_units() {
        let b = builder(
            &[("A", 4), ("B", 10)],
            &[("S1", 6), ("S2", 3)],
            &[("A", "S1"), ("B", "S1"), ("A", "S2"), ("B", "S2")],
        );
        let mut f = Fixture::new(b.build().unwrap());
        assert_eq!(f.initialize(), Ok(()));

        assert_eq!(f.value("A", "S1"), VariableValue::Zero);
        assert_eq!(f.value("B", "S1"), VariableValue::One);
        assert_eq!(f.state.covering_worker(f.shift("S1")), Some(f.worker("B")));
        assert_eq!(f.value("A", "S2"), VariableValue::Unfixed);
        assert_eq!(f.value("B", "S2"), VariableValue::Unfixed);
        assert_eq!(f.state.current_objective(), 6);
    }

    #[test]
    fn test_initialize_self_pair_makes_shift_uncoverable() {
        let mut b = builder(&[("A", 10)], &[("S1", 1)], &[("A", "S1")]);
        b.add_forbidden_pair("S1", "S1");
        let mut f = Fixture::new(b.build().unwrap());
        assert_eq!(
            f.initialize(),
            Err(Contradiction::ShiftUncoverable {
                shift: ShiftIndex::new(0)
            })
        );
    }

    #[test]
    fn test_assign_applies_exact_cover_and_forbidden_pairs() {
        let mut b = builder(
            &[("A", 20), ("B", 20), ("C", 20)],
            &[("S1", 2), ("S2", 2), ("S3", 2)],
            &[
                ("A", "S1"),
                ("B", "S1"),
                ("C", "S1"),
                ("A", "S2"),
                ("B", "S2"),
                ("A", "S3"),
                ("C", "S3"),
            ],
        );
        b.add_forbidden_pair("S1", "S2");
        let mut f = Fixture::new(b.build().unwrap());
        f.initialize().unwrap();

        f.assign("A", "S1").unwrap();
        assert_eq!(f.value("B", "S1"), VariableValue::Zero);
        assert_eq!(f.value("C", "S1"), VariableValue::Zero);
        assert_eq!(f.value("A", "S2"), VariableValue::Zero);
        // S2 has only B left.
        assert_eq!(f.value("B", "S2"), VariableValue::One);
        assert_eq!(f.value("A", "S3"), VariableValue::Unfixed);
        assert_eq!(f.state.current_objective(), 4);
    }

    #[test]
    fn test_capacity_lookahead_excludes_shifts_that_no_longer_fit() {
        let b = builder(
            &[("A", 7), ("B", 7)],
            &[("S1", 4), ("S2", 4), ("S3", 3)],
            &[
                ("A", "S1"),
                ("B", "S1"),
                ("A", "S2"),
                ("B", "S2"),
                ("A", "S3"),
                ("B", "S3"),
            ],
        );
        let mut f = Fixture::new(b.build().unwrap());
        f.initialize().unwrap();

        f.assign("A", "S1").unwrap();
        // A has 3 left: S2 (4h) no longer fits, so B must take S2.
        assert_eq!(f.value("A", "S2"), VariableValue::Zero);
        assert_eq!(f.value("B", "S2"), VariableValue::One);
        // B has 3 left and A has 3 left, S3 is still open for both.
        assert_eq!(f.value("A", "S3"), VariableValue::Unfixed);
        assert_eq!(f.value("B", "S3"), VariableValue::Unfixed);
    }

    #[test]
    fn test_exclude_forces_last_candidate_and_backtracks() {
        let b = builder(
            &[("A", 10), ("B", 10)],
            &[("S1", 1), ("S2", 1)],
            &[("A", "S1"), ("B", "S1"), ("A", "S2"), ("B", "S2")],
        );
        let mut f = Fixture::new(b.build().unwrap());
        f.initialize().unwrap();

        f.trail.push_frame();
        f.exclude("A", "S1").unwrap();
        assert_eq!(f.value("B", "S1"), VariableValue::One);

        f.trail.backtrack(&mut f.state);
        assert_eq!(f.value("A", "S1"), VariableValue::Unfixed);
        assert_eq!(f.value("B", "S1"), VariableValue::Unfixed);
    }

    #[test]
    fn test_unit_chain_detects_capacity_conflict() {
        let b = builder(
            &[("A", 10), ("B", 5)],
            &[("S1", 3), ("S2", 3)],
            &[("A", "S1"), ("B", "S1"), ("B", "S2")],
        );
        let mut f = Fixture::new(b.build().unwrap());
        // S2 only has B: the unit rule fixes it, then B has 2 left so S1 must go to A.
        f.initialize().unwrap();
        assert_eq!(f.value("B", "S2"), VariableValue::One);
        assert_eq!(f.value("B", "S1"), VariableValue::Zero);
        assert_eq!(f.value("A", "S1"), VariableValue::One);
        assert!(f.state.is_complete());
    }

    #[test]
    fn test_forbidden_partner_exclusion_chains_units() {
        let mut b = builder(
            &[("A", 10), ("B", 10)],
            &[("S1", 1), ("S2", 1), ("S3", 1)],
            &[("A", "S1"), ("B", "S1"), ("A", "S2"), ("A", "S3"), ("B", "S3")],
        );
        b.add_forbidden_pair("S1", "S2");
        let mut f = Fixture::new(b.build().unwrap());
        f.initialize().unwrap();
        // S2 has only A, so A takes S2 and S1 goes to B.
        assert_eq!(f.value("A", "S2"), VariableValue::One);
        assert_eq!(f.value("B", "S1"), VariableValue::One);

        f.trail.push_frame();
        assert_eq!(f.exclude("B", "S3"), Ok(()));
        assert_eq!(f.value("A", "S3"), VariableValue::One);
        f.trail.backtrack(&mut f.state);
        assert_eq!(f.value("A", "S3"), VariableValue::Unfixed);
    }

    #[test]
    fn test_assign_reports_capacity_exceeded() {
        let b = builder(
            &[("A", 5), ("B", 1)],
            &[("S1", 3), ("S2", 3)],
            &[("A", "S1"), ("B", "S1"), ("A", "S2")],
        );
        let mut f = Fixture::new(b.build().unwrap());
        // B cannot take S1 (3 > 1), so A must take S1 and S2: 6 > 5.
        let err = f.initialize().unwrap_err();
        assert_eq!(err.reason(), ContradictionReason::CapacityExceeded);
        assert_eq!(f.propagator.pending(), 0);
    }

    #[test]
    fn test_assign_reports_forbidden_pair() {
        let mut b = builder(
            &[("A", 10)],
            &[("S1", 1), ("S2", 1)],
            &[("A", "S1"), ("A", "S2")],
        );
        b.add_forbidden_pair("S2", "S1");
        let mut f = Fixture::new(b.build().unwrap());
        let err = f.initialize().unwrap_err();
        assert_eq!(err.reason(), ContradictionReason::ForbiddenPairViolated);
        assert_eq!(
            err,
            Contradiction::ForbiddenPairViolated {
                worker: WorkerIndex::new(0),
                first: ShiftIndex::new(0),
                second: ShiftIndex::new(1),
            }
        );
    }

    #[test]
    fn test_assign_one_is_idempotent() {
        let b = builder(
            &[("A", 10), ("B", 10)],
            &[("S1", 1)],
            &[("A", "S1"), ("B", "S1")],
        );
        let mut f = Fixture::new(b.build().unwrap());
        f.initialize().unwrap();
        f.assign("A", "S1").unwrap();
        let entries = f.trail.num_entries();
        f.assign("A", "S1").unwrap();
        assert_eq!(f.trail.num_entries(), entries);
        assert_eq!(f.exclude("B", "S1"), Ok(()));
    }

    #[test]
    fn test_contradiction_display() {
        let c = Contradiction::CapacityExceeded {
            worker: WorkerIndex::new(1),
            shift: ShiftIndex::new(2),
        };
        assert_eq!(
            c.to_string(),
            "CapacityExceeded(worker: WorkerIndex(1), shift: ShiftIndex(2))"
        );
        assert_eq!(c.reason().to_string(), "CapacityExceeded");
    }
}
