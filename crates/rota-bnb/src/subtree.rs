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

//! Adapter that runs `BnbSolver` behind the `rota_search` subtree seam.
//!
//! The orchestrator only knows `SubtreeSolver`. `BnbSubtreeSolver` bridges it
//! to the branch-and-bound engine: the job's fixed assignments root the
//! search, the shared incumbent is consulted with the job's rank, and the
//! solver-agnostic monitor is wrapped into a `TreeSearchMonitor`.

use crate::{
    bnb::BnbSolver,
    bound::ObjectiveBound,
    branching::decision::DecisionBuilder,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::TracingTreeSearchMonitor,
        wrapper::WrapperMonitor,
    },
};
use rota_search::{
    num::SolverNumeric,
    subtree::{SubtreeSolver, SubtreeSolverContext, SubtreeSolverResult},
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct BnbSubtreeSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    E: ObjectiveBound<T>,
{
    inner: BnbSolver<T>,
    decision_builder: B,
    bound: E,
    progress_log: Option<(Duration, u64)>,
}

impl<T, B, E> BnbSubtreeSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    E: ObjectiveBound<T>,
{
    #[inline]
    pub fn new(decision_builder: B, bound: E) -> Self {
        Self {
            inner: BnbSolver::<T>::new(),
            decision_builder,
            bound,
            progress_log: None,
        }
    }

    #[inline]
    pub fn preallocated(
        num_workers: usize,
        num_shifts: usize,
        num_variables: usize,
        decision_builder: B,
        bound: E,
    ) -> Self {
        Self {
            inner: BnbSolver::<T>::preallocated(num_workers, num_shifts, num_variables),
            decision_builder,
            bound,
            progress_log: None,
        }
    }

    /// Enables periodic progress events through a `TracingTreeSearchMonitor`.
    #[inline]
    pub fn with_progress_log(mut self, log_interval: Duration, clock_check_mask: u64) -> Self {
        self.progress_log = Some((log_interval, clock_check_mask));
        self
    }

    #[inline]
    pub fn inner(&self) -> &BnbSolver<T> {
        &self.inner
    }

    #[inline]
    pub fn decision_builder(&self) -> &B {
        &self.decision_builder
    }

    #[inline]
    pub fn bound(&self) -> &E {
        &self.bound
    }
}

impl<T, B, E> SubtreeSolver<T> for BnbSubtreeSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    E: ObjectiveBound<T>,
{
    fn solve<'a>(&mut self, context: SubtreeSolverContext<'a, T>) -> SubtreeSolverResult<T> {
        let wrapper = WrapperMonitor::new(context.monitor);

        let outcome = match self.progress_log {
            None => self.inner.solve_with_fixed_and_incumbent(
                context.model,
                &mut self.decision_builder,
                &mut self.bound,
                wrapper,
                context.fixed,
                context.incumbent,
                context.rank,
            ),
            Some((log_interval, clock_check_mask)) => {
                let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
                monitor.add_monitor(wrapper);
                monitor.add_monitor(TracingTreeSearchMonitor::new(log_interval, clock_check_mask));
                self.inner.solve_with_fixed_and_incumbent(
                    context.model,
                    &mut self.decision_builder,
                    &mut self.bound,
                    monitor,
                    context.fixed,
                    context.incumbent,
                    context.rank,
                )
            }
        };

        outcome.into()
    }

    fn name(&self) -> &str {
        "BnbSubtreeSolver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bound::UncoveredHoursBound,
        branching::mrv::MostConstrainedShiftBuilder,
        split::{RootSplit, split_root},
    };
    use rota_model::model::{Model, ModelBuilder};
    use rota_search::{
        incumbent::SharedIncumbent,
        monitor::deadline::DeadlineMonitor,
        result::{SolverResult, TerminationReason},
    };
    use std::time::Instant;

    type IntegerType = i64;

    fn build_model() -> Model<IntegerType> {
        let mut b = ModelBuilder::new();
        b.add_workers(["A", "B", "C"])
            .set_worker_capacity("A", 6)
            .set_worker_capacity("B", 6)
            .set_worker_capacity("C", 6)
            .add_shifts(["S1", "S2", "S3", "S4"])
            .set_shift_hours("S1", 3)
            .set_shift_hours("S2", 3)
            .set_shift_hours("S3", 3)
            .set_shift_hours("S4", 3)
            .add_forbidden_pair("S1", "S2");
        for w in ["A", "B", "C"] {
            for s in ["S1", "S2", "S3", "S4"] {
                b.set_availability(w, s, true);
            }
        }
        b.build().unwrap()
    }

    fn solver() -> BnbSubtreeSolver<IntegerType, MostConstrainedShiftBuilder, UncoveredHoursBound>
    {
        BnbSubtreeSolver::new(MostConstrainedShiftBuilder::new(), UncoveredHoursBound::new())
    }

    #[test]
    fn test_jobs_share_the_incumbent_by_rank() {
        let model = build_model();
        let branches = match split_root(&model, &mut MostConstrainedShiftBuilder::new()) {
            RootSplit::Branches(branches) => branches,
            other => panic!("expected branches, got {other}"),
        };
        assert_eq!(branches.len(), 3);

        let incumbent = SharedIncumbent::<IntegerType>::new();
        let mut subtree_solver = solver().with_progress_log(Duration::from_secs(1), 0xFF);
        let mut results = Vec::new();
        for (rank, fixed) in branches.iter().enumerate() {
            let mut monitor = DeadlineMonitor::new(Instant::now() + Duration::from_secs(60));
            let context = SubtreeSolverContext::new(
                &model,
                &incumbent,
                &mut monitor,
                rank,
                std::slice::from_ref(fixed),
            );
            results.push(subtree_solver.solve(context));
        }

        // The first job reaches the full 12 hours; later jobs cannot beat it.
        match results[0].result() {
            SolverResult::Optimal(solution) => assert_eq!(solution.objective_value(), 12),
            other => panic!("expected optimal, got {other}"),
        }
        for result in &results[1..] {
            assert!(matches!(result.result(), SolverResult::Infeasible));
            assert!(result.is_complete());
        }
        assert_eq!(incumbent.best_rank(), 0);
        assert_eq!(incumbent.best_objective(), 12);
    }

    #[test]
    fn test_expired_deadline_aborts_without_solution() {
        let model = build_model();
        let incumbent = SharedIncumbent::<IntegerType>::new();
        let mut monitor = DeadlineMonitor::new(Instant::now());
        let context = SubtreeSolverContext::new(&model, &incumbent, &mut monitor, 0, &[]);

        let result = solver().solve(context);
        assert!(matches!(result.result(), SolverResult::Unknown));
        assert!(matches!(
            result.termination_reason(),
            TerminationReason::Aborted(_)
        ));
        assert!(!incumbent.has_solution());
    }
}
