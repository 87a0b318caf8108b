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

//! Branch-and-bound solver for the shift assignment problem.
//!
//! This module implements a stateful depth-first search over the binary
//! variables `(worker, shift)`. Every node is propagated to a fixed point by
//! the `Propagator`, and a node is pruned when its optimistic bound does not
//! exceed the incumbent threshold. The `BnbSolver` keeps its trail, stack and
//! propagation queue between solves, so repeated solves only pay for growth.
//!
//! Branching is n-ary: a node picks one uncovered shift and has one child
//! per candidate worker. Trying `(w, s) = 1` for the preferred worker first
//! and leaving the rest to its siblings explores the same tree as binary
//! branching that tries one before zero.
//!
//! A search session object encapsulates per-run state, statistics, and
//! timing. The solver accepts fixed assignments, which is how the parallel
//! orchestrator hands each job its own subtree.

use crate::{
    bound::ObjectiveBound,
    branching::decision::{Decision, DecisionBuilder},
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbentAdapter},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    propagate::Propagator,
    result::BnbSolverOutcome,
    stack::SearchStack,
    state::{SearchState, VariableValue},
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use num_traits::{PrimInt, Signed};
use rota_model::{fixed::FixedAssignment, model::Model, solution::Solution};
use rota_search::{
    incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand, num::SolverNumeric,
    result::TerminationReason,
};

/// A branch-and-bound solver for the shift assignment problem using a
/// backtracking search with constraint propagation and bounding.
/// Note that this is just the execution engine: the choice of the branching
/// shift and the order of its workers is left to a `DecisionBuilder`, and
/// the optimistic bound to an `ObjectiveBound`.
#[derive(Clone, Debug)]
pub struct BnbSolver<T>
where
    T: PrimInt + Signed,
{
    trail: SearchTrail<T>,
    stack: SearchStack,
    propagator: Propagator,
}

impl<T> Default for BnbSolver<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
            propagator: Propagator::new(),
        }
    }

    /// Create a new solver instance with preallocated storage for the given
    /// model size.
    ///
    /// # Note
    ///
    /// Every solve ensures sufficient capacity for its model anyway.
    /// Preallocation only moves the cost of the allocations to construction.
    #[inline]
    pub fn preallocated(num_workers: usize, num_shifts: usize, num_variables: usize) -> Self {
        Self {
            trail: SearchTrail::preallocated(num_variables, num_shifts),
            stack: SearchStack::preallocated(num_workers, num_shifts),
            propagator: Propagator::preallocated(num_variables),
        }
    }

    /// Returns the memory in bytes held by the trail and the stack.
    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.trail.allocated_memory_bytes() + self.stack.allocated_memory_bytes()
    }

    /// Solve the given model as a standalone, single threaded solver.
    #[inline]
    pub fn solve<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        bound: &mut E,
        monitor: S,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        E: ObjectiveBound<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = NoSharedIncumbent::new();
        self.solve_internal(model, &[], builder, bound, monitor, backing)
    }

    /// Solve the given model while sharing the incumbent with other solver
    /// instances. `rank` is the position of this job in the sequential
    /// exploration order and breaks ties between equal objectives.
    #[inline]
    pub fn solve_with_incumbent<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        bound: &mut E,
        monitor: S,
        incumbent: &SharedIncumbent<T>,
        rank: usize,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        E: ObjectiveBound<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = SharedIncumbentAdapter::new(incumbent, rank);
        self.solve_internal(model, &[], builder, bound, monitor, backing)
    }

    /// Solve the subtree in which every `fixed` assignment holds.
    #[inline]
    pub fn solve_with_fixed<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        bound: &mut E,
        monitor: S,
        fixed: &[FixedAssignment],
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        E: ObjectiveBound<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = NoSharedIncumbent::new();
        self.solve_internal(model, fixed, builder, bound, monitor, backing)
    }

    /// Solve the subtree in which every `fixed` assignment holds, sharing the
    /// incumbent with other solver instances.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn solve_with_fixed_and_incumbent<B, E, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        bound: &mut E,
        monitor: S,
        fixed: &[FixedAssignment],
        incumbent: &SharedIncumbent<T>,
        rank: usize,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        E: ObjectiveBound<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        let backing = SharedIncumbentAdapter::new(incumbent, rank);
        self.solve_internal(model, fixed, builder, bound, monitor, backing)
    }

    #[inline(always)]
    fn solve_internal<B, E, S, I>(
        &mut self,
        model: &Model<T>,
        fixed: &[FixedAssignment],
        builder: &mut B,
        bound: &mut E,
        mut monitor: S,
        backing: I,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        E: ObjectiveBound<T>,
        S: TreeSearchMonitor<T>,
        I: IncumbentStore<T>,
        T: SolverNumeric,
    {
        let session =
            BnbSolverSearchSession::new(self, model, fixed, builder, bound, &mut monitor, backing);
        let res = session.run();
        self.reset();
        res
    }

    /// Clears the logical state of the trail, stack and propagation queue
    /// without releasing their memory.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// A search session for the branch-and-bound solver.
/// This struct encapsulates the state and logic of a single search run.
struct BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    solver: &'a mut BnbSolver<T>,
    model: &'a Model<T>,
    fixed: &'a [FixedAssignment],
    builder: &'a mut B,
    bound: &'a mut E,
    monitor: &'a mut S,
    incumbent: I,
    state: SearchState<T>,
    best_objective: T,
    best_solution: Option<Solution<T>>,
    stats: BnbSolverStatistics<T>,
    start_time: std::time::Instant,
}

impl<'a, T, B, E, S, I> std::fmt::Debug for BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("best_objective", &self.best_objective)
            .field("best_solution", &self.best_solution)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, T, B, E, S, I> BnbSolverSearchSession<'a, T, B, E, S, I>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    E: ObjectiveBound<T>,
    S: TreeSearchMonitor<T>,
    I: IncumbentStore<T>,
{
    #[inline]
    fn new(
        solver: &'a mut BnbSolver<T>,
        model: &'a Model<T>,
        fixed: &'a [FixedAssignment],
        builder: &'a mut B,
        bound: &'a mut E,
        monitor: &'a mut S,
        incumbent_backing: I,
    ) -> Self {
        let state = SearchState::new(model);
        let best_objective = incumbent_backing.initial_threshold();

        Self {
            solver,
            model,
            fixed,
            builder,
            bound,
            monitor,
            incumbent: incumbent_backing,
            state,
            best_objective,
            best_solution: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        self.monitor.on_enter_search(self.model, &self.stats);

        // `initialize` returns false once the root is proven infeasible.
        if !self.initialize() {
            return self.finish(TerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);

            if let SearchCommand::Terminate(msg) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break TerminationReason::Aborted(msg);
            }
            self.monitor.on_step(&self.state, &self.stats);

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break if self.best_solution.is_some() {
                        TerminationReason::OptimalityProven
                    } else {
                        TerminationReason::InfeasibilityProven
                    };
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.finish(termination_reason)
    }

    /// Records the final statistics and builds the outcome. Consumes self.
    fn finish(mut self, reason: TerminationReason) -> BnbSolverOutcome<T> {
        self.stats.set_total_time(self.start_time.elapsed());
        self.stats
            .set_allocated_memory_bytes(self.solver.allocated_memory_bytes());
        self.monitor.on_exit_search(&self.stats);

        match reason {
            TerminationReason::Aborted(msg) => {
                BnbSolverOutcome::aborted(self.best_solution, msg, self.stats)
            }
            _ => match self.best_solution {
                Some(solution) => BnbSolverOutcome::optimal(solution, self.stats),
                None => BnbSolverOutcome::infeasible(self.stats),
            },
        }
    }

    /// Propagates the root, applies the fixed assignments and pushes the
    /// children of the root onto the stack.
    ///
    /// Root fixings are made outside of any frame, so backtracking never
    /// undoes them.
    fn initialize(&mut self) -> bool {
        let (num_workers, num_shifts, num_variables) = (
            self.model.num_workers(),
            self.model.num_shifts(),
            self.model.num_variables(),
        );
        self.solver.trail.ensure_capacity(num_variables, num_shifts);
        self.solver.stack.ensure_capacity(num_workers, num_shifts);

        if self
            .solver
            .propagator
            .initialize(self.model, &mut self.state, &mut self.solver.trail)
            .is_err()
        {
            self.prune_root_infeasible();
            return false;
        }

        for assignment in self.fixed {
            let variable = self
                .model
                .variable(assignment.worker_index, assignment.shift_index);
            let Some(variable_index) = variable else {
                self.prune_root_infeasible();
                return false;
            };

            let consistent = match self.state.value(variable_index) {
                VariableValue::One => true,
                VariableValue::Zero => false,
                VariableValue::Unfixed => self
                    .solver
                    .propagator
                    .assign(
                        self.model,
                        &mut self.state,
                        &mut self.solver.trail,
                        variable_index,
                    )
                    .is_ok(),
            };
            if !consistent {
                self.prune_root_infeasible();
                return false;
            }
        }

        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();

        if self.state.is_complete() {
            self.handle_complete_solution();
            return true;
        }

        let root_bound = self.bound.optimistic_bound(self.model, &self.state);
        self.stats.set_root_upper_bound(root_bound);
        if self.should_backtrack_after_expand() {
            self.stats.on_pruning_bound();
        }

        true
    }

    #[inline]
    fn prune_root_infeasible(&mut self) {
        self.stats.on_pruning_infeasible();
        self.monitor
            .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    /// Pops the next decision of the current level and descends into it.
    #[inline(always)]
    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };

        self.stats.on_decision_generated();
        self.descend(decision);
    }

    /// Opens a new frame, applies the decision and propagates it.
    #[inline(always)]
    fn descend(&mut self, decision: Decision) {
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();

        let propagated = self.solver.propagator.assign(
            self.model,
            &mut self.state,
            &mut self.solver.trail,
            decision.variable_index(),
        );

        self.stats.on_node_explored();
        self.stats.on_depth_update(self.solver.stack.depth() as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        if propagated.is_err() {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            self.backtrack_step();
            return;
        }

        if self.state.is_complete() {
            self.handle_complete_solution();
            return;
        }

        if self.should_backtrack_after_expand() {
            self.stats.on_pruning_bound();
            self.backtrack_step();
        }
    }

    /// Handle a complete assignment at the current state. The frame stays
    /// open; the next step finds its level empty and backtracks.
    #[inline(always)]
    fn handle_complete_solution(&mut self) {
        let objective = self.state.current_objective();
        if objective <= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        match Solution::try_from(&self.state) {
            Ok(solution) => {
                debug_assert!(
                    solution.verify(self.model).is_ok(),
                    "propagation produced an infeasible assignment: {:?}",
                    solution.verify(self.model)
                );
                self.best_objective = objective;
                self.incumbent.on_solution_found(&solution);
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&solution, &self.stats);
                self.best_solution = Some(solution);
            }
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }

    /// Computes the bound of the current node. Returns `true` if the node is
    /// dominated; otherwise pushes its children and returns `false`.
    #[inline(always)]
    fn should_backtrack_after_expand(&mut self) -> bool {
        let node_upper_bound = self.bound.optimistic_bound(self.model, &self.state);
        let estimated_remaining = node_upper_bound.saturating_sub(self.state.current_objective());

        self.monitor.on_upper_bound_computed(
            &self.state,
            node_upper_bound,
            estimated_remaining,
            &self.stats,
        );

        if node_upper_bound <= self.best_objective {
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return true;
        }

        let decisions = self.builder.next_decision(self.model, &self.state);

        let added_count = self.solver.stack.push_alternatives(decisions);
        self.monitor
            .on_decisions_enqueued(&self.state, added_count, &self.stats);

        false
    }
}
