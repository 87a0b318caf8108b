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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children. This lets you mix logging and early stopping
//! without coupling them to the solver.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use rota_model::{model::Model, solution::Solution};
use rota_search::monitor::search_monitor::SearchCommand;

pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model, statistics);
        }
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        state: &SearchState<T>,
        statistics: &BnbSolverStatistics<T>,
    ) -> SearchCommand {
        for monitor in &mut self.monitors {
            let cmd = monitor.search_command(state, statistics);
            if !matches!(cmd, SearchCommand::Continue) {
                return cmd;
            }
        }
        SearchCommand::Continue
    }

    #[inline(always)]
    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_step(state, statistics);
        }
    }

    #[inline(always)]
    fn on_upper_bound_computed(
        &mut self,
        state: &SearchState<T>,
        upper_bound: T,
        estimated_remaining: T,
        statistics: &BnbSolverStatistics<T>,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_upper_bound_computed(state, upper_bound, estimated_remaining, statistics);
        }
    }

    #[inline(always)]
    fn on_prune(
        &mut self,
        state: &SearchState<T>,
        reason: PruneReason,
        statistics: &BnbSolverStatistics<T>,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_prune(state, reason, statistics);
        }
    }

    #[inline(always)]
    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState<T>,
        count: usize,
        statistics: &BnbSolverStatistics<T>,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    #[inline(always)]
    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        decision: Decision,
        statistics: &BnbSolverStatistics<T>,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_descend(state, decision, statistics);
        }
    }

    #[inline(always)]
    fn on_backtrack(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(state, statistics);
        }
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(solution, statistics);
        }
    }
}

impl<'a, T> std::fmt::Display for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.monitors.iter().map(|m| m.name()).collect();
        write!(f, "CompositeTreeSearchMonitor([{}])", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use rota_model::model::ModelBuilder;
    use std::{cell::RefCell, rc::Rc};

    type IntegerType = i64;

    struct Recording {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        command: SearchCommand,
    }

    impl TreeSearchMonitor<IntegerType> for Recording {
        fn name(&self) -> &str {
            self.name
        }
        fn on_enter_search(&mut self, _: &Model<IntegerType>, _: &BnbSolverStatistics<IntegerType>) {
            self.log.borrow_mut().push(format!("{}:enter", self.name));
        }
        fn on_exit_search(&mut self, _: &BnbSolverStatistics<IntegerType>) {
            self.log.borrow_mut().push(format!("{}:exit", self.name));
        }
        fn search_command(
            &mut self,
            _: &SearchState<IntegerType>,
            _: &BnbSolverStatistics<IntegerType>,
        ) -> SearchCommand {
            self.log.borrow_mut().push(format!("{}:command", self.name));
            self.command.clone()
        }
        fn on_prune(
            &mut self,
            _: &SearchState<IntegerType>,
            reason: PruneReason,
            _: &BnbSolverStatistics<IntegerType>,
        ) {
            self.log.borrow_mut().push(format!("{}:prune:{}", self.name, reason));
        }
    }

    #[test]
    fn test_fan_out_and_short_circuit() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let model = ModelBuilder::<IntegerType>::new().build().unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();

        let mut composite = CompositeTreeSearchMonitor::with_capacity(3);
        composite.add_monitor(Recording {
            name: "first",
            log: Rc::clone(&log),
            command: SearchCommand::Terminate("limit".to_string()),
        });
        composite.add_monitor(Recording {
            name: "second",
            log: Rc::clone(&log),
            command: SearchCommand::Continue,
        });
        composite.add_monitor(NoOperationMonitor::new());
        assert_eq!(composite.len(), 3);
        assert_eq!(
            composite.to_string(),
            "CompositeTreeSearchMonitor([first, second, NoOperationMonitor])"
        );

        composite.on_enter_search(&model, &stats);
        composite.on_prune(&state, PruneReason::BoundDominated, &stats);
        assert_eq!(
            composite.search_command(&state, &stats),
            SearchCommand::Terminate("limit".to_string())
        );
        composite.on_exit_search(&stats);

        assert_eq!(
            *log.borrow(),
            vec![
                "first:enter",
                "second:enter",
                "first:prune:BoundDominated",
                "second:prune:BoundDominated",
                "first:command",
                "first:exit",
                "second:exit",
            ]
        );
    }

    #[test]
    fn test_empty_composite_continues() {
        let model = ModelBuilder::<IntegerType>::new().build().unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();
        let mut composite = CompositeTreeSearchMonitor::<IntegerType>::new();
        assert!(composite.is_empty());
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);
    }
}
