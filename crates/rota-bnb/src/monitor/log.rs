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

//! Progress logging for tree search
//!
//! `TracingTreeSearchMonitor` emits a `debug` event with the search progress
//! at most once per `log_interval`. The clock is only read when the node
//! counter hits the `clock_check_mask`, which keeps the hot path cheap.
//! Improving solutions and the end of the search are logged at `info`.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::TreeSearchMonitor,
    state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use rota_model::{model::Model, solution::Solution};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TracingTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<T>,
}

impl<T> TracingTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }

    #[inline(always)]
    fn log_line(&mut self, state: &SearchState<T>, stats: &BnbSolverStatistics<T>) {
        let now = Instant::now();
        let best = self
            .best_objective
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());

        debug!(
            event = "search_progress",
            elapsed_s = now.duration_since(self.start_time).as_secs_f32(),
            nodes = stats.nodes_explored,
            covered = state.num_covered(),
            best = %best,
            current_objective = %state.current_objective(),
            backtracks = stats.backtracks,
            pruned_bound = stats.prunings_bound,
            pruned_infeasible = stats.prunings_infeasible,
        );

        self.last_log_time = now;
    }
}

impl<T> Default for TracingTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 0x3FFF)
    }
}

impl<T> std::fmt::Display for TracingTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TracingTreeSearchMonitor(log_interval: {:?}, clock_check_mask: {:#x})",
            self.log_interval, self.clock_check_mask
        )
    }
}

impl<T> TreeSearchMonitor<T> for TracingTreeSearchMonitor<T>
where
    T: std::fmt::Display + std::fmt::Debug + PrimInt + Signed,
{
    fn name(&self) -> &str {
        "TracingTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, _statistics: &BnbSolverStatistics<T>) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        debug!(
            event = "search_started",
            workers = model.num_workers(),
            shifts = model.num_shifts(),
            variables = model.num_variables(),
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics<T>) {
        info!(
            event = "search_finished",
            nodes = statistics.nodes_explored,
            solutions = statistics.solutions_found,
            max_depth = statistics.max_depth,
            elapsed_ms = statistics.time_total.as_millis() as u64,
        );
    }

    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        _decision: Decision,
        statistics: &BnbSolverStatistics<T>,
    ) {
        if (statistics.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(state, statistics);
        }
    }

    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics<T>) {
        let objective = solution.objective_value();
        self.best_objective = Some(objective);
        info!(
            event = "solution_found",
            objective = %objective,
            nodes = statistics.nodes_explored,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    #[test]
    fn test_tracks_best_objective() {
        let mut monitor = TracingTreeSearchMonitor::<IntegerType>::new(Duration::ZERO, 0);
        let stats = BnbSolverStatistics::default();
        monitor.on_solution_found(&Solution::new(9, vec![]), &stats);
        assert_eq!(monitor.best_objective, Some(9));
        assert_eq!(
            monitor.to_string(),
            "TracingTreeSearchMonitor(log_interval: 0ns, clock_check_mask: 0x0)"
        );
        assert_eq!(
            TracingTreeSearchMonitor::<IntegerType>::default().to_string(),
            "TracingTreeSearchMonitor(log_interval: 1s, clock_check_mask: 0x3fff)"
        );
    }
}
