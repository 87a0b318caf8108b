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

//! # Subtree Solvers
//!
//! The seam between the parallel orchestrator and a concrete search engine.
//! The orchestrator splits the search tree into ranked subtrees, each rooted
//! at a set of `FixedAssignment`s, and hands each one to a `SubtreeSolver`
//! together with the shared incumbent and a monitor.

use crate::{
    incumbent::SharedIncumbent,
    monitor::search_monitor::SearchMonitor,
    result::{SolverResult, TerminationReason},
};
use num_traits::{PrimInt, Signed};
use rota_model::{fixed::FixedAssignment, model::Model, solution::Solution};

pub struct SubtreeSolverContext<'a, T>
where
    T: PrimInt + Signed,
{
    pub model: &'a Model<T>,
    pub incumbent: &'a SharedIncumbent<T>,
    pub monitor: &'a mut dyn SearchMonitor<T>,
    /// Position of this subtree in sequential exploration order.
    pub rank: usize,
    /// Assignments that root the subtree.
    pub fixed: &'a [FixedAssignment],
}

impl<'a, T> SubtreeSolverContext<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new(
        model: &'a Model<T>,
        incumbent: &'a SharedIncumbent<T>,
        monitor: &'a mut dyn SearchMonitor<T>,
        rank: usize,
        fixed: &'a [FixedAssignment],
    ) -> Self {
        Self {
            model,
            incumbent,
            monitor,
            rank,
            fixed,
        }
    }
}

impl<'a, T> std::fmt::Debug for SubtreeSolverContext<'a, T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtreeSolverContext")
            .field("model", &self.model)
            .field("incumbent", &self.incumbent)
            .field("monitor", &self.monitor.name())
            .field("rank", &self.rank)
            .field("fixed", &self.fixed)
            .finish()
    }
}

impl<'a, T> std::fmt::Display for SubtreeSolverContext<'a, T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SubtreeSolverContext(model: {}, monitor: {}, rank: {}, fixed: {})",
            self.model,
            self.monitor.name(),
            self.rank,
            self.fixed.len()
        )
    }
}

/// What a subtree solver reports back for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeSolverResult<T>
where
    T: PrimInt + Signed,
{
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    nodes_explored: u64,
    solutions_found: u64,
    max_memory_bytes: usize,
}

impl<T> SubtreeSolverResult<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn optimal(solution: Solution<T>) -> Self {
        Self::new(
            SolverResult::Optimal(solution),
            TerminationReason::OptimalityProven,
        )
    }

    #[inline]
    pub fn infeasible() -> Self {
        Self::new(SolverResult::Infeasible, TerminationReason::InfeasibilityProven)
    }

    #[inline]
    pub fn aborted<R>(solution: Option<Solution<T>>, reason: R) -> Self
    where
        R: Into<String>,
    {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };
        Self::new(result, TerminationReason::Aborted(reason.into()))
    }

    #[inline]
    fn new(result: SolverResult<T>, termination_reason: TerminationReason) -> Self {
        Self {
            result,
            termination_reason,
            nodes_explored: 0,
            solutions_found: 0,
            max_memory_bytes: 0,
        }
    }

    /// Attaches search counters to the result.
    #[inline]
    pub fn with_counters(
        mut self,
        nodes_explored: u64,
        solutions_found: u64,
        max_memory_bytes: usize,
    ) -> Self {
        self.nodes_explored = nodes_explored;
        self.solutions_found = solutions_found;
        self.max_memory_bytes = max_memory_bytes;
        self
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn into_result(self) -> SolverResult<T> {
        self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    /// Returns `true` if the subtree was searched to completion.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.termination_reason.is_proven()
    }

    #[inline]
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored
    }

    #[inline]
    pub fn solutions_found(&self) -> u64 {
        self.solutions_found
    }

    #[inline]
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_bytes
    }
}

impl<T> std::fmt::Display for SubtreeSolverResult<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SubtreeSolverResult(result: {}, termination_reason: {}, nodes: {})",
            self.result, self.termination_reason, self.nodes_explored
        )
    }
}

pub trait SubtreeSolver<T>
where
    T: PrimInt + Signed,
{
    fn solve<'a>(&mut self, context: SubtreeSolverContext<'a, T>) -> SubtreeSolverResult<T>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::index::WorkerIndex;

    type IntegerType = i64;

    #[test]
    fn test_result_constructors() {
        let sol = Solution::new(5 as IntegerType, vec![WorkerIndex::new(0)]);
        let r = SubtreeSolverResult::optimal(sol.clone()).with_counters(10, 1, 64);
        assert!(r.is_complete());
        assert_eq!(r.nodes_explored(), 10);
        assert_eq!(r.solutions_found(), 1);
        assert_eq!(r.max_memory_bytes(), 64);
        assert_eq!(r.result(), &SolverResult::Optimal(sol.clone()));

        let r = SubtreeSolverResult::<IntegerType>::infeasible();
        assert!(r.is_complete());
        assert_eq!(r.into_result(), SolverResult::Infeasible);

        let r = SubtreeSolverResult::aborted(Some(sol.clone()), "deadline reached");
        assert!(!r.is_complete());
        assert_eq!(r.result(), &SolverResult::Feasible(sol));

        let r = SubtreeSolverResult::<IntegerType>::aborted(None, "deadline reached");
        assert_eq!(r.result(), &SolverResult::Unknown);
        assert_eq!(
            r.to_string(),
            "SubtreeSolverResult(result: Unknown, termination_reason: Aborted: deadline reached, nodes: 0)"
        );
    }
}
