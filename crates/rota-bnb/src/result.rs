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

use crate::stats::BnbSolverStatistics;
use num_traits::{PrimInt, Signed};
use rota_model::solution::Solution;
use rota_search::{
    result::{SolverResult, TerminationReason},
    subtree::SubtreeSolverResult,
};

/// Result of the branch-and-bound solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics<T>,
}

impl<T> BnbSolverOutcome<T> {
    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// Creates the outcome of an interrupted search. Without a solution the
    /// result is `Unknown`: nothing was proven.
    #[inline]
    pub fn aborted<R>(
        solution: Option<Solution<T>>,
        reason: R,
        statistics: BnbSolverStatistics<T>,
    ) -> Self
    where
        R: Into<String>,
    {
        let termination_reason = TerminationReason::Aborted(reason.into());

        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };

        Self {
            result,
            termination_reason,
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics<T> {
        &self.statistics
    }

    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        self.result.solution()
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }
}

impl<T> std::fmt::Display for BnbSolverOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BnB Outcome:")?;
        writeln!(f, "  Result:      {}", self.result)?;
        writeln!(f, "  Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

impl<T> From<BnbSolverOutcome<T>> for SubtreeSolverResult<T>
where
    T: PrimInt + Signed,
{
    fn from(val: BnbSolverOutcome<T>) -> Self {
        let nodes = val.statistics.nodes_explored;
        let solutions = val.statistics.solutions_found;
        let memory = val.statistics.allocated_memory_bytes;

        let result = match val.termination_reason {
            TerminationReason::OptimalityProven => {
                debug_assert!(
                    matches!(val.result, SolverResult::Optimal(_)),
                    "called `BnbSolverOutcome::into()` with inconsistent state: termination reason is OptimalityProven but result is not Optimal"
                );
                match val.result {
                    SolverResult::Optimal(solution) => SubtreeSolverResult::optimal(solution),
                    _ => SubtreeSolverResult::infeasible(),
                }
            }
            TerminationReason::InfeasibilityProven => SubtreeSolverResult::infeasible(),
            TerminationReason::Aborted(reason) => match val.result {
                SolverResult::Feasible(solution) => {
                    SubtreeSolverResult::aborted(Some(solution), reason)
                }
                _ => SubtreeSolverResult::aborted(None, reason),
            },
        };

        result.with_counters(nodes, solutions, memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::index::WorkerIndex;

    type IntegerType = i64;

    fn stats() -> BnbSolverStatistics<IntegerType> {
        let mut s = BnbSolverStatistics::default();
        s.nodes_explored = 12;
        s.solutions_found = 2;
        s.allocated_memory_bytes = 64;
        s
    }

    #[test]
    fn test_into_subtree_optimal_keeps_counters() {
        let sol = Solution::new(5, vec![WorkerIndex::new(0)]);
        let outcome = BnbSolverOutcome::optimal(sol.clone(), stats());
        assert!(outcome.is_optimal());
        assert_eq!(outcome.solution(), Some(&sol));

        let sub: SubtreeSolverResult<IntegerType> = outcome.into();
        assert_eq!(sub.result(), &SolverResult::Optimal(sol));
        assert!(sub.is_complete());
        assert_eq!(sub.nodes_explored(), 12);
        assert_eq!(sub.solutions_found(), 2);
        assert_eq!(sub.max_memory_bytes(), 64);
    }

    #[test]
    fn test_into_subtree_infeasible() {
        let outcome = BnbSolverOutcome::<IntegerType>::infeasible(stats());
        assert!(outcome.is_infeasible());
        let sub: SubtreeSolverResult<IntegerType> = outcome.into();
        assert_eq!(sub.result(), &SolverResult::Infeasible);
        assert_eq!(sub.termination_reason(), &TerminationReason::InfeasibilityProven);
    }

    #[test]
    fn test_into_subtree_aborted_without_solution_is_unknown() {
        let outcome = BnbSolverOutcome::<IntegerType>::aborted(None, "deadline reached", stats());
        let sub: SubtreeSolverResult<IntegerType> = outcome.into();
        assert_eq!(sub.result(), &SolverResult::Unknown);
        assert!(!sub.is_complete());
        match sub.termination_reason() {
            TerminationReason::Aborted(msg) => assert_eq!(msg, "deadline reached"),
            other => panic!("expected Aborted termination reason, got {other}"),
        }
    }

    #[test]
    fn test_into_subtree_aborted_with_solution_is_feasible() {
        let sol = Solution::new(3, vec![WorkerIndex::new(1)]);
        let outcome = BnbSolverOutcome::aborted(Some(sol.clone()), "stop", stats());
        let sub: SubtreeSolverResult<IntegerType> = outcome.into();
        assert_eq!(sub.result(), &SolverResult::Feasible(sol));
    }
}
