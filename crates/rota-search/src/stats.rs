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


use std::time::Duration;

/// Totals of one schedule solve, summed over every subtree job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Improving schedules found, counted per job.
    pub solutions_found: u64,
    pub used_threads: usize,
    /// Jobs the root split produced. Zero when the root settled the instance.
    pub subtrees_total: usize,
    /// Jobs that closed their subtree without being stopped.
    pub subtrees_completed: usize,
    pub nodes_explored: u64,
    /// Largest trail plus stack footprint of a single job, in bytes.
    pub max_memory_bytes: usize,
    pub solve_duration: Duration,
}

impl SolverStatistics {
    /// Jobs stopped by the deadline or an interrupt before closing their subtree.
    #[inline]
    pub fn subtrees_unfinished(&self) -> usize {
        self.subtrees_total - self.subtrees_completed
    }

    /// True when no part of the shift-assignment tree was left unexplored.
    #[inline]
    pub fn is_exhaustive(&self) -> bool {
        self.subtrees_completed == self.subtrees_total
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subtrees {}/{}, nodes {}, schedules {}, threads {}, memory {} B, {:.3} s",
            self.subtrees_completed,
            self.subtrees_total,
            self.nodes_explored,
            self.solutions_found,
            self.used_threads,
            self.max_memory_bytes,
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`. Starts from a single thread and zero work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverStatisticsBuilder(SolverStatistics);

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    #[inline]
    pub fn new() -> Self {
        Self(SolverStatistics {
            solutions_found: 0,
            used_threads: 1,
            subtrees_total: 0,
            subtrees_completed: 0,
            nodes_explored: 0,
            max_memory_bytes: 0,
            solve_duration: Duration::ZERO,
        })
    }

    #[inline]
    pub fn solutions_found(mut self, solutions_found: u64) -> Self {
        self.0.solutions_found = solutions_found;
        self
    }

    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.0.used_threads = used_threads;
        self
    }

    #[inline]
    pub fn subtrees_total(mut self, subtrees_total: usize) -> Self {
        self.0.subtrees_total = subtrees_total;
        self
    }

    /// Clamped to the number of subtrees set so far.
    #[inline]
    pub fn subtrees_completed(mut self, subtrees_completed: usize) -> Self {
        self.0.subtrees_completed = subtrees_completed.min(self.0.subtrees_total);
        self
    }

    #[inline]
    pub fn nodes_explored(mut self, nodes_explored: u64) -> Self {
        self.0.nodes_explored = nodes_explored;
        self
    }

    #[inline]
    pub fn max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.0.max_memory_bytes = max_memory_bytes;
        self
    }

    #[inline]
    pub fn solve_duration(mut self, solve_duration: Duration) -> Self {
        self.0.solve_duration = solve_duration;
        self
    }

    #[inline]
    pub fn build(self) -> SolverStatistics {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_settled_instance_is_exhaustive() {
        let stats = SolverStatisticsBuilder::new().nodes_explored(1).build();
        assert_eq!(stats.subtrees_total, 0);
        assert_eq!(stats.used_threads, 1);
        assert!(stats.is_exhaustive());
        assert_eq!(stats.subtrees_unfinished(), 0);
    }

    #[test]
    fn test_stopped_jobs_are_unfinished() {
        let stats = SolverStatisticsBuilder::new()
            .used_threads(4)
            .subtrees_total(5)
            .subtrees_completed(3)
            .nodes_explored(1200)
            .solutions_found(2)
            .max_memory_bytes(4096)
            .solve_duration(Duration::from_millis(1234))
            .build();
        assert!(!stats.is_exhaustive());
        assert_eq!(stats.subtrees_unfinished(), 2);
        assert_eq!(
            stats.to_string(),
            "subtrees 3/5, nodes 1200, schedules 2, threads 4, memory 4096 B, 1.234 s"
        );
    }

    #[test]
    fn test_completed_count_never_exceeds_total() {
        let stats = SolverStatisticsBuilder::new()
            .subtrees_total(2)
            .subtrees_completed(7)
            .build();
        assert_eq!(stats.subtrees_completed, 2);
        assert!(stats.is_exhaustive());
    }
}
