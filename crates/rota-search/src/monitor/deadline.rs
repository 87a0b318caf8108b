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

//! # Deadline Monitor
//!
//! Enforces a wall-clock deadline on the search. Unlike a relative time limit,
//! the deadline is an absolute `Instant`, so every job of a parallel solve can
//! share the same budget regardless of when it starts.
//!
//! The clock is only read when `(steps & clock_check_mask) == 0`. The default
//! mask (`0x3FFF`) checks roughly every 16,384 steps. The first check happens
//! at step zero, so a job that starts after the deadline stops immediately.
//!
//! ## Usage
//!
//! ```rust
//! use rota_search::monitor::deadline::DeadlineMonitor;
//! use rota_search::monitor::search_monitor::{SearchCommand, SearchMonitor};
//! use std::time::{Duration, Instant};
//!
//! let mon = DeadlineMonitor::<i64>::new(Instant::now() + Duration::from_secs(5));
//! assert_eq!(mon.search_command(), SearchCommand::Continue);
//! ```

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use rota_model::model::Model;
use std::time::Instant;

/// Abort reason of a job that ran past the deadline.
pub const DEADLINE_REACHED: &str = "deadline reached";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMonitor<T> {
    clock_check_mask: u64,
    steps: u64,
    deadline: Instant,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> DeadlineMonitor<T> {
    /// 16384 - 1 = 16383 = 0x3FFF
    pub const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FFF;

    #[inline]
    pub fn new(deadline: Instant) -> Self {
        Self::with_clock_check_mask(deadline, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(deadline: Instant, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            deadline,
            _phantom: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl<T> SearchMonitor<T> for DeadlineMonitor<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "DeadlineMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model<T>) {
        self.steps = 0;
    }

    #[inline(always)]
    fn on_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if (self.steps & self.clock_check_mask) == 0 && Instant::now() >= self.deadline {
            return SearchCommand::terminate(DEADLINE_REACHED);
        }
        SearchCommand::Continue
    }
}
