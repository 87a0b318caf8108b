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


//! Cross-thread stop requests.
//!
//! `Solver::interrupt` raises one flag that every job of the running solve
//! watches through an `InterruptMonitor`. Jobs that have not started yet are
//! skipped by the orchestrator with the same reason.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use std::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};

/// Abort reason of a job stopped by an interrupt.
pub const INTERRUPTED: &str = "interrupted";

#[derive(Debug, Clone)]
pub struct InterruptMonitor<'a, T> {
    stop_flag: &'a AtomicBool,
    _marker: PhantomData<T>,
}

impl<'a, T> InterruptMonitor<'a, T> {
    #[inline]
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self {
            stop_flag,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl<T> SearchMonitor<T> for InterruptMonitor<'_, T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    #[inline]
    fn search_command(&self) -> SearchCommand {
        match self.is_raised() {
            true => SearchCommand::terminate(INTERRUPTED),
            false => SearchCommand::Continue,
        }
    }
}
