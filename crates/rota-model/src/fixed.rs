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

//! Fixed assignments for shift scheduling
//!
//! `FixedAssignment` pins a worker to a shift before search starts. It is used
//! to express pre-placed work and to seed the independent subtrees that the
//! parallel solver hands to its threads.
//!
//! Ordering
//! - Total order: by `shift_index`, then `worker_index`.

use crate::index::{ShiftIndex, WorkerIndex};

/// A fixed assignment of a worker to a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedAssignment {
    /// The index of the worker.
    pub worker_index: WorkerIndex,

    /// The index of the shift.
    pub shift_index: ShiftIndex,
}

impl FixedAssignment {
    #[inline]
    pub fn new(worker_index: WorkerIndex, shift_index: ShiftIndex) -> FixedAssignment {
        Self {
            worker_index,
            shift_index,
        }
    }
}

impl PartialOrd for FixedAssignment {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedAssignment {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.shift_index
            .cmp(&other.shift_index)
            .then(self.worker_index.cmp(&other.worker_index))
    }
}

impl std::fmt::Display for FixedAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FixedAssignment(worker: {}, shift: {})",
            self.worker_index, self.shift_index
        )
    }
}
