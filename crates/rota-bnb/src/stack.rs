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


//! Pending alternatives of the open decision levels.
//!
//! Each level of the search branches on one uncovered shift, and its
//! alternatives are the candidate workers not tried yet. All levels share
//! one buffer; `levels[d]` is where the alternatives of level `d` start.

use crate::branching::decision::Decision;

#[derive(Clone, Debug, Default)]
pub struct SearchStack {
    alternatives: Vec<Decision>,
    levels: Vec<usize>,
}

impl SearchStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A level never holds more than `num_workers` alternatives and there is
    /// at most one level per shift plus the root.
    #[inline]
    pub fn preallocated(num_workers: usize, num_shifts: usize) -> Self {
        Self {
            alternatives: Vec::with_capacity(num_shifts.saturating_mul(num_workers)),
            levels: Vec::with_capacity(num_shifts.saturating_add(1)),
        }
    }

    pub fn ensure_capacity(&mut self, num_workers: usize, num_shifts: usize) {
        let alternatives = num_shifts.saturating_mul(num_workers);
        let levels = num_shifts.saturating_add(1);
        self.alternatives
            .reserve(alternatives.saturating_sub(self.alternatives.len()));
        self.levels.reserve(levels.saturating_sub(self.levels.len()));
    }

    /// Total number of pending alternatives over all levels.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.alternatives.len()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.levels.push(self.alternatives.len());
    }

    /// Closes the innermost level and drops whatever it still had pending.
    #[inline]
    pub fn pop_frame(&mut self) -> Option<()> {
        let start = self.levels.pop()?;
        self.alternatives.truncate(start);
        Some(())
    }

    /// Adds alternatives to the innermost level and returns how many were
    /// added. The last one added is tried first.
    #[inline]
    pub fn push_alternatives<I>(&mut self, decisions: I) -> usize
    where
        I: IntoIterator<Item = Decision>,
    {
        let before = self.alternatives.len();
        self.alternatives.extend(decisions);
        self.alternatives.len() - before
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Decision> {
        match self.levels.last() {
            Some(&start) if self.alternatives.len() > start => self.alternatives.pop(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_current_level_empty(&self) -> bool {
        self.levels
            .last()
            .is_none_or(|&start| self.alternatives.len() == start)
    }

    #[inline]
    pub fn reset(&mut self) {
        self.alternatives.clear();
        self.levels.clear();
    }

    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.alternatives.capacity() * std::mem::size_of::<Decision>()
            + self.levels.capacity() * std::mem::size_of::<usize>()
    }
}

impl std::fmt::Display for SearchStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStack(levels: {}, pending: {})",
            self.levels.len(),
            self.alternatives.len()
        )
    }
}
