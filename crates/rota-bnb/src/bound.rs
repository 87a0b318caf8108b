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

//! Optimistic bounds
//!
//! An `ObjectiveBound` returns an upper bound on the objective of every
//! completion of a search state. The search prunes a node when this bound
//! does not exceed the incumbent threshold.

use crate::state::SearchState;
use num_traits::{PrimInt, Signed};
use rota_model::model::Model;

pub trait ObjectiveBound<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str;

    /// Returns an upper bound on the objective of any completion of `state`.
    fn optimistic_bound(&mut self, model: &Model<T>, state: &SearchState<T>) -> T;
}

/// Current objective plus the hours of every shift not covered yet.
///
/// The bound is valid because each uncovered shift contributes at most its
/// own hours. Since every feasible completion covers all shifts, it is also
/// exact on feasible branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UncoveredHoursBound;

impl UncoveredHoursBound {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl<T> ObjectiveBound<T> for UncoveredHoursBound
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "UncoveredHoursBound"
    }

    #[inline]
    fn optimistic_bound(&mut self, _model: &Model<T>, state: &SearchState<T>) -> T {
        state.current_objective() + state.uncovered_hours()
    }
}
