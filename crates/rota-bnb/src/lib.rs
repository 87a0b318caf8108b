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

//! Rota-BnB: branch-and-bound for shift assignment
//!
//! Implements a deterministic branch-and-bound search that assigns every
//! shift to exactly one available worker while respecting hour capacities
//! and forbidden shift pairs, maximizing the total covered hours.
//!
//! Core flow
//! - Provide a `rota_model::model::Model<T>`.
//! - Choose a `branching::decision::DecisionBuilder` (which shift, which worker first).
//! - Choose a `bound::ObjectiveBound` (optimistic bound used for pruning).
//! - Optionally pass fixed assignments, a shared incumbent, and monitors.
//! - Run `bnb::BnbSolver` directly, or split the root with `split` and run
//!   the jobs through `subtree::BnbSubtreeSolver`.
//!
//! Design highlights
//! - Every node is propagated to a fixed point before branching: exact
//!   cover, capacity, and forbidden pairs each prune the domains.
//! - Tight inner loop: the state is mutated in place and restored via a trail.
//! - Deterministic given deterministic builders; all tie-breaks are total orders.
//!
//! Module map
//! - `bnb`: the solver engine and session orchestration.
//! - `bound`: optimistic bounds on the objective.
//! - `branching`: decision builders.
//! - `monitor`: tree-search monitors (log, composite, wrapper).
//! - `propagate`: the constraint propagator.
//! - `result`: solver outcomes with termination reasons.
//! - `split`: root splitting into ranked jobs.
//! - `state`: the search state with its aggregates.
//! - `stats`: counters and timing.
//! - `subtree`: adapter to the `rota_search` subtree seam.
//! - `trail`: the undo log used by propagation and backtracking.

pub mod bnb;
pub mod bound;
pub mod branching;
mod incumbent;
pub mod monitor;
pub mod propagate;
pub mod result;
pub mod split;
mod stack;
pub mod state;
pub mod stats;
pub mod subtree;
pub mod trail;
