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

//! # Rota Solver
//!
//! Orchestration and the collaborator interface of the shift assignment
//! engine. A request layer hands a `ScheduleRequest` to `schedule::schedule`
//! and receives a `ScheduleResponse`; everything in between happens here.
//!
//! ## Modules
//!
//! - `config`: `SolverConfig`, loadable from TOML.
//! - `request`: the request contract and its validation into a `Model`.
//! - `solver`: the parallel subtree orchestrator with a shared deadline.
//! - `extract`: the response contract built from a solver outcome.
//! - `schedule`: the entry point tying the above together.

pub mod config;
pub mod extract;
pub mod request;
pub mod schedule;
pub mod solver;
