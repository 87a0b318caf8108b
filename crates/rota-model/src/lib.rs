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

//! # Rota Model
//!
//! **The core domain model for the rota shift assignment solver.**
//!
//! This crate defines the data structures that describe a shift assignment
//! instance: workers with hour capacities, shifts with hour requirements, the
//! availability relation and the pairs of shifts that must never share a
//! worker. It is the interchange layer between the request layer and the
//! search engine (`rota_bnb`).
//!
//! ## Architecture
//!
//! * **`index`**: Strongly typed wrappers (`WorkerIndex`, `ShiftIndex`, `VariableIndex`).
//! * **`model`**: The immutable `Model` and the string-keyed `ModelBuilder` that validates input.
//! * **`solution`**: The solver output, one worker per shift, plus a feasibility check.
//! * **`fixed`**: `FixedAssignment`, a pre-placed worker-to-shift pairing.
//! * **`error`**: `ValidationError`, raised by `ModelBuilder::build`.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: Indices are distinct types. A `WorkerIndex` cannot address a shift.
//! 2.  **Memory Layout**: Data is stored as a Structure of Arrays with compressed adjacency lists.
//! 3.  **Fail-Fast**: All validation happens in the builder; a `Model` is always consistent.

pub mod error;
pub mod fixed;
pub mod index;
pub mod model;
pub mod solution;
