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

//! Validation errors raised while building a `Model`.
//!
//! Every variant names the offending identifier so a caller can report it
//! verbatim. Validation happens once in `ModelBuilder::build`; a model that
//! exists has passed all of these checks.

/// The error type for model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A worker identifier was declared more than once.
    #[error("duplicate worker identifier '{0}'")]
    DuplicateWorker(String),
    /// A shift identifier was declared more than once.
    #[error("duplicate shift identifier '{0}'")]
    DuplicateShift(String),
    /// A worker that was never declared is referenced.
    #[error("unknown worker '{worker}' referenced in {context}")]
    UnknownWorker {
        worker: String,
        context: &'static str,
    },
    /// A shift that was never declared is referenced.
    #[error("unknown shift '{shift}' referenced in {context}")]
    UnknownShift { shift: String, context: &'static str },
    /// A shift requires a negative number of hours.
    #[error("shift '{shift}' requires negative hours ({hours})")]
    NegativeHours { shift: String, hours: i64 },
    /// A worker has a negative hour capacity.
    #[error("worker '{worker}' has negative capacity ({capacity})")]
    NegativeCapacity { worker: String, capacity: i64 },
    /// A declared shift has no hours entry.
    #[error("shift '{0}' has no hours entry")]
    MissingHours(String),
    /// A declared worker has no capacity entry.
    #[error("worker '{0}' has no capacity entry")]
    MissingCapacity(String),
    /// An availability key is not of the form `worker,shift`.
    #[error("malformed availability key '{0}': expected 'worker,shift'")]
    MalformedAvailabilityKey(String),
    /// An availability flag is neither 0 nor 1.
    #[error("availability for '{key}' must be 0 or 1, got {value}")]
    InvalidAvailabilityValue { key: String, value: i64 },
    /// The hours of all shifts up to and including this one no longer fit
    /// the numeric type.
    #[error("total shift hours overflow at shift '{0}'")]
    HoursOverflow(String),
    /// A forbidden pair does not name exactly two shifts.
    #[error("forbidden pair {0:?} must name exactly two shifts")]
    MalformedForbiddenPair(Vec<String>),
}
