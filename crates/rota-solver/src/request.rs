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

//! The scheduling request accepted from the request layer.
//!
//! Field names follow the camelCase wire contract. The short names of the
//! first version of the service (`H`, `M`, `avail`, `forbidden_pairs`) are
//! accepted as aliases, so existing clients keep working.
//!
//! ```
//! use rota_solver::request::ScheduleRequest;
//!
//! let request: ScheduleRequest = serde_json::from_str(r#"{
//!     "workers": ["Alice"],
//!     "shifts": ["MonLunch"],
//!     "H": {"MonLunch": 4},
//!     "M": {"Alice": 8},
//!     "avail": {"Alice, MonLunch": 1}
//! }"#).unwrap();
//!
//! let model = request.to_model().unwrap();
//! assert_eq!(model.num_variables(), 1);
//! ```

use rota_model::{
    error::ValidationError,
    model::{Model, ModelBuilder},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub workers: Vec<String>,
    pub shifts: Vec<String>,
    /// Hours required by each shift.
    #[serde(alias = "H")]
    pub hours_per_shift: BTreeMap<String, i64>,
    /// Hour capacity of each worker.
    #[serde(alias = "M")]
    pub max_hours_per_worker: BTreeMap<String, i64>,
    /// `"worker,shift"` keys mapped to 0 or 1. Missing pairs are unavailable.
    #[serde(alias = "avail", default)]
    pub availability: BTreeMap<String, i64>,
    #[serde(alias = "forbidden_pairs", default)]
    pub forbidden_pairs: Vec<Vec<String>>,
}

impl ScheduleRequest {
    pub fn new<W, S>(workers: W, shifts: S) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            workers: workers.into_iter().map(Into::into).collect(),
            shifts: shifts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_hours(mut self, shift: &str, hours: i64) -> Self {
        self.hours_per_shift.insert(shift.to_string(), hours);
        self
    }

    pub fn with_capacity(mut self, worker: &str, capacity: i64) -> Self {
        self.max_hours_per_worker.insert(worker.to_string(), capacity);
        self
    }

    pub fn with_availability(mut self, worker: &str, shift: &str) -> Self {
        self.availability.insert(format!("{worker},{shift}"), 1);
        self
    }

    pub fn with_forbidden_pair(mut self, first: &str, second: &str) -> Self {
        self.forbidden_pairs
            .push(vec![first.to_string(), second.to_string()]);
        self
    }

    /// Validates the request and builds the `Model` the solver works on.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for malformed availability keys or values,
    /// forbidden pairs that do not name two shifts, and everything
    /// `ModelBuilder::build` rejects.
    pub fn to_model(&self) -> Result<Model<i64>, ValidationError> {
        let mut builder = ModelBuilder::<i64>::new();
        builder
            .add_workers(self.workers.iter().cloned())
            .add_shifts(self.shifts.iter().cloned());

        for (shift, &hours) in &self.hours_per_shift {
            builder.set_shift_hours(shift.as_str(), hours);
        }
        for (worker, &capacity) in &self.max_hours_per_worker {
            builder.set_worker_capacity(worker.as_str(), capacity);
        }

        for (key, &value) in &self.availability {
            let (worker, shift) = split_availability_key(key)?;
            let available = match value {
                0 => false,
                1 => true,
                _ => {
                    return Err(ValidationError::InvalidAvailabilityValue {
                        key: key.clone(),
                        value,
                    });
                }
            };
            builder.set_availability(worker, shift, available);
        }

        for pair in &self.forbidden_pairs {
            match pair.as_slice() {
                [first, second] => {
                    builder.add_forbidden_pair(first.as_str(), second.as_str());
                }
                _ => return Err(ValidationError::MalformedForbiddenPair(pair.clone())),
            }
        }

        builder.build()
    }
}

/// Splits `"worker,shift"` at its single comma and trims both halves.
fn split_availability_key(key: &str) -> Result<(&str, &str), ValidationError> {
    let mut parts = key.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(worker), Some(shift), None) => Ok((worker.trim(), shift.trim())),
        _ => Err(ValidationError::MalformedAvailabilityKey(key.to_string())),
    }
}
