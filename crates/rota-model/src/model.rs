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

//! Immutable shift-assignment model and its builder.
//!
//! A `Model` is the validated, index-based form of a scheduling instance:
//! workers with hour capacities, shifts with hour requirements, the
//! availability relation between them and the symmetric set of shift pairs
//! that must never share a worker. Each available `(worker, shift)` pair
//! becomes one binary decision variable.
//!
//! Storage is a Structure of Arrays. Per-shift and per-worker variable lists
//! and the forbidden-partner adjacency are kept in compressed (CSR) form so
//! that the search can iterate them without chasing pointers.
//!
//! Construction goes through `ModelBuilder`, which records string-keyed input
//! as given and resolves it to indices in `ModelBuilder::build`.

use crate::{
    error::ValidationError,
    index::{ShiftIndex, VariableIndex, WorkerIndex},
};
use num_traits::{PrimInt, Signed};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[inline(always)]
fn flatten_index(num_shifts: usize, worker_index: WorkerIndex, shift_index: ShiftIndex) -> usize {
    worker_index.get() * num_shifts + shift_index.get()
}

#[inline]
fn to_i64<T: PrimInt>(value: T) -> i64 {
    value.to_i64().unwrap_or(i64::MIN)
}

/// The immutable shift-assignment model.
///
/// This struct holds all pre-validated, queryable data:
/// - `shift_hours[shift]`: hours required by each shift.
/// - `worker_capacities[worker]`: maximum hours each worker may take on.
/// - `variable_lookup[worker * num_shifts + shift]`: the decision variable of an
///   available pair, or `None` if the worker cannot take the shift.
/// - `shift_variables` / `worker_variables`: the candidate variables per shift
///   and per worker, ordered by worker index and shift index respectively.
/// - `forbidden_partners`: for each shift, the sorted shifts it must not share
///   a worker with. The relation is symmetric; a shift may list itself.
///
/// Construction:
/// - Use `ModelBuilder` and call `ModelBuilder::build` to obtain a validated `Model`.
#[derive(Clone)]
pub struct Model<T>
where
    T: PrimInt + Signed,
{
    worker_ids: Vec<String>,                       // len = num_workers
    shift_ids: Vec<String>,                        // len = num_shifts
    worker_lookup: FxHashMap<String, WorkerIndex>, // id -> index
    shift_lookup: FxHashMap<String, ShiftIndex>,   // id -> index
    shift_hours: Vec<T>,                           // len = num_shifts
    worker_capacities: Vec<T>,                     // len = num_workers
    variable_workers: Vec<WorkerIndex>,            // len = num_variables
    variable_shifts: Vec<ShiftIndex>,              // len = num_variables
    variable_lookup: Vec<Option<VariableIndex>>,   // len = num_workers * num_shifts
    shift_variable_offsets: Vec<usize>,            // len = num_shifts + 1
    shift_variable_list: Vec<VariableIndex>,       // len = num_variables
    worker_variable_offsets: Vec<usize>,           // len = num_workers + 1
    worker_variable_list: Vec<VariableIndex>,      // len = num_variables
    forbidden_offsets: Vec<usize>,                 // len = num_shifts + 1
    forbidden_list: Vec<ShiftIndex>,
    total_hours: T,
}

impl<T> Model<T>
where
    T: PrimInt + Signed,
{
    /// Returns the number of workers in the model.
    #[inline]
    pub fn num_workers(&self) -> usize {
        self.worker_ids.len()
    }

    /// Returns the number of shifts in the model.
    #[inline]
    pub fn num_shifts(&self) -> usize {
        self.shift_ids.len()
    }

    /// Returns the number of decision variables, one per available pair.
    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variable_workers.len()
    }

    /// Returns the identifiers of all workers in index order.
    #[inline]
    pub fn worker_ids(&self) -> &[String] {
        &self.worker_ids
    }

    /// Returns the identifiers of all shifts in index order.
    #[inline]
    pub fn shift_ids(&self) -> &[String] {
        &self.shift_ids
    }

    /// Returns the identifier of the specified worker.
    ///
    /// # Panics
    ///
    /// Panics if `worker_index` is not in `0..num_workers()`.
    #[inline]
    pub fn worker_id(&self, worker_index: WorkerIndex) -> &str {
        let index = worker_index.get();
        debug_assert!(
            index < self.num_workers(),
            "called `Model::worker_id` with worker index out of bounds: the len is {} but the index is {}",
            self.num_workers(),
            index
        );

        &self.worker_ids[index]
    }

    /// Returns the identifier of the specified shift.
    ///
    /// # Panics
    ///
    /// Panics if `shift_index` is not in `0..num_shifts()`.
    #[inline]
    pub fn shift_id(&self, shift_index: ShiftIndex) -> &str {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `Model::shift_id` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        &self.shift_ids[index]
    }

    /// Resolves a worker identifier to its index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rota_model::model::ModelBuilder;
    /// let mut builder = ModelBuilder::<i64>::new();
    /// builder.add_worker("Alice").set_worker_capacity("Alice", 8);
    /// let model = builder.build().unwrap();
    /// assert_eq!(model.worker_index("Alice").map(|w| w.get()), Some(0));
    /// assert!(model.worker_index("Bob").is_none());
    /// ```
    #[inline]
    pub fn worker_index(&self, worker_id: &str) -> Option<WorkerIndex> {
        self.worker_lookup.get(worker_id).copied()
    }

    /// Resolves a shift identifier to its index.
    #[inline]
    pub fn shift_index(&self, shift_id: &str) -> Option<ShiftIndex> {
        self.shift_lookup.get(shift_id).copied()
    }

    /// Returns the hours required by the specified shift.
    ///
    /// # Panics
    ///
    /// Panics if `shift_index` is not in `0..num_shifts()`.
    #[inline]
    pub fn shift_hours(&self, shift_index: ShiftIndex) -> T {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `Model::shift_hours` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        self.shift_hours[index]
    }

    /// Returns the hour capacity of the specified worker.
    ///
    /// # Panics
    ///
    /// Panics if `worker_index` is not in `0..num_workers()`.
    #[inline]
    pub fn worker_capacity(&self, worker_index: WorkerIndex) -> T {
        let index = worker_index.get();
        debug_assert!(
            index < self.num_workers(),
            "called `Model::worker_capacity` with worker index out of bounds: the len is {} but the index is {}",
            self.num_workers(),
            index
        );

        self.worker_capacities[index]
    }

    /// Returns the decision variable for `(worker, shift)`, or `None` if the
    /// worker is not available for the shift.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rota_model::model::ModelBuilder;
    /// # use rota_model::index::{ShiftIndex, WorkerIndex};
    /// let mut builder = ModelBuilder::<i64>::new();
    /// builder
    ///     .add_worker("A")
    ///     .add_shift("S1")
    ///     .add_shift("S2")
    ///     .set_worker_capacity("A", 8)
    ///     .set_shift_hours("S1", 4)
    ///     .set_shift_hours("S2", 4)
    ///     .set_availability("A", "S2", true);
    /// let model = builder.build().unwrap();
    /// assert!(model.variable(WorkerIndex::new(0), ShiftIndex::new(0)).is_none());
    /// assert!(model.variable(WorkerIndex::new(0), ShiftIndex::new(1)).is_some());
    /// ```
    #[inline]
    pub fn variable(&self, worker_index: WorkerIndex, shift_index: ShiftIndex) -> Option<VariableIndex> {
        debug_assert!(
            worker_index.get() < self.num_workers(),
            "called `Model::variable` with worker index out of bounds: the len is {} but the index is {}",
            self.num_workers(),
            worker_index.get()
        );
        debug_assert!(
            shift_index.get() < self.num_shifts(),
            "called `Model::variable` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            shift_index.get()
        );

        self.variable_lookup[flatten_index(self.num_shifts(), worker_index, shift_index)]
    }

    /// Returns `true` if the worker is available for the shift.
    #[inline]
    pub fn is_available(&self, worker_index: WorkerIndex, shift_index: ShiftIndex) -> bool {
        self.variable(worker_index, shift_index).is_some()
    }

    /// Returns the worker of the specified variable.
    ///
    /// # Panics
    ///
    /// Panics if `variable_index` is not in `0..num_variables()`.
    #[inline]
    pub fn variable_worker(&self, variable_index: VariableIndex) -> WorkerIndex {
        let index = variable_index.get();
        debug_assert!(
            index < self.num_variables(),
            "called `Model::variable_worker` with variable index out of bounds: the len is {} but the index is {}",
            self.num_variables(),
            index
        );

        self.variable_workers[index]
    }

    /// Returns the shift of the specified variable.
    ///
    /// # Panics
    ///
    /// Panics if `variable_index` is not in `0..num_variables()`.
    #[inline]
    pub fn variable_shift(&self, variable_index: VariableIndex) -> ShiftIndex {
        let index = variable_index.get();
        debug_assert!(
            index < self.num_variables(),
            "called `Model::variable_shift` with variable index out of bounds: the len is {} but the index is {}",
            self.num_variables(),
            index
        );

        self.variable_shifts[index]
    }

    /// Returns the candidate variables of a shift, ordered by worker index.
    ///
    /// # Panics
    ///
    /// Panics if `shift_index` is not in `0..num_shifts()`.
    #[inline]
    pub fn shift_variables(&self, shift_index: ShiftIndex) -> &[VariableIndex] {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `Model::shift_variables` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        &self.shift_variable_list
            [self.shift_variable_offsets[index]..self.shift_variable_offsets[index + 1]]
    }

    /// Returns the variables of a worker, ordered by shift index.
    ///
    /// # Panics
    ///
    /// Panics if `worker_index` is not in `0..num_workers()`.
    #[inline]
    pub fn worker_variables(&self, worker_index: WorkerIndex) -> &[VariableIndex] {
        let index = worker_index.get();
        debug_assert!(
            index < self.num_workers(),
            "called `Model::worker_variables` with worker index out of bounds: the len is {} but the index is {}",
            self.num_workers(),
            index
        );

        &self.worker_variable_list
            [self.worker_variable_offsets[index]..self.worker_variable_offsets[index + 1]]
    }

    /// Returns the sorted shifts that must not share a worker with `shift_index`.
    ///
    /// # Panics
    ///
    /// Panics if `shift_index` is not in `0..num_shifts()`.
    #[inline]
    pub fn forbidden_partners(&self, shift_index: ShiftIndex) -> &[ShiftIndex] {
        let index = shift_index.get();
        debug_assert!(
            index < self.num_shifts(),
            "called `Model::forbidden_partners` with shift index out of bounds: the len is {} but the index is {}",
            self.num_shifts(),
            index
        );

        &self.forbidden_list[self.forbidden_offsets[index]..self.forbidden_offsets[index + 1]]
    }

    /// Returns `true` if the two shifts must not share a worker.
    #[inline]
    pub fn is_forbidden_pair(&self, first: ShiftIndex, second: ShiftIndex) -> bool {
        self.forbidden_partners(first).binary_search(&second).is_ok()
    }

    /// Returns `true` if the shift is paired with itself, which makes it
    /// impossible to staff.
    #[inline]
    pub fn is_self_forbidden(&self, shift_index: ShiftIndex) -> bool {
        self.is_forbidden_pair(shift_index, shift_index)
    }

    /// Returns the number of unordered forbidden pairs, self pairs included.
    pub fn num_forbidden_pairs(&self) -> usize {
        let self_pairs = (0..self.num_shifts())
            .filter(|&s| self.is_self_forbidden(ShiftIndex::new(s)))
            .count();
        (self.forbidden_list.len() + self_pairs) / 2
    }

    /// Returns the sum of hours over all shifts. `build` guarantees it fits `T`.
    ///
    /// Every feasible assignment covers every shift, so this is also the
    /// objective value of every feasible solution.
    #[inline]
    pub fn total_hours(&self) -> T {
        self.total_hours
    }
}

impl<T> std::fmt::Debug for Model<T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("worker_ids", &self.worker_ids)
            .field("shift_ids", &self.shift_ids)
            .field("shift_hours", &self.shift_hours)
            .field("worker_capacities", &self.worker_capacities)
            .field("num_variables", &self.num_variables())
            .field("forbidden_list", &self.forbidden_list)
            .field("total_hours", &self.total_hours)
            .finish()
    }
}

impl<T> std::fmt::Display for Model<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(num_workers: {}, num_shifts: {}, num_variables: {}, num_forbidden_pairs: {}, total_hours: {})",
            self.num_workers(),
            self.num_shifts(),
            self.num_variables(),
            self.num_forbidden_pairs(),
            self.total_hours
        )
    }
}

/// Records a scheduling instance keyed by identifier strings.
///
/// Entries are kept as given and validated together in `build`. Setting the
/// same hours, capacity or availability twice keeps the last value. Workers
/// and shifts keep their insertion order, which fixes their indices and all
/// tie-breaking downstream.
///
/// Defaults: a worker is unavailable for every shift until
/// `set_availability` says otherwise, and no shift pairs are forbidden.
/// Every shift needs an hours entry and every worker a capacity entry.
#[derive(Clone, Default)]
pub struct ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    worker_ids: Vec<String>,
    shift_ids: Vec<String>,
    shift_hours: Vec<(String, T)>,
    worker_capacities: Vec<(String, T)>,
    availability: Vec<(String, String, bool)>,
    forbidden_pairs: Vec<(String, String)>,
}

impl<T> ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Creates an empty builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rota_model::model::ModelBuilder;
    /// let model = ModelBuilder::<i64>::new().build().unwrap();
    /// assert_eq!(model.num_workers(), 0);
    /// assert_eq!(model.num_shifts(), 0);
    /// assert_eq!(model.total_hours(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            worker_ids: Vec::new(),
            shift_ids: Vec::new(),
            shift_hours: Vec::new(),
            worker_capacities: Vec::new(),
            availability: Vec::new(),
            forbidden_pairs: Vec::new(),
        }
    }

    /// Returns the number of workers declared so far.
    #[inline]
    pub fn num_workers(&self) -> usize {
        self.worker_ids.len()
    }

    /// Returns the number of shifts declared so far.
    #[inline]
    pub fn num_shifts(&self) -> usize {
        self.shift_ids.len()
    }

    /// Declares a worker.
    pub fn add_worker<S>(&mut self, worker_id: S) -> &mut Self
    where
        S: Into<String>,
    {
        self.worker_ids.push(worker_id.into());
        self
    }

    /// Declares several workers in order.
    pub fn add_workers<I, S>(&mut self, worker_ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worker_ids.extend(worker_ids.into_iter().map(Into::into));
        self
    }

    /// Declares a shift.
    pub fn add_shift<S>(&mut self, shift_id: S) -> &mut Self
    where
        S: Into<String>,
    {
        self.shift_ids.push(shift_id.into());
        self
    }

    /// Declares several shifts in order.
    pub fn add_shifts<I, S>(&mut self, shift_ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shift_ids.extend(shift_ids.into_iter().map(Into::into));
        self
    }

    /// Sets the hours required by a shift.
    pub fn set_shift_hours<S>(&mut self, shift_id: S, hours: T) -> &mut Self
    where
        S: Into<String>,
    {
        self.shift_hours.push((shift_id.into(), hours));
        self
    }

    /// Sets the hour capacity of a worker.
    pub fn set_worker_capacity<S>(&mut self, worker_id: S, capacity: T) -> &mut Self
    where
        S: Into<String>,
    {
        self.worker_capacities.push((worker_id.into(), capacity));
        self
    }

    /// Marks a worker as available or unavailable for a shift.
    pub fn set_availability<W, S>(&mut self, worker_id: W, shift_id: S, available: bool) -> &mut Self
    where
        W: Into<String>,
        S: Into<String>,
    {
        self.availability
            .push((worker_id.into(), shift_id.into(), available));
        self
    }

    /// Forbids a single worker from taking both shifts.
    ///
    /// The relation is symmetric. Forbidding a shift together with itself
    /// makes that shift impossible to staff.
    pub fn add_forbidden_pair<A, B>(&mut self, first: A, second: B) -> &mut Self
    where
        A: Into<String>,
        B: Into<String>,
    {
        self.forbidden_pairs.push((first.into(), second.into()));
        self
    }

    /// Validates the recorded input and builds the immutable `Model`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for duplicate identifiers, references to
    /// undeclared workers or shifts, negative hours or capacities and
    /// shifts or workers lacking an hours or capacity entry, and shift hours
    /// whose total does not fit `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rota_model::model::ModelBuilder;
    /// # use rota_model::error::ValidationError;
    /// let mut builder = ModelBuilder::<i64>::new();
    /// builder.add_shift("S1").set_shift_hours("S1", -1);
    /// assert_eq!(
    ///     builder.build().unwrap_err(),
    ///     ValidationError::NegativeHours { shift: "S1".to_string(), hours: -1 }
    /// );
    /// ```
    pub fn build(&self) -> Result<Model<T>, ValidationError> {
        let num_workers = self.worker_ids.len();
        let num_shifts = self.shift_ids.len();

        let mut worker_lookup: FxHashMap<String, WorkerIndex> = FxHashMap::default();
        worker_lookup.reserve(num_workers);
        for (i, id) in self.worker_ids.iter().enumerate() {
            if worker_lookup.insert(id.clone(), WorkerIndex::new(i)).is_some() {
                return Err(ValidationError::DuplicateWorker(id.clone()));
            }
        }

        let mut shift_lookup: FxHashMap<String, ShiftIndex> = FxHashMap::default();
        shift_lookup.reserve(num_shifts);
        for (i, id) in self.shift_ids.iter().enumerate() {
            if shift_lookup.insert(id.clone(), ShiftIndex::new(i)).is_some() {
                return Err(ValidationError::DuplicateShift(id.clone()));
            }
        }

        let resolve_worker = |id: &str, context: &'static str| {
            worker_lookup
                .get(id)
                .copied()
                .ok_or_else(|| ValidationError::UnknownWorker {
                    worker: id.to_string(),
                    context,
                })
        };
        let resolve_shift = |id: &str, context: &'static str| {
            shift_lookup
                .get(id)
                .copied()
                .ok_or_else(|| ValidationError::UnknownShift {
                    shift: id.to_string(),
                    context,
                })
        };

        let mut shift_hours: Vec<Option<T>> = vec![None; num_shifts];
        for (id, hours) in &self.shift_hours {
            let s = resolve_shift(id.as_str(), "hours")?;
            if *hours < T::zero() {
                return Err(ValidationError::NegativeHours {
                    shift: id.clone(),
                    hours: to_i64(*hours),
                });
            }
            shift_hours[s.get()] = Some(*hours);
        }
        let shift_hours: Vec<T> = shift_hours
            .into_iter()
            .enumerate()
            .map(|(s, h)| h.ok_or_else(|| ValidationError::MissingHours(self.shift_ids[s].clone())))
            .collect::<Result<_, _>>()?;

        let mut worker_capacities: Vec<Option<T>> = vec![None; num_workers];
        for (id, capacity) in &self.worker_capacities {
            let w = resolve_worker(id.as_str(), "capacities")?;
            if *capacity < T::zero() {
                return Err(ValidationError::NegativeCapacity {
                    worker: id.clone(),
                    capacity: to_i64(*capacity),
                });
            }
            worker_capacities[w.get()] = Some(*capacity);
        }
        let worker_capacities: Vec<T> = worker_capacities
            .into_iter()
            .enumerate()
            .map(|(w, c)| {
                c.ok_or_else(|| ValidationError::MissingCapacity(self.worker_ids[w].clone()))
            })
            .collect::<Result<_, _>>()?;

        let mut available = vec![false; num_workers * num_shifts];
        for (worker_id, shift_id, flag) in &self.availability {
            let w = resolve_worker(worker_id.as_str(), "availability")?;
            let s = resolve_shift(shift_id.as_str(), "availability")?;
            available[flatten_index(num_shifts, w, s)] = *flag;
        }

        let mut partners: Vec<SmallVec<[ShiftIndex; 4]>> = vec![SmallVec::new(); num_shifts];
        for (first, second) in &self.forbidden_pairs {
            let a = resolve_shift(first.as_str(), "forbidden pairs")?;
            let b = resolve_shift(second.as_str(), "forbidden pairs")?;
            partners[a.get()].push(b);
            if a != b {
                partners[b.get()].push(a);
            }
        }

        // Variables are numbered worker-major, so the per-worker lists come out
        // contiguous and the per-shift lists come out sorted by worker.
        let mut variable_workers = Vec::new();
        let mut variable_shifts = Vec::new();
        let mut variable_lookup = vec![None; num_workers * num_shifts];
        let mut worker_variable_offsets = Vec::with_capacity(num_workers + 1);
        let mut shift_counts = vec![0usize; num_shifts];
        worker_variable_offsets.push(0);
        for w in 0..num_workers {
            let worker = WorkerIndex::new(w);
            for s in 0..num_shifts {
                let shift = ShiftIndex::new(s);
                let flat = flatten_index(num_shifts, worker, shift);
                if available[flat] {
                    let variable = VariableIndex::new(variable_workers.len());
                    variable_workers.push(worker);
                    variable_shifts.push(shift);
                    variable_lookup[flat] = Some(variable);
                    shift_counts[s] += 1;
                }
            }
            worker_variable_offsets.push(variable_workers.len());
        }
        let worker_variable_list: Vec<VariableIndex> =
            (0..variable_workers.len()).map(VariableIndex::new).collect();

        let mut shift_variable_offsets = Vec::with_capacity(num_shifts + 1);
        shift_variable_offsets.push(0);
        for count in &shift_counts {
            let last = shift_variable_offsets[shift_variable_offsets.len() - 1];
            shift_variable_offsets.push(last + count);
        }
        let mut cursor = shift_variable_offsets[..num_shifts].to_vec();
        let mut shift_variable_list = vec![VariableIndex::new(0); variable_workers.len()];
        for (v, shift) in variable_shifts.iter().enumerate() {
            let slot = &mut cursor[shift.get()];
            shift_variable_list[*slot] = VariableIndex::new(v);
            *slot += 1;
        }

        let mut forbidden_offsets = Vec::with_capacity(num_shifts + 1);
        let mut forbidden_list = Vec::new();
        forbidden_offsets.push(0);
        for mut list in partners {
            list.sort_unstable();
            list.dedup();
            forbidden_list.extend_from_slice(&list);
            forbidden_offsets.push(forbidden_list.len());
        }

        // Every partial sum of hours downstream is bounded by this total.
        let mut total_hours = T::zero();
        for (s, &hours) in shift_hours.iter().enumerate() {
            total_hours = total_hours
                .checked_add(&hours)
                .ok_or_else(|| ValidationError::HoursOverflow(self.shift_ids[s].clone()))?;
        }

        Ok(Model {
            worker_ids: self.worker_ids.clone(),
            shift_ids: self.shift_ids.clone(),
            worker_lookup,
            shift_lookup,
            shift_hours,
            worker_capacities,
            variable_workers,
            variable_shifts,
            variable_lookup,
            shift_variable_offsets,
            shift_variable_list,
            worker_variable_offsets,
            worker_variable_list,
            forbidden_offsets,
            forbidden_list,
            total_hours,
        })
    }
}

impl<T> std::fmt::Debug for ModelBuilder<T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("worker_ids", &self.worker_ids)
            .field("shift_ids", &self.shift_ids)
            .field("shift_hours", &self.shift_hours)
            .field("worker_capacities", &self.worker_capacities)
            .field("availability", &self.availability)
            .field("forbidden_pairs", &self.forbidden_pairs)
            .finish()
    }
}

impl<T> std::fmt::Display for ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ModelBuilder(num_workers: {}, num_shifts: {})",
            self.num_workers(),
            self.num_shifts()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    fn w(i: usize) -> WorkerIndex {
        WorkerIndex::new(i)
    }
    fn s(i: usize) -> ShiftIndex {
        ShiftIndex::new(i)
    }

    fn sample_builder() -> ModelBuilder<IntegerType> {
        let mut b = ModelBuilder::new();
        b.add_workers(["Alice", "Bob"])
            .add_shifts(["Mon", "Tue", "Wed"])
            .set_shift_hours("Mon", 8)
            .set_shift_hours("Tue", 6)
            .set_shift_hours("Wed", 4)
            .set_worker_capacity("Alice", 10)
            .set_worker_capacity("Bob", 12)
            .set_availability("Alice", "Mon", true)
            .set_availability("Alice", "Wed", true)
            .set_availability("Bob", "Mon", true)
            .set_availability("Bob", "Tue", true)
            .add_forbidden_pair("Mon", "Tue");
        b
    }

    #[test]
    fn test_flatten_index_basic() {
        assert_eq!(flatten_index(3, w(0), s(0)), 0);
        assert_eq!(flatten_index(3, w(0), s(2)), 2);
        assert_eq!(flatten_index(3, w(1), s(0)), 3);
        assert_eq!(flatten_index(3, w(2), s(1)), 7);
    }

    #[test]
    fn test_build_dimensions_and_lookups() {
        let model = sample_builder().build().unwrap();
        assert_eq!(model.num_workers(), 2);
        assert_eq!(model.num_shifts(), 3);
        assert_eq!(model.num_variables(), 4);
        assert_eq!(model.worker_index("Bob"), Some(w(1)));
        assert_eq!(model.shift_index("Wed"), Some(s(2)));
        assert_eq!(model.shift_index("Thu"), None);
        assert_eq!(model.worker_id(w(0)), "Alice");
        assert_eq!(model.shift_id(s(1)), "Tue");
        assert_eq!(model.shift_hours(s(0)), 8);
        assert_eq!(model.shift_hours(s(2)), 4);
        assert_eq!(model.worker_capacity(w(1)), 12);
        assert_eq!(model.total_hours(), 18);
    }

    #[test]
    fn test_total_hours_overflow_is_rejected() {
        let big = IntegerType::MAX / 2 + 1;
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_workers(["A", "B"])
            .add_shifts(["S1", "S2"])
            .set_shift_hours("S1", big)
            .set_shift_hours("S2", big)
            .set_worker_capacity("A", big)
            .set_worker_capacity("B", big)
            .set_availability("A", "S1", true)
            .set_availability("B", "S2", true);
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::HoursOverflow("S2".to_string())
        );

        let mut b = ModelBuilder::<i16>::new();
        b.add_shifts(["S1", "S2"])
            .set_shift_hours("S1", i16::MAX - 1)
            .set_shift_hours("S2", 1);
        assert_eq!(b.build().unwrap().total_hours(), i16::MAX);
    }

    #[test]
    fn test_variables_are_worker_major() {
        let model = sample_builder().build().unwrap();
        // Alice: Mon, Wed. Bob: Mon, Tue.
        let v = |wi, si| model.variable(w(wi), s(si)).map(|x| x.get());
        assert_eq!(v(0, 0), Some(0));
        assert_eq!(v(0, 1), None);
        assert_eq!(v(0, 2), Some(1));
        assert_eq!(v(1, 0), Some(2));
        assert_eq!(v(1, 1), Some(3));
        assert_eq!(v(1, 2), None);

        assert_eq!(model.variable_worker(VariableIndex::new(3)), w(1));
        assert_eq!(model.variable_shift(VariableIndex::new(3)), s(1));
        assert!(model.is_available(w(0), s(2)));
        assert!(!model.is_available(w(1), s(2)));
    }

    #[test]
    fn test_csr_lists() {
        let model = sample_builder().build().unwrap();
        let ids = |xs: &[VariableIndex]| xs.iter().map(|x| x.get()).collect::<Vec<_>>();
        assert_eq!(ids(model.shift_variables(s(0))), vec![0, 2]);
        assert_eq!(ids(model.shift_variables(s(1))), vec![3]);
        assert_eq!(ids(model.shift_variables(s(2))), vec![1]);
        assert_eq!(ids(model.worker_variables(w(0))), vec![0, 1]);
        assert_eq!(ids(model.worker_variables(w(1))), vec![2, 3]);
    }

    #[test]
    fn test_forbidden_pairs_are_symmetric_and_deduplicated() {
        let mut b = sample_builder();
        b.add_forbidden_pair("Tue", "Mon").add_forbidden_pair("Mon", "Tue");
        let model = b.build().unwrap();
        assert_eq!(model.forbidden_partners(s(0)), &[s(1)]);
        assert_eq!(model.forbidden_partners(s(1)), &[s(0)]);
        assert!(model.forbidden_partners(s(2)).is_empty());
        assert!(model.is_forbidden_pair(s(1), s(0)));
        assert!(!model.is_forbidden_pair(s(0), s(2)));
        assert_eq!(model.num_forbidden_pairs(), 1);
    }

    #[test]
    fn test_self_pair() {
        let mut b = sample_builder();
        b.add_forbidden_pair("Wed", "Wed");
        let model = b.build().unwrap();
        assert!(model.is_self_forbidden(s(2)));
        assert!(!model.is_self_forbidden(s(0)));
        assert_eq!(model.forbidden_partners(s(2)), &[s(2)]);
        assert_eq!(model.num_forbidden_pairs(), 2);
    }

    #[test]
    fn test_last_availability_entry_wins() {
        let mut b = sample_builder();
        b.set_availability("Alice", "Mon", false);
        let model = b.build().unwrap();
        assert!(!model.is_available(w(0), s(0)));
        assert_eq!(model.num_variables(), 3);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut b = sample_builder();
        b.add_worker("Alice");
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::DuplicateWorker("Alice".into())
        );

        let mut b = sample_builder();
        b.add_shift("Tue");
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::DuplicateShift("Tue".into())
        );
    }

    #[test]
    fn test_unknown_references_rejected() {
        let mut b = sample_builder();
        b.set_availability("Carol", "Mon", true);
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::UnknownWorker {
                worker: "Carol".into(),
                context: "availability"
            }
        );

        let mut b = sample_builder();
        b.add_forbidden_pair("Mon", "Sun");
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::UnknownShift {
                shift: "Sun".into(),
                context: "forbidden pairs"
            }
        );

        let mut b = sample_builder();
        b.set_shift_hours("Sun", 3);
        assert!(matches!(
            b.build().unwrap_err(),
            ValidationError::UnknownShift { context: "hours", .. }
        ));
    }

    #[test]
    fn test_negative_and_missing_values_rejected() {
        let mut b = sample_builder();
        b.set_worker_capacity("Bob", -1);
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::NegativeCapacity {
                worker: "Bob".into(),
                capacity: -1
            }
        );

        let mut b = sample_builder();
        b.add_shift("Thu");
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::MissingHours("Thu".into())
        );

        let mut b = sample_builder();
        b.add_worker("Dan");
        assert_eq!(
            b.build().unwrap_err(),
            ValidationError::MissingCapacity("Dan".into())
        );
    }

    #[test]
    fn test_zero_hours_and_capacity_are_valid() {
        let mut b = ModelBuilder::<IntegerType>::new();
        b.add_worker("A")
            .add_shift("S")
            .set_worker_capacity("A", 0)
            .set_shift_hours("S", 0)
            .set_availability("A", "S", true);
        let model = b.build().unwrap();
        assert_eq!(model.total_hours(), 0);
        assert_eq!(model.num_variables(), 1);
    }

    #[test]
    fn test_display() {
        let model = sample_builder().build().unwrap();
        assert_eq!(
            model.to_string(),
            "Model(num_workers: 2, num_shifts: 3, num_variables: 4, num_forbidden_pairs: 1, total_hours: 18)"
        );
        assert_eq!(
            sample_builder().to_string(),
            "ModelBuilder(num_workers: 2, num_shifts: 3)"
        );
    }
}
