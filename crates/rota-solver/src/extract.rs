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

//! Turns a solver outcome into the response returned to the request layer.
//!
//! A solved request lists every worker, even those without tasks. Tasks
//! follow shift input order and workers are keyed in identifier order, so
//! the serialized response is stable.

use rota_model::{index::ShiftIndex, model::Model, solution::Solution};
use rota_search::{num::SolverNumeric, result::SolverOutcome, result::SolverResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message of the infeasibility marker, as sent by the first version of the service.
pub const INFEASIBLE_MESSAGE: &str = "No feasible assignment found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub shift: String,
    pub hours: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    pub tasks: Vec<Task>,
    pub hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub total_hours: i64,
    pub assignments: BTreeMap<String, WorkerAssignment>,
    /// `false` when the time budget ran out before optimality was proven.
    pub proven_optimal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoSchedule {
    pub error: String,
    /// `false` when the time budget ran out before infeasibility was proven.
    pub proven: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleResponse {
    Scheduled(Schedule),
    Infeasible(NoSchedule),
}

impl ScheduleResponse {
    #[inline]
    pub fn infeasible(proven: bool) -> Self {
        ScheduleResponse::Infeasible(NoSchedule {
            error: INFEASIBLE_MESSAGE.to_string(),
            proven,
        })
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleResponse::Scheduled(_))
    }

    #[inline]
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            ScheduleResponse::Scheduled(schedule) => Some(schedule),
            ScheduleResponse::Infeasible(_) => None,
        }
    }

    #[inline]
    pub fn total_hours(&self) -> Option<i64> {
        self.schedule().map(|schedule| schedule.total_hours)
    }
}

/// Builds the response for `outcome`.
///
/// `Optimal` and `Feasible` results become a `Schedule`; only the former is
/// flagged as proven. `Infeasible` becomes the proven marker and `Unknown`
/// the unproven one.
pub fn extract<T>(model: &Model<T>, outcome: &SolverOutcome<T>) -> ScheduleResponse
where
    T: SolverNumeric,
{
    match outcome.result() {
        SolverResult::Optimal(solution) => {
            ScheduleResponse::Scheduled(build_schedule(model, solution, true))
        }
        SolverResult::Feasible(solution) => {
            ScheduleResponse::Scheduled(build_schedule(model, solution, false))
        }
        SolverResult::Infeasible => ScheduleResponse::infeasible(true),
        SolverResult::Unknown => ScheduleResponse::infeasible(false),
    }
}

fn build_schedule<T>(model: &Model<T>, solution: &Solution<T>, proven_optimal: bool) -> Schedule
where
    T: SolverNumeric,
{
    let mut per_worker: Vec<WorkerAssignment> = vec![WorkerAssignment::default(); model.num_workers()];

    for s in 0..model.num_shifts() {
        let shift_index = ShiftIndex::new(s);
        let hours: i64 = model.shift_hours(shift_index).into();
        let entry = &mut per_worker[solution.worker_for_shift(shift_index).get()];
        entry.tasks.push(Task {
            shift: model.shift_id(shift_index).to_string(),
            hours,
        });
        entry.hours += hours;
    }

    let total_hours: i64 = solution.objective_value().into();
    debug_assert_eq!(
        total_hours,
        per_worker.iter().map(|w| w.hours).sum::<i64>(),
        "objective does not match the assigned hours"
    );

    let assignments = model
        .worker_ids()
        .iter()
        .cloned()
        .zip(per_worker)
        .collect();

    Schedule {
        total_hours,
        assignments,
        proven_optimal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_model::{index::WorkerIndex, model::ModelBuilder};
    use rota_search::stats::SolverStatisticsBuilder;

    type IntegerType = i64;

    fn model() -> Model<IntegerType> {
        let mut b = ModelBuilder::new();
        b.add_workers(["Zoe", "Adam", "Mia"])
            .set_worker_capacity("Zoe", 10)
            .set_worker_capacity("Adam", 10)
            .set_worker_capacity("Mia", 10)
            .add_shifts(["Tue", "Mon"])
            .set_shift_hours("Tue", 3)
            .set_shift_hours("Mon", 5)
            .set_availability("Zoe", "Tue", true)
            .set_availability("Zoe", "Mon", true);
        b.build().unwrap()
    }

    fn optimal(model: &Model<IntegerType>) -> SolverOutcome<IntegerType> {
        let solution = Solution::new(8, vec![WorkerIndex::new(0), WorkerIndex::new(0)]);
        assert_eq!(solution.verify(model), Ok(()));
        SolverOutcome::optimal(solution, SolverStatisticsBuilder::new().build())
    }

    #[test]
    fn test_every_worker_is_listed() {
        let model = model();
        let response = extract(&model, &optimal(&model));
        let schedule = response.schedule().unwrap();

        assert_eq!(schedule.total_hours, 8);
        assert!(schedule.proven_optimal);
        assert_eq!(
            schedule.assignments.keys().collect::<Vec<_>>(),
            vec!["Adam", "Mia", "Zoe"]
        );
        assert_eq!(schedule.assignments["Adam"], WorkerAssignment::default());

        // Shift input order, not identifier order.
        let zoe = &schedule.assignments["Zoe"];
        assert_eq!(zoe.hours, 8);
        let shifts: Vec<&str> = zoe.tasks.iter().map(|t| t.shift.as_str()).collect();
        assert_eq!(shifts, vec!["Tue", "Mon"]);
    }

    #[test]
    fn test_feasible_is_not_proven() {
        let model = model();
        let solution = Solution::new(8, vec![WorkerIndex::new(0), WorkerIndex::new(0)]);
        let outcome = SolverOutcome::aborted(
            Some(solution),
            "deadline reached",
            SolverStatisticsBuilder::new().build(),
        );
        let response = extract(&model, &outcome);
        assert_eq!(response.total_hours(), Some(8));
        assert!(!response.schedule().unwrap().proven_optimal);
    }

    #[test]
    fn test_infeasibility_markers() {
        let model = model();
        let stats = SolverStatisticsBuilder::new().build();

        let proven = extract(&model, &SolverOutcome::infeasible(stats.clone()));
        assert_eq!(proven, ScheduleResponse::infeasible(true));
        assert!(!proven.is_scheduled());

        let unknown = extract(
            &model,
            &SolverOutcome::<IntegerType>::aborted(None, "deadline reached", stats),
        );
        assert_eq!(unknown, ScheduleResponse::infeasible(false));
    }

    #[test]
    fn test_wire_shapes() {
        let model = model();
        let response = extract(&model, &optimal(&model));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalHours": 8,
                "assignments": {
                    "Adam": {"tasks": [], "hours": 0},
                    "Mia": {"tasks": [], "hours": 0},
                    "Zoe": {
                        "tasks": [{"shift": "Tue", "hours": 3}, {"shift": "Mon", "hours": 5}],
                        "hours": 8
                    }
                },
                "provenOptimal": true
            })
        );

        let marker = serde_json::to_value(ScheduleResponse::infeasible(false)).unwrap();
        assert_eq!(
            marker,
            serde_json::json!({"error": "No feasible assignment found", "proven": false})
        );

        let back: ScheduleResponse = serde_json::from_value(marker).unwrap();
        assert_eq!(back, ScheduleResponse::infeasible(false));
        let back: ScheduleResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }
}
