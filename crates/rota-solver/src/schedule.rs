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

//! The entry point the request layer calls.

use crate::{
    config::SolverConfig,
    extract::{ScheduleResponse, extract},
    request::ScheduleRequest,
    solver::SolverBuilder,
};
use rota_model::error::ValidationError;
use tracing::debug;

/// Validates `request`, solves it within the budget of `config` and returns
/// the response.
///
/// Infeasibility is a normal outcome: it is returned as
/// `Ok(ScheduleResponse::Infeasible(..))`. A run that hits the time limit
/// returns its best schedule with `provenOptimal: false`.
///
/// # Errors
///
/// Returns a `ValidationError` if the request is malformed. The search is
/// never started in that case.
pub fn schedule(
    request: &ScheduleRequest,
    config: &SolverConfig,
) -> Result<ScheduleResponse, ValidationError> {
    let model = request.to_model()?;
    debug!(event = "request_validated", model = %model);

    let solver = SolverBuilder::from_config(config).build();
    let outcome = solver.solve(&model);
    Ok(extract(&model, &outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::time::Duration;

    fn config() -> SolverConfig {
        SolverConfig::default().with_time_limit(Duration::from_secs(60))
    }

    fn random_request(rng: &mut StdRng) -> ScheduleRequest {
        let workers: Vec<String> = (0..rng.random_range(2..=4usize))
            .map(|w| format!("W{w}"))
            .collect();
        let shifts: Vec<String> = (0..rng.random_range(3..=7usize))
            .map(|s| format!("S{s}"))
            .collect();

        let mut request = ScheduleRequest::new(workers.clone(), shifts.clone());
        for s in &shifts {
            request = request.with_hours(s, rng.random_range(1..=5));
        }
        for w in &workers {
            request = request.with_capacity(w, rng.random_range(3..=12));
            for s in &shifts {
                if rng.random_bool(0.75) {
                    request = request.with_availability(w, s);
                }
            }
        }
        for _ in 0..rng.random_range(0..=3) {
            let a = rng.random_range(0..shifts.len());
            let c = rng.random_range(0..shifts.len());
            if a != c {
                request = request.with_forbidden_pair(&shifts[a], &shifts[c]);
            }
        }
        request
    }

    fn objective(response: &ScheduleResponse) -> Option<i64> {
        assert!(matches!(
            response,
            ScheduleResponse::Scheduled(_) | ScheduleResponse::Infeasible(_)
        ));
        response.total_hours()
    }

    #[test]
    fn test_single_shift_goes_to_one_worker() {
        let request = ScheduleRequest::new(["A", "B"], ["S1"])
            .with_hours("S1", 4)
            .with_capacity("A", 4)
            .with_capacity("B", 4)
            .with_availability("A", "S1")
            .with_availability("B", "S1");

        let response = schedule(&request, &config()).unwrap();
        let schedule = response.schedule().unwrap();
        assert_eq!(schedule.total_hours, 4);
        assert!(schedule.proven_optimal);

        let a = &schedule.assignments["A"];
        let b = &schedule.assignments["B"];
        assert_eq!(a.hours + b.hours, 4);
        let (taken, idle) = if a.hours == 4 { (a, b) } else { (b, a) };
        assert_eq!(taken.tasks.len(), 1);
        assert_eq!(taken.tasks[0].shift, "S1");
        assert_eq!(taken.tasks[0].hours, 4);
        assert!(idle.tasks.is_empty());
        assert_eq!(idle.hours, 0);
    }

    #[test]
    fn test_capacity_below_required_hours_is_infeasible() {
        let request = ScheduleRequest::new(["A", "B"], ["S1", "S2"])
            .with_hours("S1", 3)
            .with_hours("S2", 5)
            .with_capacity("A", 6)
            .with_capacity("B", 40)
            .with_availability("A", "S1")
            .with_availability("A", "S2");

        let response = schedule(&request, &config()).unwrap();
        assert_eq!(response, ScheduleResponse::infeasible(true));
    }

    #[test]
    fn test_forbidden_pair_with_single_worker_is_infeasible() {
        let request = ScheduleRequest::new(["A"], ["S1", "S2"])
            .with_hours("S1", 2)
            .with_hours("S2", 2)
            .with_capacity("A", 100)
            .with_availability("A", "S1")
            .with_availability("A", "S2")
            .with_forbidden_pair("S1", "S2");

        let response = schedule(&request, &config()).unwrap();
        assert_eq!(response, ScheduleResponse::infeasible(true));
    }

    #[test]
    fn test_shift_without_available_worker_is_infeasible() {
        let request = ScheduleRequest::new(["A", "B"], ["S1", "S2"])
            .with_hours("S1", 1)
            .with_hours("S2", 1)
            .with_capacity("A", 10)
            .with_capacity("B", 10)
            .with_availability("A", "S1")
            .with_availability("B", "S1");

        let response = schedule(&request, &config()).unwrap();
        assert_eq!(response, ScheduleResponse::infeasible(true));
    }

    #[test]
    fn test_validation_errors_surface() {
        let request = ScheduleRequest::new(["A"], ["S1"])
            .with_hours("S1", 1)
            .with_capacity("A", -1);
        assert_eq!(
            schedule(&request, &config()).unwrap_err(),
            ValidationError::NegativeCapacity {
                worker: "A".to_string(),
                capacity: -1
            }
        );
    }

    #[test]
    fn test_hours_beyond_the_numeric_range_are_rejected() {
        let big = i64::MAX / 2 + 1;
        let request = ScheduleRequest::new(["A", "B"], ["S1", "S2"])
            .with_hours("S1", big)
            .with_hours("S2", big)
            .with_capacity("A", big)
            .with_capacity("B", big)
            .with_availability("A", "S1")
            .with_availability("B", "S2");
        assert_eq!(
            schedule(&request, &config()).unwrap_err(),
            ValidationError::HoursOverflow("S2".to_string())
        );
    }

    #[test]
    fn test_hours_summing_to_the_numeric_limit_are_reported_exactly() {
        let (low, high) = (i64::MAX / 2, i64::MAX / 2 + 1);
        let request = ScheduleRequest::new(["A", "B"], ["S1", "S2"])
            .with_hours("S1", low)
            .with_hours("S2", high)
            .with_capacity("A", high)
            .with_capacity("B", high)
            .with_availability("A", "S1")
            .with_availability("B", "S1")
            .with_availability("B", "S2")
            .with_forbidden_pair("S1", "S2");

        let response = schedule(&request, &config()).unwrap();
        let schedule = response.schedule().unwrap();
        assert_eq!(schedule.total_hours, i64::MAX);
        assert!(schedule.proven_optimal);
        assert_eq!(schedule.assignments["A"].hours, low);
        assert_eq!(schedule.assignments["B"].hours, high);
    }

    #[test]
    fn test_returned_schedules_satisfy_every_rule() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            let request = random_request(&mut rng);
            let Some(schedule) = schedule(&request, &config()).unwrap().schedule().cloned() else {
                continue;
            };

            let mut covered = Vec::new();
            for (worker, assignment) in &schedule.assignments {
                assert!(assignment.hours <= request.max_hours_per_worker[worker]);
                for task in &assignment.tasks {
                    assert!(request.availability.contains_key(&format!("{worker},{}", task.shift)));
                    assert_eq!(task.hours, request.hours_per_shift[&task.shift]);
                    covered.push(task.shift.clone());
                }
                for pair in &request.forbidden_pairs {
                    let holds = |s: &String| assignment.tasks.iter().any(|t| &t.shift == s);
                    assert!(!(holds(&pair[0]) && holds(&pair[1])));
                }
            }
            covered.sort();
            let mut expected = request.shifts.clone();
            expected.sort();
            assert_eq!(covered, expected);
        }
    }

    #[test]
    fn test_relaxing_constraints_never_lowers_the_optimum() {
        let mut rng = StdRng::seed_from_u64(29);
        for _ in 0..30 {
            let request = random_request(&mut rng);
            let base = objective(&schedule(&request, &config()).unwrap());

            let mut fewer_pairs = request.clone();
            fewer_pairs.forbidden_pairs.pop();
            let relaxed = objective(&schedule(&fewer_pairs, &config()).unwrap());
            assert!(relaxed >= base, "removing a pair lowered {base:?} to {relaxed:?}");

            let mut more_capacity = request.clone();
            if let Some(capacity) = more_capacity.max_hours_per_worker.values_mut().next() {
                *capacity += 4;
            }
            let relaxed = objective(&schedule(&more_capacity, &config()).unwrap());
            assert!(relaxed >= base, "raising a capacity lowered {base:?} to {relaxed:?}");
        }
    }

    #[test]
    fn test_solving_twice_is_identical() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let request = random_request(&mut rng);
            let first = schedule(&request, &config()).unwrap();
            let second = schedule(&request, &config()).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_thread_count_does_not_change_the_schedule() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let request = random_request(&mut rng);
            let sequential = schedule(&request, &config().with_threads(1)).unwrap();
            let parallel = schedule(&request, &config().with_threads(4)).unwrap();
            assert_eq!(sequential, parallel);
        }
    }

    #[test]
    fn test_expired_deadline_returns_unproven_marker() {
        // Every worker can take every shift, so the root needs branching.
        let request = ScheduleRequest::new(["A", "B", "C"], ["S1", "S2", "S3"])
            .with_hours("S1", 2)
            .with_hours("S2", 2)
            .with_hours("S3", 2)
            .with_capacity("A", 6)
            .with_capacity("B", 6)
            .with_capacity("C", 6);
        let request = ["A", "B", "C"].iter().fold(request, |r, w| {
            r.with_availability(w, "S1")
                .with_availability(w, "S2")
                .with_availability(w, "S3")
        });

        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let response = schedule(&request, &config).unwrap();
        assert_eq!(response, ScheduleResponse::infeasible(false));
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"error":"No feasible assignment found","proven":false}"#
        );
    }
}
