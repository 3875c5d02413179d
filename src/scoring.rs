//! Turns per-problem results into the `(points, penalty)` pair the rating
//! calculator takes for the hypothetical participant.

use crate::{
    api::api_structs::{Contest, ProblemResult},
    model::structures::contest_type::ContestType
};

// Points-scored problems lose floor(max / 250) points per minute
const POINTS_DECAY_STEP: f64 = 250.0;
const REJECTION_COST: f64 = 50.0;
const MINIMUM_SHARE: f64 = 0.3;
// Minutes of penalty per rejected attempt under ICPC rules
const ICPC_REJECTION_MINUTES: i64 = 10;

/// Score of an accepted points-scored problem.
pub fn cf_problem_points(max_points: f64, minutes: u64, rejected_attempts: u32) -> f64 {
    let decrement = (max_points / POINTS_DECAY_STEP).floor();
    let earned = max_points - minutes as f64 * decrement - REJECTION_COST * rejected_attempts as f64;

    earned.max((max_points * MINIMUM_SHARE).floor())
}

/// Score for one problem. `submission_seconds` is the accepted submission's
/// time into the contest, `None` if unsolved; it is clamped to the contest
/// duration.
pub fn problem_points(
    contest: &Contest,
    max_points: Option<f64>,
    submission_seconds: Option<u64>,
    rejected_attempts: u32
) -> f64 {
    let Some(seconds) = submission_seconds else {
        return 0.0;
    };

    match contest.contest_type {
        ContestType::Cf => {
            let seconds = seconds.min(contest.duration_seconds);
            cf_problem_points(max_points.unwrap_or(0.0), seconds / 60, rejected_attempts)
        }
        _ => 1.0
    }
}

/// Penalty in minutes: accepted submission times, plus ten minutes per
/// rejected attempt on solved problems under ICPC rules.
pub fn total_penalty(contest_type: ContestType, results: &[ProblemResult]) -> i64 {
    results
        .iter()
        .filter_map(|r| {
            r.best_submission_time_seconds.map(|seconds| {
                let minutes = (seconds / 60) as i64;
                match contest_type {
                    ContestType::Icpc => minutes + ICPC_REJECTION_MINUTES * r.rejected_attempt_count as i64,
                    _ => minutes
                }
            })
        })
        .sum()
}

/// `(points, penalty)` from per-problem results as reported in a ranklist row.
/// Only ICPC contests carry a penalty into the ranking.
pub fn score_from_results(contest: &Contest, results: &[ProblemResult]) -> (f64, i64) {
    let points = results.iter().map(|r| r.points).sum();
    let penalty = match contest.contest_type {
        ContestType::Icpc => total_penalty(contest.contest_type, results),
        _ => 0
    };

    (points, penalty)
}
