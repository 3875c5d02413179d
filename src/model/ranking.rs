use std::cmp::Ordering;

use crate::model::structures::{contest_type::ContestType, contestant::Contestant};

fn compare(contest_type: ContestType, a: &Contestant, b: &Contestant) -> Ordering {
    contest_type.compare(a.points, a.penalty, b.points, b.penalty)
}

/// Sorts the roster best-first and assigns ranks.
///
/// Contestants tied under the contest's rule share a rank equal to the
/// position at which the next group begins, so a lone winner gets `1` and the
/// last group gets `roster.len()`. The sort is stable, so the input order of
/// tied contestants never affects any rank.
pub fn reassign_ranks(contest_type: ContestType, contestants: &mut [Contestant]) {
    contestants.sort_by(|a, b| compare(contest_type, b, a));

    let mut first = 0;
    for i in 1..contestants.len() {
        if compare(contest_type, &contestants[first], &contestants[i]) != Ordering::Equal {
            for contestant in &mut contestants[first..i] {
                contestant.rank = i;
            }
            first = i;
        }
    }

    let n = contestants.len();
    for contestant in &mut contestants[first..] {
        contestant.rank = n;
    }
}
