use crate::model::{
    constants::{TOP_GROUP_FACTOR, TOP_INC_CEILING, TOP_INC_FLOOR},
    structures::contestant::Contestant
};

/// Size of the top-rated group that receives the second correction.
pub fn top_group_size(n: usize) -> usize {
    let group = TOP_GROUP_FACTOR as usize * (n as f64).sqrt().round() as usize;
    n.min(group)
}

/// Zero-sum correction of the raw deltas.
///
/// 1. Everyone gets `trunc(-Σdelta / n) - 1`, pulling the total slightly negative.
/// 2. The `top_group_size(n)` highest rated get
///    `clamp(trunc(-Σtop / top), -10, 0)` on top of that.
///
/// Leaves the roster ordered by rank.
pub fn adjust_deltas(contestants: &mut [Contestant]) {
    if contestants.is_empty() {
        return;
    }

    contestants.sort_by(|a, b| b.rating.cmp(&a.rating));

    let n = contestants.len() as i64;
    let sum: i64 = contestants.iter().map(|c| c.delta as i64).sum();
    // Integer division truncates toward zero
    let all_inc = (-sum / n - 1) as i32;
    for contestant in contestants.iter_mut() {
        contestant.delta += all_inc;
    }

    let top_count = top_group_size(contestants.len());
    let top_sum: i64 = contestants[..top_count].iter().map(|c| c.delta as i64).sum();
    let top_inc = ((-top_sum / top_count as i64) as i32).clamp(TOP_INC_FLOOR, TOP_INC_CEILING);
    for contestant in &mut contestants[..top_count] {
        contestant.delta += top_inc;
    }

    contestants.sort_by_key(|c| c.rank);
}
