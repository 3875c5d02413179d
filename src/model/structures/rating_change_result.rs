use serde::{Deserialize, Serialize};

use crate::model::structures::contestant::Contestant;

/// What a caller gets back for the hypothetical participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChangeResult {
    pub handle: String,
    pub contest_id: u32,
    pub old_rating: i32,
    pub new_rating: i32,
    /// 1-based place shared by a tie group: the position where the group
    /// ends, so a lone winner is 1 and the last group is `participants`
    pub rank: usize,
    pub seed: f64,
    pub need_rating: i32,
    pub performance: i32,
    pub delta: i32,
    /// Roster size, the hypothetical participant included
    pub participants: usize
}

impl RatingChangeResult {
    pub fn from_contestant(contestant: &Contestant, contest_id: u32, participants: usize) -> RatingChangeResult {
        RatingChangeResult {
            handle: contestant.handle.clone(),
            contest_id,
            old_rating: contestant.rating,
            new_rating: contestant.rating + contestant.delta,
            rank: contestant.rank,
            seed: contestant.seed,
            need_rating: contestant.need_rating,
            performance: contestant.performance,
            delta: contestant.delta,
            participants
        }
    }
}
