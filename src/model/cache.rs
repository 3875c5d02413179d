use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    api::{
        api_structs::{Contest, RanklistRow, RatingChange},
        ContestDataSource
    },
    error::RatingError,
    model::{elo::ExpectedRankTable, structures::contestant::Contestant}
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Ready(u32)
}

/// Single-slot cache of the most recently processed contest.
///
/// `rating_changes[i]` and `standings_rows[i]` always describe the same
/// participant. The expected-rank table is replaced together with them.
#[derive(Debug, Default)]
pub struct ContestCache {
    contest: Option<Contest>,
    rating_changes: Vec<RatingChange>,
    standings_rows: Vec<RanklistRow>,
    expected_ranks: ExpectedRankTable
}

impl ContestCache {
    pub fn new() -> ContestCache {
        Self::default()
    }

    pub fn state(&self) -> CacheState {
        match &self.contest {
            Some(contest) => CacheState::Ready(contest.id),
            None => CacheState::Empty
        }
    }

    pub fn contest(&self) -> Option<&Contest> {
        self.contest.as_ref()
    }

    pub fn rating_changes(&self) -> &[RatingChange] {
        &self.rating_changes
    }

    pub fn standings_rows(&self) -> &[RanklistRow] {
        &self.standings_rows
    }

    pub fn expected_ranks(&mut self) -> &mut ExpectedRankTable {
        &mut self.expected_ranks
    }

    pub fn invalidate(&mut self) {
        self.contest = None;
        self.rating_changes.clear();
        self.standings_rows.clear();
        self.expected_ranks.clear();
    }

    /// Makes sure the cache holds `contest_id`, fetching it otherwise.
    ///
    /// The cache is emptied before the fetches start, so a failure or a
    /// dropped future leaves it empty rather than half updated.
    pub async fn ensure<S: ContestDataSource>(&mut self, source: &S, contest_id: u32) -> Result<(), RatingError> {
        if self.state() == CacheState::Ready(contest_id) {
            debug!("Contest {} already cached", contest_id);
            return Ok(());
        }

        self.invalidate();
        info!("Fetching standings and rating changes for contest {}", contest_id);

        let (standings, rating_changes) =
            futures::try_join!(source.standings(contest_id), source.rating_changes(contest_id))?;

        let standings = standings.into_result().map_err(RatingError::DataUnavailable)?;
        let rating_changes = rating_changes
            .into_result()
            .map_err(RatingError::DataUnavailable)?;

        if rating_changes.is_empty() {
            warn!("Contest {} has no rating changes", contest_id);
            return Err(RatingError::RatingsNotFinalized(contest_id));
        }

        let (rating_changes, standings_rows) = merge_standings(standings.rows, rating_changes);
        info!(
            "Cached contest {} ({}): {} rated participants",
            standings.contest.id,
            standings.contest.contest_type,
            standings_rows.len()
        );

        self.contest = Some(standings.contest);
        self.rating_changes = rating_changes;
        self.standings_rows = standings_rows;
        self.expected_ranks.clear();

        Ok(())
    }

    /// Real participants other than `handle`, followed by the hypothetical one.
    pub fn roster_for(&self, handle: &str, old_rating: i32, points: f64, penalty: i64) -> Vec<Contestant> {
        let mut roster: Vec<Contestant> = self
            .rating_changes
            .iter()
            .zip(&self.standings_rows)
            .filter(|(change, _)| change.handle != handle)
            .map(|(change, row)| Contestant::new(&change.handle, change.old_rating, row.points, row.penalty))
            .collect();

        roster.push(Contestant::new(handle, old_rating, points, penalty));
        roster
    }
}

/// Aligns standings rows with the official rating changes.
///
/// Both lists are sorted by (rank, handle) and walked in lock step: a row is
/// kept when its first member matches the rating change under the cursor,
/// which then advances. Rows that do not match at the cursor are dropped even
/// if their handle appears further on. Kept rows take the official rank.
///
/// Returns rating changes truncated to the matched prefix alongside the kept rows.
pub fn merge_standings(
    rows: Vec<RanklistRow>,
    rating_changes: Vec<RatingChange>
) -> (Vec<RatingChange>, Vec<RanklistRow>) {
    let rows = rows
        .into_iter()
        .sorted_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.handle().cmp(&b.handle())))
        .collect_vec();
    let mut rating_changes = rating_changes
        .into_iter()
        .sorted_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.handle.cmp(&b.handle)))
        .collect_vec();

    let mut matched = Vec::with_capacity(rating_changes.len());
    let mut cursor = 0;
    for mut row in rows {
        let Some(change) = rating_changes.get(cursor) else {
            break;
        };

        if row.handle() == Some(change.handle.as_str()) {
            row.rank = change.rank;
            matched.push(row);
            cursor += 1;
        }
    }

    if cursor < rating_changes.len() {
        debug!(
            "{} rating changes had no aligned standings row",
            rating_changes.len() - cursor
        );
    }
    rating_changes.truncate(cursor);

    (rating_changes, matched)
}
