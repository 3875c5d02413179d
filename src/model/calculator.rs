use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    api::ContestDataSource,
    error::RatingError,
    scoring::score_from_results,
    model::{
        adjust::adjust_deltas,
        cache::{CacheState, ContestCache},
        constants::SEED_CONTINUITY,
        elo::ExpectedRankTable,
        ranking::reassign_ranks,
        structures::{contest_type::ContestType, contestant::Contestant, rating_change_result::RatingChangeResult}
    }
};

/// Fills in seed, need rating, raw delta and performance. Ranks must already
/// be assigned.
pub fn compute_statistics(contestants: &mut [Contestant], table: &mut ExpectedRankTable) {
    for i in 0..contestants.len() {
        let rating = contestants[i].rating;
        let rank = contestants[i].rank as f64;

        let seed = table.seed(contestants, rating) - SEED_CONTINUITY;
        let mid_rank = (rank * seed).sqrt();
        let need_rating = table.rating_for_rank(contestants, mid_rank);
        let performance = table.rating_for_rank(contestants, rank);

        let contestant = &mut contestants[i];
        contestant.seed = seed;
        contestant.need_rating = need_rating;
        // Integer division truncates toward zero
        contestant.delta = (need_rating - rating) / 2;
        contestant.performance = performance;
    }
}

/// Rank, compute statistics and apply the zero-sum correction to a whole
/// roster. The roster ends up ordered by rank.
pub fn rate_roster(contest_type: ContestType, contestants: &mut [Contestant], table: &mut ExpectedRankTable) {
    reassign_ranks(contest_type, contestants);
    compute_statistics(contestants, table);
    adjust_deltas(contestants);
}

/// Computes hypothetical rating changes against the official results of a contest.
///
/// Owns the single-slot [`ContestCache`]. Calls are serialized on it: a request
/// for another contest waits until the one in progress has finished.
pub struct RatingCalculator<S> {
    source: S,
    cache: Mutex<ContestCache>
}

impl<S: ContestDataSource> RatingCalculator<S> {
    pub fn new(source: S) -> RatingCalculator<S> {
        RatingCalculator {
            source,
            cache: Mutex::new(ContestCache::new())
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn cache_state(&self) -> CacheState {
        self.cache.lock().await.state()
    }

    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }

    /// # Hypothetical rating change
    ///
    /// 1. Make sure the cache holds `contest_id`.
    /// 2. Build the roster: every rated participant except `handle`, plus
    ///    `handle` itself with the given rating and result.
    /// 3. Rank, compute seeds, need ratings, performances and raw deltas.
    /// 4. Apply the zero-sum correction and return `handle`'s record.
    pub async fn compute_rating_change(
        &self,
        handle: &str,
        contest_id: u32,
        old_rating: i32,
        points: f64,
        penalty: i64
    ) -> Result<RatingChangeResult, RatingError> {
        let mut cache = self.cache.lock().await;
        cache.ensure(&self.source, contest_id).await?;

        let contest_type = cache
            .contest()
            .map(|c| c.contest_type)
            .ok_or_else(|| RatingError::DataUnavailable(format!("Contest {} is not cached", contest_id)))?;

        let mut roster = cache.roster_for(handle, old_rating, points, penalty);
        debug!("Rating {} against {} contestants", handle, roster.len());

        let table = cache.expected_ranks();
        table.bind(handle, old_rating);
        rate_roster(contest_type, &mut roster, table);

        let result = roster
            .iter()
            .find(|c| c.handle == handle)
            .map(|c| RatingChangeResult::from_contestant(c, contest_id, roster.len()))
            .ok_or_else(|| RatingError::ContestantNotFound(handle.to_string()))?;

        info!(
            "{} in contest {}: rank {}, performance {}, delta {:+}",
            handle, contest_id, result.rank, result.performance, result.delta
        );

        Ok(result)
    }

    /// Current rating of `handle` according to the provider.
    pub async fn resolve_rating(&self, handle: &str) -> Result<i32, RatingError> {
        let users = self
            .source
            .user_info(handle)
            .await?
            .into_result()
            .map_err(RatingError::DataUnavailable)?;

        users
            .first()
            .and_then(|u| u.rating)
            .ok_or_else(|| RatingError::UnratedUser(handle.to_string()))
    }

    /// `(points, penalty)` that `handle` actually scored in `contest_id`, from
    /// its own standings row. A handle without a contest-time row scored
    /// nothing.
    pub async fn resolve_score(&self, handle: &str, contest_id: u32) -> Result<(f64, i64), RatingError> {
        let standings = self
            .source
            .participant_row(contest_id, handle)
            .await?
            .into_result()
            .map_err(RatingError::DataUnavailable)?;

        let score = match standings.rows.first() {
            Some(row) if row.is_contest_row_of(handle) => score_from_results(&standings.contest, &row.problem_results),
            _ => {
                debug!("{} has no result in contest {}", handle, contest_id);
                (0.0, 0)
            }
        };

        debug!("Score of {} in contest {}: {:?}", handle, contest_id, score);
        Ok(score)
    }
}
