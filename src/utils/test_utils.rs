use crate::{
    api::{
        api_structs::{ApiResponse, Contest, Member, Party, ProblemResult, RanklistRow, RatingChange, Standings, User},
        ContestDataSource
    },
    error::FetchError,
    model::structures::{contest_type::ContestType, contestant::Contestant}
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex
    }
};

pub fn generate_contestant(handle: &str, rating: i32, points: f64, penalty: i64) -> Contestant {
    Contestant::new(handle, rating, points, penalty)
}

/// `n` contestants with ratings in `800..3500` and points in `0..5000`,
/// reproducible for a given seed.
pub fn generate_random_roster(n: usize, seed: u64) -> Vec<Contestant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|i| {
            let rating = rng.random_range(800..3500);
            let points = rng.random_range(0..50) as f64 * 100.0;
            let penalty = rng.random_range(0..300);
            generate_contestant(&format!("player{}", i), rating, points, penalty)
        })
        .collect()
}

pub fn generate_contest(id: u32, contest_type: ContestType) -> Contest {
    Contest {
        id,
        name: format!("Contest {}", id),
        contest_type,
        phase: "FINISHED".to_string(),
        duration_seconds: 7200,
        start_time_seconds: Some(1_700_000_000)
    }
}

pub fn generate_row(handle: &str, rank: u32, points: f64, penalty: i64) -> RanklistRow {
    RanklistRow {
        party: Party {
            members: vec![Member {
                handle: handle.to_string()
            }],
            participant_type: "CONTESTANT".to_string()
        },
        rank,
        points,
        penalty,
        problem_results: Vec::new()
    }
}

pub fn generate_rating_change(handle: &str, rank: u32, old_rating: i32) -> RatingChange {
    RatingChange {
        contest_id: 0,
        contest_name: String::new(),
        handle: handle.to_string(),
        rank,
        old_rating,
        new_rating: old_rating
    }
}

/// Rows and rating changes for a field of `(handle, rating, points, penalty)`
/// entries, ranked by the contest's rule.
pub fn generate_field(
    contest_type: ContestType,
    field: &[(&str, i32, f64, i64)]
) -> (Vec<RanklistRow>, Vec<RatingChange>) {
    let mut roster: Vec<Contestant> = field
        .iter()
        .map(|(handle, rating, points, penalty)| generate_contestant(handle, *rating, *points, *penalty))
        .collect();
    crate::model::ranking::reassign_ranks(contest_type, &mut roster);

    let rows = roster
        .iter()
        .map(|c| generate_row(&c.handle, c.rank as u32, c.points, c.penalty))
        .collect();
    let changes = roster
        .iter()
        .map(|c| generate_rating_change(&c.handle, c.rank as u32, c.rating))
        .collect();

    (rows, changes)
}

#[derive(Clone)]
struct ContestFixture {
    standings: ApiResponse<Standings>,
    rating_changes: ApiResponse<Vec<RatingChange>>
}

/// In-memory [`ContestDataSource`] that counts its calls.
#[derive(Default)]
pub struct StaticSource {
    contests: Mutex<HashMap<u32, ContestFixture>>,
    users: Mutex<HashMap<String, User>>,
    fail_transport: AtomicBool,
    standings_calls: AtomicUsize,
    rating_changes_calls: AtomicUsize
}

impl StaticSource {
    /// A source holding one contest whose field is `(handle, rating, points)`.
    pub fn with_field(contest_id: u32, contest_type: ContestType, field: &[(&str, i32, f64)]) -> StaticSource {
        let source = StaticSource::default();
        source.insert_field(contest_id, contest_type, field);
        source
    }

    pub fn insert_field(&self, contest_id: u32, contest_type: ContestType, field: &[(&str, i32, f64)]) {
        let field: Vec<(&str, i32, f64, i64)> = field.iter().map(|(h, r, p)| (*h, *r, *p, 0)).collect();
        self.insert_field_with_penalty(contest_id, contest_type, &field);
    }

    pub fn insert_field_with_penalty(&self, contest_id: u32, contest_type: ContestType, field: &[(&str, i32, f64, i64)]) {
        let (rows, changes) = generate_field(contest_type, field);
        self.insert_contest(contest_id, contest_type, rows, changes);
    }

    pub fn insert_contest(
        &self,
        contest_id: u32,
        contest_type: ContestType,
        rows: Vec<RanklistRow>,
        rating_changes: Vec<RatingChange>
    ) {
        let fixture = ContestFixture {
            standings: ApiResponse::ok(Standings {
                contest: generate_contest(contest_id, contest_type),
                problems: Vec::new(),
                rows
            }),
            rating_changes: ApiResponse::ok(rating_changes)
        };

        self.contests.lock().unwrap().insert(contest_id, fixture);
    }

    /// A finished contest whose ratings were not computed (or rolled back).
    pub fn insert_unrated_contest(&self, contest_id: u32, contest_type: ContestType) {
        let rows = vec![generate_row("someone", 1, 1.0, 0)];
        self.insert_contest(contest_id, contest_type, rows, Vec::new());
    }

    /// Replaces the per-problem results on `handle`'s row of a stored contest.
    pub fn set_problem_results(&self, contest_id: u32, handle: &str, results: Vec<ProblemResult>) {
        let mut contests = self.contests.lock().unwrap();
        let rows = contests
            .get_mut(&contest_id)
            .and_then(|f| f.standings.result.as_mut())
            .map(|s| &mut s.rows);

        if let Some(row) = rows.and_then(|rows| rows.iter_mut().find(|r| r.handle() == Some(handle))) {
            row.problem_results = results;
        }
    }

    /// Marks `handle`'s row of a stored contest as a practice submission.
    pub fn set_participant_type(&self, contest_id: u32, handle: &str, participant_type: &str) {
        let mut contests = self.contests.lock().unwrap();
        let rows = contests
            .get_mut(&contest_id)
            .and_then(|f| f.standings.result.as_mut())
            .map(|s| &mut s.rows);

        if let Some(row) = rows.and_then(|rows| rows.iter_mut().find(|r| r.handle() == Some(handle))) {
            row.party.participant_type = participant_type.to_string();
        }
    }

    pub fn insert_user(&self, handle: &str, rating: Option<i32>) {
        self.users.lock().unwrap().insert(
            handle.to_string(),
            User {
                handle: handle.to_string(),
                rating,
                max_rating: rating
            }
        );
    }

    pub fn fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    pub fn standings_calls(&self) -> usize {
        self.standings_calls.load(Ordering::SeqCst)
    }

    pub fn rating_changes_calls(&self) -> usize {
        self.rating_changes_calls.load(Ordering::SeqCst)
    }

    fn check_transport(&self) -> Result<(), FetchError> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(FetchError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn fixture(&self, contest_id: u32) -> Option<ContestFixture> {
        self.contests.lock().unwrap().get(&contest_id).cloned()
    }
}

impl ContestDataSource for StaticSource {
    async fn standings(&self, contest_id: u32) -> Result<ApiResponse<Standings>, FetchError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;

        Ok(self
            .fixture(contest_id)
            .map(|f| f.standings)
            .unwrap_or_else(|| ApiResponse::failed(&format!("contestId: Contest with id {} not found", contest_id))))
    }

    async fn rating_changes(&self, contest_id: u32) -> Result<ApiResponse<Vec<RatingChange>>, FetchError> {
        self.rating_changes_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;

        Ok(self
            .fixture(contest_id)
            .map(|f| f.rating_changes)
            .unwrap_or_else(|| ApiResponse::failed(&format!("contestId: Contest with id {} not found", contest_id))))
    }

    async fn participant_row(&self, contest_id: u32, handle: &str) -> Result<ApiResponse<Standings>, FetchError> {
        self.check_transport()?;

        let Some(fixture) = self.fixture(contest_id) else {
            return Ok(ApiResponse::failed(&format!("contestId: Contest with id {} not found", contest_id)));
        };

        let mut response = fixture.standings;
        if let Some(standings) = response.result.as_mut() {
            standings.rows.retain(|r| r.handle().is_some_and(|h| h.eq_ignore_ascii_case(handle)));
            standings.rows.truncate(1);
        }

        Ok(response)
    }

    async fn user_info(&self, handle: &str) -> Result<ApiResponse<Vec<User>>, FetchError> {
        self.check_transport()?;

        Ok(match self.users.lock().unwrap().get(handle) {
            Some(user) => ApiResponse::ok(vec![user.clone()]),
            None => ApiResponse::failed(&format!("handles: User with handle {} not found", handle))
        })
    }
}
