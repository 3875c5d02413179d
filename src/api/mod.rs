pub mod api_structs;
pub mod fetcher;

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::{
    api::{
        api_structs::{ApiResponse, RatingChange, Standings, User},
        fetcher::RateLimitedFetcher
    },
    error::FetchError
};

pub const DEFAULT_API_ROOT: &str = "https://codeforces.com/api";

/// Where contest standings, official rating changes and user ratings come from.
///
/// Implementations return the provider's envelope as-is; a non-`OK` status is
/// not a [`FetchError`].
pub trait ContestDataSource: Send + Sync {
    /// Full standings of a contest, unofficial participants included.
    fn standings(&self, contest_id: u32) -> impl Future<Output = Result<ApiResponse<Standings>, FetchError>> + Send;

    fn rating_changes(
        &self,
        contest_id: u32
    ) -> impl Future<Output = Result<ApiResponse<Vec<RatingChange>>, FetchError>> + Send;

    fn user_info(&self, handle: &str) -> impl Future<Output = Result<ApiResponse<Vec<User>>, FetchError>> + Send;

    /// Standings restricted to the first row of `handle`, if it has one.
    fn participant_row(
        &self,
        contest_id: u32,
        handle: &str
    ) -> impl Future<Output = Result<ApiResponse<Standings>, FetchError>> + Send;
}

/// Codeforces API client. Every request goes through the shared
/// [`RateLimitedFetcher`].
#[derive(Clone)]
pub struct CodeforcesClient {
    api_root: String,
    fetcher: RateLimitedFetcher
}

impl CodeforcesClient {
    pub fn new(api_root: &str, fetcher: RateLimitedFetcher) -> CodeforcesClient {
        CodeforcesClient {
            api_root: api_root.trim_end_matches('/').to_string(),
            fetcher
        }
    }

    pub fn standings_url(&self, contest_id: u32) -> String {
        format!(
            "{}/contest.standings?contestId={}&showUnofficial=true",
            self.api_root, contest_id
        )
    }

    pub fn rating_changes_url(&self, contest_id: u32) -> String {
        format!("{}/contest.ratingChanges?contestId={}", self.api_root, contest_id)
    }

    pub fn participant_row_url(&self, contest_id: u32, handle: &str) -> String {
        format!(
            "{}/contest.standings?contestId={}&from=1&count=1&showUnofficial=true&handles={}",
            self.api_root, contest_id, handle
        )
    }

    pub fn user_info_url(&self, handle: &str) -> String {
        format!("{}/user.info?handles={}", self.api_root, handle)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>, FetchError> {
        let body = self.fetcher.fetch(url).await?;

        serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl ContestDataSource for CodeforcesClient {
    async fn standings(&self, contest_id: u32) -> Result<ApiResponse<Standings>, FetchError> {
        self.get(&self.standings_url(contest_id)).await
    }

    async fn rating_changes(&self, contest_id: u32) -> Result<ApiResponse<Vec<RatingChange>>, FetchError> {
        self.get(&self.rating_changes_url(contest_id)).await
    }

    async fn user_info(&self, handle: &str) -> Result<ApiResponse<Vec<User>>, FetchError> {
        self.get(&self.user_info_url(handle)).await
    }

    async fn participant_row(&self, contest_id: u32, handle: &str) -> Result<ApiResponse<Standings>, FetchError> {
        self.get(&self.participant_row_url(contest_id, handle)).await
    }
}
