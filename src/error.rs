use thiserror::Error;

/// Failure reported by the contest-data provider or the fetcher in front of it.
///
/// `Clone` because a single underlying request may fan its outcome out to
/// several waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Fetcher is no longer running")]
    Closed
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("Contest data unavailable: {0}")]
    DataUnavailable(String),

    #[error("No rating changes found for contest {0}. Presumably rolled back or not updated yet.")]
    RatingsNotFinalized(u32),

    #[error("Contestant {0} not found in the roster")]
    ContestantNotFound(String),

    #[error("User {0} has no rating")]
    UnratedUser(String)
}

impl From<FetchError> for RatingError {
    fn from(err: FetchError) -> Self {
        RatingError::DataUnavailable(err.to_string())
    }
}
