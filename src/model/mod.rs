pub mod adjust;
pub mod cache;
pub mod calculator;
pub mod constants;
pub mod elo;
pub mod ranking;
pub mod structures;

pub use cache::{CacheState, ContestCache};
pub use calculator::RatingCalculator;
