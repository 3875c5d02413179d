// Elo model constants
pub const ELO_SCALE: f64 = 400.0;
pub const SEED_CONTINUITY: f64 = 0.5;
// Search range of the rating-to-rank inversion
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 8000;
// Ratings outside 0..=MAX_RATING are evaluated without memoization
pub const EXPECTED_RANK_TABLE_SIZE: usize = MAX_RATING as usize + 1;
// Zero-sum correction
pub const TOP_GROUP_FACTOR: i32 = 4;
pub const TOP_INC_FLOOR: i32 = -10;
pub const TOP_INC_CEILING: i32 = 0;
