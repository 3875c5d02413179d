/// One entry of the working roster. Built fresh for every computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Contestant {
    pub handle: String,
    pub rating: i32,
    pub points: f64,
    pub penalty: i64,
    pub rank: usize,
    /// Expected rank under the Elo model, continuity corrected
    pub seed: f64,
    pub need_rating: i32,
    pub performance: i32,
    pub delta: i32
}

impl Contestant {
    pub fn new(handle: &str, rating: i32, points: f64, penalty: i64) -> Contestant {
        Contestant {
            handle: handle.to_owned(),
            rating,
            points,
            penalty,
            rank: 0,
            seed: 0.0,
            need_rating: 0,
            performance: 0,
            delta: 0
        }
    }
}
