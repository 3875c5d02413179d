use crate::model::{
    constants::{ELO_SCALE, EXPECTED_RANK_TABLE_SIZE, MAX_RATING, MIN_RATING},
    structures::contestant::Contestant
};

/// Probability that a contestant rated `ra` places ahead of one rated `rb`.
pub fn win_probability(ra: f64, rb: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rb - ra) / ELO_SCALE))
}

/// `1 + Σ p(c, rating)`: the rank a contestant rated `rating` is expected to
/// reach against `roster`. Non-increasing in `rating`.
pub fn expected_rank(roster: &[Contestant], rating: i32) -> f64 {
    roster
        .iter()
        .fold(1.0, |acc, c| acc + win_probability(c.rating as f64, rating as f64))
}

/// Memoized [`expected_rank`] over the bounded rating domain.
///
/// The sums depend on every rating in the roster, so the table is bound to the
/// cached contest (cleared with it) and to the hypothetical participant the
/// roster was built around (see [`ExpectedRankTable::bind`]).
#[derive(Debug, Clone)]
pub struct ExpectedRankTable {
    entries: Vec<Option<f64>>,
    bound_to: Option<(String, i32)>
}

impl Default for ExpectedRankTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpectedRankTable {
    pub fn new() -> ExpectedRankTable {
        ExpectedRankTable {
            entries: vec![None; EXPECTED_RANK_TABLE_SIZE],
            bound_to: None
        }
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.bound_to = None;
    }

    /// Keeps memoized sums only if they were computed for the same
    /// hypothetical participant; a different handle or rating changes the roster.
    pub fn bind(&mut self, handle: &str, rating: i32) {
        let unchanged = matches!(&self.bound_to, Some((h, r)) if h == handle && *r == rating);

        if !unchanged {
            self.clear();
            self.bound_to = Some((handle.to_owned(), rating));
        }
    }

    /// Number of memoized ratings.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn seed(&mut self, roster: &[Contestant], rating: i32) -> f64 {
        let slot = usize::try_from(rating)
            .ok()
            .and_then(|idx| self.entries.get_mut(idx));

        match slot {
            Some(Some(value)) => *value,
            Some(entry) => *entry.insert(expected_rank(roster, rating)),
            None => expected_rank(roster, rating)
        }
    }

    /// Highest rating in `MIN_RATING..MAX_RATING` whose seed is still at least `rank`.
    pub fn rating_for_rank(&mut self, roster: &[Contestant], rank: f64) -> i32 {
        let mut left = MIN_RATING;
        let mut right = MAX_RATING;

        while right - left > 1 {
            let mid = (left + right) / 2;
            if self.seed(roster, mid) < rank {
                right = mid;
            } else {
                left = mid;
            }
        }

        left
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{
        model::{
            constants::MAX_RATING,
            elo::{expected_rank, win_probability, ExpectedRankTable},
            structures::contestant::Contestant
        },
        utils::test_utils::{generate_contestant, generate_random_roster}
    };

    #[test]
    fn test_win_probability_equal_ratings() {
        assert_abs_diff_eq!(win_probability(1500.0, 1500.0), 0.5);
    }

    #[test]
    fn test_win_probability_400_gap() {
        // A 400 point gap means 10:1 odds
        assert_abs_diff_eq!(win_probability(1900.0, 1500.0), 10.0 / 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_win_probability_complement() {
        for ra in (0..4000).step_by(137) {
            for rb in (0..4000).step_by(211) {
                let sum = win_probability(ra as f64, rb as f64) + win_probability(rb as f64, ra as f64);
                assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_expected_rank_empty_roster() {
        assert_abs_diff_eq!(expected_rank(&[], 1500), 1.0);
    }

    #[test]
    fn test_expected_rank_includes_self() {
        let roster = vec![generate_contestant("a", 1500, 0.0, 0)];

        // Against only itself a contestant is expected at 1.5, the continuity
        // correction brings that back to 1.
        assert_abs_diff_eq!(expected_rank(&roster, 1500), 1.5);
    }

    #[test]
    fn test_seed_non_increasing() {
        let roster = generate_random_roster(50, 42);
        let mut table = ExpectedRankTable::new();

        let mut previous = f64::INFINITY;
        for rating in (0..=MAX_RATING).step_by(7) {
            let seed = table.seed(&roster, rating);
            assert!(seed <= previous, "seed increased at rating {}", rating);
            previous = seed;
        }
    }

    #[test]
    fn test_seed_memoized_matches_direct() {
        let roster = generate_random_roster(20, 7);
        let mut table = ExpectedRankTable::new();

        let first = table.seed(&roster, 1600);
        let second = table.seed(&roster, 1600);

        assert_eq!(first, second);
        assert_abs_diff_eq!(first, expected_rank(&roster, 1600));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_seed_out_of_table_range() {
        let roster = generate_random_roster(5, 1);
        let mut table = ExpectedRankTable::new();

        assert_abs_diff_eq!(table.seed(&roster, -50), expected_rank(&roster, -50));
        assert_abs_diff_eq!(table.seed(&roster, 9000), expected_rank(&roster, 9000));
        assert!(table.is_empty());
    }

    #[test]
    fn test_rating_for_rank_inverts_seed() {
        let roster = generate_random_roster(30, 99);
        let mut table = ExpectedRankTable::new();

        for k in 2..=25 {
            let target = k as f64;
            let rating = table.rating_for_rank(&roster, target);

            assert!(table.seed(&roster, rating) >= target);
            assert!(table.seed(&roster, rating + 1) < target);
        }
    }

    #[test]
    fn test_rating_for_rank_unreachable_targets() {
        let roster = vec![
            generate_contestant("a", 1500, 0.0, 0),
            generate_contestant("b", 1500, 0.0, 0),
        ];
        let mut table = ExpectedRankTable::new();

        // Nothing is expected to rank below everyone, the search pins to the floor
        assert_eq!(table.rating_for_rank(&roster, 100.0), 1);
        // Rank zero is satisfied everywhere, the search pins to the ceiling
        assert_eq!(table.rating_for_rank(&roster, 0.0), MAX_RATING - 1);
    }

    #[test]
    fn test_bind_clears_for_new_participant() {
        let roster = generate_random_roster(10, 3);
        let mut table = ExpectedRankTable::new();

        table.bind("alice", 1500);
        table.seed(&roster, 1500);
        table.bind("alice", 1500);
        assert_eq!(table.len(), 1);

        table.bind("alice", 1600);
        assert!(table.is_empty());

        table.seed(&roster, 1500);
        table.bind("bob", 1600);
        assert!(table.is_empty());
    }

    #[test]
    fn test_clear() {
        let roster: Vec<Contestant> = generate_random_roster(10, 3);
        let mut table = ExpectedRankTable::new();

        table.seed(&roster, 10);
        table.seed(&roster, 20);
        table.clear();

        assert!(table.is_empty());
    }
}
