use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, convert::TryFrom};
use strum_macros::{Display, EnumIter};

/// Scoring rule of a contest, as reported by the provider.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum ContestType {
    /// Points only; ties on points share a place.
    #[serde(rename = "CF")]
    #[strum(serialize = "CF")]
    Cf,
    #[serde(rename = "IOI")]
    #[strum(serialize = "IOI")]
    Ioi,
    #[serde(rename = "ICPC")]
    #[strum(serialize = "ICPC")]
    Icpc
}

impl ContestType {
    /// Whether a lower penalty breaks a tie on points.
    pub fn uses_penalty(&self) -> bool {
        !matches!(self, ContestType::Cf)
    }

    /// Orders two results so that `Ordering::Greater` means `a` placed better than `b`.
    pub fn compare(&self, points_a: f64, penalty_a: i64, points_b: f64, penalty_b: i64) -> Ordering {
        // 0.0 and -0.0 tie
        let by_points = points_a.partial_cmp(&points_b).unwrap_or(Ordering::Equal);

        if !self.uses_penalty() || by_points != Ordering::Equal {
            return by_points;
        }

        penalty_b.cmp(&penalty_a)
    }
}

impl TryFrom<&str> for ContestType {
    type Error = ();

    fn try_from(v: &str) -> Result<Self, Self::Error> {
        match v {
            "CF" => Ok(ContestType::Cf),
            "IOI" => Ok(ContestType::Ioi),
            "ICPC" => Ok(ContestType::Icpc),
            _ => Err(())
        }
    }
}
