use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::structures::contest_type::ContestType;

pub const STATUS_OK: &str = "OK";

/// Envelope every provider method answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> ApiResponse<T> {
        ApiResponse {
            status: STATUS_OK.to_string(),
            comment: None,
            result: Some(result)
        }
    }

    pub fn failed(comment: &str) -> ApiResponse<T> {
        ApiResponse {
            status: "FAILED".to_string(),
            comment: Some(comment.to_string()),
            result: None
        }
    }

    /// The payload, or the provider's comment when the status is not `OK`.
    pub fn into_result(self) -> Result<T, String> {
        if self.status != STATUS_OK {
            return Err(self.comment.unwrap_or(self.status));
        }

        self.result.ok_or_else(|| "Response is missing its result".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub contest_type: ContestType,
    #[serde(default)]
    pub phase: String,
    pub duration_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_seconds: Option<i64>
}

impl Contest {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time_seconds
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest_id: Option<u32>,
    pub index: String,
    #[serde(default)]
    pub name: String,
    /// Maximum points, only present for points-scored contests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub handle: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub members: Vec<Member>,
    #[serde(default)]
    pub participant_type: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResult {
    pub points: f64,
    #[serde(default)]
    pub rejected_attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_submission_time_seconds: Option<u64>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RanklistRow {
    pub party: Party,
    pub rank: u32,
    pub points: f64,
    pub penalty: i64,
    #[serde(default)]
    pub problem_results: Vec<ProblemResult>
}

pub const PARTICIPANT_TYPE_PRACTICE: &str = "PRACTICE";

impl RanklistRow {
    /// Handle of the first team member; the identity rows are matched on.
    pub fn handle(&self) -> Option<&str> {
        self.party.members.first().map(|m| m.handle.as_str())
    }

    /// Whether this is a contest-time row of `handle`. Practice rows are
    /// submitted after the contest and carry no usable result.
    pub fn is_contest_row_of(&self, handle: &str) -> bool {
        self.party.participant_type != PARTICIPANT_TYPE_PRACTICE
            && self.handle().is_some_and(|h| h.eq_ignore_ascii_case(handle))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub contest: Contest,
    #[serde(default)]
    pub problems: Vec<Problem>,
    pub rows: Vec<RanklistRow>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    #[serde(default)]
    pub contest_id: u32,
    #[serde(default)]
    pub contest_name: String,
    pub handle: String,
    pub rank: u32,
    pub old_rating: i32,
    #[serde(default)]
    pub new_rating: i32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<i32>
}
