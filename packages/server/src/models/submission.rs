use serde::{Deserialize, Serialize};

use crate::engine::submit::SubmitOutcome;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitFlagRequest {
    /// The plaintext guess. Hashed immediately; never stored.
    pub flag: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitFlagResponse {
    pub is_correct: bool,
    /// True when this scope already held a scored solve; nothing new was
    /// recorded or scored.
    pub already_solved: bool,
    pub points: Option<i32>,
    pub solve_count: Option<i64>,
    pub team_name: Option<String>,
}

impl From<SubmitOutcome> for SubmitFlagResponse {
    fn from(o: SubmitOutcome) -> Self {
        Self {
            is_correct: o.is_correct,
            already_solved: o.already_solved,
            points: o.points,
            solve_count: o.solve_count,
            team_name: o.team_name,
        }
    }
}
