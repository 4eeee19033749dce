use common::{ScoringType, current_points};
use serde::Serialize;

use crate::entity::challenge;

/// A visible challenge as shown to players. Carries the live point
/// value, never the flag digest.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChallengeSummary {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub scoring_type: ScoringType,
    /// Current value at this solve count.
    pub points: i32,
    pub solve_count: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChallengeListResponse {
    pub data: Vec<ChallengeSummary>,
}

impl From<challenge::Model> for ChallengeSummary {
    fn from(m: challenge::Model) -> Self {
        let points = current_points(m.scoring_type, m.max_points, m.min_points, m.decay, m.solve_count);
        Self {
            id: m.id,
            title: m.title,
            category: m.category,
            scoring_type: m.scoring_type,
            points,
            solve_count: m.solve_count,
        }
    }
}
