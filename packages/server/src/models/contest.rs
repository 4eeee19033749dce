use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::contest;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_paused: bool,
    pub freeze_time: Option<DateTime<Utc>>,
}

impl From<contest::Model> for ContestResponse {
    fn from(m: contest::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            start_time: m.start_time,
            end_time: m.end_time,
            is_paused: m.is_paused,
            freeze_time: m.freeze_time,
        }
    }
}
