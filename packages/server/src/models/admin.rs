use chrono::{DateTime, Utc};
use common::ScopeKind;
use serde::{Deserialize, Serialize};

use crate::entity::score_adjustment;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAdjustmentRequest {
    pub target_kind: ScopeKind,
    pub target_id: i32,
    /// Signed correction; negative values deduct.
    pub delta: i32,
    pub reason: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdjustmentResponse {
    pub id: i32,
    pub target_kind: ScopeKind,
    pub target_id: i32,
    pub delta: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<score_adjustment::Model> for AdjustmentResponse {
    fn from(m: score_adjustment::Model) -> Self {
        Self {
            id: m.id,
            target_kind: m.target_kind,
            target_id: m.target_id,
            delta: m.delta,
            reason: m.reason,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_adjustment(payload: &CreateAdjustmentRequest) -> Result<(), AppError> {
    if payload.delta == 0 {
        return Err(AppError::Validation("Delta must be non-zero".into()));
    }
    let reason = payload.reason.trim();
    if reason.is_empty() || reason.chars().count() > 256 {
        return Err(AppError::Validation(
            "Reason must be 1-256 characters".into(),
        ));
    }
    Ok(())
}
