use common::ScopeKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Out-of-band score correction, independent of any submission.
/// Consumed by aggregation as an additive term.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score_adjustment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub target_kind: ScopeKind,
    pub target_id: i32,
    pub delta: i32,
    pub reason: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
