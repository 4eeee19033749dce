use common::ScopeKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The scoring ledger: one row per (challenge, actor-scope) that has
/// solved it. The composite primary key is the at-most-one-scored-solve
/// invariant; a concurrent duplicate surfaces as an insert conflict and
/// is treated as "already solved", never as an error.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solve")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub challenge_id: i32,
    #[sea_orm(primary_key)]
    pub scope_kind: ScopeKind,
    #[sea_orm(primary_key)]
    pub scope_id: i32,

    #[sea_orm(belongs_to, from = "challenge_id", to = "id")]
    pub challenge: Option<super::challenge::Entity>,

    /// The user whose attempt landed the solve; individual standings
    /// attribute team solves to this user.
    pub user_id: i32,
    pub submission_id: i32,

    pub solved_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
