use common::AchievementKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A badge held by a user. The composite primary key enforces
/// at-most-once semantics; `category` is the empty string for kinds
/// that are not category-scoped.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievement")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub kind: AchievementKind,
    #[sea_orm(primary_key)]
    pub category: String,

    pub team_id: Option<i32>,
    pub challenge_id: Option<i32>,

    pub earned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
