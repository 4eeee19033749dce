use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contest_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: Option<super::contest::Entity>,

    pub title: String,

    /// A round is active at t iff t >= visible_from && t >= start_time
    /// && t <= end_time. visible_from allows announcing a window before
    /// it opens without exposing its challenges.
    pub visible_from: DateTimeUtc,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    #[sea_orm(has_many, via = "round_challenge")]
    pub challenges: HasMany<super::challenge::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
