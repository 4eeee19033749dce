use common::ScoringType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub category: String,
    pub description: String, // in Markdown

    pub scoring_type: ScoringType,
    /// max_points >= min_points >= 0.
    pub max_points: i32,
    pub min_points: i32,
    /// Solves needed to walk the value from max to min. <= 0 behaves as 10.
    pub decay: i32,

    /// Distinct scoring scopes that have solved this challenge. Only ever
    /// incremented, and only through the atomic store operation.
    pub solve_count: i64,

    /// Hex SHA-256 of the answer. The plaintext flag is never persisted.
    pub flag_digest: String,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
