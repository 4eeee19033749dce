use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String, // in Markdown
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// The contest currently being served. At most one row should carry
    /// this flag; readers take the first match.
    pub is_active: bool,
    /// Coarse platform-wide submission gate.
    pub is_paused: bool,
    /// Public standings stop reflecting solves after this instant.
    pub freeze_time: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub rounds: HasMany<super::round::Entity>,

    #[sea_orm(has_many, via = "contest_team")]
    pub teams: HasMany<super::team::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
