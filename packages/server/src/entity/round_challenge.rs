use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_challenge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub round_id: i32,
    #[sea_orm(primary_key)]
    pub challenge_id: i32,
    #[sea_orm(belongs_to, from = "round_id", to = "id")]
    pub round: Option<super::round::Entity>,
    #[sea_orm(belongs_to, from = "challenge_id", to = "id")]
    pub challenge: Option<super::challenge::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
