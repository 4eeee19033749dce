#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-shot badges awarded by the post-solve rule pass.
///
/// Each kind is held at most once per user; `CategoryMaster` is scoped a
/// level finer, at most once per (user, category).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// First scored solve of a challenge, platform-wide.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "first_blood"))]
    FirstBlood,
    /// Solved every challenge in a category.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "category_master"))]
    CategoryMaster,
    /// Solved a challenge between midnight and 05:00 local time.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "night_owl"))]
    NightOwl,
    /// Five or more solves within a single calendar day.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "speed_demon"))]
    SpeedDemon,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstBlood => "first_blood",
            Self::CategoryMaster => "category_master",
            Self::NightOwl => "night_owl",
            Self::SpeedDemon => "speed_demon",
        }
    }

    /// Whether awards of this kind are keyed by challenge category.
    pub fn is_category_scoped(&self) -> bool {
        matches!(self, Self::CategoryMaster)
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
