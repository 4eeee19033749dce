#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a challenge's point value responds to its global solve count.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    /// Constant value, solve count is ignored.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "static"))]
    Static,
    /// Value falls by a fixed step per solve until it hits the floor.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "linear"))]
    Linear,
    /// Value falls quadratically, so early solvers keep most of the points.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "dynamic"))]
    Dynamic,
}

impl ScoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Linear => "linear",
            Self::Dynamic => "dynamic",
        }
    }

    /// Parse a scoring type, falling back to `Dynamic` for unknown or
    /// empty input. Admin tooling has historically stored free-form
    /// strings here, so the boundary is lenient rather than strict.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "static" => Self::Static,
            "linear" => Self::Linear,
            _ => Self::Dynamic,
        }
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ScoringType {
    fn default() -> Self {
        Self::Dynamic
    }
}

/// Current point value of a challenge.
///
/// Pure and deterministic in its inputs; re-evaluated on every read, so a
/// solve's worth drifts downward as later solvers appear. Clamped to
/// `min_points`, never negative. A non-positive `decay` behaves as 10.
pub fn current_points(
    scoring_type: ScoringType,
    max_points: i32,
    min_points: i32,
    decay: i32,
    solve_count: i64,
) -> i32 {
    let decay = if decay <= 0 { 10 } else { decay };
    let max = f64::from(max_points);
    let min = f64::from(min_points);
    let n = solve_count as f64 / f64::from(decay);

    let value = match scoring_type {
        ScoringType::Static => max,
        ScoringType::Linear => max - (max - min) * n,
        ScoringType::Dynamic => max - (max - min) * n * n,
    };

    (value.round() as i32).max(min_points)
}
