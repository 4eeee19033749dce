#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of party owns a solve or receives an adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user"))]
    User,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "team"))]
    Team,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Team => "team",
        })
    }
}

/// The unit that owns a solve: the submitting user's team when they have
/// one, otherwise the user themselves. At most one scored solve exists
/// per (challenge, scope).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorScope {
    pub kind: ScopeKind,
    pub id: i32,
}

impl ActorScope {
    pub fn user(id: i32) -> Self {
        Self {
            kind: ScopeKind::User,
            id,
        }
    }

    pub fn team(id: i32) -> Self {
        Self {
            kind: ScopeKind::Team,
            id,
        }
    }

    pub fn is_team(&self) -> bool {
        self.kind == ScopeKind::Team
    }
}

impl fmt::Display for ActorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
