pub mod orm;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AchievementKind, ActorScope, ScopeKind};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::entity::{
    achievement, challenge, contest, round, score_adjustment, solve, submission, team, user,
};

/// Errors produced by the storage collaborators.
///
/// `Conflict` is a uniqueness violation. Callers on the solve and
/// achievement paths treat it as "someone else already recorded this",
/// not as a failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("uniqueness conflict")]
    Conflict,
    #[error("storage backend error: {0}")]
    Backend(#[from] sea_orm::DbErr),
}

/// A flag attempt about to be persisted. Carries the digest of the
/// guess, never the guess itself.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i32,
    pub team_id: Option<i32>,
    pub challenge_id: i32,
    pub flag_digest: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdjustment {
    pub target_kind: ScopeKind,
    pub target_id: i32,
    pub delta: i32,
    pub reason: String,
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn challenge(&self, id: i32) -> Result<Option<challenge::Model>, StoreError>;
    async fn challenges(&self) -> Result<Vec<challenge::Model>, StoreError>;
    async fn challenges_by_ids(&self, ids: &[i32]) -> Result<Vec<challenge::Model>, StoreError>;
    async fn challenges_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<challenge::Model>, StoreError>;

    /// Bump `solve_count` by one in a single storage-level increment and
    /// return the updated row. Never read-modify-write: the counter
    /// feeds the decay formula read by every concurrent submitter.
    async fn increment_solve_count(&self, id: i32) -> Result<challenge::Model, StoreError>;
}

#[async_trait]
pub trait ContestStore: Send + Sync {
    /// The contest currently marked active, if any.
    async fn active_contest(&self) -> Result<Option<contest::Model>, StoreError>;
    async fn contest(&self, id: i32) -> Result<Option<contest::Model>, StoreError>;
    async fn rounds(&self, contest_id: i32) -> Result<Vec<round::Model>, StoreError>;
    async fn round_challenge_ids(&self, round_ids: &[i32]) -> Result<Vec<i32>, StoreError>;
    async fn set_paused(&self, contest_id: i32, paused: bool) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn is_registered(&self, contest_id: i32, team_id: i32) -> Result<bool, StoreError>;
    /// Returns `Conflict` when the team is already registered.
    async fn register(
        &self,
        contest_id: i32,
        team_id: i32,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    async fn find_solve(
        &self,
        challenge_id: i32,
        scope: ActorScope,
    ) -> Result<Option<solve::Model>, StoreError>;

    async fn record_incorrect(&self, attempt: NewAttempt)
    -> Result<submission::Model, StoreError>;

    /// Persist a correct attempt together with its solve row in one
    /// transaction. A solve-key conflict rolls the attempt back too and
    /// returns `Conflict`, leaving no partial state behind.
    async fn record_correct(
        &self,
        attempt: NewAttempt,
        scope: ActorScope,
    ) -> Result<(submission::Model, solve::Model), StoreError>;

    /// Every scored solve, optionally restricted to `solved_at <= up_to`
    /// for frozen standings.
    async fn solves(&self, up_to: Option<DateTime<Utc>>) -> Result<Vec<solve::Model>, StoreError>;

    async fn solves_by_user(&self, user_id: i32) -> Result<Vec<solve::Model>, StoreError>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn team(&self, id: i32) -> Result<Option<team::Model>, StoreError>;
    async fn team_of_user(&self, user_id: i32) -> Result<Option<team::Model>, StoreError>;
    async fn teams(&self) -> Result<Vec<team::Model>, StoreError>;
    /// Storage-level additive update; linearized per team.
    async fn add_score(&self, team_id: i32, delta: i32) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user(&self, id: i32) -> Result<Option<user::Model>, StoreError>;
    async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<user::Model>, StoreError>;
    async fn users_in_teams(&self, team_ids: &[i32]) -> Result<Vec<user::Model>, StoreError>;
}

#[async_trait]
pub trait AchievementStore: Send + Sync {
    async fn has(
        &self,
        user_id: i32,
        kind: AchievementKind,
        category: &str,
    ) -> Result<bool, StoreError>;

    /// Insert unless an identical badge already exists. Returns `false`
    /// when the badge was already held; the uniqueness conflict is the
    /// success path, not an error.
    async fn award(&self, badge: achievement::Model) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    async fn create(
        &self,
        adjustment: NewAdjustment,
    ) -> Result<score_adjustment::Model, StoreError>;

    /// Sum of deltas grouped by target id, for one target kind.
    async fn totals(&self, kind: ScopeKind) -> Result<Vec<(i32, i64)>, StoreError>;
}

/// The engine's storage collaborators, bundled for `AppState`.
#[derive(Clone)]
pub struct Stores {
    pub challenges: Arc<dyn ChallengeStore>,
    pub contests: Arc<dyn ContestStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub ledger: Arc<dyn SubmissionLedger>,
    pub teams: Arc<dyn TeamStore>,
    pub users: Arc<dyn UserStore>,
    pub achievements: Arc<dyn AchievementStore>,
    pub adjustments: Arc<dyn AdjustmentStore>,
}

impl Stores {
    /// Wire every collaborator to the SeaORM-backed store.
    pub fn orm(db: DatabaseConnection) -> Self {
        let store = Arc::new(orm::OrmStore::new(db));
        Self {
            challenges: store.clone(),
            contests: store.clone(),
            registrations: store.clone(),
            ledger: store.clone(),
            teams: store.clone(),
            users: store.clone(),
            achievements: store.clone(),
            adjustments: store,
        }
    }

    /// Wire every collaborator to a shared in-memory store.
    #[cfg(test)]
    pub fn memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            challenges: store.clone(),
            contests: store.clone(),
            registrations: store.clone(),
            ledger: store.clone(),
            teams: store.clone(),
            users: store.clone(),
            achievements: store.clone(),
            adjustments: store,
        }
    }
}
