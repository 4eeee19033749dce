use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AchievementKind, ActorScope, ScopeKind};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, OnConflict};
use sea_orm::*;

use crate::entity::{
    achievement, challenge, contest, contest_team, round, round_challenge, score_adjustment, solve,
    submission, team, user,
};

use super::{
    AchievementStore, AdjustmentStore, ChallengeStore, ContestStore, NewAdjustment, NewAttempt,
    RegistrationStore, StoreError, SubmissionLedger, TeamStore, UserStore,
};

/// SeaORM-backed implementation of every storage collaborator.
///
/// Uniqueness violations on the solve and achievement tables are mapped
/// to `StoreError::Conflict` / "already held" here, so callers never see
/// a raw database error for the concurrent-duplicate case.
pub struct OrmStore {
    db: DatabaseConnection,
}

impl OrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn attempt_active_model(attempt: &NewAttempt) -> submission::ActiveModel {
    submission::ActiveModel {
        user_id: Set(attempt.user_id),
        team_id: Set(attempt.team_id),
        challenge_id: Set(attempt.challenge_id),
        flag_digest: Set(attempt.flag_digest.clone()),
        is_correct: Set(attempt.is_correct),
        created_at: Set(attempt.submitted_at),
        ..Default::default()
    }
}

#[async_trait]
impl ChallengeStore for OrmStore {
    async fn challenge(&self, id: i32) -> Result<Option<challenge::Model>, StoreError> {
        Ok(challenge::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn challenges(&self) -> Result<Vec<challenge::Model>, StoreError> {
        Ok(challenge::Entity::find().all(&self.db).await?)
    }

    async fn challenges_by_ids(&self, ids: &[i32]) -> Result<Vec<challenge::Model>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(challenge::Entity::find()
            .filter(challenge::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?)
    }

    async fn challenges_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<challenge::Model>, StoreError> {
        Ok(challenge::Entity::find()
            .filter(challenge::Column::Category.eq(category))
            .all(&self.db)
            .await?)
    }

    async fn increment_solve_count(&self, id: i32) -> Result<challenge::Model, StoreError> {
        let updated = challenge::Entity::update_many()
            .col_expr(
                challenge::Column::SolveCount,
                Expr::col(challenge::Column::SolveCount).add(1),
            )
            .filter(challenge::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await?;

        updated.into_iter().next().ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ContestStore for OrmStore {
    async fn active_contest(&self) -> Result<Option<contest::Model>, StoreError> {
        Ok(contest::Entity::find()
            .filter(contest::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    async fn contest(&self, id: i32) -> Result<Option<contest::Model>, StoreError> {
        Ok(contest::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn rounds(&self, contest_id: i32) -> Result<Vec<round::Model>, StoreError> {
        Ok(round::Entity::find()
            .filter(round::Column::ContestId.eq(contest_id))
            .order_by_asc(round::Column::StartTime)
            .all(&self.db)
            .await?)
    }

    async fn round_challenge_ids(&self, round_ids: &[i32]) -> Result<Vec<i32>, StoreError> {
        if round_ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(round_challenge::Entity::find()
            .filter(round_challenge::Column::RoundId.is_in(round_ids.to_vec()))
            .select_only()
            .column(round_challenge::Column::ChallengeId)
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    async fn set_paused(&self, contest_id: i32, paused: bool) -> Result<(), StoreError> {
        let result = contest::Entity::update_many()
            .col_expr(contest::Column::IsPaused, Expr::value(paused))
            .col_expr(contest::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(contest::Column::Id.eq(contest_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for OrmStore {
    async fn is_registered(&self, contest_id: i32, team_id: i32) -> Result<bool, StoreError> {
        Ok(contest_team::Entity::find_by_id((contest_id, team_id))
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn register(
        &self,
        contest_id: i32,
        team_id: i32,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let registration = contest_team::ActiveModel {
            contest_id: Set(contest_id),
            team_id: Set(team_id),
            registered_at: Set(at),
        };

        match registration.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SubmissionLedger for OrmStore {
    async fn find_solve(
        &self,
        challenge_id: i32,
        scope: ActorScope,
    ) -> Result<Option<solve::Model>, StoreError> {
        Ok(
            solve::Entity::find_by_id((challenge_id, scope.kind, scope.id))
                .one(&self.db)
                .await?,
        )
    }

    async fn record_incorrect(
        &self,
        attempt: NewAttempt,
    ) -> Result<submission::Model, StoreError> {
        Ok(attempt_active_model(&attempt).insert(&self.db).await?)
    }

    async fn record_correct(
        &self,
        attempt: NewAttempt,
        scope: ActorScope,
    ) -> Result<(submission::Model, solve::Model), StoreError> {
        let txn = self.db.begin().await?;

        let recorded = attempt_active_model(&attempt).insert(&txn).await?;

        let new_solve = solve::ActiveModel {
            challenge_id: Set(attempt.challenge_id),
            scope_kind: Set(scope.kind),
            scope_id: Set(scope.id),
            user_id: Set(attempt.user_id),
            submission_id: Set(recorded.id),
            solved_at: Set(attempt.submitted_at),
        };

        // Dropping the transaction on the conflict path rolls the
        // attempt row back as well, so a concurrent duplicate leaves no
        // trace.
        let solved = match new_solve.insert(&txn).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => return Err(StoreError::Conflict),
            Err(e) => return Err(e.into()),
        };

        txn.commit().await?;
        Ok((recorded, solved))
    }

    async fn solves(&self, up_to: Option<DateTime<Utc>>) -> Result<Vec<solve::Model>, StoreError> {
        let mut select = solve::Entity::find();
        if let Some(cutoff) = up_to {
            select = select.filter(solve::Column::SolvedAt.lte(cutoff));
        }
        Ok(select.all(&self.db).await?)
    }

    async fn solves_by_user(&self, user_id: i32) -> Result<Vec<solve::Model>, StoreError> {
        Ok(solve::Entity::find()
            .filter(solve::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl TeamStore for OrmStore {
    async fn team(&self, id: i32) -> Result<Option<team::Model>, StoreError> {
        Ok(team::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn team_of_user(&self, user_id: i32) -> Result<Option<team::Model>, StoreError> {
        let Some(member) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Ok(None);
        };
        let Some(team_id) = member.team_id else {
            return Ok(None);
        };
        Ok(team::Entity::find_by_id(team_id).one(&self.db).await?)
    }

    async fn teams(&self) -> Result<Vec<team::Model>, StoreError> {
        Ok(team::Entity::find().all(&self.db).await?)
    }

    async fn add_score(&self, team_id: i32, delta: i32) -> Result<(), StoreError> {
        let result = team::Entity::update_many()
            .col_expr(team::Column::Score, Expr::col(team::Column::Score).add(delta))
            .filter(team::Column::Id.eq(team_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for OrmStore {
    async fn user(&self, id: i32) -> Result<Option<user::Model>, StoreError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<user::Model>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(user::Entity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?)
    }

    async fn users_in_teams(&self, team_ids: &[i32]) -> Result<Vec<user::Model>, StoreError> {
        if team_ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(user::Entity::find()
            .filter(user::Column::TeamId.is_in(team_ids.to_vec()))
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl AchievementStore for OrmStore {
    async fn has(
        &self,
        user_id: i32,
        kind: AchievementKind,
        category: &str,
    ) -> Result<bool, StoreError> {
        Ok(
            achievement::Entity::find_by_id((user_id, kind, category.to_string()))
                .one(&self.db)
                .await?
                .is_some(),
        )
    }

    async fn award(&self, badge: achievement::Model) -> Result<bool, StoreError> {
        let model = achievement::ActiveModel {
            user_id: Set(badge.user_id),
            kind: Set(badge.kind),
            category: Set(badge.category),
            team_id: Set(badge.team_id),
            challenge_id: Set(badge.challenge_id),
            earned_at: Set(badge.earned_at),
        };

        let result = achievement::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    achievement::Column::UserId,
                    achievement::Column::Kind,
                    achievement::Column::Category,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AdjustmentStore for OrmStore {
    async fn create(
        &self,
        adjustment: NewAdjustment,
    ) -> Result<score_adjustment::Model, StoreError> {
        let model = score_adjustment::ActiveModel {
            target_kind: Set(adjustment.target_kind),
            target_id: Set(adjustment.target_id),
            delta: Set(adjustment.delta),
            reason: Set(adjustment.reason),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn totals(&self, kind: ScopeKind) -> Result<Vec<(i32, i64)>, StoreError> {
        Ok(score_adjustment::Entity::find()
            .select_only()
            .column(score_adjustment::Column::TargetId)
            .column_as(score_adjustment::Column::Delta.sum(), "total")
            .filter(score_adjustment::Column::TargetKind.eq(kind))
            .group_by(score_adjustment::Column::TargetId)
            .into_tuple()
            .all(&self.db)
            .await?)
    }
}
