//! In-memory store used by the engine's unit tests.
//!
//! Mirrors the uniqueness and atomic-increment semantics of the SeaORM
//! store behind a single mutex, so concurrent-duplicate tests observe
//! the same conflict behavior the database enforces.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AchievementKind, ActorScope, FlagDigest, ScopeKind, ScoringType};

use crate::entity::{
    achievement, challenge, contest, round, score_adjustment, solve, submission, team, user,
};

use super::{
    AchievementStore, AdjustmentStore, ChallengeStore, ContestStore, NewAdjustment, NewAttempt,
    RegistrationStore, StoreError, SubmissionLedger, TeamStore, UserStore,
};

#[derive(Default)]
struct Inner {
    users: HashMap<i32, user::Model>,
    teams: HashMap<i32, team::Model>,
    contests: HashMap<i32, contest::Model>,
    rounds: Vec<round::Model>,
    round_challenges: Vec<(i32, i32)>,
    registrations: HashSet<(i32, i32)>,
    challenges: HashMap<i32, challenge::Model>,
    submissions: Vec<submission::Model>,
    solves: Vec<solve::Model>,
    achievements: Vec<achievement::Model>,
    adjustments: Vec<score_adjustment::Model>,
    next_submission_id: i32,
    next_adjustment_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    pub fn add_user(&self, id: i32, username: &str, team_id: Option<i32>) {
        self.lock().users.insert(
            id,
            user::Model {
                id,
                username: username.to_string(),
                team_id,
                created_at: Utc::now(),
            },
        );
    }

    pub fn add_team(&self, id: i32, name: &str, leader_id: i32) {
        self.lock().teams.insert(
            id,
            team::Model {
                id,
                name: name.to_string(),
                leader_id,
                score: 0,
                created_at: Utc::now(),
            },
        );
    }

    pub fn add_contest(&self, contest: contest::Model) {
        self.lock().contests.insert(contest.id, contest);
    }

    pub fn add_round(&self, round: round::Model) {
        self.lock().rounds.push(round);
    }

    pub fn attach_challenge(&self, round_id: i32, challenge_id: i32) {
        self.lock().round_challenges.push((round_id, challenge_id));
    }

    pub fn add_registration(&self, contest_id: i32, team_id: i32) {
        self.lock().registrations.insert((contest_id, team_id));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_challenge(
        &self,
        id: i32,
        title: &str,
        category: &str,
        scoring_type: ScoringType,
        max_points: i32,
        min_points: i32,
        decay: i32,
        flag: &str,
    ) {
        self.lock().challenges.insert(
            id,
            challenge::Model {
                id,
                title: title.to_string(),
                category: category.to_string(),
                description: String::new(),
                scoring_type,
                max_points,
                min_points,
                decay,
                solve_count: 0,
                flag_digest: FlagDigest::compute(flag).to_hex(),
                created_at: Utc::now(),
            },
        );
    }

    pub fn team_score(&self, team_id: i32) -> i64 {
        self.lock().teams.get(&team_id).map(|t| t.score).unwrap_or(0)
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }

    pub fn submissions(&self) -> Vec<submission::Model> {
        self.lock().submissions.clone()
    }

    pub fn solve_count(&self) -> usize {
        self.lock().solves.len()
    }

    pub fn achievements_for(&self, user_id: i32) -> Vec<achievement::Model> {
        self.lock()
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn backdate_solves(&self, solved_at: DateTime<Utc>) {
        for s in self.lock().solves.iter_mut() {
            s.solved_at = solved_at;
        }
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn challenge(&self, id: i32) -> Result<Option<challenge::Model>, StoreError> {
        Ok(self.lock().challenges.get(&id).cloned())
    }

    async fn challenges(&self) -> Result<Vec<challenge::Model>, StoreError> {
        Ok(self.lock().challenges.values().cloned().collect())
    }

    async fn challenges_by_ids(&self, ids: &[i32]) -> Result<Vec<challenge::Model>, StoreError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.challenges.get(id).cloned())
            .collect())
    }

    async fn challenges_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<challenge::Model>, StoreError> {
        Ok(self
            .lock()
            .challenges
            .values()
            .filter(|c| c.category == category)
            .cloned()
            .collect())
    }

    async fn increment_solve_count(&self, id: i32) -> Result<challenge::Model, StoreError> {
        let mut inner = self.lock();
        let row = inner.challenges.get_mut(&id).ok_or(StoreError::NotFound)?;
        row.solve_count += 1;
        Ok(row.clone())
    }
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn active_contest(&self) -> Result<Option<contest::Model>, StoreError> {
        Ok(self
            .lock()
            .contests
            .values()
            .find(|c| c.is_active)
            .cloned())
    }

    async fn contest(&self, id: i32) -> Result<Option<contest::Model>, StoreError> {
        Ok(self.lock().contests.get(&id).cloned())
    }

    async fn rounds(&self, contest_id: i32) -> Result<Vec<round::Model>, StoreError> {
        Ok(self
            .lock()
            .rounds
            .iter()
            .filter(|r| r.contest_id == contest_id)
            .cloned()
            .collect())
    }

    async fn round_challenge_ids(&self, round_ids: &[i32]) -> Result<Vec<i32>, StoreError> {
        Ok(self
            .lock()
            .round_challenges
            .iter()
            .filter(|(round_id, _)| round_ids.contains(round_id))
            .map(|&(_, challenge_id)| challenge_id)
            .collect())
    }

    async fn set_paused(&self, contest_id: i32, paused: bool) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let row = inner
            .contests
            .get_mut(&contest_id)
            .ok_or(StoreError::NotFound)?;
        row.is_paused = paused;
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn is_registered(&self, contest_id: i32, team_id: i32) -> Result<bool, StoreError> {
        Ok(self.lock().registrations.contains(&(contest_id, team_id)))
    }

    async fn register(
        &self,
        contest_id: i32,
        team_id: i32,
        _at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if !self.lock().registrations.insert((contest_id, team_id)) {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionLedger for MemoryStore {
    async fn find_solve(
        &self,
        challenge_id: i32,
        scope: ActorScope,
    ) -> Result<Option<solve::Model>, StoreError> {
        Ok(self
            .lock()
            .solves
            .iter()
            .find(|s| {
                s.challenge_id == challenge_id
                    && s.scope_kind == scope.kind
                    && s.scope_id == scope.id
            })
            .cloned())
    }

    async fn record_incorrect(
        &self,
        attempt: NewAttempt,
    ) -> Result<submission::Model, StoreError> {
        let mut inner = self.lock();
        inner.next_submission_id += 1;
        let row = submission::Model {
            id: inner.next_submission_id,
            user_id: attempt.user_id,
            team_id: attempt.team_id,
            challenge_id: attempt.challenge_id,
            flag_digest: attempt.flag_digest,
            is_correct: attempt.is_correct,
            created_at: attempt.submitted_at,
        };
        inner.submissions.push(row.clone());
        Ok(row)
    }

    async fn record_correct(
        &self,
        attempt: NewAttempt,
        scope: ActorScope,
    ) -> Result<(submission::Model, solve::Model), StoreError> {
        let mut inner = self.lock();

        // Both inserts happen under the one lock; the duplicate check is
        // the in-memory equivalent of the solve primary key.
        let duplicate = inner.solves.iter().any(|s| {
            s.challenge_id == attempt.challenge_id
                && s.scope_kind == scope.kind
                && s.scope_id == scope.id
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        inner.next_submission_id += 1;
        let recorded = submission::Model {
            id: inner.next_submission_id,
            user_id: attempt.user_id,
            team_id: attempt.team_id,
            challenge_id: attempt.challenge_id,
            flag_digest: attempt.flag_digest,
            is_correct: attempt.is_correct,
            created_at: attempt.submitted_at,
        };
        let solved = solve::Model {
            challenge_id: attempt.challenge_id,
            scope_kind: scope.kind,
            scope_id: scope.id,
            user_id: attempt.user_id,
            submission_id: recorded.id,
            solved_at: attempt.submitted_at,
        };
        inner.submissions.push(recorded.clone());
        inner.solves.push(solved.clone());
        Ok((recorded, solved))
    }

    async fn solves(&self, up_to: Option<DateTime<Utc>>) -> Result<Vec<solve::Model>, StoreError> {
        Ok(self
            .lock()
            .solves
            .iter()
            .filter(|s| up_to.is_none_or(|cutoff| s.solved_at <= cutoff))
            .cloned()
            .collect())
    }

    async fn solves_by_user(&self, user_id: i32) -> Result<Vec<solve::Model>, StoreError> {
        Ok(self
            .lock()
            .solves
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn team(&self, id: i32) -> Result<Option<team::Model>, StoreError> {
        Ok(self.lock().teams.get(&id).cloned())
    }

    async fn team_of_user(&self, user_id: i32) -> Result<Option<team::Model>, StoreError> {
        let inner = self.lock();
        let Some(member) = inner.users.get(&user_id) else {
            return Ok(None);
        };
        Ok(member.team_id.and_then(|tid| inner.teams.get(&tid).cloned()))
    }

    async fn teams(&self) -> Result<Vec<team::Model>, StoreError> {
        Ok(self.lock().teams.values().cloned().collect())
    }

    async fn add_score(&self, team_id: i32, delta: i32) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let row = inner.teams.get_mut(&team_id).ok_or(StoreError::NotFound)?;
        row.score += i64::from(delta);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user(&self, id: i32) -> Result<Option<user::Model>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn users_in_teams(&self, team_ids: &[i32]) -> Result<Vec<user::Model>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.team_id.is_some_and(|tid| team_ids.contains(&tid)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AchievementStore for MemoryStore {
    async fn has(
        &self,
        user_id: i32,
        kind: AchievementKind,
        category: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .achievements
            .iter()
            .any(|a| a.user_id == user_id && a.kind == kind && a.category == category))
    }

    async fn award(&self, badge: achievement::Model) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let held = inner
            .achievements
            .iter()
            .any(|a| a.user_id == badge.user_id && a.kind == badge.kind && a.category == badge.category);
        if held {
            return Ok(false);
        }
        inner.achievements.push(badge);
        Ok(true)
    }
}

#[async_trait]
impl AdjustmentStore for MemoryStore {
    async fn create(
        &self,
        adjustment: NewAdjustment,
    ) -> Result<score_adjustment::Model, StoreError> {
        let mut inner = self.lock();
        inner.next_adjustment_id += 1;
        let row = score_adjustment::Model {
            id: inner.next_adjustment_id,
            target_kind: adjustment.target_kind,
            target_id: adjustment.target_id,
            delta: adjustment.delta,
            reason: adjustment.reason,
            created_at: Utc::now(),
        };
        inner.adjustments.push(row.clone());
        Ok(row)
    }

    async fn totals(&self, kind: ScopeKind) -> Result<Vec<(i32, i64)>, StoreError> {
        let mut sums: HashMap<i32, i64> = HashMap::new();
        for adj in self
            .lock()
            .adjustments
            .iter()
            .filter(|a| a.target_kind == kind)
        {
            *sums.entry(adj.target_id).or_default() += i64::from(adj.delta);
        }
        Ok(sums.into_iter().collect())
    }
}
