use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{ScopeKind, current_points};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::engine::cache::TtlCache;
use crate::entity::{challenge, solve, team, user};
use crate::error::AppError;
use crate::store::Stores;

/// How a frozen board values its challenges.
///
/// `Live` is the historical behavior: the submission set is cut at the
/// freeze, but point values keep decaying with post-freeze solves, so a
/// frozen score can drop. `Frozen` values challenges at their solve
/// counts as of the freeze instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreezePolicy {
    #[default]
    Live,
    Frozen,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IndividualStanding {
    pub user_id: i32,
    pub username: String,
    pub score: i64,
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TeamStanding {
    pub team_id: i32,
    pub name: String,
    pub score: i64,
    pub member_ids: Vec<i32>,
    pub leader_id: i32,
}

/// Current value of every challenge, as a lookup table for aggregation.
///
/// Under the `Frozen` policy a frozen board derives each challenge's
/// solve count from the frozen solve set itself; otherwise the stored
/// (live) counter is used.
fn challenge_values(
    challenges: &[challenge::Model],
    solves: &[solve::Model],
    policy: FreezePolicy,
    frozen: bool,
) -> HashMap<i32, i32> {
    let frozen_counts: Option<HashMap<i32, i64>> = (policy == FreezePolicy::Frozen && frozen)
        .then(|| {
            let mut counts: HashMap<i32, i64> = HashMap::new();
            for s in solves {
                *counts.entry(s.challenge_id).or_default() += 1;
            }
            counts
        });

    challenges
        .iter()
        .map(|c| {
            let count = match &frozen_counts {
                Some(counts) => counts.get(&c.id).copied().unwrap_or(0),
                None => c.solve_count,
            };
            let value = current_points(c.scoring_type, c.max_points, c.min_points, c.decay, count);
            (c.id, value)
        })
        .collect()
}

/// Sum current challenge values per submitting user, apply user-targeted
/// adjustments, and order the board: score descending, username
/// ascending on ties.
fn rank_individuals(
    solves: &[solve::Model],
    values: &HashMap<i32, i32>,
    users: &[user::Model],
    team_names: &HashMap<i32, String>,
    adjustments: &[(i32, i64)],
) -> Vec<IndividualStanding> {
    let mut scores: HashMap<i32, i64> = HashMap::new();
    for s in solves {
        if let Some(value) = values.get(&s.challenge_id) {
            *scores.entry(s.user_id).or_default() += i64::from(*value);
        }
    }
    for (target_id, total) in adjustments {
        *scores.entry(*target_id).or_default() += total;
    }

    let mut standings: Vec<IndividualStanding> = users
        .iter()
        .filter_map(|u| {
            scores.get(&u.id).map(|score| IndividualStanding {
                user_id: u.id,
                username: u.username.clone(),
                score: *score,
                team_name: u.team_id.and_then(|tid| team_names.get(&tid).cloned()),
            })
        })
        .collect();

    standings.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
    standings
}

/// Sum current challenge values over each team's distinct solved
/// challenges (structural: the ledger holds one row per scope), apply
/// team-targeted adjustments, and include every team — a zero score is
/// a standing too.
fn rank_teams(
    solves: &[solve::Model],
    values: &HashMap<i32, i32>,
    teams: &[team::Model],
    members: &[user::Model],
    adjustments: &[(i32, i64)],
) -> Vec<TeamStanding> {
    let mut scores: HashMap<i32, i64> = teams.iter().map(|t| (t.id, 0)).collect();
    for s in solves {
        if s.scope_kind != ScopeKind::Team {
            continue;
        }
        if let (Some(value), Some(entry)) = (values.get(&s.challenge_id), scores.get_mut(&s.scope_id))
        {
            *entry += i64::from(*value);
        }
    }
    for (target_id, total) in adjustments {
        if let Some(entry) = scores.get_mut(target_id) {
            *entry += total;
        }
    }

    let mut members_by_team: HashMap<i32, Vec<i32>> = HashMap::new();
    for m in members {
        if let Some(tid) = m.team_id {
            members_by_team.entry(tid).or_default().push(m.id);
        }
    }
    for ids in members_by_team.values_mut() {
        ids.sort_unstable();
    }

    let mut standings: Vec<TeamStanding> = teams
        .iter()
        .map(|t| TeamStanding {
            team_id: t.id,
            name: t.name.clone(),
            score: scores.get(&t.id).copied().unwrap_or(0),
            member_ids: members_by_team.remove(&t.id).unwrap_or_default(),
            leader_id: t.leader_id,
        })
        .collect();

    standings.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    standings
}

/// Both leaderboard views, recomputed from the solve ledger on demand
/// and memoized behind a short TTL. The stored per-team accumulator is
/// never consulted here.
pub struct ScoreboardService {
    policy: FreezePolicy,
    individuals: TtlCache<bool, Vec<IndividualStanding>>,
    teams: TtlCache<bool, Vec<TeamStanding>>,
}

impl ScoreboardService {
    pub fn new(ttl: Duration, policy: FreezePolicy) -> Self {
        Self {
            policy,
            individuals: TtlCache::new(ttl),
            teams: TtlCache::new(ttl),
        }
    }

    /// The freeze cutoff, once it has passed. A future freeze restricts
    /// nothing and keeps the board live.
    async fn effective_freeze(&self, stores: &Stores) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(contest) = stores.contests.active_contest().await? else {
            return Ok(None);
        };
        Ok(contest.freeze_time.filter(|cutoff| Utc::now() >= *cutoff))
    }

    #[instrument(skip(self, stores))]
    pub async fn individual(&self, stores: &Stores) -> Result<Vec<IndividualStanding>, AppError> {
        let freeze = self.effective_freeze(stores).await?;
        let frozen = freeze.is_some();
        if let Some(board) = self.individuals.get(&frozen) {
            return Ok(board);
        }

        let solves = stores.ledger.solves(freeze).await?;
        let challenges = stores.challenges.challenges().await?;
        let values = challenge_values(&challenges, &solves, self.policy, frozen);
        let adjustments = stores.adjustments.totals(ScopeKind::User).await?;

        let mut user_ids: HashSet<i32> = solves.iter().map(|s| s.user_id).collect();
        user_ids.extend(adjustments.iter().map(|(id, _)| *id));
        let ids: Vec<i32> = user_ids.into_iter().collect();
        let users = stores.users.users_by_ids(&ids).await?;

        let team_names: HashMap<i32, String> = stores
            .teams
            .teams()
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let board = rank_individuals(&solves, &values, &users, &team_names, &adjustments);
        self.individuals.insert(frozen, board.clone());
        Ok(board)
    }

    #[instrument(skip(self, stores))]
    pub async fn team(&self, stores: &Stores) -> Result<Vec<TeamStanding>, AppError> {
        let freeze = self.effective_freeze(stores).await?;
        let frozen = freeze.is_some();
        if let Some(board) = self.teams.get(&frozen) {
            return Ok(board);
        }

        let solves = stores.ledger.solves(freeze).await?;
        let challenges = stores.challenges.challenges().await?;
        let values = challenge_values(&challenges, &solves, self.policy, frozen);
        let adjustments = stores.adjustments.totals(ScopeKind::Team).await?;

        let teams = stores.teams.teams().await?;
        let team_ids: Vec<i32> = teams.iter().map(|t| t.id).collect();
        let members = stores.users.users_in_teams(&team_ids).await?;

        let board = rank_teams(&solves, &values, &teams, &members, &adjustments);
        self.teams.insert(frozen, board.clone());
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;
    use common::{ActorScope, ScoringType};

    use crate::entity::contest;
    use crate::store::memory::MemoryStore;
    use crate::store::{NewAdjustment, NewAttempt};

    use super::*;

    fn service(policy: FreezePolicy) -> ScoreboardService {
        ScoreboardService::new(Duration::from_secs(60), policy)
    }

    fn uncached(policy: FreezePolicy) -> ScoreboardService {
        ScoreboardService::new(Duration::ZERO, policy)
    }

    fn contest_with_freeze(freeze: Option<DateTime<Utc>>) -> contest::Model {
        let now = Utc::now();
        contest::Model {
            id: 1,
            title: "finals".into(),
            description: String::new(),
            start_time: now - ChronoDuration::hours(10),
            end_time: now + ChronoDuration::hours(10),
            is_active: true,
            is_paused: false,
            freeze_time: freeze,
            created_at: now,
            updated_at: now,
        }
    }

    async fn solve_as(
        stores: &Stores,
        scope: ActorScope,
        user_id: i32,
        challenge_id: i32,
        at: DateTime<Utc>,
    ) {
        stores
            .ledger
            .record_correct(
                NewAttempt {
                    user_id,
                    team_id: scope.is_team().then_some(scope.id),
                    challenge_id,
                    flag_digest: String::new(),
                    is_correct: true,
                    submitted_at: at,
                },
                scope,
            )
            .await
            .unwrap();
        stores
            .challenges
            .increment_solve_count(challenge_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn individuals_rank_by_score_then_username() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_user(1, "zed", None);
        store.add_user(2, "amy", None);
        store.add_user(3, "kim", None);
        store.add_challenge(10, "a", "web", ScoringType::Static, 300, 300, 10, "f1");
        store.add_challenge(11, "b", "web", ScoringType::Static, 200, 200, 10, "f2");

        let now = Utc::now();
        // kim: 500, zed and amy tie at 300.
        solve_as(&stores, ActorScope::user(3), 3, 10, now).await;
        solve_as(&stores, ActorScope::user(3), 3, 11, now).await;
        solve_as(&stores, ActorScope::user(1), 1, 10, now).await;
        solve_as(&stores, ActorScope::user(2), 2, 10, now).await;

        let board = service(FreezePolicy::Live).individual(&stores).await.unwrap();
        let order: Vec<&str> = board.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(order, vec!["kim", "amy", "zed"]);
        assert_eq!(board[0].score, 500);
        assert_eq!(board[1].score, 300);
    }

    #[tokio::test]
    async fn individual_scores_drift_with_live_decay() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_user(1, "alice", None);
        store.add_user(2, "bob", None);
        store.add_challenge(10, "a", "web", ScoringType::Dynamic, 500, 100, 10, "f");

        let now = Utc::now();
        let board = uncached(FreezePolicy::Live);

        solve_as(&stores, ActorScope::user(1), 1, 10, now).await;
        let first = board.individual(&stores).await.unwrap();
        assert_eq!(first[0].score, 496);

        // A second solver reprices the challenge for everyone.
        solve_as(&stores, ActorScope::user(2), 2, 10, now).await;
        let second = board.individual(&stores).await.unwrap();
        assert_eq!(second[0].score, 484);
        assert_eq!(second[1].score, 484);
    }

    #[tokio::test]
    async fn user_adjustments_feed_the_individual_board() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_user(1, "alice", None);
        store.add_user(2, "bob", None);
        store.add_challenge(10, "a", "web", ScoringType::Static, 100, 100, 10, "f");

        solve_as(&stores, ActorScope::user(1), 1, 10, Utc::now()).await;
        stores
            .adjustments
            .create(NewAdjustment {
                target_kind: ScopeKind::User,
                target_id: 1,
                delta: -50,
                reason: "hint penalty".into(),
            })
            .await
            .unwrap();
        // An adjustment-only user still appears.
        stores
            .adjustments
            .create(NewAdjustment {
                target_kind: ScopeKind::User,
                target_id: 2,
                delta: 25,
                reason: "writeup bonus".into(),
            })
            .await
            .unwrap();

        let board = uncached(FreezePolicy::Live).individual(&stores).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].score, 50);
        assert_eq!(board[1].username, "bob");
        assert_eq!(board[1].score, 25);
    }

    #[tokio::test]
    async fn team_board_recomputes_from_the_ledger_not_the_accumulator() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_team(7, "hackers", 1);
        store.add_team(8, "idlers", 3);
        store.add_user(1, "alice", Some(7));
        store.add_user(2, "bob", Some(7));
        store.add_user(3, "carol", Some(8));
        store.add_challenge(10, "a", "web", ScoringType::Dynamic, 500, 100, 10, "f");

        solve_as(&stores, ActorScope::team(7), 1, 10, Utc::now()).await;
        // Inflate the stored accumulator; the board must not read it.
        stores.teams.add_score(7, 10_000).await.unwrap();

        let board = uncached(FreezePolicy::Live).team(&stores).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "hackers");
        assert_eq!(board[0].score, 496);
        assert_eq!(board[0].member_ids, vec![1, 2]);
        assert_eq!(board[0].leader_id, 1);
        // Teams without solves still appear.
        assert_eq!(board[1].name, "idlers");
        assert_eq!(board[1].score, 0);
    }

    #[tokio::test]
    async fn team_adjustments_feed_the_team_board() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_team(7, "hackers", 1);
        store.add_team(8, "rivals", 2);
        store.add_user(1, "alice", Some(7));
        store.add_user(2, "bob", Some(8));
        store.add_challenge(10, "a", "web", ScoringType::Static, 100, 100, 10, "f");

        solve_as(&stores, ActorScope::team(7), 1, 10, Utc::now()).await;
        solve_as(&stores, ActorScope::team(8), 2, 10, Utc::now()).await;
        stores
            .adjustments
            .create(NewAdjustment {
                target_kind: ScopeKind::Team,
                target_id: 8,
                delta: 40,
                reason: "unlock compensation".into(),
            })
            .await
            .unwrap();

        let board = uncached(FreezePolicy::Live).team(&stores).await.unwrap();
        assert_eq!(board[0].name, "rivals");
        assert_eq!(board[0].score, 140);
        assert_eq!(board[1].score, 100);
    }

    /// One pre-freeze solve by alice, one post-freeze solve by bob. The
    /// frozen set holds only alice's solve either way; the policies
    /// disagree on what it is worth.
    async fn freeze_fixture() -> (Stores, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        let now = Utc::now();
        store.add_contest(contest_with_freeze(Some(now - ChronoDuration::hours(1))));
        store.add_user(1, "alice", None);
        store.add_user(2, "bob", None);
        store.add_challenge(10, "a", "web", ScoringType::Dynamic, 500, 100, 10, "f");

        solve_as(&stores, ActorScope::user(1), 1, 10, now - ChronoDuration::hours(2)).await;
        solve_as(&stores, ActorScope::user(2), 2, 10, now).await;
        (stores, store)
    }

    #[tokio::test]
    async fn frozen_board_hides_post_freeze_solves() {
        let (stores, _) = freeze_fixture().await;
        let board = uncached(FreezePolicy::Live).individual(&stores).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username, "alice");
    }

    #[tokio::test]
    async fn live_policy_prices_frozen_solves_at_live_decay() {
        let (stores, _) = freeze_fixture().await;
        let board = uncached(FreezePolicy::Live).individual(&stores).await.unwrap();
        // Two solves exist live, so the frozen board shows the fully
        // decayed value — a frozen score can drop under this policy.
        assert_eq!(board[0].score, 484);
    }

    #[tokio::test]
    async fn frozen_policy_prices_solves_as_of_the_freeze() {
        let (stores, _) = freeze_fixture().await;
        let board = uncached(FreezePolicy::Frozen).individual(&stores).await.unwrap();
        // Only alice's solve exists at the freeze, so the challenge is
        // priced at one solve.
        assert_eq!(board[0].score, 496);
    }

    #[tokio::test]
    async fn standings_are_served_stale_within_the_ttl() {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        store.add_contest(contest_with_freeze(None));
        store.add_user(1, "alice", None);
        store.add_user(2, "bob", None);
        store.add_challenge(10, "a", "web", ScoringType::Static, 100, 100, 10, "f");

        let cached = service(FreezePolicy::Live);
        solve_as(&stores, ActorScope::user(1), 1, 10, Utc::now()).await;
        let first = cached.individual(&stores).await.unwrap();
        assert_eq!(first.len(), 1);

        // A solve landing inside the TTL is invisible until expiry.
        solve_as(&stores, ActorScope::user(2), 2, 10, Utc::now()).await;
        let second = cached.individual(&stores).await.unwrap();
        assert_eq!(second.len(), 1);

        let fresh = uncached(FreezePolicy::Live).individual(&stores).await.unwrap();
        assert_eq!(fresh.len(), 2);
    }
}
