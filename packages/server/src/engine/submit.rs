use chrono::Utc;
use common::event::{ScoreboardUpdateEvent, SolveFeedEvent};
use common::{ActorScope, FlagDigest, current_points};
use tracing::{info, instrument};

use crate::config::{AchievementConfig, SubmissionConfig};
use crate::engine::achievements::{self, SolveContext};
use crate::engine::events::EventBus;
use crate::engine::visibility;
use crate::entity::challenge;
use crate::error::AppError;
use crate::store::{NewAttempt, StoreError, Stores};

/// Result of a flag submission. `already_solved` is a success variant:
/// the scope had a scored solve before this attempt, so nothing new was
/// recorded or scored.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub is_correct: bool,
    pub already_solved: bool,
    pub points: Option<i32>,
    pub solve_count: Option<i64>,
    pub team_name: Option<String>,
}

fn points_of(challenge: &challenge::Model) -> i32 {
    current_points(
        challenge.scoring_type,
        challenge.max_points,
        challenge.min_points,
        challenge.decay,
        challenge.solve_count,
    )
}

/// Turn a flag submission into at most one scored solve.
///
/// The attempt and its solve row are one transaction; the solve table's
/// composite key makes the existing-solve check and the insert atomic
/// with respect to concurrent submitters in the same scope, and a
/// conflict comes back as the `already_solved` outcome rather than an
/// error. The solve-count increment is a storage-level atomic, so the
/// decay formula always sees a consistent counter.
#[instrument(skip(stores, events, submission_config, achievement_config, flag))]
pub async fn submit(
    stores: &Stores,
    events: &EventBus,
    submission_config: &SubmissionConfig,
    achievement_config: &AchievementConfig,
    user_id: i32,
    challenge_id: i32,
    flag: &str,
) -> Result<SubmitOutcome, AppError> {
    let flag = flag.trim();
    if flag.is_empty() || flag.chars().count() > submission_config.max_flag_length {
        return Err(AppError::Validation(format!(
            "Flag must be 1-{} characters",
            submission_config.max_flag_length
        )));
    }

    let now = Utc::now();

    // Coarse platform-wide gate; round/registration visibility does not
    // apply here unless enforce_visibility is configured.
    if let Some(contest) = stores.contests.active_contest().await?
        && contest.is_paused
    {
        return Err(AppError::ContestPaused);
    }

    let user = stores
        .users
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let challenge = stores
        .challenges
        .challenge(challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))?;

    let team = stores.teams.team_of_user(user.id).await?;
    let team_name = team.as_ref().map(|t| t.name.clone());

    if submission_config.enforce_visibility {
        let visible =
            visibility::visible_challenge_ids(stores, now, team.as_ref().map(|t| t.id)).await?;
        if !visible.contains(&challenge.id) {
            // Same shape as a missing challenge, to prevent probing.
            return Err(AppError::NotFound("Challenge not found".into()));
        }
    }

    let scope = match &team {
        Some(t) => ActorScope::team(t.id),
        None => ActorScope::user(user.id),
    };

    let digest = FlagDigest::compute(flag);
    let is_correct = digest.to_hex() == challenge.flag_digest;

    if stores.ledger.find_solve(challenge.id, scope).await?.is_some() {
        return Ok(SubmitOutcome {
            is_correct,
            already_solved: true,
            points: Some(points_of(&challenge)),
            solve_count: Some(challenge.solve_count),
            team_name,
        });
    }

    let attempt = NewAttempt {
        user_id: user.id,
        team_id: team.as_ref().map(|t| t.id),
        challenge_id: challenge.id,
        flag_digest: digest.to_hex(),
        is_correct,
        submitted_at: now,
    };

    if !is_correct {
        stores.ledger.record_incorrect(attempt).await?;
        return Ok(SubmitOutcome {
            is_correct: false,
            already_solved: false,
            points: None,
            solve_count: None,
            team_name,
        });
    }

    match stores.ledger.record_correct(attempt, scope).await {
        Ok(_) => {}
        Err(StoreError::Conflict) => {
            // A teammate (or a concurrent request) won the race. Their
            // solve is the scored one; report it like any other
            // already-solved case.
            let latest = stores
                .challenges
                .challenge(challenge.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Challenge not found".into()))?;
            return Ok(SubmitOutcome {
                is_correct: true,
                already_solved: true,
                points: Some(points_of(&latest)),
                solve_count: Some(latest.solve_count),
                team_name,
            });
        }
        Err(e) => return Err(e.into()),
    }

    let updated = stores.challenges.increment_solve_count(challenge.id).await?;

    // The solver is awarded the value at the count excluding their own
    // solve; from here on the boards reprice every solve at the new
    // count.
    let points = current_points(
        updated.scoring_type,
        updated.max_points,
        updated.min_points,
        updated.decay,
        updated.solve_count - 1,
    );

    if let Some(t) = &team {
        stores.teams.add_score(t.id, points).await?;
    }

    achievements::evaluate(
        stores,
        achievement_config,
        &SolveContext {
            user: &user,
            team: team.as_ref(),
            challenge: &updated,
            solved_at: now,
        },
    )
    .await;

    events.publish(&SolveFeedEvent::new(
        user.id,
        user.username.clone(),
        updated.id,
        points,
        updated.solve_count,
        team_name.clone(),
        now,
    ));
    events.publish(&ScoreboardUpdateEvent {
        challenge_id: updated.id,
    });

    info!(
        user_id = user.id,
        challenge_id = updated.id,
        points,
        solve_count = updated.solve_count,
        "flag solved"
    );

    Ok(SubmitOutcome {
        is_correct: true,
        already_solved: false,
        points: Some(points),
        solve_count: Some(updated.solve_count),
        team_name,
    })
}
