use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::entity::round;
use crate::error::AppError;
use crate::store::Stores;

/// A round exposes its challenges at t iff t >= visible_from &&
/// t >= start_time && t <= end_time. A future `visible_from` hides a
/// round even when its play window has opened.
pub fn round_is_active(round: &round::Model, now: DateTime<Utc>) -> bool {
    now >= round.visible_from && now >= round.start_time && now <= round.end_time
}

/// The set of challenge ids currently exposed to a team.
///
/// Fails closed: no active contest, a closed contest window, a missing
/// team, or an unregistered team all yield the empty set. Registration
/// is mandatory — there is no anonymous access to contest challenges.
///
/// This gates challenge listing. Flag submission is gated separately by
/// the contest pause flag (plus this check only when
/// `submission.enforce_visibility` is configured).
#[instrument(skip(stores))]
pub async fn visible_challenge_ids(
    stores: &Stores,
    now: DateTime<Utc>,
    team_id: Option<i32>,
) -> Result<HashSet<i32>, AppError> {
    let Some(contest) = stores.contests.active_contest().await? else {
        return Ok(HashSet::new());
    };

    if now < contest.start_time || now > contest.end_time {
        return Ok(HashSet::new());
    }

    let Some(team_id) = team_id else {
        return Ok(HashSet::new());
    };
    if !stores.registrations.is_registered(contest.id, team_id).await? {
        return Ok(HashSet::new());
    }

    let rounds = stores.contests.rounds(contest.id).await?;
    let active_round_ids: Vec<i32> = rounds
        .iter()
        .filter(|r| round_is_active(r, now))
        .map(|r| r.id)
        .collect();

    let ids = stores.contests.round_challenge_ids(&active_round_ids).await?;
    Ok(ids.into_iter().collect())
}
