use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use common::AchievementKind;
use tracing::{info, instrument, warn};

use crate::config::AchievementConfig;
use crate::entity::{achievement, challenge, team, user};
use crate::store::{StoreError, Stores};

/// Night Owl covers local hours [0, 5).
const NIGHT_OWL_END_HOUR: u32 = 5;
/// Speed Demon requires this many solves within one local calendar day.
const SPEED_DEMON_THRESHOLD: usize = 5;

/// Everything the rules need about a freshly-scored solve. The
/// challenge carries its just-incremented solve count.
pub struct SolveContext<'a> {
    pub user: &'a user::Model,
    pub team: Option<&'a team::Model>,
    pub challenge: &'a challenge::Model,
    pub solved_at: DateTime<Utc>,
}

/// Run every badge rule for a newly-scored solve.
///
/// Rules are independent and idempotent: each is an exists-check
/// followed by an insert whose uniqueness conflict means another solve
/// got there first. A failing rule is logged and skipped — it never
/// fails the solve that triggered it.
#[instrument(skip(stores, config, ctx), fields(user_id = ctx.user.id, challenge_id = ctx.challenge.id))]
pub async fn evaluate(stores: &Stores, config: &AchievementConfig, ctx: &SolveContext<'_>) {
    if let Err(e) = first_blood(stores, ctx).await {
        warn!(error = %e, "first blood check failed");
    }
    if let Err(e) = category_master(stores, ctx).await {
        warn!(error = %e, "category master check failed");
    }
    if let Err(e) = night_owl(stores, config, ctx).await {
        warn!(error = %e, "night owl check failed");
    }
    if let Err(e) = speed_demon(stores, config, ctx).await {
        warn!(error = %e, "speed demon check failed");
    }
}

async fn first_blood(stores: &Stores, ctx: &SolveContext<'_>) -> Result<(), StoreError> {
    if ctx.challenge.solve_count != 1 {
        return Ok(());
    }
    award_once(
        stores,
        ctx,
        AchievementKind::FirstBlood,
        "",
        Some(ctx.challenge.id),
    )
    .await
}

async fn category_master(stores: &Stores, ctx: &SolveContext<'_>) -> Result<(), StoreError> {
    let category = ctx.challenge.category.as_str();
    if stores
        .achievements
        .has(ctx.user.id, AchievementKind::CategoryMaster, category)
        .await?
    {
        return Ok(());
    }

    let in_category = stores.challenges.challenges_in_category(category).await?;
    if in_category.is_empty() {
        return Ok(());
    }

    let solved: HashSet<i32> = stores
        .ledger
        .solves_by_user(ctx.user.id)
        .await?
        .into_iter()
        .map(|s| s.challenge_id)
        .collect();

    if in_category.iter().all(|c| solved.contains(&c.id)) {
        award_once(stores, ctx, AchievementKind::CategoryMaster, category, None).await?;
    }
    Ok(())
}

async fn night_owl(
    stores: &Stores,
    config: &AchievementConfig,
    ctx: &SolveContext<'_>,
) -> Result<(), StoreError> {
    let hour = local_time(ctx.solved_at, config.utc_offset_hours).hour();
    if hour >= NIGHT_OWL_END_HOUR {
        return Ok(());
    }
    award_once(stores, ctx, AchievementKind::NightOwl, "", Some(ctx.challenge.id)).await
}

async fn speed_demon(
    stores: &Stores,
    config: &AchievementConfig,
    ctx: &SolveContext<'_>,
) -> Result<(), StoreError> {
    let today = local_time(ctx.solved_at, config.utc_offset_hours).date_naive();
    let solves_today = stores
        .ledger
        .solves_by_user(ctx.user.id)
        .await?
        .into_iter()
        .filter(|s| local_time(s.solved_at, config.utc_offset_hours).date_naive() == today)
        .count();

    if solves_today < SPEED_DEMON_THRESHOLD {
        return Ok(());
    }
    award_once(stores, ctx, AchievementKind::SpeedDemon, "", None).await
}

/// Exists-check then conflict-tolerant insert; the composite key on the
/// achievement table closes the race between concurrent qualifying
/// solves.
async fn award_once(
    stores: &Stores,
    ctx: &SolveContext<'_>,
    kind: AchievementKind,
    category: &str,
    challenge_id: Option<i32>,
) -> Result<(), StoreError> {
    debug_assert_eq!(kind.is_category_scoped(), !category.is_empty());

    if stores.achievements.has(ctx.user.id, kind, category).await? {
        return Ok(());
    }

    let badge = achievement::Model {
        user_id: ctx.user.id,
        kind,
        category: category.to_string(),
        team_id: ctx.team.map(|t| t.id),
        challenge_id,
        earned_at: ctx.solved_at,
    };

    if stores.achievements.award(badge).await? {
        info!(user_id = ctx.user.id, kind = %kind, "achievement awarded");
    }
    Ok(())
}

fn local_time(at: DateTime<Utc>, utc_offset_hours: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600))
        .unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
}
