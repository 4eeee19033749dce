use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use crate::engine::visibility;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::ActorUser;
use crate::models::challenge::{ChallengeListResponse, ChallengeSummary};
use crate::state::AppState;

/// List the challenges currently visible to the caller.
#[utoipa::path(
    get,
    path = "/",
    tag = "Challenges",
    operation_id = "listChallenges",
    summary = "List visible challenges",
    description = "Returns the challenges exposed to the caller's team right now: active contest, open round windows, and team registration all apply. Solo players and unregistered teams see an empty list.",
    responses(
        (status = 200, description = "Visible challenges", body = ChallengeListResponse),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor))]
pub async fn list_challenges(
    actor: ActorUser,
    State(state): State<AppState>,
) -> Result<Json<ChallengeListResponse>, AppError> {
    let now = Utc::now();
    let team = state.stores.teams.team_of_user(actor.user_id).await?;

    let visible =
        visibility::visible_challenge_ids(&state.stores, now, team.map(|t| t.id)).await?;
    let ids: Vec<i32> = visible.into_iter().collect();

    let mut challenges = state.stores.challenges.challenges_by_ids(&ids).await?;
    challenges.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.title.cmp(&b.title)));

    let data: Vec<ChallengeSummary> = challenges.into_iter().map(Into::into).collect();
    Ok(Json(ChallengeListResponse { data }))
}
