use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::ActorUser;
use crate::models::contest::ContestResponse;
use crate::state::AppState;
use crate::store::StoreError;

/// The contest currently being served.
#[utoipa::path(
    get,
    path = "/active",
    tag = "Contests",
    operation_id = "getActiveContest",
    summary = "Get the active contest",
    responses(
        (status = 200, description = "Active contest", body = ContestResponse),
        (status = 404, description = "No active contest (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_active_contest(
    State(state): State<AppState>,
) -> Result<Json<ContestResponse>, AppError> {
    let contest = state
        .stores
        .contests
        .active_contest()
        .await?
        .ok_or_else(|| AppError::NotFound("No active contest".into()))?;
    Ok(Json(contest.into()))
}

/// Register the caller's team for a contest.
#[utoipa::path(
    post,
    path = "/{id}/registrations",
    tag = "Contests",
    operation_id = "registerTeam",
    summary = "Register the caller's team",
    description = "Registers the authenticated actor's team for the contest. Registration is mandatory before any round's challenges become visible to the team. Blocked after the contest ends. Returns 409 if already registered.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 201, description = "Team registered"),
        (status = 400, description = "No team, or contest ended (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor), fields(contest_id))]
pub async fn register_team(
    actor: ActorUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();

    let contest = state
        .stores
        .contests
        .contest(contest_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))?;

    if now >= contest.end_time {
        return Err(AppError::Validation("Contest has ended".into()));
    }

    let team = state
        .stores
        .teams
        .team_of_user(actor.user_id)
        .await?
        .ok_or_else(|| AppError::Validation("You must belong to a team to register".into()))?;

    match state
        .stores
        .registrations
        .register(contest.id, team.id, now)
        .await
    {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(StoreError::Conflict) => Err(AppError::Conflict("Already registered".into())),
        Err(e) => Err(e.into()),
    }
}
