use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ScopeKind;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::ActorUser;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    AdjustmentResponse, CreateAdjustmentRequest, validate_create_adjustment,
};
use crate::state::AppState;
use crate::store::NewAdjustment;

/// Record a manual score correction.
#[utoipa::path(
    post,
    path = "/adjustments",
    tag = "Admin",
    operation_id = "createAdjustment",
    summary = "Create a score adjustment",
    description = "Records an out-of-band score correction against a user or team. Consumed by the matching scoreboard view as an additive term. Requires the `admin` role.",
    request_body = CreateAdjustmentRequest,
    responses(
        (status = 201, description = "Adjustment recorded", body = AdjustmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Target not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor, payload))]
pub async fn create_adjustment(
    actor: ActorUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAdjustmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_role("admin")?;
    validate_create_adjustment(&payload)?;

    match payload.target_kind {
        ScopeKind::User => {
            state
                .stores
                .users
                .user(payload.target_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        }
        ScopeKind::Team => {
            state
                .stores
                .teams
                .team(payload.target_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Team not found".into()))?;
        }
    }

    let model = state
        .stores
        .adjustments
        .create(NewAdjustment {
            target_kind: payload.target_kind,
            target_id: payload.target_id,
            delta: payload.delta,
            reason: payload.reason.trim().to_string(),
        })
        .await?;

    info!(
        target_kind = %model.target_kind,
        target_id = model.target_id,
        delta = model.delta,
        "score adjustment recorded"
    );

    Ok((StatusCode::CREATED, Json(AdjustmentResponse::from(model))))
}

/// Pause submissions platform-wide.
#[utoipa::path(
    post,
    path = "/contests/{id}/pause",
    tag = "Admin",
    operation_id = "pauseContest",
    summary = "Pause a contest",
    description = "Sets the coarse submission gate: all flag submissions are rejected until the contest is resumed. Requires the `admin` role.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Contest paused"),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor), fields(contest_id))]
pub async fn pause_contest(
    actor: ActorUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    actor.require_role("admin")?;
    state.stores.contests.set_paused(contest_id, true).await?;
    info!(contest_id, "contest paused");
    Ok(StatusCode::NO_CONTENT)
}

/// Resume submissions.
#[utoipa::path(
    delete,
    path = "/contests/{id}/pause",
    tag = "Admin",
    operation_id = "resumeContest",
    summary = "Resume a contest",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Contest resumed"),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor), fields(contest_id))]
pub async fn resume_contest(
    actor: ActorUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    actor.require_role("admin")?;
    state.stores.contests.set_paused(contest_id, false).await?;
    info!(contest_id, "contest resumed");
    Ok(StatusCode::NO_CONTENT)
}
