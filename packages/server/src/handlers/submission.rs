use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use tokio::time::timeout;
use tracing::instrument;

use crate::engine::submit;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::ActorUser;
use crate::extractors::json::AppJson;
use crate::models::submission::{SubmitFlagRequest, SubmitFlagResponse};
use crate::state::AppState;

/// Submit a flag for a challenge.
#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "submitFlag",
    summary = "Submit a flag",
    description = "Checks the guess against the challenge and, when newly correct, records the solve, reprices the challenge, and credits the actor's scope. Resubmissions after a scored solve are accepted but inert. Submissions are rejected platform-wide while the contest is paused.",
    params(
        ("id" = i32, Path, description = "Challenge ID")
    ),
    request_body = SubmitFlagRequest,
    responses(
        (status = 200, description = "Submission outcome", body = SubmitFlagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (IDENTITY_MISSING, IDENTITY_INVALID)", body = ErrorBody),
        (status = 403, description = "Contest paused (CONTEST_PAUSED)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
        (status = 504, description = "Deadline exceeded (DEADLINE_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, actor, payload), fields(user_id = actor.user_id, challenge_id = %challenge_id))]
pub async fn submit_flag(
    actor: ActorUser,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
    AppJson(payload): AppJson<SubmitFlagRequest>,
) -> Result<Json<SubmitFlagResponse>, AppError> {
    let deadline = Duration::from_secs(state.config.server.request_timeout_secs);

    // A timed-out solve is surfaced, never retried: retrying a possibly
    // already-applied solve risks double scoring.
    let outcome = timeout(
        deadline,
        submit::submit(
            &state.stores,
            &state.events,
            &state.config.submission,
            &state.config.achievements,
            actor.user_id,
            challenge_id,
            &payload.flag,
        ),
    )
    .await
    .map_err(|_| AppError::Timeout)??;

    Ok(Json(outcome.into()))
}
