use std::time::Duration;

use axum::Json;
use axum::extract::State;
use tokio::time::timeout;
use tracing::instrument;

use crate::engine::scoreboard::{IndividualStanding, TeamStanding};
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Individual standings.
#[utoipa::path(
    get,
    path = "/individual",
    tag = "Scoreboard",
    operation_id = "getIndividualScoreboard",
    summary = "Individual standings",
    description = "Every solver ranked by the live value of their solves plus adjustments, score descending, username ascending on ties. Served from a short-TTL cache; once the active contest's freeze has passed, only pre-freeze solves count.",
    responses(
        (status = 200, description = "Ordered standings", body = Vec<IndividualStanding>),
        (status = 504, description = "Deadline exceeded (DEADLINE_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn individual_scoreboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<IndividualStanding>>, AppError> {
    let deadline = Duration::from_secs(state.config.server.request_timeout_secs);
    let board = timeout(deadline, state.scoreboard.individual(&state.stores))
        .await
        .map_err(|_| AppError::Timeout)??;
    Ok(Json(board))
}

/// Team standings.
#[utoipa::path(
    get,
    path = "/teams",
    tag = "Scoreboard",
    operation_id = "getTeamScoreboard",
    summary = "Team standings",
    description = "Every team ranked by the live value of its distinct solved challenges plus adjustments. Recomputed from the solve ledger; the stored per-team accumulator is not consulted.",
    responses(
        (status = 200, description = "Ordered standings", body = Vec<TeamStanding>),
        (status = 504, description = "Deadline exceeded (DEADLINE_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn team_scoreboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamStanding>>, AppError> {
    let deadline = Duration::from_secs(state.config.server.request_timeout_secs);
    let board = timeout(deadline, state.scoreboard.team(&state.stores))
        .await
        .map_err(|_| AppError::Timeout)??;
    Ok(Json(board))
}
