use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/challenges", challenge_routes())
        .nest("/contests", contest_routes())
        .nest("/scoreboard", scoreboard_routes())
        .nest("/admin", admin_routes())
}

fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::challenge::list_challenges))
        .route(
            "/{id}/submissions",
            post(handlers::submission::submit_flag),
        )
}

fn contest_routes() -> Router<AppState> {
    Router::new()
        .route("/active", get(handlers::contest::get_active_contest))
        .route(
            "/{id}/registrations",
            post(handlers::contest::register_team),
        )
}

fn scoreboard_routes() -> Router<AppState> {
    Router::new()
        .route("/individual", get(handlers::scoreboard::individual_scoreboard))
        .route("/teams", get(handlers::scoreboard::team_scoreboard))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", post(handlers::admin::create_adjustment))
        .route(
            "/contests/{id}/pause",
            post(handlers::admin::pause_contest).delete(handlers::admin::resume_contest),
        )
}
