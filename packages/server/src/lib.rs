pub mod config;
pub mod consumers;
pub mod database;
pub mod engine;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flagforge CTF API",
        version = "1.0.0",
        description = "Scoring and leaderboard engine for the Flagforge CTF platform"
    ),
    paths(
        handlers::challenge::list_challenges,
        handlers::submission::submit_flag,
        handlers::scoreboard::individual_scoreboard,
        handlers::scoreboard::team_scoreboard,
        handlers::contest::get_active_contest,
        handlers::contest::register_team,
        handlers::admin::create_adjustment,
        handlers::admin::pause_contest,
        handlers::admin::resume_contest,
    ),
    tags(
        (name = "Challenges", description = "Challenge visibility and listing"),
        (name = "Submissions", description = "Flag submission and scoring"),
        (name = "Scoreboard", description = "Individual and team standings"),
        (name = "Contests", description = "Contest window and registration"),
        (name = "Admin", description = "Pause gate and score adjustments"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}
