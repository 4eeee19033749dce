use tracing::{Level, info};

use server::config::AppConfig;
use server::consumers;
use server::database;
use server::engine::events::EventBus;
use server::seed;
use server::state::AppState;
use server::store::Stores;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;

    let stores = Stores::orm(db);
    let events = EventBus::default();
    let _feed_logger = consumers::spawn_solve_feed_logger(&events);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(stores, events, config);
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
