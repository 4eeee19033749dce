use common::event::{Event, SolveFeedEvent, TOPIC_SOLVE_FEED};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::engine::events::EventBus;

/// Drain the solve feed into the log.
///
/// Stands in for the real-time relays (websocket fan-out, notification
/// feeds) that subscribe to the same bus in a full deployment. Lag only
/// skips log lines; the feed is advisory.
pub fn spawn_solve_feed_logger(events: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.topic == TOPIC_SOLVE_FEED => {
                    match SolveFeedEvent::from_generic_event(&event) {
                        Ok(solve) => info!(
                            username = %solve.username,
                            challenge_id = solve.challenge_id,
                            points = solve.points,
                            solve_count = solve.solve_count,
                            team = solve.team_name.as_deref().unwrap_or("-"),
                            "solve"
                        ),
                        Err(e) => warn!(error = %e, "malformed solve feed event"),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "solve feed lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}
