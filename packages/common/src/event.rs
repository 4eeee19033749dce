use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Topic carried by solve-feed events.
pub const TOPIC_SOLVE_FEED: &str = "solve_feed";
/// Topic carried by scoreboard invalidation hints.
pub const TOPIC_SCOREBOARD_UPDATE: &str = "scoreboard_update";

/// Core event trait for everything published on the engine's bus.
pub trait Event: Send + Sync + Sized + Serialize + DeserializeOwned {
    /// Get the event topic (e.g. "solve_feed").
    fn topic(&self) -> &str;

    /// Convert event to a generic envelope.
    fn to_generic_event(&self) -> GenericEvent {
        GenericEvent {
            topic: self.topic().to_string(),
            payload: serde_json::to_value(self).unwrap_or_default(),
        }
    }

    /// Create an event from a generic envelope.
    fn from_generic_event(e: &GenericEvent) -> Result<Self, anyhow::Error> {
        let payload: Self = serde_json::from_value(e.payload.clone())?;
        Ok(payload)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl Event for GenericEvent {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn from_generic_event(e: &GenericEvent) -> Result<Self, anyhow::Error> {
        Ok(e.clone())
    }
}

/// Published once per newly-scored solve, for real-time feeds.
///
/// Advisory only: delivery is a relaying collaborator's concern, and the
/// engine never blocks on it. `event_id` lets relays deduplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveFeedEvent {
    pub event_id: Uuid,
    pub user_id: i32,
    pub username: String,
    pub challenge_id: i32,
    pub points: i32,
    pub solve_count: i64,
    pub team_name: Option<String>,
    pub solved_at: DateTime<Utc>,
}

impl SolveFeedEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: i32,
        username: String,
        challenge_id: i32,
        points: i32,
        solve_count: i64,
        team_name: Option<String>,
        solved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id,
            username,
            challenge_id,
            points,
            solve_count,
            team_name,
            solved_at,
        }
    }
}

impl Event for SolveFeedEvent {
    fn topic(&self) -> &str {
        TOPIC_SOLVE_FEED
    }
}

/// Hint that cached standings are stale. Carries no payload beyond the
/// trigger; consumers re-fetch rather than patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreboardUpdateEvent {
    pub challenge_id: i32,
}

impl Event for ScoreboardUpdateEvent {
    fn topic(&self) -> &str {
        TOPIC_SCOREBOARD_UPDATE
    }
}
