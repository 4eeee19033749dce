use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::engine::scoreboard::FreezePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Deadline for engine operations (submission, scoreboard reads),
    /// in seconds. Expiry is surfaced; nothing is retried.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// When true, flag submission requires the challenge to be visible
    /// to the actor, closing the historical gap where only the pause
    /// flag gated submissions.
    #[serde(default)]
    pub enforce_visibility: bool,
    /// Maximum accepted flag length, in characters.
    #[serde(default = "default_max_flag_length")]
    pub max_flag_length: usize,
}

fn default_max_flag_length() -> usize {
    256
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            enforce_visibility: false,
            max_flag_length: default_max_flag_length(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoreboardConfig {
    /// How long computed standings are served before recomputation.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Whether a frozen board values challenges at live decayed prices
    /// ("live", the historical behavior) or at their solve counts as of
    /// the freeze ("frozen").
    #[serde(default)]
    pub freeze_point_values: FreezePolicy,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            freeze_point_values: FreezePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AchievementConfig {
    /// Fixed offset applied to UTC when rules speak of "local" hours
    /// and calendar days (Night Owl, Speed Demon).
    #[serde(default)]
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub scoreboard: ScoreboardConfig,
    #[serde(default)]
    pub achievements: AchievementConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FLAGFORGE__DATABASE__URL)
            .add_source(Environment::with_prefix("FLAGFORGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
