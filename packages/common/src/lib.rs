pub mod achievement;
pub mod actor;
pub mod event;
pub mod flag;
pub mod scoring;

pub use achievement::AchievementKind;
pub use actor::{ActorScope, ScopeKind};
pub use flag::FlagDigest;
pub use scoring::{ScoringType, current_points};
