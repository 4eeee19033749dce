pub mod achievements;
pub mod cache;
pub mod events;
pub mod scoreboard;
pub mod submit;
pub mod visibility;
