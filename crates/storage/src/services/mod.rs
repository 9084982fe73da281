pub mod attendance;
pub mod audit;
pub mod reveal;
pub mod roster;
pub mod scoreboard;
pub mod scoring;
