pub mod audit_log;
pub mod logbook;
pub mod person;
pub mod score_log;
pub mod scoreboard_settings;
pub mod team;
