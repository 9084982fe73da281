pub mod audit;
pub mod common;
pub mod logbook;
pub mod person;
pub mod scan;
pub mod score;
pub mod scoreboard;
pub mod team;
