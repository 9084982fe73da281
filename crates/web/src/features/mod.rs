pub mod audit;
pub mod changes;
pub mod logbooks;
pub mod persons;
pub mod scan;
pub mod scoreboard;
pub mod scores;
pub mod teams;
