pub mod audit_log;
pub mod logbook;
pub mod person;
pub mod score_log;
pub mod scoreboard_settings;
pub mod team;

pub use audit_log::{AuditAction, AuditLogEntry, NewAuditEntry};
pub use logbook::{Logbook, LogbookEntry};
pub use person::{Person, Role, SELF_EDIT_LIMIT};
pub use score_log::ScoreLogEntry;
pub use scoreboard_settings::{RevealState, ScoreboardSettings};
pub use team::{BASE_SCORE, DEFAULT_DELTA, Team, TeamWithMembers};
