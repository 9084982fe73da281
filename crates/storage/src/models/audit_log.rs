use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Register,
    ProfileUpdate,
    ProfileDelete,
    SelfEdit,
    TeamCreate,
    TeamRename,
    TeamDelete,
    ScoreAdjust,
    DeleteScore,
    RecalculateScores,
    ResetScores,
    CheckIn,
    CheckOut,
    BatchScan,
    BatchScanOut,
    ScoreboardUpdate,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditAction::Register => "REGISTER",
            AuditAction::ProfileUpdate => "PROFILE_UPDATE",
            AuditAction::ProfileDelete => "PROFILE_DELETE",
            AuditAction::SelfEdit => "SELF_EDIT",
            AuditAction::TeamCreate => "TEAM_CREATE",
            AuditAction::TeamRename => "TEAM_RENAME",
            AuditAction::TeamDelete => "TEAM_DELETE",
            AuditAction::ScoreAdjust => "SCORE_ADJUST",
            AuditAction::DeleteScore => "DELETE_SCORE",
            AuditAction::RecalculateScores => "RECALCULATE_SCORES",
            AuditAction::ResetScores => "RESET_SCORES",
            AuditAction::CheckIn => "CHECK_IN",
            AuditAction::CheckOut => "CHECK_OUT",
            AuditAction::BatchScan => "BATCH_SCAN",
            AuditAction::BatchScanOut => "BATCH_SCAN_OUT",
            AuditAction::ScoreboardUpdate => "SCOREBOARD_UPDATE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub audit_id: Uuid,
    pub actor: String,
    pub action: AuditAction,
    pub target: String,
    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Entry to be appended; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub actor: String,
    pub action: AuditAction,
    pub target: String,
    pub details: serde_json::Value,
}
