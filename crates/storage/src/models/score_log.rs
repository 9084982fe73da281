use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One merit or demerit. `delta` is stored exactly as requested, even when the
/// team score was clamped at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScoreLogEntry {
    pub entry_id: Uuid,
    /// Null once the team has been deleted.
    pub team_id: Option<Uuid>,
    /// Name of the team when the entry was written.
    pub team_name: String,
    pub delta: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
