use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Score every team starts from, and the base of every reconciliation.
pub const BASE_SCORE: i32 = 150;

/// Suggested magnitude for a merit or demerit.
pub const DEFAULT_DELTA: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub name: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// Team with its derived member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamWithMembers {
    pub team_id: Uuid,
    pub name: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
}
