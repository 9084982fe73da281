use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{PaginationParams, default_page, default_page_size};
use crate::models::{DEFAULT_DELTA, ScoreLogEntry, Team};

/// Merit (positive) or demerit (negative) for one team
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplyDeltaRequest {
    #[serde(default = "default_delta")]
    pub delta: i32,

    /// Event name or manual justification
    #[validate(length(min = 1, max = 500, message = "Reason is required"))]
    pub reason: String,
}

fn default_delta() -> i32 {
    DEFAULT_DELTA
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreAdjustmentResponse {
    pub team: Team,
    pub entry: ScoreLogEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteScoreResponse {
    pub removed: ScoreLogEntry,
    pub team: Team,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecalculateResponse {
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub teams_reset: u64,
    pub score: i32,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScoreLogFilter {
    pub team_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl ScoreLogFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}
