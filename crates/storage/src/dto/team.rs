use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Team, TeamWithMembers};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Team name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RenameTeamRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Team name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team_id: Uuid,
    pub name: String,
    pub score: i32,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<TeamWithMembers> for TeamResponse {
    fn from(team: TeamWithMembers) -> Self {
        Self {
            team_id: team.team_id,
            name: team.name,
            score: team.score,
            member_count: team.member_count,
            created_at: team.created_at,
        }
    }
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            team_id: team.team_id,
            name: team.name,
            score: team.score,
            member_count: 0,
            created_at: team.created_at,
        }
    }
}
