use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Logbook;

/// Maximum number of self-service profile edits a person may make.
pub const SELF_EDIT_LIMIT: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "person_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "student")]
    GeneralParticipant,
    TeamLeader,
    Facilitator,
    Executive,
    Officer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::GeneralParticipant,
        Role::TeamLeader,
        Role::Facilitator,
        Role::Executive,
        Role::Officer,
    ];

    /// Everyone except general participants signs into the staff logbook.
    pub fn is_staff(self) -> bool {
        !matches!(self, Role::GeneralParticipant)
    }

    /// Roles that must belong to a team at registration.
    pub fn requires_team(self) -> bool {
        matches!(self, Role::GeneralParticipant | Role::TeamLeader)
    }

    pub fn logbook(self) -> Logbook {
        Logbook::for_role(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::GeneralParticipant => "general_participant",
            Role::TeamLeader => "team_leader",
            Role::Facilitator => "facilitator",
            Role::Executive => "executive",
            Role::Officer => "officer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub person_id: Uuid,
    pub badge_id: String,
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
    pub edit_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn remaining_self_edits(&self) -> i32 {
        (SELF_EDIT_LIMIT - self.edit_count).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_general_participants_are_not_staff() {
        for role in Role::ALL {
            assert_eq!(role.is_staff(), role != Role::GeneralParticipant, "{role}");
        }
    }

    #[test]
    fn test_student_alias_parses_as_general_participant() {
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::GeneralParticipant);

        let role: Role = serde_json::from_str("\"facilitator\"").unwrap();
        assert_eq!(role, Role::Facilitator);
    }
}
