use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// The two physically separate attendance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Logbook {
    General,
    Staff,
}

impl Logbook {
    pub fn for_role(role: Role) -> Self {
        if role.is_staff() {
            Logbook::Staff
        } else {
            Logbook::General
        }
    }

    /// Table name; only ever one of two static identifiers, safe to splice into SQL.
    pub fn table(self) -> &'static str {
        match self {
            Logbook::General => "general_logbook",
            Logbook::Staff => "staff_logbook",
        }
    }
}

impl fmt::Display for Logbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logbook::General => f.write_str("general"),
            Logbook::Staff => f.write_str("staff"),
        }
    }
}

/// One attendance session. A null `time_out` means the person is currently checked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LogbookEntry {
    pub entry_id: Uuid,
    pub person_id: Uuid,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
}

impl LogbookEntry {
    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_routing() {
        assert_eq!(Logbook::for_role(Role::GeneralParticipant), Logbook::General);
        assert_eq!(Logbook::for_role(Role::TeamLeader), Logbook::Staff);
        assert_eq!(Logbook::for_role(Role::Facilitator), Logbook::Staff);
        assert_eq!(Logbook::for_role(Role::Executive), Logbook::Staff);
        assert_eq!(Logbook::for_role(Role::Officer), Logbook::Staff);
    }

    #[test]
    fn test_tables_are_distinct() {
        assert_ne!(Logbook::General.table(), Logbook::Staff.table());
    }
}
