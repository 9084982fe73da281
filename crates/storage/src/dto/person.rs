use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Person, Role};

/// Self-service registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterPersonRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Full name must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub full_name: String,

    #[validate(length(max = 100))]
    pub team: Option<String>,

    pub role: Role,
}

/// Partial update used by both the self-service and the admin edit flows
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, max = 255))]
    #[validate(custom(function = "validate_not_blank"))]
    pub full_name: Option<String>,

    #[validate(length(max = 100))]
    pub team: Option<String>,

    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonResponse {
    pub person_id: Uuid,
    pub badge_id: String,
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
    pub edit_count: i32,
    pub remaining_self_edits: i32,
    pub created_at: DateTime<Utc>,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            remaining_self_edits: person.remaining_self_edits(),
            person_id: person.person_id,
            badge_id: person.badge_id,
            full_name: person.full_name,
            team: person.team,
            role: person.role,
            edit_count: person.edit_count,
            created_at: person.created_at,
        }
    }
}
