use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::person::PersonResponse;
use crate::models::{Logbook, LogbookEntry, Person};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    #[serde(alias = "check-in")]
    TimeIn,
    #[serde(alias = "check-out")]
    TimeOut,
}

/// Classified result of one scan. Everything except `Ok` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Ok,
    /// Unknown badge
    Missing,
    /// Check-in while a session is already open
    Duplicate,
    /// Check-out with nothing open, after at least one completed session
    NotCheckedIn,
    /// Check-out by someone who never checked in
    NoActiveSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    pub mode: ScanMode,
    pub person: Option<Person>,
    pub logbook: Option<Logbook>,
    pub entry: Option<LogbookEntry>,
}

impl ScanOutcome {
    pub(crate) fn missing(mode: ScanMode) -> Self {
        Self {
            status: ScanStatus::Missing,
            mode,
            person: None,
            logbook: None,
            entry: None,
        }
    }

    /// Operator-facing description of the outcome.
    pub fn message(&self) -> String {
        let name = self
            .person
            .as_ref()
            .map(|p| p.full_name.as_str())
            .unwrap_or("Unknown badge");
        match (self.status, self.mode) {
            (ScanStatus::Ok, ScanMode::TimeIn) => format!("{name} checked in"),
            (ScanStatus::Ok, ScanMode::TimeOut) => format!("{name} checked out"),
            (ScanStatus::Missing, _) => "Badge not registered".to_string(),
            (ScanStatus::Duplicate, _) => format!("{name} is already checked in"),
            (ScanStatus::NotCheckedIn, _) => format!("{name} is already checked out"),
            (ScanStatus::NoActiveSession, _) => format!("{name} never checked in"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScanRequest {
    #[validate(length(max = 255, message = "Badge id is too long"))]
    pub badge_id: String,
    pub mode: ScanMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    pub status: ScanStatus,
    pub message: String,
    pub person: Option<PersonResponse>,
    pub logbook: Option<Logbook>,
    pub entry: Option<LogbookEntry>,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            message: outcome.message(),
            status: outcome.status,
            person: outcome.person.map(PersonResponse::from),
            logbook: outcome.logbook,
            entry: outcome.entry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchScanRequest {
    #[validate(length(min = 1, message = "At least one badge id is required"))]
    pub uuids: Vec<String>,
    pub mode: ScanMode,
}

/// Per-id status of the batch endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchScanStatus {
    Ok,
    Missing,
    Duplicate,
    NotCheckedIn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchScanResult {
    pub uuid: String,
    pub status: BatchScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchScanResult {
    pub fn from_outcome(uuid: String, outcome: &ScanOutcome) -> Self {
        let status = match outcome.status {
            ScanStatus::Ok => BatchScanStatus::Ok,
            ScanStatus::Missing => BatchScanStatus::Missing,
            ScanStatus::Duplicate => BatchScanStatus::Duplicate,
            ScanStatus::NotCheckedIn | ScanStatus::NoActiveSession => {
                BatchScanStatus::NotCheckedIn
            }
        };
        let message = (outcome.status != ScanStatus::Ok).then(|| outcome.message());
        Self {
            uuid,
            status,
            message,
        }
    }

    pub fn error(uuid: String, message: impl Into<String>) -> Self {
        Self {
            uuid,
            status: BatchScanStatus::Error,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchScanResponse {
    pub results: Vec<BatchScanResult>,
}
