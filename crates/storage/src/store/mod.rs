//! Persistence contract consumed by the engines in [`crate::services`].
//!
//! [`crate::Database`] implements it over PostgreSQL; `memory::MemoryStore`
//! (feature `test-support`) implements it in process.

use async_trait::async_trait;
use uuid::Uuid;

use crate::changes::ChangeFeed;
use crate::error::Result;
use crate::models::{
    AuditAction, AuditLogEntry, Logbook, LogbookEntry, NewAuditEntry, Person, RevealState, Role,
    ScoreLogEntry, ScoreboardSettings, Team, TeamWithMembers,
};

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod postgres;

/// Values for a new person row; the store assigns id, timestamps and a zero edit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub badge_id: String,
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
}

/// Full replacement of the editable person fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonUpdate {
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
}

/// Visibility toggles and navigation target; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub hide_names: Option<bool>,
    pub hide_scores: Option<bool>,
    pub hide_bars: Option<bool>,
    pub hide_top2: Option<bool>,
    pub hide_rank_3: Option<bool>,
    pub hide_rank_4: Option<bool>,
    pub hide_all: Option<bool>,
    pub force_route: Option<Option<String>>,
}

/// Reveal columns written together by one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPatch {
    pub reveal_state: RevealState,
    pub countdown: i32,
    pub winner_team_id: Option<Uuid>,
    pub winner_name: Option<String>,
    pub winner_score: Option<i32>,
}

#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn find_person(&self, person_id: Uuid) -> Result<Person>;

    async fn find_person_by_badge(&self, badge_id: &str) -> Result<Option<Person>>;

    async fn list_persons(&self) -> Result<Vec<Person>>;

    async fn insert_person(&self, person: &NewPerson) -> Result<Person>;

    async fn update_person(&self, person_id: Uuid, update: &PersonUpdate) -> Result<Person>;

    /// Applies the update and increments `edit_count` only while it is below `limit`.
    /// Returns `None` when the limit has been reached.
    async fn self_edit_person(
        &self,
        person_id: Uuid,
        update: &PersonUpdate,
        limit: i32,
    ) -> Result<Option<Person>>;

    /// Removes the person together with their rows in both logbooks.
    async fn delete_person(&self, person_id: Uuid) -> Result<Person>;
}

#[async_trait]
pub trait LogbookStore: Send + Sync {
    /// Inserts an open session unless one already exists. `None` means one was open.
    async fn open_session(&self, logbook: Logbook, person_id: Uuid) -> Result<Option<LogbookEntry>>;

    /// Closes the most recent open session. `None` means nothing was open.
    async fn close_latest_session(
        &self,
        logbook: Logbook,
        person_id: Uuid,
    ) -> Result<Option<LogbookEntry>>;

    async fn has_closed_session(&self, logbook: Logbook, person_id: Uuid) -> Result<bool>;

    /// Newest first.
    async fn list_entries(
        &self,
        logbook: Logbook,
        person_id: Option<Uuid>,
    ) -> Result<Vec<LogbookEntry>>;

    async fn list_open_sessions(&self, logbook: Logbook) -> Result<Vec<LogbookEntry>>;
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Ordered by score descending, then name, then id.
    async fn list_teams(&self) -> Result<Vec<TeamWithMembers>>;

    async fn find_team(&self, team_id: Uuid) -> Result<Team>;

    async fn find_team_by_name(&self, name: &str) -> Result<Option<Team>>;

    async fn insert_team(&self, name: &str, score: i32) -> Result<Team>;

    /// Renames the team and moves its members to the new name.
    async fn rename_team(&self, team_id: Uuid, name: &str) -> Result<Team>;

    async fn delete_team(&self, team_id: Uuid) -> Result<Team>;

    /// Adds `delta` to the score, clamped at zero, and appends the log entry atomically.
    async fn apply_delta(
        &self,
        team_id: Uuid,
        delta: i32,
        reason: &str,
    ) -> Result<(Team, ScoreLogEntry)>;

    /// Reverses the entry's delta on its team, clamped at zero, and deletes it atomically.
    async fn delete_score_entry(&self, entry_id: Uuid) -> Result<(ScoreLogEntry, Team)>;

    /// Sets every team to `base` plus the sum of its log deltas, floored at zero.
    async fn recalculate_totals(&self, base: i32) -> Result<Vec<Team>>;

    /// Sets every team to `base`; returns the number of teams touched.
    async fn reset_scores(&self, base: i32) -> Result<u64>;

    /// Newest first, with the total count for pagination.
    async fn list_score_log(
        &self,
        team_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ScoreLogEntry>, i64)>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: &NewAuditEntry) -> Result<AuditLogEntry>;

    /// Newest first, with the total count for pagination.
    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64)>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self) -> Result<ScoreboardSettings>;

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<ScoreboardSettings>;

    /// Writes `patch` only if the row is still in `expected_state` with `expected_countdown`.
    /// `None` means another writer got there first.
    async fn compare_and_set_reveal(
        &self,
        expected_state: RevealState,
        expected_countdown: i32,
        patch: &RevealPatch,
    ) -> Result<Option<ScoreboardSettings>>;
}

/// Everything the engines need from persistence, plus change notification.
pub trait Store: PersonStore + LogbookStore + ScoreStore + AuditStore + SettingsStore {
    fn changes(&self) -> &ChangeFeed;
}
