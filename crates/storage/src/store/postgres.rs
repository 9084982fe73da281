use async_trait::async_trait;
use uuid::Uuid;

use super::{
    AuditStore, LogbookStore, NewPerson, PersonStore, PersonUpdate, RevealPatch, ScoreStore,
    SettingsStore, SettingsUpdate, Store,
};
use crate::Database;
use crate::changes::{ChangeFeed, ChangeKind, ChangeTable};
use crate::error::Result;
use crate::models::{
    AuditAction, AuditLogEntry, Logbook, LogbookEntry, NewAuditEntry, Person, RevealState,
    ScoreLogEntry, ScoreboardSettings, Team, TeamWithMembers,
};
use crate::repository::{
    audit_log::AuditLogRepository, logbook::LogbookRepository, person::PersonRepository,
    score_log::ScoreLogRepository, scoreboard_settings::ScoreboardSettingsRepository,
    team::TeamRepository,
};

fn logbook_table(logbook: Logbook) -> ChangeTable {
    match logbook {
        Logbook::General => ChangeTable::GeneralLogbook,
        Logbook::Staff => ChangeTable::StaffLogbook,
    }
}

#[async_trait]
impl PersonStore for Database {
    async fn find_person(&self, person_id: Uuid) -> Result<Person> {
        PersonRepository::new(self.pool()).find_by_id(person_id).await
    }

    async fn find_person_by_badge(&self, badge_id: &str) -> Result<Option<Person>> {
        PersonRepository::new(self.pool()).find_by_badge(badge_id).await
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        PersonRepository::new(self.pool()).list().await
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<Person> {
        let person = PersonRepository::new(self.pool()).create(person).await?;
        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Insert, Some(person.person_id));
        Ok(person)
    }

    async fn update_person(&self, person_id: Uuid, update: &PersonUpdate) -> Result<Person> {
        let person = PersonRepository::new(self.pool())
            .update(person_id, update)
            .await?;
        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Update, Some(person_id));
        Ok(person)
    }

    async fn self_edit_person(
        &self,
        person_id: Uuid,
        update: &PersonUpdate,
        limit: i32,
    ) -> Result<Option<Person>> {
        let person = PersonRepository::new(self.pool())
            .self_edit(person_id, update, limit)
            .await?;
        if person.is_some() {
            self.changes
                .publish(ChangeTable::Persons, ChangeKind::Update, Some(person_id));
        }
        Ok(person)
    }

    async fn delete_person(&self, person_id: Uuid) -> Result<Person> {
        let person = PersonRepository::new(self.pool()).delete(person_id).await?;
        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Delete, Some(person_id));
        Ok(person)
    }
}

#[async_trait]
impl LogbookStore for Database {
    async fn open_session(&self, logbook: Logbook, person_id: Uuid) -> Result<Option<LogbookEntry>> {
        let entry = LogbookRepository::new(self.pool(), logbook)
            .open_session(person_id)
            .await?;
        if let Some(entry) = &entry {
            self.changes
                .publish(logbook_table(logbook), ChangeKind::Insert, Some(entry.entry_id));
        }
        Ok(entry)
    }

    async fn close_latest_session(
        &self,
        logbook: Logbook,
        person_id: Uuid,
    ) -> Result<Option<LogbookEntry>> {
        let entry = LogbookRepository::new(self.pool(), logbook)
            .close_latest_session(person_id)
            .await?;
        if let Some(entry) = &entry {
            self.changes
                .publish(logbook_table(logbook), ChangeKind::Update, Some(entry.entry_id));
        }
        Ok(entry)
    }

    async fn has_closed_session(&self, logbook: Logbook, person_id: Uuid) -> Result<bool> {
        LogbookRepository::new(self.pool(), logbook)
            .has_closed_session(person_id)
            .await
    }

    async fn list_entries(
        &self,
        logbook: Logbook,
        person_id: Option<Uuid>,
    ) -> Result<Vec<LogbookEntry>> {
        LogbookRepository::new(self.pool(), logbook)
            .list(person_id)
            .await
    }

    async fn list_open_sessions(&self, logbook: Logbook) -> Result<Vec<LogbookEntry>> {
        LogbookRepository::new(self.pool(), logbook).list_open().await
    }
}

#[async_trait]
impl ScoreStore for Database {
    async fn list_teams(&self) -> Result<Vec<TeamWithMembers>> {
        TeamRepository::new(self.pool()).list_with_members().await
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Team> {
        TeamRepository::new(self.pool()).find_by_id(team_id).await
    }

    async fn find_team_by_name(&self, name: &str) -> Result<Option<Team>> {
        TeamRepository::new(self.pool()).find_by_name(name).await
    }

    async fn insert_team(&self, name: &str, score: i32) -> Result<Team> {
        let team = TeamRepository::new(self.pool()).create(name, score).await?;
        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Insert, Some(team.team_id));
        Ok(team)
    }

    async fn rename_team(&self, team_id: Uuid, name: &str) -> Result<Team> {
        let team = TeamRepository::new(self.pool()).rename(team_id, name).await?;
        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team_id));
        self.changes.publish(ChangeTable::Persons, ChangeKind::Update, None);
        Ok(team)
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<Team> {
        let team = TeamRepository::new(self.pool()).delete(team_id).await?;
        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Delete, Some(team_id));
        self.changes.publish(ChangeTable::Persons, ChangeKind::Update, None);
        Ok(team)
    }

    async fn apply_delta(
        &self,
        team_id: Uuid,
        delta: i32,
        reason: &str,
    ) -> Result<(Team, ScoreLogEntry)> {
        let (team, entry) = ScoreLogRepository::new(self.pool())
            .apply_delta(team_id, delta, reason)
            .await?;
        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team_id));
        self.changes
            .publish(ChangeTable::ScoreLogs, ChangeKind::Insert, Some(entry.entry_id));
        Ok((team, entry))
    }

    async fn delete_score_entry(&self, entry_id: Uuid) -> Result<(ScoreLogEntry, Team)> {
        let (entry, team) = ScoreLogRepository::new(self.pool())
            .delete_with_reversal(entry_id)
            .await?;
        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team.team_id));
        self.changes
            .publish(ChangeTable::ScoreLogs, ChangeKind::Delete, Some(entry_id));
        Ok((entry, team))
    }

    async fn recalculate_totals(&self, base: i32) -> Result<Vec<Team>> {
        let teams = ScoreLogRepository::new(self.pool())
            .recalculate_totals(base)
            .await?;
        self.changes.publish(ChangeTable::Teams, ChangeKind::Update, None);
        Ok(teams)
    }

    async fn reset_scores(&self, base: i32) -> Result<u64> {
        let count = TeamRepository::new(self.pool()).reset_scores(base).await?;
        self.changes.publish(ChangeTable::Teams, ChangeKind::Update, None);
        Ok(count)
    }

    async fn list_score_log(
        &self,
        team_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ScoreLogEntry>, i64)> {
        ScoreLogRepository::new(self.pool())
            .list(team_id, offset, limit)
            .await
    }
}

#[async_trait]
impl AuditStore for Database {
    async fn append_audit(&self, entry: &NewAuditEntry) -> Result<AuditLogEntry> {
        AuditLogRepository::new(self.pool()).append(entry).await
    }

    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64)> {
        AuditLogRepository::new(self.pool())
            .list(action, offset, limit)
            .await
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn get_settings(&self) -> Result<ScoreboardSettings> {
        ScoreboardSettingsRepository::new(self.pool()).get().await
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<ScoreboardSettings> {
        let settings = ScoreboardSettingsRepository::new(self.pool())
            .update(update)
            .await?;
        self.changes
            .publish(ChangeTable::ScoreboardSettings, ChangeKind::Update, None);
        Ok(settings)
    }

    async fn compare_and_set_reveal(
        &self,
        expected_state: RevealState,
        expected_countdown: i32,
        patch: &RevealPatch,
    ) -> Result<Option<ScoreboardSettings>> {
        let settings = ScoreboardSettingsRepository::new(self.pool())
            .compare_and_set_reveal(expected_state, expected_countdown, patch)
            .await?;
        if settings.is_some() {
            self.changes
                .publish(ChangeTable::ScoreboardSettings, ChangeKind::Update, None);
        }
        Ok(settings)
    }
}

impl Store for Database {
    fn changes(&self) -> &ChangeFeed {
        &self.changes
    }
}
