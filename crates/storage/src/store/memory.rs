//! In-process implementation of the persistence contract with the same
//! atomicity as the PostgreSQL store: every operation runs under one lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    AuditStore, LogbookStore, NewPerson, PersonStore, PersonUpdate, RevealPatch, ScoreStore,
    SettingsStore, SettingsUpdate, Store,
};
use crate::changes::{ChangeFeed, ChangeKind, ChangeTable};
use crate::error::{Result, StorageError};
use crate::models::{
    AuditAction, AuditLogEntry, Logbook, LogbookEntry, NewAuditEntry, Person, RevealState,
    ScoreLogEntry, ScoreboardSettings, Team, TeamWithMembers,
};

#[derive(Debug, Default)]
struct MemoryState {
    persons: Vec<Person>,
    teams: Vec<Team>,
    general_logbook: Vec<LogbookEntry>,
    staff_logbook: Vec<LogbookEntry>,
    score_logs: Vec<ScoreLogEntry>,
    audit_logs: Vec<AuditLogEntry>,
    settings: ScoreboardSettings,
}

impl MemoryState {
    fn logbook(&self, logbook: Logbook) -> &Vec<LogbookEntry> {
        match logbook {
            Logbook::General => &self.general_logbook,
            Logbook::Staff => &self.staff_logbook,
        }
    }

    fn logbook_mut(&mut self, logbook: Logbook) -> &mut Vec<LogbookEntry> {
        match logbook {
            Logbook::General => &mut self.general_logbook,
            Logbook::Staff => &mut self.staff_logbook,
        }
    }

    fn team_mut(&mut self, team_id: Uuid) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.team_id == team_id)
            .ok_or(StorageError::NotFound)
    }
}

fn clamp_score(score: i64) -> i32 {
    i32::try_from(score.max(0)).unwrap_or(i32::MAX)
}

fn page<T: Clone>(rows: &[T], offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.iter().skip(offset).take(limit).cloned().collect()
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    changes: ChangeFeed,
    fail_audit: AtomicBool,
    failing_badges: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every audit append fail with [`StorageError::Unavailable`].
    pub fn fail_audit_writes(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Make badge lookups for `badge_id` fail with [`StorageError::Unavailable`].
    pub fn fail_lookups_for(&self, badge_id: &str) {
        self.failing_badges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(badge_id.to_string());
    }

    /// Overwrite a team score directly, bypassing the log, to simulate drift.
    pub fn force_team_score(&self, team_id: Uuid, score: i32) -> Result<()> {
        self.state().team_mut(team_id)?.score = score;
        Ok(())
    }

    /// Every audit row in insertion order.
    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state().audit_logs.clone()
    }

    /// Every row of a logbook in insertion order.
    pub fn logbook_rows(&self, logbook: Logbook) -> Vec<LogbookEntry> {
        self.state().logbook(logbook).clone()
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn find_person(&self, person_id: Uuid) -> Result<Person> {
        self.state()
            .persons
            .iter()
            .find(|p| p.person_id == person_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_person_by_badge(&self, badge_id: &str) -> Result<Option<Person>> {
        let failing = self
            .failing_badges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(badge_id);
        if failing {
            return Err(StorageError::Unavailable(format!(
                "lookup of badge {badge_id} failed"
            )));
        }

        Ok(self
            .state()
            .persons
            .iter()
            .find(|p| p.badge_id == badge_id)
            .cloned())
    }

    async fn list_persons(&self) -> Result<Vec<Person>> {
        let mut persons = self.state().persons.clone();
        persons.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(persons)
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<Person> {
        let mut state = self.state();
        if state.persons.iter().any(|p| p.badge_id == person.badge_id) {
            return Err(StorageError::ConstraintViolation(
                "Badge already exists".to_string(),
            ));
        }

        let person = Person {
            person_id: Uuid::new_v4(),
            badge_id: person.badge_id.clone(),
            full_name: person.full_name.clone(),
            team: person.team.clone(),
            role: person.role,
            edit_count: 0,
            created_at: Utc::now(),
        };
        state.persons.push(person.clone());
        drop(state);

        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Insert, Some(person.person_id));
        Ok(person)
    }

    async fn update_person(&self, person_id: Uuid, update: &PersonUpdate) -> Result<Person> {
        let mut state = self.state();
        let person = state
            .persons
            .iter_mut()
            .find(|p| p.person_id == person_id)
            .ok_or(StorageError::NotFound)?;
        person.full_name = update.full_name.clone();
        person.team = update.team.clone();
        person.role = update.role;
        let person = person.clone();
        drop(state);

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
        let mut state = self.state();
        let person = state
            .persons
            .iter_mut()
            .find(|p| p.person_id == person_id)
            .ok_or(StorageError::NotFound)?;
        if person.edit_count >= limit {
            return Ok(None);
        }
        person.full_name = update.full_name.clone();
        person.team = update.team.clone();
        person.role = update.role;
        person.edit_count += 1;
        let person = person.clone();
        drop(state);

        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Update, Some(person_id));
        Ok(Some(person))
    }

    async fn delete_person(&self, person_id: Uuid) -> Result<Person> {
        let mut state = self.state();
        let index = state
            .persons
            .iter()
            .position(|p| p.person_id == person_id)
            .ok_or(StorageError::NotFound)?;
        let person = state.persons.remove(index);
        state.general_logbook.retain(|e| e.person_id != person_id);
        state.staff_logbook.retain(|e| e.person_id != person_id);
        drop(state);

        self.changes
            .publish(ChangeTable::Persons, ChangeKind::Delete, Some(person_id));
        Ok(person)
    }
}

#[async_trait]
impl LogbookStore for MemoryStore {
    async fn open_session(&self, logbook: Logbook, person_id: Uuid) -> Result<Option<LogbookEntry>> {
        let mut state = self.state();
        let rows = state.logbook_mut(logbook);
        if rows.iter().any(|e| e.person_id == person_id && e.is_open()) {
            return Ok(None);
        }

        let entry = LogbookEntry {
            entry_id: Uuid::new_v4(),
            person_id,
            time_in: Utc::now(),
            time_out: None,
        };
        rows.push(entry.clone());
        drop(state);

        self.changes.publish(
            logbook_table(logbook),
            ChangeKind::Insert,
            Some(entry.entry_id),
        );
        Ok(Some(entry))
    }

    async fn close_latest_session(
        &self,
        logbook: Logbook,
        person_id: Uuid,
    ) -> Result<Option<LogbookEntry>> {
        let mut state = self.state();
        let Some(entry) = state
            .logbook_mut(logbook)
            .iter_mut()
            .rev()
            .find(|e| e.person_id == person_id && e.is_open())
        else {
            return Ok(None);
        };
        entry.time_out = Some(Utc::now());
        let entry = entry.clone();
        drop(state);

        self.changes.publish(
            logbook_table(logbook),
            ChangeKind::Update,
            Some(entry.entry_id),
        );
        Ok(Some(entry))
    }

    async fn has_closed_session(&self, logbook: Logbook, person_id: Uuid) -> Result<bool> {
        Ok(self
            .state()
            .logbook(logbook)
            .iter()
            .any(|e| e.person_id == person_id && !e.is_open()))
    }

    async fn list_entries(
        &self,
        logbook: Logbook,
        person_id: Option<Uuid>,
    ) -> Result<Vec<LogbookEntry>> {
        Ok(self
            .state()
            .logbook(logbook)
            .iter()
            .rev()
            .filter(|e| person_id.is_none_or(|id| e.person_id == id))
            .cloned()
            .collect())
    }

    async fn list_open_sessions(&self, logbook: Logbook) -> Result<Vec<LogbookEntry>> {
        Ok(self
            .state()
            .logbook(logbook)
            .iter()
            .rev()
            .filter(|e| e.is_open())
            .cloned()
            .collect())
    }
}

fn logbook_table(logbook: Logbook) -> ChangeTable {
    match logbook {
        Logbook::General => ChangeTable::GeneralLogbook,
        Logbook::Staff => ChangeTable::StaffLogbook,
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn list_teams(&self) -> Result<Vec<TeamWithMembers>> {
        let state = self.state();
        let mut teams: Vec<TeamWithMembers> = state
            .teams
            .iter()
            .map(|t| TeamWithMembers {
                team_id: t.team_id,
                name: t.name.clone(),
                score: t.score,
                created_at: t.created_at,
                member_count: state
                    .persons
                    .iter()
                    .filter(|p| p.team.as_deref() == Some(t.name.as_str()))
                    .count() as i64,
            })
            .collect();
        teams.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.team_id.cmp(&b.team_id))
        });
        Ok(teams)
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Team> {
        self.state()
            .teams
            .iter()
            .find(|t| t.team_id == team_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_team_by_name(&self, name: &str) -> Result<Option<Team>> {
        Ok(self.state().teams.iter().find(|t| t.name == name).cloned())
    }

    async fn insert_team(&self, name: &str, score: i32) -> Result<Team> {
        let mut state = self.state();
        if state.teams.iter().any(|t| t.name == name) {
            return Err(StorageError::ConstraintViolation(
                "Team name already exists".to_string(),
            ));
        }
        let team = Team {
            team_id: Uuid::new_v4(),
            name: name.to_string(),
            score,
            created_at: Utc::now(),
        };
        state.teams.push(team.clone());
        drop(state);

        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Insert, Some(team.team_id));
        Ok(team)
    }

    async fn rename_team(&self, team_id: Uuid, name: &str) -> Result<Team> {
        let mut state = self.state();
        if state
            .teams
            .iter()
            .any(|t| t.name == name && t.team_id != team_id)
        {
            return Err(StorageError::ConstraintViolation(
                "Team name already exists".to_string(),
            ));
        }
        let team = state.team_mut(team_id)?;
        let previous = std::mem::replace(&mut team.name, name.to_string());
        let team = team.clone();
        for person in state
            .persons
            .iter_mut()
            .filter(|p| p.team.as_deref() == Some(previous.as_str()))
        {
            person.team = Some(name.to_string());
        }
        drop(state);

        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team_id));
        self.changes.publish(ChangeTable::Persons, ChangeKind::Update, None);
        Ok(team)
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<Team> {
        let mut state = self.state();
        let index = state
            .teams
            .iter()
            .position(|t| t.team_id == team_id)
            .ok_or(StorageError::NotFound)?;
        let team = state.teams.remove(index);
        for person in state
            .persons
            .iter_mut()
            .filter(|p| p.team.as_deref() == Some(team.name.as_str()))
        {
            person.team = None;
        }
        for entry in state
            .score_logs
            .iter_mut()
            .filter(|e| e.team_id == Some(team_id))
        {
            entry.team_id = None;
        }
        drop(state);

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
        let mut state = self.state();
        let team = state.team_mut(team_id)?;
        team.score = clamp_score(i64::from(team.score) + i64::from(delta));
        let team = team.clone();

        let entry = ScoreLogEntry {
            entry_id: Uuid::new_v4(),
            team_id: Some(team.team_id),
            team_name: team.name.clone(),
            delta,
            reason: reason.to_string(),
            created_at: Utc::now(),
        };
        state.score_logs.push(entry.clone());
        drop(state);

        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team_id));
        self.changes
            .publish(ChangeTable::ScoreLogs, ChangeKind::Insert, Some(entry.entry_id));
        Ok((team, entry))
    }

    async fn delete_score_entry(&self, entry_id: Uuid) -> Result<(ScoreLogEntry, Team)> {
        let mut state = self.state();
        let index = state
            .score_logs
            .iter()
            .position(|e| e.entry_id == entry_id)
            .ok_or(StorageError::NotFound)?;
        let team_id = state.score_logs[index]
            .team_id
            .ok_or(StorageError::NotFound)?;
        let delta = state.score_logs[index].delta;

        let team = state.team_mut(team_id)?;
        team.score = clamp_score(i64::from(team.score) - i64::from(delta));
        let team = team.clone();
        let entry = state.score_logs.remove(index);
        drop(state);

        self.changes
            .publish(ChangeTable::Teams, ChangeKind::Update, Some(team_id));
        self.changes
            .publish(ChangeTable::ScoreLogs, ChangeKind::Delete, Some(entry_id));
        Ok((entry, team))
    }

    async fn recalculate_totals(&self, base: i32) -> Result<Vec<Team>> {
        let mut state = self.state();
        let MemoryState {
            teams, score_logs, ..
        } = &mut *state;
        for team in teams.iter_mut() {
            let total: i64 = score_logs
                .iter()
                .filter(|e| e.team_id == Some(team.team_id))
                .map(|e| i64::from(e.delta))
                .sum();
            team.score = clamp_score(i64::from(base) + total);
        }
        let mut teams = teams.clone();
        drop(state);

        teams.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.team_id.cmp(&b.team_id))
        });
        self.changes.publish(ChangeTable::Teams, ChangeKind::Update, None);
        Ok(teams)
    }

    async fn reset_scores(&self, base: i32) -> Result<u64> {
        let mut state = self.state();
        for team in state.teams.iter_mut() {
            team.score = base;
        }
        let count = state.teams.len() as u64;
        drop(state);

        self.changes.publish(ChangeTable::Teams, ChangeKind::Update, None);
        Ok(count)
    }

    async fn list_score_log(
        &self,
        team_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ScoreLogEntry>, i64)> {
        let rows: Vec<ScoreLogEntry> = self
            .state()
            .score_logs
            .iter()
            .rev()
            .filter(|e| team_id.is_none() || e.team_id == team_id)
            .cloned()
            .collect();
        Ok((page(&rows, offset, limit), rows.len() as i64))
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: &NewAuditEntry) -> Result<AuditLogEntry> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("audit log is down".to_string()));
        }

        let entry = AuditLogEntry {
            audit_id: Uuid::new_v4(),
            actor: entry.actor.clone(),
            action: entry.action,
            target: entry.target.clone(),
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        self.state().audit_logs.push(entry.clone());
        Ok(entry)
    }

    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64)> {
        let rows: Vec<AuditLogEntry> = self
            .state()
            .audit_logs
            .iter()
            .rev()
            .filter(|e| action.is_none_or(|a| e.action == a))
            .cloned()
            .collect();
        Ok((page(&rows, offset, limit), rows.len() as i64))
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_settings(&self) -> Result<ScoreboardSettings> {
        Ok(self.state().settings.clone())
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<ScoreboardSettings> {
        let mut state = self.state();
        let settings = &mut state.settings;
        let toggles = [
            (&mut settings.hide_names, update.hide_names),
            (&mut settings.hide_scores, update.hide_scores),
            (&mut settings.hide_bars, update.hide_bars),
            (&mut settings.hide_top2, update.hide_top2),
            (&mut settings.hide_rank_3, update.hide_rank_3),
            (&mut settings.hide_rank_4, update.hide_rank_4),
            (&mut settings.hide_all, update.hide_all),
        ];
        for (field, value) in toggles {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(route) = &update.force_route {
            settings.force_route = route.clone();
        }
        settings.updated_at = Utc::now();
        let settings = settings.clone();
        drop(state);

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
        let mut state = self.state();
        let settings = &mut state.settings;
        if settings.reveal_state != expected_state || settings.countdown != expected_countdown {
            return Ok(None);
        }
        settings.reveal_state = patch.reveal_state;
        settings.countdown = patch.countdown;
        settings.winner_team_id = patch.winner_team_id;
        settings.winner_name = patch.winner_name.clone();
        settings.winner_score = patch.winner_score;
        settings.updated_at = Utc::now();
        let settings = settings.clone();
        drop(state);

        self.changes
            .publish(ChangeTable::ScoreboardSettings, ChangeKind::Update, None);
        Ok(Some(settings))
    }
}

impl Store for MemoryStore {
    fn changes(&self) -> &ChangeFeed {
        &self.changes
    }
}
