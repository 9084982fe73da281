//! Bulk registration from a roster file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use storage::dto::person::RegisterPersonRequest;
use storage::models::Role;
use storage::services::roster;
use storage::store::Store;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AdminError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub persons: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
}

impl RosterFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

pub struct RosterValidator;

impl RosterValidator {
    pub fn validate(roster: &RosterFile) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        let mut team_names = HashSet::new();
        for team in &roster.teams {
            let name = team.trim();
            if name.is_empty() {
                report.errors.push("Team name cannot be empty".to_string());
            } else if name.chars().count() > 100 {
                report
                    .errors
                    .push(format!("Team name '{name}' is longer than 100 characters"));
            } else if !team_names.insert(name) {
                report.errors.push(format!("Team '{name}' is listed twice"));
            }
        }

        if roster.persons.is_empty() {
            report.warnings.push("Roster lists no persons".to_string());
        }

        let mut person_names = HashSet::new();
        for (index, person) in roster.persons.iter().enumerate() {
            let line = index + 1;
            let name = person.full_name.trim();
            if name.is_empty() {
                report
                    .errors
                    .push(format!("Person #{line}: full name is required"));
                continue;
            }
            if name.chars().count() > 255 {
                report.errors.push(format!(
                    "Person #{line}: full name is longer than 255 characters"
                ));
            }
            if !person_names.insert(name.to_lowercase()) {
                report
                    .warnings
                    .push(format!("Person '{name}' appears more than once"));
            }

            match person.team.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                None if person.role.requires_team() => report.errors.push(format!(
                    "Person '{name}': a team is required for the {} role",
                    person.role
                )),
                Some(team) if !team_names.contains(team) => report.warnings.push(format!(
                    "Person '{name}': team '{team}' is not in this file and must already exist"
                )),
                _ => {}
            }
        }

        if !report.errors.is_empty() {
            Err(AdminError::Validation(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }
}

/// Badge issued during an import, written back for printing.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedBadge {
    pub person_id: Uuid,
    pub badge_id: String,
    pub full_name: String,
    pub team: Option<String>,
    pub role: Role,
}

/// Roster row the store refused.
#[derive(Debug, Clone)]
pub struct FailedEntry {
    pub line: usize,
    pub full_name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub teams_created: usize,
    pub teams_existing: usize,
    pub badges: Vec<IssuedBadge>,
    pub failures: Vec<FailedEntry>,
}

pub struct RosterImporter<'a, S: Store + ?Sized> {
    store: &'a S,
    actor: &'a str,
}

impl<'a, S: Store + ?Sized> RosterImporter<'a, S> {
    pub fn new(store: &'a S, actor: &'a str) -> Self {
        Self { store, actor }
    }

    /// Creates missing teams, then registers every person. A person the store
    /// refuses is recorded in `failures` and the remaining rows still run.
    pub async fn import(&self, roster: &RosterFile) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for team in &roster.teams {
            let name = team.trim();
            if self.store.find_team_by_name(name).await?.is_some() {
                summary.teams_existing += 1;
                continue;
            }
            roster::create_team(self.store, name, self.actor).await?;
            summary.teams_created += 1;
        }
        info!(
            created = summary.teams_created,
            existing = summary.teams_existing,
            "Teams ready"
        );

        for (index, entry) in roster.persons.iter().enumerate() {
            let request = RegisterPersonRequest {
                full_name: entry.full_name.clone(),
                team: entry.team.clone(),
                role: entry.role,
            };
            match roster::register(self.store, &request).await {
                Ok(person) => summary.badges.push(IssuedBadge {
                    person_id: person.person_id,
                    badge_id: person.badge_id,
                    full_name: person.full_name,
                    team: person.team,
                    role: person.role,
                }),
                Err(e) => {
                    warn!(person = %entry.full_name, error = %e, "Failed to register person");
                    summary.failures.push(FailedEntry {
                        line: index + 1,
                        full_name: entry.full_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            registered = summary.badges.len(),
            failed = summary.failures.len(),
            "Persons registered"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use storage::store::memory::MemoryStore;
    use storage::store::{PersonStore, ScoreStore};

    use super::*;

    fn roster(json: &str) -> RosterFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_team_for_participant_is_an_error() {
        let file = roster(
            r#"{"teams": ["Alpha"], "persons": [
                {"full_name": "Ada", "team": null, "role": "general_participant"}
            ]}"#,
        );

        assert!(matches!(
            RosterValidator::validate(&file),
            Err(AdminError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_team_is_only_a_warning() {
        let file = roster(
            r#"{"persons": [
                {"full_name": "Ada", "team": "Alpha", "role": "team_leader"},
                {"full_name": "Lin", "team": null, "role": "officer"}
            ]}"#,
        );

        let report = RosterValidator::validate(&file).unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_duplicate_team_is_an_error() {
        let file = roster(r#"{"teams": ["Alpha", " Alpha "]}"#);

        assert!(RosterValidator::validate(&file).is_err());
    }

    #[tokio::test]
    async fn test_import_creates_teams_and_issues_badges() {
        let store = MemoryStore::new();
        store.insert_team("Alpha", 150).await.unwrap();
        let file = roster(
            r#"{"teams": ["Alpha", "Beta"], "persons": [
                {"full_name": "Ada", "team": "Alpha", "role": "general_participant"},
                {"full_name": "Grace", "team": "Beta", "role": "team_leader"},
                {"full_name": "Lin", "role": "facilitator"}
            ]}"#,
        );

        let summary = RosterImporter::new(&store, "cli")
            .import(&file)
            .await
            .unwrap();

        assert_eq!(summary.teams_created, 1);
        assert_eq!(summary.teams_existing, 1);
        assert_eq!(summary.badges.len(), 3);
        let lin = store
            .find_person_by_badge(&summary.badges[2].badge_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lin.role, Role::Facilitator);
        assert_eq!(lin.team, None);
        assert!(store.find_team_by_name("Beta").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_row_keeps_issued_badges() {
        let store = MemoryStore::new();
        let file = roster(
            r#"{"teams": ["Alpha"], "persons": [
                {"full_name": "Ada", "team": "Alpha", "role": "general_participant"},
                {"full_name": "Grace", "team": "Ghost", "role": "general_participant"},
                {"full_name": "Linus", "team": "Alpha", "role": "team_leader"}
            ]}"#,
        );
        let report = RosterValidator::validate(&file).unwrap();
        assert_eq!(report.warnings.len(), 1);

        let summary = RosterImporter::new(&store, "cli")
            .import(&file)
            .await
            .unwrap();

        let names: Vec<_> = summary.badges.iter().map(|b| b.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Linus"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].line, 2);
        assert_eq!(summary.failures[0].full_name, "Grace");
        for badge in &summary.badges {
            assert!(
                store
                    .find_person_by_badge(&badge.badge_id)
                    .await
                    .unwrap()
                    .is_some()
            );
        }
        assert_eq!(store.list_persons().await.unwrap().len(), 2);
    }
}
