//! People and teams: registration, profile edits and team maintenance.

use uuid::Uuid;
use validator::Validate;

use crate::dto::person::{RegisterPersonRequest, UpdatePersonRequest};
use crate::error::{Result, StorageError};
use crate::models::{
    AuditAction, BASE_SCORE, Logbook, Person, Role, SELF_EDIT_LIMIT, Team, TeamWithMembers,
};
use crate::services::audit;
use crate::store::{NewPerson, PersonUpdate, Store};

fn validate<T: Validate>(request: &T) -> Result<()> {
    request
        .validate()
        .map_err(|e| StorageError::Validation(e.to_string()))
}

fn normalize_team(team: Option<&str>) -> Option<String> {
    team.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Team membership must name an existing team, and is mandatory for some roles.
async fn check_team<S>(store: &S, role: Role, team: Option<&str>) -> Result<()>
where
    S: Store + ?Sized,
{
    match team {
        None if role.requires_team() => Err(StorageError::Validation(format!(
            "A team is required for the {role} role"
        ))),
        None => Ok(()),
        Some(name) => match store.find_team_by_name(name).await? {
            Some(_) => Ok(()),
            None => Err(StorageError::Validation(format!("Unknown team '{name}'"))),
        },
    }
}

/// Team rules apply only when the request touches team or role, so a name fix
/// still goes through for a member whose team was deleted.
async fn check_requested_team<S>(
    store: &S,
    request: &UpdatePersonRequest,
    update: &PersonUpdate,
) -> Result<()>
where
    S: Store + ?Sized,
{
    if request.team.is_none() && request.role.is_none() {
        return Ok(());
    }
    check_team(store, update.role, update.team.as_deref()).await
}

/// A role change that moves the person to the other logbook is refused while
/// they are checked in to the old one.
async fn check_logbook_move<S>(store: &S, person: &Person, role: Role) -> Result<()>
where
    S: Store + ?Sized,
{
    let current = Logbook::for_role(person.role);
    if current == Logbook::for_role(role) {
        return Ok(());
    }

    let entries = store.list_entries(current, Some(person.person_id)).await?;
    if entries.iter().any(|e| e.is_open()) {
        return Err(StorageError::ConstraintViolation(format!(
            "{} is checked in to the {current} logbook; check out before changing role to {role}",
            person.full_name
        )));
    }

    Ok(())
}

/// Apply a partial update on top of the current profile.
fn merge(person: &Person, request: &UpdatePersonRequest) -> PersonUpdate {
    PersonUpdate {
        full_name: request
            .full_name
            .as_deref()
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| person.full_name.clone()),
        team: match &request.team {
            Some(team) => normalize_team(Some(team)),
            None => person.team.clone(),
        },
        role: request.role.unwrap_or(person.role),
    }
}

fn profile_diff(before: &Person, after: &Person) -> audit::Diff {
    audit::Diff::new()
        .field("full_name", &before.full_name, &after.full_name)
        .field("team", &before.team, &after.team)
        .field("role", &before.role, &after.role)
}

pub async fn register<S>(store: &S, request: &RegisterPersonRequest) -> Result<Person>
where
    S: Store + ?Sized,
{
    validate(request)?;
    let team = normalize_team(request.team.as_deref());
    check_team(store, request.role, team.as_deref()).await?;

    let person = store
        .insert_person(&NewPerson {
            badge_id: Uuid::new_v4().to_string(),
            full_name: request.full_name.trim().to_string(),
            team,
            role: request.role,
        })
        .await?;

    tracing::info!(person_id = %person.person_id, role = %person.role, "Person registered");
    audit::record(
        store,
        &person.person_id.to_string(),
        AuditAction::Register,
        &person.full_name,
        audit::message(format!(
            "{} registered as {} with badge {}",
            person.full_name, person.role, person.badge_id
        )),
    )
    .await;

    Ok(person)
}

/// Public profile lookup by the decoded badge text.
pub async fn find_by_badge<S>(store: &S, badge_id: &str) -> Result<Person>
where
    S: Store + ?Sized,
{
    store
        .find_person_by_badge(badge_id.trim())
        .await?
        .ok_or(StorageError::NotFound)
}

/// Self-service edit, allowed at most [`SELF_EDIT_LIMIT`] times per person.
pub async fn self_edit<S>(
    store: &S,
    person_id: Uuid,
    request: &UpdatePersonRequest,
) -> Result<Person>
where
    S: Store + ?Sized,
{
    validate(request)?;
    let before = store.find_person(person_id).await?;
    if before.edit_count >= SELF_EDIT_LIMIT {
        return Err(StorageError::EditLimitReached {
            limit: SELF_EDIT_LIMIT,
        });
    }

    let update = merge(&before, request);
    check_requested_team(store, request, &update).await?;
    check_logbook_move(store, &before, update.role).await?;

    let after = store
        .self_edit_person(person_id, &update, SELF_EDIT_LIMIT)
        .await?
        .ok_or(StorageError::EditLimitReached {
            limit: SELF_EDIT_LIMIT,
        })?;

    audit::record(
        store,
        &person_id.to_string(),
        AuditAction::SelfEdit,
        &after.full_name,
        profile_diff(&before, &after).into_details(),
    )
    .await;

    Ok(after)
}

/// Administrative edit; not subject to the self-service cap.
pub async fn admin_update<S>(
    store: &S,
    person_id: Uuid,
    request: &UpdatePersonRequest,
    actor: &str,
) -> Result<Person>
where
    S: Store + ?Sized,
{
    validate(request)?;
    let before = store.find_person(person_id).await?;
    let update = merge(&before, request);
    check_requested_team(store, request, &update).await?;
    check_logbook_move(store, &before, update.role).await?;

    let after = store.update_person(person_id, &update).await?;

    let diff = profile_diff(&before, &after);
    if !diff.is_empty() {
        audit::record(
            store,
            actor,
            AuditAction::ProfileUpdate,
            &after.full_name,
            diff.into_details(),
        )
        .await;
    }

    Ok(after)
}

/// Removes the person together with their attendance history.
pub async fn delete_person<S>(store: &S, person_id: Uuid, actor: &str) -> Result<Person>
where
    S: Store + ?Sized,
{
    let person = store.delete_person(person_id).await?;

    tracing::info!(%person_id, "Person deleted");
    audit::record(
        store,
        actor,
        AuditAction::ProfileDelete,
        &person.full_name,
        audit::message(format!(
            "Deleted {} ({}, badge {})",
            person.full_name, person.role, person.badge_id
        )),
    )
    .await;

    Ok(person)
}

pub async fn list_persons<S>(store: &S) -> Result<Vec<Person>>
where
    S: Store + ?Sized,
{
    store.list_persons().await
}

pub async fn create_team<S>(store: &S, name: &str, actor: &str) -> Result<Team>
where
    S: Store + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::Validation("Team name is required".to_string()));
    }

    let team = store.insert_team(name, BASE_SCORE).await?;

    audit::record(
        store,
        actor,
        AuditAction::TeamCreate,
        &team.name,
        audit::message(format!("Created team {} at {}", team.name, team.score)),
    )
    .await;

    Ok(team)
}

/// Renames a team; members follow the new name.
pub async fn rename_team<S>(store: &S, team_id: Uuid, name: &str, actor: &str) -> Result<Team>
where
    S: Store + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::Validation("Team name is required".to_string()));
    }

    let before = store.find_team(team_id).await?;
    let team = store.rename_team(team_id, name).await?;

    audit::record(
        store,
        actor,
        AuditAction::TeamRename,
        &team.name,
        audit::Diff::new()
            .field("name", &before.name, &team.name)
            .into_details(),
    )
    .await;

    Ok(team)
}

/// Deletes a team. Members become teamless and its score history is kept.
pub async fn delete_team<S>(store: &S, team_id: Uuid, actor: &str) -> Result<Team>
where
    S: Store + ?Sized,
{
    let team = store.delete_team(team_id).await?;

    tracing::info!(%team_id, name = %team.name, "Team deleted");
    audit::record(
        store,
        actor,
        AuditAction::TeamDelete,
        &team.name,
        audit::message(format!("Deleted team {} at {}", team.name, team.score)),
    )
    .await;

    Ok(team)
}

pub async fn list_standings<S>(store: &S) -> Result<Vec<TeamWithMembers>>
where
    S: Store + ?Sized,
{
    store.list_teams().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::scan::{ScanMode, ScanStatus};
    use crate::services::attendance::{self, ScanSource};
    use crate::store::memory::MemoryStore;
    use crate::store::{LogbookStore, PersonStore, ScoreStore};

    fn participant(name: &str, team: Option<&str>) -> RegisterPersonRequest {
        RegisterPersonRequest {
            full_name: name.to_string(),
            team: team.map(str::to_string),
            role: Role::GeneralParticipant,
        }
    }

    async fn store_with_team(name: &str) -> MemoryStore {
        let store = MemoryStore::new();
        create_team(&store, name, "admin").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_register_assigns_fresh_badge() {
        let store = store_with_team("Alpha").await;

        let first = register(&store, &participant("  Ada  ", Some("Alpha")))
            .await
            .unwrap();
        let second = register(&store, &participant("Grace", Some("Alpha")))
            .await
            .unwrap();

        assert_eq!(first.full_name, "Ada");
        assert_eq!(first.edit_count, 0);
        assert!(Uuid::parse_str(&first.badge_id).is_ok());
        assert_ne!(first.badge_id, second.badge_id);

        let audit = store
            .audit_entries()
            .into_iter()
            .find(|e| e.action == AuditAction::Register)
            .unwrap();
        assert_eq!(audit.actor, first.person_id.to_string());
    }

    #[tokio::test]
    async fn test_register_requires_team_for_participants() {
        let store = store_with_team("Alpha").await;

        let err = register(&store, &participant("Ada", None)).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = register(&store, &participant("Ada", Some("Nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let facilitator = RegisterPersonRequest {
            full_name: "Lin".to_string(),
            team: None,
            role: Role::Facilitator,
        };
        assert!(register(&store, &facilitator).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_badge_trims_input() {
        let store = store_with_team("Alpha").await;
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();

        let found = find_by_badge(&store, &format!(" {}\n", person.badge_id))
            .await
            .unwrap();
        assert_eq!(found.person_id, person.person_id);

        assert!(matches!(
            find_by_badge(&store, "unknown").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_self_edit_is_capped() {
        let store = store_with_team("Alpha").await;
        create_team(&store, "Beta", "admin").await.unwrap();
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();

        let rename = UpdatePersonRequest {
            full_name: Some("Ada L".to_string()),
            ..Default::default()
        };
        let after = self_edit(&store, person.person_id, &rename).await.unwrap();
        assert_eq!(after.full_name, "Ada L");
        assert_eq!(after.team.as_deref(), Some("Alpha"));
        assert_eq!(after.remaining_self_edits(), 1);

        let move_team = UpdatePersonRequest {
            team: Some("Beta".to_string()),
            ..Default::default()
        };
        let after = self_edit(&store, person.person_id, &move_team)
            .await
            .unwrap();
        assert_eq!(after.team.as_deref(), Some("Beta"));
        assert_eq!(after.edit_count, 2);

        let err = self_edit(&store, person.person_id, &rename)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EditLimitReached { limit: 2 }));
        let stored = store.find_person(person.person_id).await.unwrap();
        assert_eq!(stored.team.as_deref(), Some("Beta"));
    }

    #[tokio::test]
    async fn test_self_edit_audit_lists_changed_fields() {
        let store = store_with_team("Alpha").await;
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();

        let request = UpdatePersonRequest {
            full_name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        self_edit(&store, person.person_id, &request).await.unwrap();

        let entry = store
            .audit_entries()
            .into_iter()
            .find(|e| e.action == AuditAction::SelfEdit)
            .unwrap();
        let changes = &entry.details["changes"];
        assert_eq!(changes["full_name"]["before"], "Ada");
        assert_eq!(changes["full_name"]["after"], "Ada Lovelace");
        assert!(changes.get("team").is_none());
    }

    #[tokio::test]
    async fn test_admin_update_is_not_capped() {
        let store = store_with_team("Alpha").await;
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();

        for i in 0..4 {
            let request = UpdatePersonRequest {
                full_name: Some(format!("Ada {i}")),
                ..Default::default()
            };
            admin_update(&store, person.person_id, &request, "admin")
                .await
                .unwrap();
        }

        let promoted = admin_update(
            &store,
            person.person_id,
            &UpdatePersonRequest {
                role: Some(Role::Officer),
                team: Some(String::new()),
                ..Default::default()
            },
            "admin",
        )
        .await
        .unwrap();
        assert_eq!(promoted.role, Role::Officer);
        assert_eq!(promoted.team, None);
        assert_eq!(promoted.edit_count, 0);
    }

    #[tokio::test]
    async fn test_delete_person_is_audited() {
        let store = store_with_team("Alpha").await;
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();

        delete_person(&store, person.person_id, "admin").await.unwrap();

        assert!(matches!(
            store.find_person(person.person_id).await,
            Err(StorageError::NotFound)
        ));
        assert!(
            store
                .audit_entries()
                .iter()
                .any(|e| e.action == AuditAction::ProfileDelete && e.actor == "admin")
        );
    }

    #[tokio::test]
    async fn test_standings_count_members_and_follow_renames() {
        let store = store_with_team("Alpha").await;
        let beta = create_team(&store, "Beta", "admin").await.unwrap();
        register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();
        let grace = register(&store, &participant("Grace", Some("Beta")))
            .await
            .unwrap();
        register(&store, &participant("Linus", Some("Beta")))
            .await
            .unwrap();

        rename_team(&store, beta.team_id, "Gamma", "admin")
            .await
            .unwrap();

        let standings = list_standings(&store).await.unwrap();
        let gamma = standings.iter().find(|t| t.name == "Gamma").unwrap();
        assert_eq!(gamma.member_count, 2);
        assert_eq!(gamma.score, BASE_SCORE);
        let moved = store.find_person(grace.person_id).await.unwrap();
        assert_eq!(moved.team.as_deref(), Some("Gamma"));
    }

    #[tokio::test]
    async fn test_duplicate_team_name_is_rejected() {
        let store = store_with_team("Alpha").await;

        let err = create_team(&store, " Alpha ", "admin").await.unwrap_err();

        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert!(matches!(
            create_team(&store, "  ", "admin").await,
            Err(StorageError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_team_leaves_members_teamless() {
        let store = store_with_team("Alpha").await;
        let alpha = store.find_team_by_name("Alpha").await.unwrap().unwrap();
        let leader = register(
            &store,
            &RegisterPersonRequest {
                full_name: "Ada".to_string(),
                team: Some("Alpha".to_string()),
                role: Role::TeamLeader,
            },
        )
        .await
        .unwrap();

        delete_team(&store, alpha.team_id, "admin").await.unwrap();

        let leader = store.find_person(leader.person_id).await.unwrap();
        assert_eq!(leader.team, None);
    }

    async fn scan(store: &MemoryStore, badge: &str, mode: ScanMode) -> ScanStatus {
        attendance::process_scan(store, badge, mode, ScanSource::Interactive, "scanner")
            .await
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn test_role_change_refused_while_checked_in() {
        let store = store_with_team("Alpha").await;
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();
        assert_eq!(scan(&store, &person.badge_id, ScanMode::TimeIn).await, ScanStatus::Ok);

        let promote = UpdatePersonRequest {
            role: Some(Role::Officer),
            ..Default::default()
        };
        let err = admin_update(&store, person.person_id, &promote, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        let err = self_edit(&store, person.person_id, &promote)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let stored = store.find_person(person.person_id).await.unwrap();
        assert_eq!(stored.role, Role::GeneralParticipant);
        assert_eq!(stored.edit_count, 0);

        assert_eq!(scan(&store, &person.badge_id, ScanMode::TimeOut).await, ScanStatus::Ok);
        let promoted = admin_update(&store, person.person_id, &promote, "admin")
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Officer);

        assert_eq!(scan(&store, &person.badge_id, ScanMode::TimeIn).await, ScanStatus::Ok);
        let general = store
            .list_entries(Logbook::General, Some(person.person_id))
            .await
            .unwrap();
        let staff = store
            .list_entries(Logbook::Staff, Some(person.person_id))
            .await
            .unwrap();
        let open = general.iter().chain(&staff).filter(|e| e.is_open()).count();
        assert_eq!(open, 1);
        assert_eq!(scan(&store, &person.badge_id, ScanMode::TimeOut).await, ScanStatus::Ok);
    }

    #[tokio::test]
    async fn test_role_change_within_logbook_allowed_while_checked_in() {
        let store = store_with_team("Alpha").await;
        let person = register(
            &store,
            &RegisterPersonRequest {
                full_name: "Lin".to_string(),
                team: None,
                role: Role::Facilitator,
            },
        )
        .await
        .unwrap();
        scan(&store, &person.badge_id, ScanMode::TimeIn).await;

        let request = UpdatePersonRequest {
            role: Some(Role::Executive),
            ..Default::default()
        };
        let updated = admin_update(&store, person.person_id, &request, "admin")
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Executive);
        assert_eq!(scan(&store, &person.badge_id, ScanMode::TimeOut).await, ScanStatus::Ok);
    }

    #[tokio::test]
    async fn test_name_fix_allowed_after_team_deleted() {
        let store = store_with_team("Alpha").await;
        let alpha = store.find_team_by_name("Alpha").await.unwrap().unwrap();
        let person = register(&store, &participant("Ada", Some("Alpha")))
            .await
            .unwrap();
        delete_team(&store, alpha.team_id, "admin").await.unwrap();

        let rename = UpdatePersonRequest {
            full_name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        let after = self_edit(&store, person.person_id, &rename).await.unwrap();
        assert_eq!(after.full_name, "Ada Lovelace");
        assert_eq!(after.team, None);

        let role_only = UpdatePersonRequest {
            role: Some(Role::GeneralParticipant),
            ..Default::default()
        };
        let err = self_edit(&store, person.person_id, &role_only)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }
}
