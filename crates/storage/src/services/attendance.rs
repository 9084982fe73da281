//! Attendance ledger: check-in/check-out transitions over the general and
//! staff logbooks.
//!
//! The open-session invariant (at most one session with a null `time_out`
//! per person and logbook) is held by the store: opening is a conditional
//! insert and closing is a conditional update, so two racing scans of the
//! same badge cannot both succeed.

use uuid::Uuid;

use crate::dto::scan::{BatchScanResult, ScanMode, ScanOutcome, ScanStatus};
use crate::error::Result;
use crate::models::{AuditAction, Logbook, LogbookEntry, Person};
use crate::services::audit;
use crate::store::Store;

/// Where a scan came from; decides which audit action is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    Interactive,
    Batch,
}

impl ScanSource {
    fn audit_action(self, mode: ScanMode) -> AuditAction {
        match (self, mode) {
            (ScanSource::Interactive, ScanMode::TimeIn) => AuditAction::CheckIn,
            (ScanSource::Interactive, ScanMode::TimeOut) => AuditAction::CheckOut,
            (ScanSource::Batch, ScanMode::TimeIn) => AuditAction::BatchScan,
            (ScanSource::Batch, ScanMode::TimeOut) => AuditAction::BatchScanOut,
        }
    }
}

/// Apply one scan to the logbook matching the person's role.
pub async fn process_scan<S>(
    store: &S,
    badge_id: &str,
    mode: ScanMode,
    source: ScanSource,
    actor: &str,
) -> Result<ScanOutcome>
where
    S: Store + ?Sized,
{
    let badge_id = badge_id.trim();
    if badge_id.is_empty() {
        return Ok(ScanOutcome::missing(mode));
    }

    let Some(person) = store.find_person_by_badge(badge_id).await? else {
        tracing::debug!(badge_id, "Scan of unregistered badge");
        return Ok(ScanOutcome::missing(mode));
    };

    let logbook = Logbook::for_role(person.role);
    let (status, entry) = match mode {
        ScanMode::TimeIn => check_in(store, logbook, &person).await?,
        ScanMode::TimeOut => check_out(store, logbook, &person).await?,
    };

    if status == ScanStatus::Ok {
        tracing::info!(
            person_id = %person.person_id,
            %logbook,
            ?mode,
            "Attendance recorded"
        );
        audit::record(
            store,
            actor,
            source.audit_action(mode),
            &person.full_name,
            audit::message(format!(
                "{} ({}) {} in the {} logbook",
                person.full_name,
                person.badge_id,
                match mode {
                    ScanMode::TimeIn => "checked in",
                    ScanMode::TimeOut => "checked out",
                },
                logbook
            )),
        )
        .await;
    } else {
        tracing::debug!(person_id = %person.person_id, ?status, ?mode, "Scan was a no-op");
    }

    Ok(ScanOutcome {
        status,
        mode,
        person: Some(person),
        logbook: Some(logbook),
        entry,
    })
}

async fn check_in<S>(
    store: &S,
    logbook: Logbook,
    person: &Person,
) -> Result<(ScanStatus, Option<LogbookEntry>)>
where
    S: Store + ?Sized,
{
    match store.open_session(logbook, person.person_id).await? {
        Some(entry) => Ok((ScanStatus::Ok, Some(entry))),
        None => Ok((ScanStatus::Duplicate, None)),
    }
}

async fn check_out<S>(
    store: &S,
    logbook: Logbook,
    person: &Person,
) -> Result<(ScanStatus, Option<LogbookEntry>)>
where
    S: Store + ?Sized,
{
    if let Some(entry) = store
        .close_latest_session(logbook, person.person_id)
        .await?
    {
        return Ok((ScanStatus::Ok, Some(entry)));
    }

    let status = if store.has_closed_session(logbook, person.person_id).await? {
        ScanStatus::NotCheckedIn
    } else {
        ScanStatus::NoActiveSession
    };
    Ok((status, None))
}

/// Apply scans one after another. A failure on one id is reported in its
/// result and does not stop the rest.
pub async fn process_scan_batch<S>(
    store: &S,
    badge_ids: &[String],
    mode: ScanMode,
    actor: &str,
) -> Vec<BatchScanResult>
where
    S: Store + ?Sized,
{
    let mut results = Vec::with_capacity(badge_ids.len());

    for badge_id in badge_ids {
        let result = match process_scan(store, badge_id, mode, ScanSource::Batch, actor).await {
            Ok(outcome) => BatchScanResult::from_outcome(badge_id.clone(), &outcome),
            Err(e) => {
                tracing::error!(badge_id = %badge_id, error = %e, "Batch scan failed for badge");
                BatchScanResult::error(badge_id.clone(), e.to_string())
            }
        };
        results.push(result);
    }

    tracing::info!(count = results.len(), ?mode, "Batch scan processed");
    results
}

pub async fn list_entries<S>(
    store: &S,
    logbook: Logbook,
    person_id: Option<Uuid>,
) -> Result<Vec<LogbookEntry>>
where
    S: Store + ?Sized,
{
    store.list_entries(logbook, person_id).await
}

pub async fn list_open_sessions<S>(store: &S, logbook: Logbook) -> Result<Vec<LogbookEntry>>
where
    S: Store + ?Sized,
{
    store.list_open_sessions(logbook).await
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::dto::scan::BatchScanStatus;
    use crate::models::Role;
    use crate::store::{NewPerson, PersonStore};
    use crate::store::memory::MemoryStore;

    async fn register(store: &MemoryStore, badge: &str, role: Role) -> Person {
        store
            .insert_person(&NewPerson {
                badge_id: badge.to_string(),
                full_name: format!("Person {badge}"),
                team: Some("Alpha".to_string()),
                role,
            })
            .await
            .unwrap()
    }

    async fn scan(store: &MemoryStore, badge: &str, mode: ScanMode) -> ScanStatus {
        process_scan(store, badge, mode, ScanSource::Interactive, "scanner")
            .await
            .unwrap()
            .status
    }

    fn open_count(store: &MemoryStore, logbook: Logbook, person: &Person) -> usize {
        store
            .logbook_rows(logbook)
            .iter()
            .filter(|e| e.person_id == person.person_id && e.is_open())
            .count()
    }

    #[tokio::test]
    async fn test_unknown_badge_is_missing() {
        let store = MemoryStore::new();

        assert_eq!(scan(&store, "nope", ScanMode::TimeIn).await, ScanStatus::Missing);
        assert_eq!(scan(&store, "   ", ScanMode::TimeOut).await, ScanStatus::Missing);
        assert!(store.logbook_rows(Logbook::General).is_empty());
        assert!(store.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn test_badge_is_trimmed_before_lookup() {
        let store = MemoryStore::new();
        register(&store, "badge-1", Role::GeneralParticipant).await;

        assert_eq!(scan(&store, "  badge-1\n", ScanMode::TimeIn).await, ScanStatus::Ok);
    }

    #[tokio::test]
    async fn test_double_check_in_is_duplicate() {
        let store = MemoryStore::new();
        let person = register(&store, "b", Role::GeneralParticipant).await;

        assert_eq!(scan(&store, "b", ScanMode::TimeIn).await, ScanStatus::Ok);
        assert_eq!(scan(&store, "b", ScanMode::TimeIn).await, ScanStatus::Duplicate);

        assert_eq!(store.logbook_rows(Logbook::General).len(), 1);
        assert_eq!(open_count(&store, Logbook::General, &person), 1);
    }

    #[tokio::test]
    async fn test_double_check_out_writes_time_out_once() {
        let store = MemoryStore::new();
        register(&store, "b", Role::GeneralParticipant).await;

        scan(&store, "b", ScanMode::TimeIn).await;
        assert_eq!(scan(&store, "b", ScanMode::TimeOut).await, ScanStatus::Ok);
        let closed = store.logbook_rows(Logbook::General)[0].time_out;
        assert_eq!(
            scan(&store, "b", ScanMode::TimeOut).await,
            ScanStatus::NotCheckedIn
        );

        assert_eq!(store.logbook_rows(Logbook::General)[0].time_out, closed);
    }

    #[tokio::test]
    async fn test_check_out_without_any_session_is_no_active_session() {
        let store = MemoryStore::new();
        register(&store, "b", Role::Officer).await;

        assert_eq!(
            scan(&store, "b", ScanMode::TimeOut).await,
            ScanStatus::NoActiveSession
        );
    }

    #[tokio::test]
    async fn test_role_routing_for_every_role() {
        for role in Role::ALL {
            let store = MemoryStore::new();
            let person = register(&store, "r", role).await;

            assert_eq!(scan(&store, "r", ScanMode::TimeIn).await, ScanStatus::Ok);

            let (used, unused) = if role.is_staff() {
                (Logbook::Staff, Logbook::General)
            } else {
                (Logbook::General, Logbook::Staff)
            };
            assert_eq!(open_count(&store, used, &person), 1, "{role}");
            assert!(store.logbook_rows(unused).is_empty(), "{role}");
        }
    }

    #[tokio::test]
    async fn test_open_session_invariant_under_random_replay() {
        let mut rng = StdRng::seed_from_u64(7);
        let store = MemoryStore::new();
        let general = register(&store, "g", Role::GeneralParticipant).await;
        let staff = register(&store, "s", Role::Facilitator).await;

        for _ in 0..500 {
            let badge = if rng.gen_bool(0.5) { "g" } else { "s" };
            let mode = if rng.gen_bool(0.5) {
                ScanMode::TimeIn
            } else {
                ScanMode::TimeOut
            };
            scan(&store, badge, mode).await;

            assert!(open_count(&store, Logbook::General, &general) <= 1);
            assert!(open_count(&store, Logbook::Staff, &staff) <= 1);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scan_sequence() {
        let store = MemoryStore::new();
        let person = register(&store, "p", Role::GeneralParticipant).await;

        assert_eq!(scan(&store, "p", ScanMode::TimeIn).await, ScanStatus::Ok);
        assert_eq!(scan(&store, "p", ScanMode::TimeIn).await, ScanStatus::Duplicate);
        assert_eq!(scan(&store, "p", ScanMode::TimeOut).await, ScanStatus::Ok);
        assert_eq!(
            scan(&store, "p", ScanMode::TimeOut).await,
            ScanStatus::NotCheckedIn
        );

        let rows = store.logbook_rows(Logbook::General);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].person_id, person.person_id);
        assert!(rows[0].time_out.is_some());
        assert!(rows[0].time_out.unwrap() >= rows[0].time_in);
    }

    #[tokio::test]
    async fn test_successful_scans_are_audited() {
        let store = MemoryStore::new();
        register(&store, "p", Role::GeneralParticipant).await;

        scan(&store, "p", ScanMode::TimeIn).await;
        scan(&store, "p", ScanMode::TimeIn).await;
        scan(&store, "p", ScanMode::TimeOut).await;

        let actions: Vec<AuditAction> = store.audit_entries().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::CheckIn, AuditAction::CheckOut]);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_the_scan() {
        let store = MemoryStore::new();
        register(&store, "p", Role::GeneralParticipant).await;
        store.fail_audit_writes(true);

        assert_eq!(scan(&store, "p", ScanMode::TimeIn).await, ScanStatus::Ok);
        assert_eq!(store.logbook_rows(Logbook::General).len(), 1);
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let store = MemoryStore::new();
        register(&store, "a", Role::GeneralParticipant).await;
        register(&store, "b", Role::Executive).await;
        store.fail_lookups_for("broken");

        let ids: Vec<String> = ["a", "broken", "ghost", "b", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = process_scan_batch(&store, &ids, ScanMode::TimeIn, "admin").await;

        let statuses: Vec<BatchScanStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                BatchScanStatus::Ok,
                BatchScanStatus::Error,
                BatchScanStatus::Missing,
                BatchScanStatus::Ok,
                BatchScanStatus::Duplicate,
            ]
        );
        assert_eq!(results[1].uuid, "broken");
        assert!(results[1].message.is_some());

        let batch_audits = store
            .audit_entries()
            .iter()
            .filter(|e| e.action == AuditAction::BatchScan)
            .count();
        assert_eq!(batch_audits, 2);
    }

    #[tokio::test]
    async fn test_batch_check_out_audits_batch_scan_out() {
        let store = MemoryStore::new();
        register(&store, "a", Role::TeamLeader).await;
        scan(&store, "a", ScanMode::TimeIn).await;

        let results =
            process_scan_batch(&store, &["a".to_string()], ScanMode::TimeOut, "admin").await;

        assert_eq!(results[0].status, BatchScanStatus::Ok);
        assert_eq!(
            store.audit_entries().last().map(|e| e.action),
            Some(AuditAction::BatchScanOut)
        );
    }
}
