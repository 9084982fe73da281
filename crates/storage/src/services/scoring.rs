//! Score accumulation: signed deltas on team totals, an append-only log of
//! every adjustment, and reconciliation of totals from that log.

use uuid::Uuid;

use crate::dto::common::PaginationParams;
use crate::error::{Result, StorageError};
use crate::models::{AuditAction, BASE_SCORE, ScoreLogEntry, Team};
use crate::services::audit;
use crate::store::Store;

fn describe_delta(delta: i32) -> String {
    if delta >= 0 {
        format!("merit +{delta}")
    } else {
        format!("demerit {delta}")
    }
}

/// Add `delta` to a team (clamped at zero) and log it with its true value.
pub async fn apply_delta<S>(
    store: &S,
    team_id: Uuid,
    delta: i32,
    reason: &str,
    actor: &str,
) -> Result<(Team, ScoreLogEntry)>
where
    S: Store + ?Sized,
{
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(StorageError::Validation(
            "A reason or event name is required".to_string(),
        ));
    }

    let (team, entry) = store.apply_delta(team_id, delta, reason).await?;

    tracing::info!(
        team = %team.name,
        delta,
        score = team.score,
        "Score adjusted"
    );
    audit::record(
        store,
        actor,
        AuditAction::ScoreAdjust,
        &team.name,
        audit::message(format!(
            "{} for {}: {} (score now {})",
            describe_delta(delta),
            team.name,
            reason,
            team.score
        )),
    )
    .await;

    Ok((team, entry))
}

/// Remove a log entry and take its delta back off the team (clamped at zero).
pub async fn delete_score_entry<S>(
    store: &S,
    entry_id: Uuid,
    actor: &str,
) -> Result<(ScoreLogEntry, Team)>
where
    S: Store + ?Sized,
{
    let (entry, team) = store.delete_score_entry(entry_id).await?;

    tracing::info!(
        team = %team.name,
        removed_delta = entry.delta,
        score = team.score,
        "Score entry deleted"
    );
    audit::record(
        store,
        actor,
        AuditAction::DeleteScore,
        &entry.team_name,
        audit::message(format!(
            "Removed {} ({}) from {}; score now {}",
            describe_delta(entry.delta),
            entry.reason,
            team.name,
            team.score
        )),
    )
    .await;

    Ok((entry, team))
}

/// Rebuild every team score as the base plus the sum of its logged deltas.
pub async fn recalculate_all_totals<S>(store: &S, actor: &str) -> Result<Vec<Team>>
where
    S: Store + ?Sized,
{
    let teams = store.recalculate_totals(BASE_SCORE).await?;

    tracing::info!(teams = teams.len(), "Team totals recalculated from score log");
    audit::record(
        store,
        actor,
        AuditAction::RecalculateScores,
        "all teams",
        audit::message(format!(
            "Recalculated {} team totals from base {}",
            teams.len(),
            BASE_SCORE
        )),
    )
    .await;

    Ok(teams)
}

/// Put every team back to the base score; the log is left alone.
pub async fn reset_all_scores<S>(store: &S, actor: &str) -> Result<u64>
where
    S: Store + ?Sized,
{
    let count = store.reset_scores(BASE_SCORE).await?;

    tracing::info!(teams = count, "All team scores reset");
    audit::record(
        store,
        actor,
        AuditAction::ResetScores,
        "all teams",
        audit::message(format!("Reset {count} teams to {BASE_SCORE}")),
    )
    .await;

    Ok(count)
}

pub async fn list_score_log<S>(
    store: &S,
    team_id: Option<Uuid>,
    pagination: &PaginationParams,
) -> Result<(Vec<ScoreLogEntry>, i64)>
where
    S: Store + ?Sized,
{
    store
        .list_score_log(team_id, pagination.offset(), pagination.limit())
        .await
}
