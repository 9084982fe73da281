//! Scoreboard reveal sequence: idle -> countdown -> winner -> idle.
//!
//! Transitions are driven by administrators. Every write is a compare-and-set
//! against the state it was computed from, so two admin surfaces cannot
//! interleave a reveal.

use crate::error::{Result, StorageError};
use crate::models::{AuditAction, RevealState, ScoreboardSettings, TeamWithMembers};
use crate::services::audit;
use crate::store::{RevealPatch, SettingsUpdate, Store};

/// Countdown used when a reveal is started without an explicit value.
pub const DEFAULT_COUNTDOWN: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealCommand {
    Start { countdown: i32 },
    Tick,
    SetCountdown(i32),
    Announce,
    Reset,
}

impl RevealCommand {
    fn target(self) -> RevealState {
        match self {
            RevealCommand::Start { .. } | RevealCommand::Tick | RevealCommand::SetCountdown(_) => {
                RevealState::Countdown
            }
            RevealCommand::Announce => RevealState::Winner,
            RevealCommand::Reset => RevealState::Idle,
        }
    }
}

/// Next `(state, countdown)` for a command, or why it is not allowed.
pub fn next_state(
    state: RevealState,
    countdown: i32,
    command: RevealCommand,
) -> Result<(RevealState, i32)> {
    let invalid = || StorageError::InvalidTransition {
        from: state,
        to: command.target(),
    };

    match (state, command) {
        (RevealState::Idle, RevealCommand::Start { countdown: start }) => {
            if start < 1 {
                return Err(StorageError::Validation(
                    "Countdown must start at 1 or more".to_string(),
                ));
            }
            Ok((RevealState::Countdown, start))
        }
        (RevealState::Countdown, RevealCommand::Tick) => {
            Ok((RevealState::Countdown, (countdown - 1).max(0)))
        }
        (RevealState::Countdown, RevealCommand::SetCountdown(value)) => {
            if value < 0 || value > countdown {
                return Err(StorageError::Validation(format!(
                    "Countdown can only decrease (currently {countdown})"
                )));
            }
            Ok((RevealState::Countdown, value))
        }
        (RevealState::Countdown, RevealCommand::Announce) => Ok((RevealState::Winner, 0)),
        (_, RevealCommand::Reset) => Ok((RevealState::Idle, 0)),
        _ => Err(invalid()),
    }
}

/// Highest score wins; on a tie the first team in `teams` order wins.
pub fn select_winner(teams: &[TeamWithMembers]) -> Option<&TeamWithMembers> {
    teams.iter().fold(None, |best, team| match best {
        Some(current) if current.score >= team.score => Some(current),
        _ => Some(team),
    })
}

/// Apply a reveal command to the shared settings row.
pub async fn transition<S>(
    store: &S,
    command: RevealCommand,
    actor: &str,
) -> Result<ScoreboardSettings>
where
    S: Store + ?Sized,
{
    let current = store.get_settings().await?;
    let (state, countdown) = next_state(current.reveal_state, current.countdown, command)?;

    let patch = match state {
        RevealState::Winner => {
            let teams = store.list_teams().await?;
            let winner = select_winner(&teams).ok_or_else(|| {
                StorageError::Validation("There are no teams to announce".to_string())
            })?;
            RevealPatch {
                reveal_state: state,
                countdown,
                winner_team_id: Some(winner.team_id),
                winner_name: Some(winner.name.clone()),
                winner_score: Some(winner.score),
            }
        }
        _ => RevealPatch {
            reveal_state: state,
            countdown,
            winner_team_id: None,
            winner_name: None,
            winner_score: None,
        },
    };

    let settings = store
        .compare_and_set_reveal(current.reveal_state, current.countdown, &patch)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(
                "Scoreboard changed while applying the command; retry".to_string(),
            )
        })?;

    tracing::info!(
        from = %current.reveal_state,
        to = %settings.reveal_state,
        countdown = settings.countdown,
        "Reveal state updated"
    );

    // Countdown-only changes are not audited.
    if current.reveal_state != settings.reveal_state {
        let details = match &settings.winner_name {
            Some(name) => audit::message(format!(
                "Reveal {} -> {}; winner {} with {}",
                current.reveal_state,
                settings.reveal_state,
                name,
                settings.winner_score.unwrap_or_default()
            )),
            None => audit::message(format!(
                "Reveal {} -> {}",
                current.reveal_state, settings.reveal_state
            )),
        };
        audit::record(store, actor, AuditAction::ScoreboardUpdate, "scoreboard", details).await;
    }

    Ok(settings)
}

/// Change visibility toggles or the forced route. Last writer wins.
pub async fn update_settings<S>(
    store: &S,
    update: &SettingsUpdate,
    actor: &str,
) -> Result<ScoreboardSettings>
where
    S: Store + ?Sized,
{
    let before = store.get_settings().await?;
    let after = store.update_settings(update).await?;

    let diff = audit::Diff::new()
        .field("hide_names", &before.hide_names, &after.hide_names)
        .field("hide_scores", &before.hide_scores, &after.hide_scores)
        .field("hide_bars", &before.hide_bars, &after.hide_bars)
        .field("hide_top2", &before.hide_top2, &after.hide_top2)
        .field("hide_rank_3", &before.hide_rank_3, &after.hide_rank_3)
        .field("hide_rank_4", &before.hide_rank_4, &after.hide_rank_4)
        .field("hide_all", &before.hide_all, &after.hide_all)
        .field("force_route", &before.force_route, &after.force_route);
    if !diff.is_empty() {
        audit::record(
            store,
            actor,
            AuditAction::ScoreboardUpdate,
            "scoreboard",
            diff.into_details(),
        )
        .await;
    }

    Ok(after)
}

/// Transition seen by a viewer between two successive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    CountdownStarted,
    WinnerRevealed,
    Cleared,
}

/// Tracks the last observed reveal state of one viewer.
#[derive(Debug, Default)]
pub struct RevealTracker {
    previous: Option<RevealState>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a transition when the state differs from the previous read.
    /// The first read only primes the tracker.
    pub fn observe(&mut self, settings: &ScoreboardSettings) -> Option<RevealEvent> {
        let current = settings.reveal_state;
        let previous = self.previous.replace(current)?;
        if previous == current {
            return None;
        }
        Some(match current {
            RevealState::Countdown => RevealEvent::CountdownStarted,
            RevealState::Winner => RevealEvent::WinnerRevealed,
            RevealState::Idle => RevealEvent::Cleared,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::BASE_SCORE;
    use crate::store::memory::MemoryStore;
    use crate::store::{ScoreStore, SettingsStore};

    fn standing(name: &str, score: i32) -> TeamWithMembers {
        TeamWithMembers {
            team_id: Uuid::new_v4(),
            name: name.to_string(),
            score,
            created_at: Utc::now(),
            member_count: 0,
        }
    }

    #[test]
    fn test_full_cycle() {
        let (state, count) =
            next_state(RevealState::Idle, 0, RevealCommand::Start { countdown: 10 }).unwrap();
        assert_eq!((state, count), (RevealState::Countdown, 10));

        let (state, count) = next_state(state, count, RevealCommand::Tick).unwrap();
        assert_eq!((state, count), (RevealState::Countdown, 9));

        let (state, count) = next_state(state, count, RevealCommand::Announce).unwrap();
        assert_eq!(state, RevealState::Winner);

        let (state, _) = next_state(state, count, RevealCommand::Reset).unwrap();
        assert_eq!(state, RevealState::Idle);
    }

    #[test]
    fn test_transitions_only_move_forward() {
        assert!(matches!(
            next_state(RevealState::Idle, 0, RevealCommand::Announce),
            Err(StorageError::InvalidTransition {
                from: RevealState::Idle,
                to: RevealState::Winner
            })
        ));
        assert!(matches!(
            next_state(RevealState::Winner, 0, RevealCommand::Start { countdown: 5 }),
            Err(StorageError::InvalidTransition { .. })
        ));
        assert!(matches!(
            next_state(RevealState::Winner, 0, RevealCommand::Tick),
            Err(StorageError::InvalidTransition { .. })
        ));
        assert!(matches!(
            next_state(RevealState::Countdown, 3, RevealCommand::Start { countdown: 10 }),
            Err(StorageError::InvalidTransition { .. })
        ));
        assert!(matches!(
            next_state(RevealState::Idle, 0, RevealCommand::Tick),
            Err(StorageError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_countdown_only_decreases() {
        assert_eq!(
            next_state(RevealState::Countdown, 0, RevealCommand::Tick).unwrap(),
            (RevealState::Countdown, 0)
        );
        assert_eq!(
            next_state(RevealState::Countdown, 5, RevealCommand::SetCountdown(3)).unwrap(),
            (RevealState::Countdown, 3)
        );
        assert!(matches!(
            next_state(RevealState::Countdown, 5, RevealCommand::SetCountdown(6)),
            Err(StorageError::Validation(_))
        ));
        assert!(matches!(
            next_state(RevealState::Idle, 0, RevealCommand::Start { countdown: 0 }),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_winner_tie_goes_to_first_in_order() {
        let teams = vec![
            standing("A", 50),
            standing("B", 90),
            standing("C", 90),
            standing("D", 10),
        ];

        let winner = select_winner(&teams).unwrap();

        assert_eq!(winner.name, "B");
        assert_eq!(winner.score, 90);
        assert!(select_winner(&[]).is_none());
    }

    #[tokio::test]
    async fn test_announce_snapshots_winner() {
        let store = MemoryStore::new();
        let alpha = store.insert_team("Alpha", BASE_SCORE).await.unwrap();
        store.insert_team("Beta", BASE_SCORE - 40).await.unwrap();

        transition(&store, RevealCommand::Start { countdown: 3 }, "admin")
            .await
            .unwrap();
        transition(&store, RevealCommand::Tick, "admin").await.unwrap();
        let settings = transition(&store, RevealCommand::Announce, "admin")
            .await
            .unwrap();

        assert_eq!(settings.reveal_state, RevealState::Winner);
        assert_eq!(settings.winner_team_id, Some(alpha.team_id));
        assert_eq!(settings.winner_score, Some(BASE_SCORE));

        // Later score changes do not move the frozen winner.
        store.apply_delta(alpha.team_id, -100, "Penalty").await.unwrap();
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.winner_team_id, Some(alpha.team_id));

        let settings = transition(&store, RevealCommand::Reset, "admin")
            .await
            .unwrap();
        assert_eq!(settings.reveal_state, RevealState::Idle);
        assert_eq!(settings.winner_team_id, None);
    }

    #[tokio::test]
    async fn test_announce_without_teams_is_rejected() {
        let store = MemoryStore::new();
        transition(&store, RevealCommand::Start { countdown: 1 }, "admin")
            .await
            .unwrap();

        let err = transition(&store, RevealCommand::Announce, "admin")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Validation(_)));
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.reveal_state, RevealState::Countdown);
    }

    #[tokio::test]
    async fn test_state_changes_are_audited_but_ticks_are_not() {
        let store = MemoryStore::new();
        store.insert_team("Alpha", BASE_SCORE).await.unwrap();

        transition(&store, RevealCommand::Start { countdown: 2 }, "admin")
            .await
            .unwrap();
        transition(&store, RevealCommand::Tick, "admin").await.unwrap();
        transition(&store, RevealCommand::Tick, "admin").await.unwrap();
        transition(&store, RevealCommand::Announce, "admin")
            .await
            .unwrap();

        let audits = store.audit_entries();
        assert_eq!(audits.len(), 2);
        assert!(
            audits
                .iter()
                .all(|e| e.action == AuditAction::ScoreboardUpdate)
        );
    }

    #[tokio::test]
    async fn test_update_settings_audits_diff() {
        let store = MemoryStore::new();
        let update = SettingsUpdate {
            hide_top2: Some(true),
            force_route: Some(Some("/reveal".to_string())),
            ..Default::default()
        };

        let settings = update_settings(&store, &update, "admin").await.unwrap();

        assert!(settings.hide_top2);
        assert_eq!(settings.force_route.as_deref(), Some("/reveal"));
        let details = &store.audit_entries()[0].details;
        assert_eq!(details["changes"]["hide_top2"]["after"], true);
        assert!(details["changes"].get("hide_names").is_none());
    }

    #[test]
    fn test_tracker_reports_each_transition_once() {
        let mut tracker = RevealTracker::new();
        let mut settings = ScoreboardSettings::default();

        assert_eq!(tracker.observe(&settings), None);

        settings.reveal_state = RevealState::Countdown;
        assert_eq!(
            tracker.observe(&settings),
            Some(RevealEvent::CountdownStarted)
        );
        assert_eq!(tracker.observe(&settings), None);

        settings.reveal_state = RevealState::Winner;
        assert_eq!(tracker.observe(&settings), Some(RevealEvent::WinnerRevealed));
        assert_eq!(tracker.observe(&settings), None);

        settings.reveal_state = RevealState::Idle;
        assert_eq!(tracker.observe(&settings), Some(RevealEvent::Cleared));
    }
}
