use std::cmp::Ordering;

use crate::dto::scoreboard::{BoardRow, ScoreboardView, WinnerInfo};
use crate::error::Result;
use crate::models::{RevealState, ScoreboardSettings, TeamWithMembers};
use crate::store::Store;

/// Poll interval advertised to viewers when none is configured.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Display order: score descending, then name, then id.
pub fn standings_order(a: &TeamWithMembers, b: &TeamWithMembers) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

fn rank_hidden(settings: &ScoreboardSettings, rank: u32) -> bool {
    settings.hide_all
        || match rank {
            1 | 2 => settings.hide_top2,
            3 => settings.hide_rank_3,
            4 => settings.hide_rank_4,
            _ => false,
        }
}

fn bar_percent(score: i32, leader: i32) -> u8 {
    if leader <= 0 {
        return 0;
    }
    let percent = i64::from(score.max(0)) * 100 / i64::from(leader);
    percent.clamp(0, 100) as u8
}

/// Build the redacted public view from raw standings and the settings row.
pub fn build_view(
    mut teams: Vec<TeamWithMembers>,
    settings: &ScoreboardSettings,
    poll_interval_ms: u64,
) -> ScoreboardView {
    teams.sort_by(standings_order);
    let leader = teams.first().map(|t| t.score).unwrap_or(0);

    let rows = teams
        .iter()
        .zip(1u32..)
        .map(|(team, rank)| {
            let hidden = rank_hidden(settings, rank);
            let hide_name = hidden || settings.hide_names;
            BoardRow {
                rank,
                team_id: (!hide_name).then_some(team.team_id),
                name: (!hide_name).then(|| team.name.clone()),
                score: (!(hidden || settings.hide_scores)).then_some(team.score),
                bar_percent: (!(hidden || settings.hide_bars))
                    .then(|| bar_percent(team.score, leader)),
            }
        })
        .collect();

    let countdown =
        (settings.reveal_state == RevealState::Countdown).then_some(settings.countdown);

    let winner = match (
        settings.reveal_state,
        settings.winner_team_id,
        &settings.winner_name,
        settings.winner_score,
    ) {
        (RevealState::Winner, Some(team_id), Some(name), Some(score)) => Some(WinnerInfo {
            team_id,
            name: name.clone(),
            score,
        }),
        _ => None,
    };

    ScoreboardView {
        reveal_state: settings.reveal_state,
        countdown,
        winner,
        force_route: settings.force_route.clone(),
        hide_all: settings.hide_all,
        rows,
        poll_interval_ms,
    }
}

pub async fn get_scoreboard<S>(store: &S, poll_interval_ms: u64) -> Result<ScoreboardView>
where
    S: Store + ?Sized,
{
    let teams = store.list_teams().await?;
    let settings = store.get_settings().await?;
    Ok(build_view(teams, &settings, poll_interval_ms))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn standings(scores: &[(&str, i32)]) -> Vec<TeamWithMembers> {
        scores
            .iter()
            .map(|(name, score)| TeamWithMembers {
                team_id: Uuid::new_v4(),
                name: name.to_string(),
                score: *score,
                created_at: Utc::now(),
                member_count: 3,
            })
            .collect()
    }

    fn five_teams() -> Vec<TeamWithMembers> {
        standings(&[("E", 40), ("A", 200), ("C", 120), ("B", 150), ("D", 90)])
    }

    #[test]
    fn test_rows_are_ranked_by_score() {
        let view = build_view(five_teams(), &ScoreboardSettings::default(), 2000);

        let names: Vec<_> = view.rows.iter().map(|r| r.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        let ranks: Vec<_> = view.rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(view.rows[0].bar_percent, Some(100));
        assert_eq!(view.rows[1].bar_percent, Some(75));
        assert_eq!(view.rows[4].bar_percent, Some(20));
        assert_eq!(view.poll_interval_ms, 2000);
    }

    #[test]
    fn test_ties_sort_by_name() {
        let view = build_view(
            standings(&[("Zulu", 90), ("Alpha", 90)]),
            &ScoreboardSettings::default(),
            2000,
        );
        assert_eq!(view.rows[0].name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_hide_top2_hides_first_two_ranks() {
        let settings = ScoreboardSettings {
            hide_top2: true,
            ..Default::default()
        };

        let view = build_view(five_teams(), &settings, 2000);

        for row in &view.rows[..2] {
            assert_eq!(row.name, None);
            assert_eq!(row.team_id, None);
            assert_eq!(row.score, None);
            assert_eq!(row.bar_percent, None);
        }
        assert_eq!(view.rows[2].name.as_deref(), Some("C"));
        assert_eq!(view.rows[2].score, Some(120));
    }

    #[test]
    fn test_rank_toggles_follow_current_position() {
        let settings = ScoreboardSettings {
            hide_rank_3: true,
            hide_rank_4: true,
            ..Default::default()
        };

        let view = build_view(five_teams(), &settings, 2000);
        assert_eq!(view.rows[2].name, None);
        assert_eq!(view.rows[3].name, None);
        assert_eq!(view.rows[4].name.as_deref(), Some("E"));

        // D overtakes C; the toggle follows the rank, not the team.
        let view = build_view(
            standings(&[("A", 200), ("B", 150), ("C", 120), ("D", 500), ("E", 40)]),
            &settings,
            2000,
        );
        assert_eq!(view.rows[0].name.as_deref(), Some("D"));
        assert_eq!(view.rows[1].name.as_deref(), Some("A"));
        assert_eq!(view.rows[2].name, None);
        assert_eq!(view.rows[3].name, None);
    }

    #[test]
    fn test_general_toggles_are_independent() {
        let settings = ScoreboardSettings {
            hide_scores: true,
            ..Default::default()
        };

        let view = build_view(five_teams(), &settings, 2000);

        assert!(view.rows.iter().all(|r| r.score.is_none()));
        assert!(view.rows.iter().all(|r| r.name.is_some()));
        assert!(view.rows.iter().all(|r| r.bar_percent.is_some()));
    }

    #[test]
    fn test_hide_all_redacts_every_row() {
        let settings = ScoreboardSettings {
            hide_all: true,
            ..Default::default()
        };

        let view = build_view(five_teams(), &settings, 2000);

        assert!(view.hide_all);
        assert!(view.rows.iter().all(|r| r.name.is_none()
            && r.score.is_none()
            && r.bar_percent.is_none()));
    }

    #[test]
    fn test_zero_leader_has_empty_bars() {
        let view = build_view(
            standings(&[("A", 0), ("B", 0)]),
            &ScoreboardSettings::default(),
            2000,
        );
        assert!(view.rows.iter().all(|r| r.bar_percent == Some(0)));
    }

    #[test]
    fn test_countdown_and_winner_only_in_their_states() {
        let team_id = Uuid::new_v4();
        let mut settings = ScoreboardSettings {
            reveal_state: RevealState::Countdown,
            countdown: 7,
            ..Default::default()
        };

        let view = build_view(five_teams(), &settings, 2000);
        assert_eq!(view.countdown, Some(7));
        assert_eq!(view.winner, None);

        settings.reveal_state = RevealState::Winner;
        settings.winner_team_id = Some(team_id);
        settings.winner_name = Some("A".to_string());
        settings.winner_score = Some(90);

        let view = build_view(five_teams(), &settings, 2000);
        assert_eq!(view.countdown, None);
        assert_eq!(
            view.winner,
            Some(WinnerInfo {
                team_id,
                name: "A".to_string(),
                score: 90,
            })
        );
    }
}
