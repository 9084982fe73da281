use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "reveal_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    #[default]
    Idle,
    Countdown,
    Winner,
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealState::Idle => f.write_str("idle"),
            RevealState::Countdown => f.write_str("countdown"),
            RevealState::Winner => f.write_str("winner"),
        }
    }
}

/// The single shared row driving the public scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScoreboardSettings {
    pub hide_names: bool,
    pub hide_scores: bool,
    pub hide_bars: bool,
    pub hide_top2: bool,
    pub hide_rank_3: bool,
    pub hide_rank_4: bool,
    pub hide_all: bool,
    pub reveal_state: RevealState,
    /// Only meaningful while `reveal_state` is `countdown`.
    pub countdown: i32,
    pub force_route: Option<String>,
    pub winner_team_id: Option<Uuid>,
    pub winner_name: Option<String>,
    pub winner_score: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ScoreboardSettings {
    fn default() -> Self {
        Self {
            hide_names: false,
            hide_scores: false,
            hide_bars: false,
            hide_top2: false,
            hide_rank_3: false,
            hide_rank_4: false,
            hide_all: false,
            reveal_state: RevealState::Idle,
            countdown: 0,
            force_route: None,
            winner_team_id: None,
            winner_name: None,
            winner_score: None,
            updated_at: Utc::now(),
        }
    }
}
