use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::RevealState;
use crate::store::SettingsUpdate;

/// Visibility toggles; omitted fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    pub hide_names: Option<bool>,
    pub hide_scores: Option<bool>,
    pub hide_bars: Option<bool>,
    pub hide_top2: Option<bool>,
    pub hide_rank_3: Option<bool>,
    pub hide_rank_4: Option<bool>,
    pub hide_all: Option<bool>,
    /// Route every viewer should navigate to
    #[validate(length(min = 1, max = 255))]
    pub force_route: Option<String>,
    /// Clears `force_route`; wins over a value in the same request
    #[serde(default)]
    pub clear_force_route: bool,
}

impl From<&UpdateSettingsRequest> for SettingsUpdate {
    fn from(req: &UpdateSettingsRequest) -> Self {
        let force_route = if req.clear_force_route {
            Some(None)
        } else {
            req.force_route.clone().map(Some)
        };
        Self {
            hide_names: req.hide_names,
            hide_scores: req.hide_scores,
            hide_bars: req.hide_bars,
            hide_top2: req.hide_top2,
            hide_rank_3: req.hide_rank_3,
            hide_rank_4: req.hide_rank_4,
            hide_all: req.hide_all,
            force_route,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct StartRevealRequest {
    #[validate(range(min = 1, max = 3600))]
    pub countdown: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetCountdownRequest {
    #[validate(range(min = 0))]
    pub countdown: i32,
}

/// One team row on the public board; redacted fields are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoardRow {
    pub rank: u32,
    pub team_id: Option<Uuid>,
    pub name: Option<String>,
    pub score: Option<i32>,
    /// Share of the leader's score, 0 to 100
    pub bar_percent: Option<u8>,
}

/// Winner frozen when the reveal entered `winner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WinnerInfo {
    pub team_id: Uuid,
    pub name: String,
    /// Target of the count-up animation
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreboardView {
    pub reveal_state: RevealState,
    pub countdown: Option<i32>,
    pub winner: Option<WinnerInfo>,
    pub force_route: Option<String>,
    pub hide_all: bool,
    pub rows: Vec<BoardRow>,
    pub poll_interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_force_route_wins() {
        let req = UpdateSettingsRequest {
            force_route: Some("/winner".to_string()),
            clear_force_route: true,
            ..Default::default()
        };
        assert_eq!(SettingsUpdate::from(&req).force_route, Some(None));
    }

    #[test]
    fn test_absent_force_route_is_untouched() {
        let req = UpdateSettingsRequest {
            hide_names: Some(true),
            ..Default::default()
        };
        let update = SettingsUpdate::from(&req);
        assert_eq!(update.force_route, None);
        assert_eq!(update.hide_names, Some(true));
    }
}
