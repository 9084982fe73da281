use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::{RevealState, ScoreboardSettings};
use crate::store::{RevealPatch, SettingsUpdate};

/// Repository for the singleton scoreboard row (`id = 1`)
pub struct ScoreboardSettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreboardSettingsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<ScoreboardSettings> {
        let settings = sqlx::query_as::<_, ScoreboardSettings>(
            r#"
            SELECT hide_names, hide_scores, hide_bars, hide_top2, hide_rank_3, hide_rank_4,
                   hide_all, reveal_state, countdown, force_route,
                   winner_team_id, winner_name, winner_score, updated_at
            FROM scoreboard_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(settings)
    }

    /// Last writer wins for visibility toggles
    pub async fn update(&self, update: &SettingsUpdate) -> Result<ScoreboardSettings> {
        let settings = sqlx::query_as::<_, ScoreboardSettings>(
            r#"
            UPDATE scoreboard_settings
            SET hide_names = COALESCE($1, hide_names),
                hide_scores = COALESCE($2, hide_scores),
                hide_bars = COALESCE($3, hide_bars),
                hide_top2 = COALESCE($4, hide_top2),
                hide_rank_3 = COALESCE($5, hide_rank_3),
                hide_rank_4 = COALESCE($6, hide_rank_4),
                hide_all = COALESCE($7, hide_all),
                force_route = CASE WHEN $8 THEN $9 ELSE force_route END,
                updated_at = now()
            WHERE id = 1
            RETURNING hide_names, hide_scores, hide_bars, hide_top2, hide_rank_3, hide_rank_4,
                      hide_all, reveal_state, countdown, force_route,
                      winner_team_id, winner_name, winner_score, updated_at
            "#,
        )
        .bind(update.hide_names)
        .bind(update.hide_scores)
        .bind(update.hide_bars)
        .bind(update.hide_top2)
        .bind(update.hide_rank_3)
        .bind(update.hide_rank_4)
        .bind(update.hide_all)
        .bind(update.force_route.is_some())
        .bind(update.force_route.clone().flatten())
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(settings)
    }

    /// Conditional write of the reveal columns
    pub async fn compare_and_set_reveal(
        &self,
        expected_state: RevealState,
        expected_countdown: i32,
        patch: &RevealPatch,
    ) -> Result<Option<ScoreboardSettings>> {
        let settings = sqlx::query_as::<_, ScoreboardSettings>(
            r#"
            UPDATE scoreboard_settings
            SET reveal_state = $3,
                countdown = $4,
                winner_team_id = $5,
                winner_name = $6,
                winner_score = $7,
                updated_at = now()
            WHERE id = 1 AND reveal_state = $1 AND countdown = $2
            RETURNING hide_names, hide_scores, hide_bars, hide_top2, hide_rank_3, hide_rank_4,
                      hide_all, reveal_state, countdown, force_route,
                      winner_team_id, winner_name, winner_score, updated_at
            "#,
        )
        .bind(expected_state)
        .bind(expected_countdown)
        .bind(patch.reveal_state)
        .bind(patch.countdown)
        .bind(patch.winner_team_id)
        .bind(&patch.winner_name)
        .bind(patch.winner_score)
        .fetch_optional(self.pool)
        .await?;

        Ok(settings)
    }
}
