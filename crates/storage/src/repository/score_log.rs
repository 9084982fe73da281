use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{ScoreLogEntry, Team};

/// Repository for score adjustments. Every method that touches both the team
/// score and the log does so inside one transaction.
pub struct ScoreLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreLogRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply a delta (clamped at zero) and record it verbatim
    pub async fn apply_delta(
        &self,
        team_id: Uuid,
        delta: i32,
        reason: &str,
    ) -> Result<(Team, ScoreLogEntry)> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET score = GREATEST(0, LEAST(2147483647, score::bigint + $2))::integer
            WHERE team_id = $1
            RETURNING team_id, name, score, created_at
            "#,
        )
        .bind(team_id)
        .bind(i64::from(delta))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let entry = sqlx::query_as::<_, ScoreLogEntry>(
            r#"
            INSERT INTO score_logs (team_id, team_name, delta, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING entry_id, team_id, team_name, delta, reason, created_at
            "#,
        )
        .bind(team.team_id)
        .bind(&team.name)
        .bind(delta)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((team, entry))
    }

    /// Reverse an entry on its team and delete it; nothing changes if either row is missing
    pub async fn delete_with_reversal(&self, entry_id: Uuid) -> Result<(ScoreLogEntry, Team)> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, ScoreLogEntry>(
            r#"
            SELECT entry_id, team_id, team_name, delta, reason, created_at
            FROM score_logs
            WHERE entry_id = $1
            FOR UPDATE
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let team_id = entry.team_id.ok_or(StorageError::NotFound)?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET score = GREATEST(0, LEAST(2147483647, score::bigint - $2))::integer
            WHERE team_id = $1
            RETURNING team_id, name, score, created_at
            "#,
        )
        .bind(team_id)
        .bind(i64::from(entry.delta))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        sqlx::query(
            r#"
            DELETE FROM score_logs WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((entry, team))
    }

    /// Recompute every team from `base` plus its log, joined by team id
    pub async fn recalculate_totals(&self, base: i32) -> Result<Vec<Team>> {
        let mut teams = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams t
            SET score = GREATEST(0, LEAST(2147483647, $1::bigint + sums.total))::integer
            FROM (
                SELECT tm.team_id, COALESCE(SUM(l.delta), 0)::bigint AS total
                FROM teams tm
                LEFT JOIN score_logs l ON l.team_id = tm.team_id
                GROUP BY tm.team_id
            ) AS sums
            WHERE t.team_id = sums.team_id
            RETURNING t.team_id, t.name, t.score, t.created_at
            "#,
        )
        .bind(i64::from(base))
        .fetch_all(self.pool)
        .await?;

        teams.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.team_id.cmp(&b.team_id))
        });

        Ok(teams)
    }

    /// Page through the log, newest first
    pub async fn list(
        &self,
        team_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ScoreLogEntry>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM score_logs WHERE 1=1");
        if let Some(team_id) = team_id {
            count.push(" AND team_id = ");
            count.push_bind(team_id);
        }
        let total_items = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new(
            r#"
            SELECT entry_id, team_id, team_name, delta, reason, created_at
            FROM score_logs
            WHERE 1=1
            "#,
        );
        if let Some(team_id) = team_id {
            query.push(" AND team_id = ");
            query.push_bind(team_id);
        }
        query.push(" ORDER BY created_at DESC, entry_id LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let entries = query
            .build_query_as::<ScoreLogEntry>()
            .fetch_all(self.pool)
            .await?;

        Ok((entries, total_items))
    }
}
