use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Team, TeamWithMembers};

/// Repository for Team database operations
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    /// Create a new TeamRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List teams with derived member counts, highest score first
    pub async fn list_with_members(&self) -> Result<Vec<TeamWithMembers>> {
        let teams = sqlx::query_as::<_, TeamWithMembers>(
            r#"
            SELECT t.team_id, t.name, t.score, t.created_at,
                   COUNT(p.person_id) AS member_count
            FROM teams t
            LEFT JOIN persons p ON p.team = t.name
            GROUP BY t.team_id, t.name, t.score, t.created_at
            ORDER BY t.score DESC, t.name ASC, t.team_id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(teams)
    }

    /// Get a team by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT team_id, name, score, created_at
            FROM teams
            WHERE team_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(team)
    }

    /// Get a team by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT team_id, name, score, created_at
            FROM teams
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(team)
    }

    /// Create a new team
    pub async fn create(&self, name: &str, score: i32) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, score)
            VALUES ($1, $2)
            RETURNING team_id, name, score, created_at
            "#,
        )
        .bind(name)
        .bind(score)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Team name already exists"))?;

        Ok(team)
    }

    /// Rename a team and carry its members over to the new name
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Team> {
        let mut tx = self.pool.begin().await?;

        let previous: String = sqlx::query_scalar(
            r#"
            SELECT name FROM teams WHERE team_id = $1 FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = $2
            WHERE team_id = $1
            RETURNING team_id, name, score, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Team name already exists"))?;

        sqlx::query(
            r#"
            UPDATE persons SET team = $2 WHERE team = $1
            "#,
        )
        .bind(&previous)
        .bind(name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(team)
    }

    /// Delete a team; its members lose their affiliation and log entries keep the name snapshot
    pub async fn delete(&self, id: Uuid) -> Result<Team> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            DELETE FROM teams
            WHERE team_id = $1
            RETURNING team_id, name, score, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE persons SET team = NULL WHERE team = $1
            "#,
        )
        .bind(&team.name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(team)
    }

    /// Overwrite every team score with the same value
    pub async fn reset_scores(&self, score: i32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE teams SET score = $1
            "#,
        )
        .bind(score)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
