use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Logbook, LogbookEntry};

/// Repository for both attendance tables. Every statement is scoped to one
/// [`Logbook`], whose table name is a static identifier.
pub struct LogbookRepository<'a> {
    pool: &'a PgPool,
    logbook: Logbook,
}

impl<'a> LogbookRepository<'a> {
    pub fn new(pool: &'a PgPool, logbook: Logbook) -> Self {
        Self { pool, logbook }
    }

    /// Open a session unless the partial unique index says one is already open
    pub async fn open_session(&self, person_id: Uuid) -> Result<Option<LogbookEntry>> {
        let sql = format!(
            r#"
            INSERT INTO {table} (person_id)
            VALUES ($1)
            ON CONFLICT (person_id) WHERE time_out IS NULL DO NOTHING
            RETURNING entry_id, person_id, time_in, time_out
            "#,
            table = self.logbook.table()
        );

        let entry = sqlx::query_as::<_, LogbookEntry>(&sql)
            .bind(person_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(entry)
    }

    /// Close the most recent open session in a single conditional update
    pub async fn close_latest_session(&self, person_id: Uuid) -> Result<Option<LogbookEntry>> {
        let sql = format!(
            r#"
            UPDATE {table}
            SET time_out = now()
            WHERE entry_id = (
                SELECT entry_id
                FROM {table}
                WHERE person_id = $1 AND time_out IS NULL
                ORDER BY time_in DESC
                LIMIT 1
            )
            AND time_out IS NULL
            RETURNING entry_id, person_id, time_in, time_out
            "#,
            table = self.logbook.table()
        );

        let entry = sqlx::query_as::<_, LogbookEntry>(&sql)
            .bind(person_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(entry)
    }

    pub async fn has_closed_session(&self, person_id: Uuid) -> Result<bool> {
        let sql = format!(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM {table}
                WHERE person_id = $1 AND time_out IS NOT NULL
            )
            "#,
            table = self.logbook.table()
        );

        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(person_id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// List entries, newest first, optionally for a single person
    pub async fn list(&self, person_id: Option<Uuid>) -> Result<Vec<LogbookEntry>> {
        let sql = format!(
            r#"
            SELECT entry_id, person_id, time_in, time_out
            FROM {table}
            WHERE ($1::uuid IS NULL OR person_id = $1)
            ORDER BY time_in DESC
            "#,
            table = self.logbook.table()
        );

        let entries = sqlx::query_as::<_, LogbookEntry>(&sql)
            .bind(person_id)
            .fetch_all(self.pool)
            .await?;

        Ok(entries)
    }

    pub async fn list_open(&self) -> Result<Vec<LogbookEntry>> {
        let sql = format!(
            r#"
            SELECT entry_id, person_id, time_in, time_out
            FROM {table}
            WHERE time_out IS NULL
            ORDER BY time_in DESC
            "#,
            table = self.logbook.table()
        );

        let entries = sqlx::query_as::<_, LogbookEntry>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(entries)
    }
}
