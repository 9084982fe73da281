use sqlx::{PgPool, QueryBuilder, types::Json};

use crate::error::Result;
use crate::models::{AuditAction, AuditLogEntry, NewAuditEntry};

pub struct AuditLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry; audit rows are never updated or deleted
    pub async fn append(&self, entry: &NewAuditEntry) -> Result<AuditLogEntry> {
        let entry = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO audit_logs (actor, action, target, details)
            VALUES ($1, $2, $3, $4)
            RETURNING audit_id, actor, action, target, details, created_at
            "#,
        )
        .bind(&entry.actor)
        .bind(entry.action)
        .bind(&entry.target)
        .bind(Json(&entry.details))
        .fetch_one(self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn list(
        &self,
        action: Option<AuditAction>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditLogEntry>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs WHERE 1=1");
        if let Some(action) = action {
            count.push(" AND action = ");
            count.push_bind(action);
        }
        let total_items = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new(
            r#"
            SELECT audit_id, actor, action, target, details, created_at
            FROM audit_logs
            WHERE 1=1
            "#,
        );
        if let Some(action) = action {
            query.push(" AND action = ");
            query.push_bind(action);
        }
        query.push(" ORDER BY created_at DESC, audit_id LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let entries = query
            .build_query_as::<AuditLogEntry>()
            .fetch_all(self.pool)
            .await?;

        Ok((entries, total_items))
    }
}
