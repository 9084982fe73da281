//! Audit trail recorder. Appends are fire-and-forget: a failed write is
//! logged and never reaches the caller.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::dto::common::PaginationParams;
use crate::error::Result;
use crate::models::{AuditAction, AuditLogEntry, NewAuditEntry};
use crate::store::AuditStore;

/// Append one entry, swallowing any failure.
pub async fn record<S>(store: &S, actor: &str, action: AuditAction, target: &str, details: Value)
where
    S: AuditStore + ?Sized,
{
    let entry = NewAuditEntry {
        actor: actor.to_string(),
        action,
        target: target.to_string(),
        details,
    };

    if let Err(e) = store.append_audit(&entry).await {
        tracing::warn!(
            %action,
            actor,
            target,
            error = %e,
            "Failed to write audit entry"
        );
    }
}

/// Free-form details payload.
pub fn message(text: impl Into<String>) -> Value {
    json!({ "message": text.into() })
}

/// Before/after details for field updates. Unchanged fields are left out.
#[derive(Debug, Default)]
pub struct Diff {
    changes: Map<String, Value>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: Serialize + PartialEq>(mut self, name: &str, before: &T, after: &T) -> Self {
        if before != after {
            self.changes.insert(
                name.to_string(),
                json!({ "before": before, "after": after }),
            );
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_details(self) -> Value {
        json!({ "changes": self.changes })
    }
}

pub async fn list_audit<S>(
    store: &S,
    action: Option<AuditAction>,
    pagination: &PaginationParams,
) -> Result<(Vec<AuditLogEntry>, i64)>
where
    S: AuditStore + ?Sized,
{
    store
        .list_audit(action, pagination.offset(), pagination.limit())
        .await
}
