use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{audit::AuditFilter, common::PaginatedResponse},
    models::AuditLogEntry,
    services::audit,
};

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/audit",
    params(AuditFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = PaginatedResponse<AuditLogEntry>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "audit"
)]
pub async fn list_audit(
    State(state): State<AppState>,
    query: Result<Query<AuditFilter>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(filter) = query?;
    let pagination = filter.pagination();
    pagination.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) =
        audit::list_audit(state.store(), filter.action, &pagination).await?;

    let response = PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}
