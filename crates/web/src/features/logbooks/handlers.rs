use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use storage::{
    dto::logbook::LogbookFilter,
    models::{Logbook, LogbookEntry},
    services::attendance,
};

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/logbooks/{logbook}",
    params(
        ("logbook" = Logbook, Path, description = "`general` or `staff`"),
        LogbookFilter
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sessions, newest first", body = Vec<LogbookEntry>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "attendance"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Path(logbook): Path<Logbook>,
    query: Result<Query<LogbookFilter>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(filter) = query?;

    let entries = attendance::list_entries(state.store(), logbook, filter.person_id).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/logbooks/{logbook}/open",
    params(
        ("logbook" = Logbook, Path, description = "`general` or `staff`")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sessions without a time out", body = Vec<LogbookEntry>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "attendance"
)]
pub async fn list_open_sessions(
    State(state): State<AppState>,
    Path(logbook): Path<Logbook>,
) -> Result<Response, WebError> {
    let entries = attendance::list_open_sessions(state.store(), logbook).await?;

    Ok(Json(entries).into_response())
}
