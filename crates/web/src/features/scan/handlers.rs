use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use storage::{
    dto::scan::{BatchScanRequest, BatchScanResponse, ScanRequest, ScanResponse},
    services::attendance::{self, ScanSource},
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

/// Audit actor recorded for scans from the public kiosk.
pub const SCANNER_ACTOR: &str = "scanner";

#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan classified; `status` tells whether anything changed", body = ScanResponse),
        (status = 400, description = "Malformed request")
    ),
    tag = "attendance"
)]
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = attendance::process_scan(
        state.store(),
        &req.badge_id,
        req.mode,
        ScanSource::Interactive,
        SCANNER_ACTOR,
    )
    .await?;

    Ok(Json(ScanResponse::from(outcome)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scan/batch",
    request_body = BatchScanRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "One result per badge id, in request order", body = BatchScanResponse),
        (status = 400, description = "Malformed JSON or empty id list"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "attendance"
)]
pub async fn scan_batch(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    payload: Result<Json<BatchScanRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let results = attendance::process_scan_batch(state.store(), &req.uuids, req.mode, &actor).await;

    Ok(Json(BatchScanResponse { results }).into_response())
}
