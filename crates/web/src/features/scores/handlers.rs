use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        common::PaginatedResponse,
        score::{
            ApplyDeltaRequest, DeleteScoreResponse, RecalculateResponse, ResetResponse,
            ScoreAdjustmentResponse, ScoreLogFilter,
        },
    },
    models::{BASE_SCORE, ScoreLogEntry},
    services::scoring,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/teams/{id}/score",
    params(
        ("id" = Uuid, Path, description = "Team id")
    ),
    request_body = ApplyDeltaRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Score adjusted and logged", body = ScoreAdjustmentResponse),
        (status = 400, description = "Missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "scores"
)]
pub async fn adjust_team_score(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(team_id): Path<Uuid>,
    payload: Result<Json<ApplyDeltaRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let (team, entry) =
        scoring::apply_delta(state.store(), team_id, req.delta, &req.reason, &actor).await?;

    Ok(Json(ScoreAdjustmentResponse { team, entry }).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scores",
    params(ScoreLogFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Score log, newest first", body = PaginatedResponse<ScoreLogEntry>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scores"
)]
pub async fn list_scores(
    State(state): State<AppState>,
    query: Result<Query<ScoreLogFilter>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(filter) = query?;
    let pagination = filter.pagination();
    pagination.validate().map_err(WebError::BadRequest)?;

    let (entries, total_items) =
        scoring::list_score_log(state.store(), filter.team_id, &pagination).await?;

    let response = PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/scores/{id}",
    params(
        ("id" = Uuid, Path, description = "Score log entry id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entry removed and its delta reversed", body = DeleteScoreResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    tag = "scores"
)]
pub async fn delete_score(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(entry_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let (removed, team) = scoring::delete_score_entry(state.store(), entry_id, &actor).await?;

    Ok(Json(DeleteScoreResponse { removed, team }).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scores/recalculate",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every total rebuilt from the log", body = RecalculateResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scores"
)]
pub async fn recalculate_scores(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Response, WebError> {
    let teams = scoring::recalculate_all_totals(state.store(), &actor).await?;

    Ok(Json(RecalculateResponse { teams }).into_response())
}

#[utoipa::path(
    post,
    path = "/api/scores/reset",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every team back at the base score", body = ResetResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scores"
)]
pub async fn reset_scores(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Response, WebError> {
    let teams_reset = scoring::reset_all_scores(state.store(), &actor).await?;

    Ok(Json(ResetResponse {
        teams_reset,
        score: BASE_SCORE,
    })
    .into_response())
}
