use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::team::{CreateTeamRequest, RenameTeamRequest, TeamResponse},
    services::roster,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "Teams by score, highest first, with member counts", body = Vec<TeamResponse>)
    ),
    tag = "teams"
)]
pub async fn list_teams(State(state): State<AppState>) -> Result<Response, WebError> {
    let teams = roster::list_standings(state.store()).await?;

    let response: Vec<TeamResponse> = teams.into_iter().map(TeamResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team created at the base score", body = TeamResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Team name already exists")
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let team = roster::create_team(state.store(), &req.name, &actor).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team id")
    ),
    request_body = RenameTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team renamed; members follow", body = TeamResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Team name already exists")
    ),
    tag = "teams"
)]
pub async fn rename_team(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(team_id): Path<Uuid>,
    payload: Result<Json<RenameTeamRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let team = roster::rename_team(state.store(), team_id, &req.name, &actor).await?;

    Ok(Json(TeamResponse::from(team)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    roster::delete_team(state.store(), team_id, &actor).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
