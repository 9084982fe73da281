use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::person::{PersonResponse, RegisterPersonRequest, UpdatePersonRequest},
    services::roster,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/persons/register",
    request_body = RegisterPersonRequest,
    responses(
        (status = 201, description = "Person registered with a fresh badge", body = PersonResponse),
        (status = 400, description = "Validation error or unknown team")
    ),
    tag = "persons"
)]
pub async fn register_person(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPersonRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let person = roster::register(state.store(), &req).await?;

    Ok((StatusCode::CREATED, Json(PersonResponse::from(person))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/persons/badge/{badge_id}",
    params(
        ("badge_id" = String, Path, description = "Decoded badge text")
    ),
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 404, description = "Badge not registered")
    ),
    tag = "persons"
)]
pub async fn get_person_by_badge(
    State(state): State<AppState>,
    Path(badge_id): Path<String>,
) -> Result<Response, WebError> {
    let person = roster::find_by_badge(state.store(), &badge_id).await?;

    Ok(Json(PersonResponse::from(person)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/persons/{id}/self-edit",
    params(
        ("id" = Uuid, Path, description = "Person id")
    ),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Profile updated", body = PersonResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Self-service edit limit reached, or role change while checked in")
    ),
    tag = "persons"
)]
pub async fn self_edit_person(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
    payload: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let person = roster::self_edit(state.store(), person_id, &req).await?;

    Ok(Json(PersonResponse::from(person)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/persons",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All registered persons", body = Vec<PersonResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "persons"
)]
pub async fn list_persons(State(state): State<AppState>) -> Result<Response, WebError> {
    let persons = roster::list_persons(state.store()).await?;

    let response: Vec<PersonResponse> = persons.into_iter().map(PersonResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    put,
    path = "/api/persons/{id}",
    params(
        ("id" = Uuid, Path, description = "Person id")
    ),
    request_body = UpdatePersonRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Role change while checked in to the other logbook")
    ),
    tag = "persons"
)]
pub async fn update_person(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(person_id): Path<Uuid>,
    payload: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let person = roster::admin_update(state.store(), person_id, &req, &actor).await?;

    Ok(Json(PersonResponse::from(person)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/persons/{id}",
    params(
        ("id" = Uuid, Path, description = "Person id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Person and their attendance deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Person not found")
    ),
    tag = "persons"
)]
pub async fn delete_person(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(person_id): Path<Uuid>,
) -> Result<Response, WebError> {
    roster::delete_person(state.store(), person_id, &actor).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
