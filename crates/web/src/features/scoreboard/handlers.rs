use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use storage::{
    dto::scoreboard::{
        ScoreboardView, SetCountdownRequest, StartRevealRequest, UpdateSettingsRequest,
    },
    models::ScoreboardSettings,
    services::{
        reveal::{self, DEFAULT_COUNTDOWN, RevealCommand},
        scoreboard,
    },
    store::SettingsUpdate,
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/scoreboard",
    responses(
        (status = 200, description = "Redacted standings and reveal state for viewers", body = ScoreboardView)
    ),
    tag = "scoreboard"
)]
pub async fn get_scoreboard(State(state): State<AppState>) -> Result<Response, WebError> {
    let view = scoreboard::get_scoreboard(state.store(), state.poll_interval_ms).await?;

    Ok(Json(view).into_response())
}

#[utoipa::path(
    put,
    path = "/api/scoreboard/settings",
    request_body = UpdateSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Settings updated", body = ScoreboardSettings),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scoreboard"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let settings =
        reveal::update_settings(state.store(), &SettingsUpdate::from(&req), &actor).await?;

    Ok(Json(settings).into_response())
}

async fn apply(state: &AppState, command: RevealCommand, actor: &str) -> Result<Response, WebError> {
    let settings = reveal::transition(state.store(), command, actor).await?;

    Ok(Json(settings).into_response())
}

/// Body is optional; without one the countdown starts at the default.
#[utoipa::path(
    post,
    path = "/api/scoreboard/reveal/start",
    request_body = StartRevealRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Countdown started", body = ScoreboardSettings),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Reveal already in progress")
    ),
    tag = "scoreboard"
)]
pub async fn start_reveal(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    payload: Option<Json<StartRevealRequest>>,
) -> Result<Response, WebError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    req.validate()?;

    let countdown = req.countdown.unwrap_or(DEFAULT_COUNTDOWN);
    apply(&state, RevealCommand::Start { countdown }, &actor).await
}

#[utoipa::path(
    post,
    path = "/api/scoreboard/reveal/tick",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Countdown decreased by one, never below zero", body = ScoreboardSettings),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No countdown running")
    ),
    tag = "scoreboard"
)]
pub async fn tick_reveal(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Response, WebError> {
    apply(&state, RevealCommand::Tick, &actor).await
}

#[utoipa::path(
    post,
    path = "/api/scoreboard/reveal/countdown",
    request_body = SetCountdownRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Countdown lowered", body = ScoreboardSettings),
        (status = 400, description = "Countdown would increase"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No countdown running")
    ),
    tag = "scoreboard"
)]
pub async fn set_countdown(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    payload: Result<Json<SetCountdownRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    apply(&state, RevealCommand::SetCountdown(req.countdown), &actor).await
}

#[utoipa::path(
    post,
    path = "/api/scoreboard/reveal/announce",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Winner frozen and revealed", body = ScoreboardSettings),
        (status = 400, description = "No teams to announce"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No countdown running")
    ),
    tag = "scoreboard"
)]
pub async fn announce_winner(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Response, WebError> {
    apply(&state, RevealCommand::Announce, &actor).await
}

#[utoipa::path(
    post,
    path = "/api/scoreboard/reveal/reset",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Board back to the live view", body = ScoreboardSettings),
        (status = 401, description = "Unauthorized")
    ),
    tag = "scoreboard"
)]
pub async fn reset_reveal(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
) -> Result<Response, WebError> {
    apply(&state, RevealCommand::Reset, &actor).await
}
