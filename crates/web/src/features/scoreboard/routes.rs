use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    announce_winner, get_scoreboard, reset_reveal, set_countdown, start_reveal, tick_reveal,
    update_settings,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/settings", put(update_settings))
        .route("/reveal/start", post(start_reveal))
        .route("/reveal/tick", post(tick_reveal))
        .route("/reveal/countdown", post(set_countdown))
        .route("/reveal/announce", post(announce_winner))
        .route("/reveal/reset", post(reset_reveal))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/", get(get_scoreboard)).merge(protected)
}
