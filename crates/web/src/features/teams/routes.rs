use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{create_team, delete_team, list_teams, rename_team};
use crate::features::scores::handlers::adjust_team_score;
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_team))
        .route("/:id", put(rename_team).delete(delete_team))
        .route("/:id/score", post(adjust_team_score))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/", get(list_teams)).merge(protected)
}
