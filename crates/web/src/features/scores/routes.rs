use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{delete_score, list_scores, recalculate_scores, reset_scores};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/", get(list_scores))
        .route("/:id", delete(delete_score))
        .route("/recalculate", post(recalculate_scores))
        .route("/reset", post(reset_scores))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
