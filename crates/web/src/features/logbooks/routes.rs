use axum::{Router, middleware, routing::get};

use super::handlers::{list_entries, list_open_sessions};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:logbook", get(list_entries))
        .route("/:logbook/open", get(list_open_sessions))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
