use axum::{Router, middleware, routing::post};

use super::handlers::{scan, scan_batch};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/batch", post(scan_batch))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route("/", post(scan)).merge(protected)
}
