use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    delete_person, get_person_by_badge, list_persons, register_person, self_edit_person,
    update_person,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(list_persons))
        .route("/:id", put(update_person).delete(delete_person))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/register", post(register_person))
        .route("/badge/:badge_id", get(get_person_by_badge))
        .route("/:id/self-edit", put(self_edit_person))
        .merge(protected)
}
