use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{audit, changes, logbooks, persons, scan, scoreboard, scores, teams};
use crate::middleware::auth::ApiKeys;
use crate::openapi::ApiDoc;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full application router: public endpoints, admin endpoints behind the API key, and docs.
pub fn router(state: AppState, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .nest("/persons", persons::routes::routes(api_keys.clone()))
        .nest("/scan", scan::routes::routes(api_keys.clone()))
        .nest("/teams", teams::routes::routes(api_keys.clone()))
        .nest("/scores", scores::routes::routes(api_keys.clone()))
        .nest("/logbooks", logbooks::routes::routes(api_keys.clone()))
        .nest("/scoreboard", scoreboard::routes::routes(api_keys.clone()))
        .nest("/audit", audit::routes::routes(api_keys))
        .nest("/changes", changes::routes::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
