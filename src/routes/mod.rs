pub mod fill;
pub mod health;
pub mod questionnaire;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use crate::{
    middleware::auth::{require_admin, require_bearer_auth},
    AppState,
};

/// All routes except `/health` require a bearer token; authoring routes also need an admin role.
pub fn router(state: AppState) -> Router {
    let admin = || from_fn(require_admin);

    let api = Router::new()
        .route(
            "/api/questionnaires",
            get(questionnaire::list_questionnaires)
                .merge(post(questionnaire::create_questionnaire).route_layer(admin())),
        )
        .route(
            "/api/questionnaires/records",
            get(questionnaire::list_records).route_layer(admin()),
        )
        .route(
            "/api/questionnaires/:id",
            get(questionnaire::get_questionnaire)
                .put(questionnaire::update_questionnaire)
                .delete(questionnaire::delete_questionnaire)
                .route_layer(admin()),
        )
        .route(
            "/api/questionnaires/:id/passes",
            post(questionnaire::record_pass).route_layer(admin()),
        )
        .route("/api/questionnaires/:id/fill", get(fill::get_fill_view))
        .route("/api/questionnaires/:id/submit", post(fill::submit_answers))
        .route_layer(from_fn(require_bearer_auth));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
}
