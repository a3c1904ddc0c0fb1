pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::conversation::handlers as bot;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::translation::handlers as translation;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Bot gateway
        .route("/api/v1/bot/messages", post(bot::handle_bot_message))
        // Resume CRUD
        .route("/api/v1/resumes", post(resumes::handle_create_resume))
        .route("/api/v1/resumes", get(resumes::handle_list_resumes))
        .route("/api/v1/resumes/:id", get(resumes::handle_get_resume))
        .route("/api/v1/resumes/:id", put(resumes::handle_update_resume))
        .route("/api/v1/resumes/:id", delete(resumes::handle_delete_resume))
        // Version history
        .route(
            "/api/v1/resumes/:id/versions",
            get(resumes::handle_list_versions),
        )
        .route(
            "/api/v1/resumes/:id/versions/:version",
            get(resumes::handle_get_version),
        )
        // Export and translation
        .route(
            "/api/v1/resumes/:id/export",
            post(resumes::handle_export_resume),
        )
        .route(
            "/api/v1/resumes/:id/translate",
            post(translation::handle_translate_resume),
        )
        .with_state(state)
}
