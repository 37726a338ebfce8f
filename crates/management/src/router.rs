//! Wizard API router: mounts the wizard session, campaign and file endpoints.

use crate::handlers::{self, ManagementState};
use axum::routing::{get, post};
use axum::Router;

/// Build the management router with all endpoints.
/// Returns a Router that should be merged into the main app.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        // Wizard sessions
        .route("/api/v1/wizard/sessions", post(handlers::create_session))
        .route("/api/v1/wizard/sessions/:id", get(handlers::get_session).delete(handlers::delete_session))
        .route("/api/v1/wizard/sessions/:id/updates", post(handlers::apply_update))
        .route("/api/v1/wizard/sessions/:id/next", post(handlers::next_step))
        .route("/api/v1/wizard/sessions/:id/back", post(handlers::previous_step))
        .route("/api/v1/wizard/sessions/:id/preview", get(handlers::preview))
        .route("/api/v1/wizard/sessions/:id/uploads", post(handlers::upload))
        .route("/api/v1/wizard/sessions/:id/suggestions", get(handlers::suggestions))
        .route("/api/v1/wizard/sessions/:id/submit", post(handlers::submit))
        // Campaigns
        .route("/api/v1/campaigns", get(handlers::list_campaigns))
        .route("/api/v1/campaigns/:id", get(handlers::get_campaign))
        // Audit log
        .route("/api/v1/audit-log", get(handlers::audit_log))
        // Uploaded files
        .route("/files/:key", get(handlers::get_file))
        .with_state(state)
}
