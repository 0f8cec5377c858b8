use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Defines the routes whose every method requires a valid bearer token. The
/// `AuthUser` extractor middleware on the layer above this module rejects
/// tokenless requests with 401 before any handler runs.
///
/// Access Control Strategy:
/// Token possession is the only thing enforced at this layer. Handlers that are
/// admin- or instructor-gated perform their own `require_admin` /
/// `require_instructor` check against the persisted role, looked up fresh per
/// request, so role changes apply immediately.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET  /classes (any valid token: all listings, every moderation status)
        // POST /classes (instructor role, checked in the handler)
        .route(
            "/classes",
            get(handlers::list_classes).post(handlers::create_class),
        )
        // GET /classes/{email}
        // Per-instructor listing; the caller must hold the instructor role but the
        // path email is taken as given.
        .route("/classes/{email}", get(handlers::classes_by_instructor))
        // POST /enrollments/classes
        // Enrollment record creation, decoupled from the payment step.
        .route("/enrollments/classes", post(handlers::create_enrollment))
        // PATCH /feedback/{id}
        // Attaches moderation feedback text to a listing.
        .route("/feedback/{id}", patch(handlers::set_feedback))
}
