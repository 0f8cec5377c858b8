use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

/// Public Router Module
///
/// Defines the endpoints reachable without the auth middleware layer. Beyond the
/// obviously anonymous routes (token issuing, registration, the public catalog,
/// payment intents), this group also carries paths that mix a public method with
/// a token-gated one (e.g. POST /users is open while GET /users is admin-only):
/// axum registers a path once, so those live here and their protected methods
/// enforce 401/403 through the `AuthUser` extractor and role guards directly.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Issues a 6-hour access token for the posted identity claims.
        .route("/jwt", post(handlers::issue_token))
        // POST /users (open registration, idempotent on email)
        // GET  /users (admin-only listing; handler enforces token + role)
        .route(
            "/users",
            get(handlers::list_users).post(handlers::register_user),
        )
        // GET   /users/admin/{email}: self-match role probe (token required)
        // PATCH /users/admin/{id}:    promotion to admin (open per the API surface)
        // Same path shape, so one registration covers both; the param is an email
        // for GET and a user id for PATCH.
        .route(
            "/users/admin/{id}",
            get(handlers::check_admin).patch(handlers::promote_to_admin),
        )
        .route(
            "/users/instructor/{id}",
            get(handlers::check_instructor).patch(handlers::promote_to_instructor),
        )
        // GET /users/student/{email}
        // Self-match probe for the student role (token required, handler-enforced).
        .route("/users/student/{id}", get(handlers::check_student))
        // GET /class/edit/{id}
        // Single-class fetch for the edit form.
        .route("/class/edit/{id}", get(handlers::get_class_for_edit))
        // PUT /class/update/{id}
        // Full-replacement edit; always resets the listing back to "pending".
        .route("/class/update/{id}", put(handlers::update_class))
        // PATCH /class/permission/{id}
        // Moderation verdict; only "approved" / "denied" are accepted.
        .route(
            "/class/permission/{id}",
            patch(handlers::set_class_permission),
        )
        // GET /all-classes
        // The public catalog: approved listings only.
        .route("/all-classes", get(handlers::list_approved_classes))
        // GET    /carts?email= (token required, handler-enforced)
        // POST   /carts        (open cart staging)
        // DELETE /carts/{id}   (open removal)
        .route(
            "/carts",
            get(handlers::get_cart).post(handlers::add_cart_item),
        )
        .route("/carts/{id}", delete(handlers::remove_cart_item))
        // POST /create-payment-intent
        // Asks the payment provider for an intent and relays the client secret.
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
        // GET  /payments?email= (open history query)
        // POST /payments        (the enrollment workflow; token required,
        //                        handler-enforced)
        .route(
            "/payments",
            get(handlers::list_payments).post(handlers::process_payment),
        )
        // GET /enrollments?studentEmail=
        .route("/enrollments", get(handlers::list_enrollments))
}
