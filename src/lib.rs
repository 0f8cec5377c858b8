use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod enrollment;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod repository;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser; // The resolved authenticated identity (email claim).
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use payments::{MockPaymentGateway, PaymentState, StripeGateway};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application. It aggregates all API paths and data schemas that have been
/// decorated with the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::issue_token, handlers::list_users, handlers::check_admin,
        handlers::check_student, handlers::check_instructor, handlers::register_user,
        handlers::promote_to_admin, handlers::promote_to_instructor,
        handlers::list_classes, handlers::create_class, handlers::get_class_for_edit,
        handlers::update_class, handlers::set_class_permission,
        handlers::classes_by_instructor, handlers::list_approved_classes,
        handlers::set_feedback, handlers::get_cart, handlers::add_cart_item,
        handlers::remove_cart_item, handlers::create_payment_intent,
        handlers::process_payment, handlers::list_payments,
        handlers::list_enrollments, handlers::create_enrollment
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::User, models::ClassListing, models::CartItem, models::Payment,
            models::Enrollment, models::TokenRequest, models::TokenResponse,
            models::RegisterUserRequest, models::CreateClassRequest,
            models::UpdateClassRequest, models::PermissionRequest,
            models::FeedbackRequest, models::AddCartItemRequest,
            models::CreatePaymentIntentRequest, models::PaymentIntentResponse,
            models::ProcessPaymentRequest, models::CreateEnrollmentRequest,
            models::PaymentOutcome, models::RoleCheckResponse, models::MessageResponse,
        )
    ),
    tags(
        (name = "course-portal", description = "Course Enrollment Platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and
/// immutable container holding all essential application services and
/// configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts document-store access via the PgPool connection.
    pub repo: RepositoryState,
    /// Payment Layer: Abstracts the payment provider's intent-creation API.
    pub payments: PaymentState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers and extractors to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(app_state: &AppState) -> PaymentState {
        app_state.payments.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// A middleware function that enforces authentication for the fully-protected
/// route group.
///
/// *Mechanism*: It attempts to extract `AuthUser` from the request. Since
/// `AuthUser` implements `FromRequestParts`, if token validation fails the
/// extractor immediately rejects the request with a 401 Unauthorized status,
/// preventing execution of the handler. If successful, the request proceeds.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No middleware applied; mixed-method paths enforce auth
        // in-handler via the AuthUser extractor.
        .merge(public::public_routes())
        // Authenticated Routes: Protected wholesale by the `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a span
                // that includes the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns the x-request-id header to the
                // client and injects it into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI, so every log
/// line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
