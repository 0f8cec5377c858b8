use crate::{
    AppState,
    auth::{self, AuthUser},
    enrollment,
    models::{
        AddCartItemRequest, CartItem, ClassListing, CreateClassRequest, CreateEnrollmentRequest,
        CreatePaymentIntentRequest, Enrollment, FeedbackRequest, MessageResponse, Payment,
        PaymentIntentResponse, PaymentOutcome, PermissionRequest, ProcessPaymentRequest,
        RegisterUserRequest, RoleCheckResponse, TokenRequest, TokenResponse, UpdateClassRequest,
        User,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// CartFilter
///
/// Query parameters for GET /carts. The email is taken at face value — it is not
/// verified against the caller's token identity (existing behavior, preserved).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CartFilter {
    pub email: Option<String>,
}

/// PaymentFilter
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PaymentFilter {
    pub email: Option<String>,
}

/// EnrollmentFilter
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentFilter {
    pub student_email: Option<String>,
}

// --- Token Service ---

/// issue_token
///
/// [Public Route] Issues a signed, time-limited access token for the posted
/// identity. Anyone can request a token for any email — the token only proves
/// the caller *presented* that email; every role decision is made against the
/// persisted user record at request time.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses((status = 200, description = "Token issued", body = TokenResponse))
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    let token = auth::issue_token(&payload.email, &state.config.jwt_secret)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(TokenResponse { token }))
}

// --- Users ---

/// list_users
///
/// [Admin Route] Lists every registered user.
///
/// *RBAC*: the caller's persisted role must be "admin"; the lookup happens fresh
/// on this request, so demotions are effective immediately.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    AuthUser { email }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, StatusCode> {
    auth::require_admin(&state.repo, &email).await?;
    Ok(Json(state.repo.list_users().await))
}

/// check_admin
///
/// [Authenticated Route] Self-match probe: "is this email an admin?".
///
/// When the path email differs from the token's email, the response is a
/// non-authoritative `{"admin": false}` and the store is not consulted.
#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(("email" = String, Path, description = "Email to probe")),
    responses((status = 200, description = "Admin flag", body = RoleCheckResponse))
)]
pub async fn check_admin(
    AuthUser { email: caller }: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<RoleCheckResponse> {
    if caller != email {
        return Json(RoleCheckResponse::admin(false));
    }
    let user = state.repo.get_user_by_email(&email).await;
    Json(RoleCheckResponse::admin(
        user.map(|u| u.role == "admin").unwrap_or(false),
    ))
}

/// check_student
///
/// [Authenticated Route] Self-match probe for the "student" role.
#[utoipa::path(
    get,
    path = "/users/student/{email}",
    params(("email" = String, Path, description = "Email to probe")),
    responses((status = 200, description = "Student flag", body = RoleCheckResponse))
)]
pub async fn check_student(
    AuthUser { email: caller }: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<RoleCheckResponse> {
    if caller != email {
        return Json(RoleCheckResponse::student(false));
    }
    let user = state.repo.get_user_by_email(&email).await;
    Json(RoleCheckResponse::student(
        user.map(|u| u.role == "student").unwrap_or(false),
    ))
}

/// check_instructor
///
/// [Authenticated Route] Self-match probe for the "instructor" role.
#[utoipa::path(
    get,
    path = "/users/instructor/{email}",
    params(("email" = String, Path, description = "Email to probe")),
    responses((status = 200, description = "Instructor flag", body = RoleCheckResponse))
)]
pub async fn check_instructor(
    AuthUser { email: caller }: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<RoleCheckResponse> {
    if caller != email {
        return Json(RoleCheckResponse::instructor(false));
    }
    let user = state.repo.get_user_by_email(&email).await;
    Json(RoleCheckResponse::instructor(
        user.map(|u| u.role == "instructor").unwrap_or(false),
    ))
}

/// register_user
///
/// [Public Route] Creates a user on first self-registration. Idempotent on email:
/// a repeat registration returns `{"message": "User already exists"}` and performs
/// no insert.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Created (or already exists)", body = User)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> impl IntoResponse {
    if state
        .repo
        .get_user_by_email(&payload.email)
        .await
        .is_some()
    {
        return Json(MessageResponse {
            message: "User already exists".to_string(),
        })
        .into_response();
    }

    let user = state.repo.create_user(payload).await;
    tracing::info!(user_id = %user.id, "a user was inserted");
    Json(user).into_response()
}

/// promote_to_admin
///
/// [Public Route] Promotes the user to the "admin" role. Takes effect on the
/// target's very next request, since roles are re-read per call.
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Promoted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn promote_to_admin(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.set_user_role(id, "admin").await {
        tracing::info!(user_id = %id, "a user was made an admin");
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

/// promote_to_instructor
///
/// [Public Route] Promotes the user to the "instructor" role.
#[utoipa::path(
    patch,
    path = "/users/instructor/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Promoted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn promote_to_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.repo.set_user_role(id, "instructor").await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Catalog / Class Management ---

/// list_classes
///
/// [Authenticated Route] Lists every class regardless of moderation status.
#[utoipa::path(
    get,
    path = "/classes",
    responses((status = 200, description = "All classes", body = [ClassListing]))
)]
pub async fn list_classes(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<ClassListing>> {
    Json(state.repo.list_classes().await)
}

/// create_class
///
/// [Instructor Route] Submits a new class listing. It is inserted with
/// `status = "pending"` and only reaches the public catalog after admin approval.
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 200, description = "Created", body = ClassListing),
        (status = 403, description = "Not an instructor")
    )
)]
pub async fn create_class(
    AuthUser { email }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<Json<ClassListing>, StatusCode> {
    auth::require_instructor(&state.repo, &email).await?;
    let class = state.repo.create_class(payload).await;
    Ok(Json(class))
}

/// get_class_for_edit
///
/// [Public Route] Fetches a single class by id for the edit form.
#[utoipa::path(
    get,
    path = "/class/edit/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Found", body = ClassListing),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_class_for_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassListing>, StatusCode> {
    match state.repo.get_class(id).await {
        Some(class) => Ok(Json(class)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// update_class
///
/// [Public Route] Full-replacement update of a class listing. Every edit —
/// whatever field it touches — resets the status to "pending" and sends the
/// listing back through moderation. Deliberate behavior.
#[utoipa::path(
    put,
    path = "/class/update/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Updated", body = ClassListing),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<Json<ClassListing>, StatusCode> {
    match state.repo.replace_class(id, payload).await {
        Some(class) => Ok(Json(class)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// set_class_permission
///
/// [Public Route] Moderation verdict for a listing. Only "approved" and "denied"
/// are valid; anything else is a 400 and the listing is left untouched.
#[utoipa::path(
    patch,
    path = "/class/permission/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = PermissionRequest,
    responses(
        (status = 200, description = "Updated", body = ClassListing),
        (status = 400, description = "Invalid permission value"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_class_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionRequest>,
) -> Result<Json<ClassListing>, StatusCode> {
    if payload.permission != "approved" && payload.permission != "denied" {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.repo.set_class_status(id, &payload.permission).await {
        Some(class) => Ok(Json(class)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// classes_by_instructor
///
/// [Instructor Route] Lists the classes belonging to the instructor email in the
/// path. The guard only verifies that the *caller* holds the instructor role; the
/// path email itself is not matched against the caller (existing behavior,
/// preserved).
#[utoipa::path(
    get,
    path = "/classes/{email}",
    params(("email" = String, Path, description = "Instructor email")),
    responses(
        (status = 200, description = "Instructor's classes", body = [ClassListing]),
        (status = 403, description = "Not an instructor")
    )
)]
pub async fn classes_by_instructor(
    AuthUser { email: caller }: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<ClassListing>>, StatusCode> {
    auth::require_instructor(&state.repo, &caller).await?;
    Ok(Json(state.repo.list_classes_by_instructor(&email).await))
}

/// list_approved_classes
///
/// [Public Route] The public catalog: approved listings only.
#[utoipa::path(
    get,
    path = "/all-classes",
    responses((status = 200, description = "Approved classes", body = [ClassListing]))
)]
pub async fn list_approved_classes(State(state): State<AppState>) -> Json<Vec<ClassListing>> {
    Json(state.repo.list_approved_classes().await)
}

/// set_feedback
///
/// [Authenticated Route] Attaches moderation feedback text to a listing.
#[utoipa::path(
    patch,
    path = "/feedback/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback set"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_feedback(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeedbackRequest>,
) -> StatusCode {
    if state.repo.set_class_feedback(id, &payload.feedback).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Carts ---

/// get_cart
///
/// [Authenticated Route] Lists cart items for the `?email=` query parameter.
#[utoipa::path(
    get,
    path = "/carts",
    params(CartFilter),
    responses((status = 200, description = "Cart items", body = [CartItem]))
)]
pub async fn get_cart(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<CartFilter>,
) -> Json<Vec<CartItem>> {
    let email = filter.email.unwrap_or_default();
    Json(state.repo.get_cart_items(&email).await)
}

/// add_cart_item
///
/// [Public Route] Stages a class for purchase. The payload is inserted as-is with
/// a server-generated id.
#[utoipa::path(
    post,
    path = "/carts",
    request_body = AddCartItemRequest,
    responses((status = 200, description = "Added", body = CartItem))
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(payload): Json<AddCartItemRequest>,
) -> Json<CartItem> {
    Json(state.repo.add_cart_item(payload).await)
}

/// remove_cart_item
///
/// [Public Route] Removes a cart item by id.
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn remove_cart_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.remove_cart_item(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// --- Payments & Enrollment ---

/// create_payment_intent
///
/// [Public Route] Converts the posted price to integer minor units (price * 100)
/// and requests a "usd" payment intent from the provider, returning its client
/// secret. The price is not validated to be positive and the currency is not
/// parameterized (existing behavior, preserved).
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntentResponse),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, StatusCode> {
    let amount = (payload.price * 100.0).round() as i64;

    match state.payments.create_payment_intent(amount, "usd").await {
        Ok(client_secret) => Ok(Json(PaymentIntentResponse { client_secret })),
        Err(e) => {
            tracing::error!("create_payment_intent error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// process_payment
///
/// [Authenticated Route] The enrollment workflow: records the payment, clears the
/// purchased cart items, and decrements one seat per purchased class, returning
/// the three acknowledgements together. See [`crate::enrollment::process_payment`]
/// for the (deliberately non-transactional) semantics.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = ProcessPaymentRequest,
    responses((status = 200, description = "Payment processed", body = PaymentOutcome))
)]
pub async fn process_payment(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Json<PaymentOutcome> {
    Json(enrollment::process_payment(&state.repo, payload).await)
}

/// list_payments
///
/// [Public Route] Payment history for the `?email=` query parameter.
#[utoipa::path(
    get,
    path = "/payments",
    params(PaymentFilter),
    responses((status = 200, description = "Payments", body = [Payment]))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
) -> Json<Vec<Payment>> {
    let email = filter.email.unwrap_or_default();
    Json(state.repo.get_payments(&email).await)
}

/// list_enrollments
///
/// [Public Route] Enrollments for the `?studentEmail=` query parameter.
#[utoipa::path(
    get,
    path = "/enrollments",
    params(EnrollmentFilter),
    responses((status = 200, description = "Enrollments", body = [Enrollment]))
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Query(filter): Query<EnrollmentFilter>,
) -> Json<Vec<Enrollment>> {
    let email = filter.student_email.unwrap_or_default();
    Json(state.repo.get_enrollments(&email).await)
}

/// create_enrollment
///
/// [Authenticated Route] Records an enrollment after a class purchase
/// confirmation. Deliberately decoupled from POST /payments: a payment can exist
/// without an enrollment and vice versa.
#[utoipa::path(
    post,
    path = "/enrollments/classes",
    request_body = CreateEnrollmentRequest,
    responses((status = 200, description = "Enrolled", body = Enrollment))
)]
pub async fn create_enrollment(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> Json<Enrollment> {
    Json(state.repo.insert_enrollment(payload).await)
}
