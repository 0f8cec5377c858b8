use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---
//
// Wire format note: the frontend consumes camelCase JSON keys (availableSeats,
// instructorEmail, ...), so every schema carries `rename_all = "camelCase"`.
// The Rust field names stay snake_case and map 1:1 onto the Postgres columns.

/// User
///
/// The canonical identity record stored in the `users` collection. The `role` field
/// drives every authorization decision: one of "none", "student", "instructor",
/// "admin". Users are created on first self-registration and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // The user's primary identifier; unique across the collection.
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    // The RBAC field. Looked up fresh on every role-guarded request.
    pub role: String,
}

/// ClassListing
///
/// A course offering with seat capacity and a moderation status
/// ("pending" | "approved" | "denied"). New listings always start as "pending",
/// and any owner edit resets them to "pending" for re-review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClassListing {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub price: f64,
    // Decremented once per purchased seat. Not floor-checked; see the payment workflow.
    pub available_seats: i32,
    pub status: String,
    // Optional admin note, set via the feedback endpoint.
    pub feedback: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CartItem
///
/// A class a student has staged for purchase. Destroyed on purchase or explicit
/// removal; the `price` is snapshotted at add-to-cart time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub id: Uuid,
    pub email: String,
    pub class_id: Uuid,
    pub class_name: Option<String>,
    pub price: f64,
}

/// Payment
///
/// The immutable record of a completed purchase. `cart_items` and `class_items`
/// reference the documents the enrollment workflow cleaned up / decremented.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    pub transaction_id: String,
    pub amount: f64,
    pub cart_items: Vec<Uuid>,
    pub class_items: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Enrollment
///
/// Created via its own endpoint after a class purchase confirmation, deliberately
/// decoupled from the payment step.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_email: String,
    pub class_id: Uuid,
    pub class_name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// TokenRequest
///
/// Body of POST /jwt. Only the email claim matters for identity; the rest of the
/// payload is ignored by the token service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TokenRequest {
    pub email: String,
}

/// TokenResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// RegisterUserRequest
///
/// Input payload for POST /users. Registration is idempotent on email: a second
/// attempt with a known email returns `{"message": "User already exists"}` and
/// performs no insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    // Defaults to "student" when omitted.
    pub role: Option<String>,
}

/// CreateClassRequest
///
/// Input payload for POST /classes (instructor-only). The listing is inserted with
/// `status = "pending"` regardless of payload content.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateClassRequest {
    pub name: String,
    pub image: String,
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i32,
}

/// UpdateClassRequest
///
/// Full-replacement payload for PUT /class/update/{id}. Every listed field is
/// overwritten and the moderation status is reset to "pending" — any edit forces
/// re-review, even one unrelated to pricing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateClassRequest {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub available_seats: i32,
}

/// PermissionRequest
///
/// Body of PATCH /class/permission/{id}. Only "approved" and "denied" are accepted;
/// anything else is rejected with 400 and leaves the listing untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PermissionRequest {
    pub permission: String,
}

/// FeedbackRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeedbackRequest {
    pub feedback: String,
}

/// AddCartItemRequest
///
/// Input payload for POST /carts. Inserted as-is with a server-generated id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddCartItemRequest {
    pub email: String,
    pub class_id: Uuid,
    pub class_name: Option<String>,
    pub price: f64,
}

/// CreatePaymentIntentRequest
///
/// Body of POST /create-payment-intent. The price is converted to integer minor
/// units (price * 100) before being forwarded to the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePaymentIntentRequest {
    pub price: f64,
}

/// PaymentIntentResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// ProcessPaymentRequest
///
/// Body of POST /payments — the input to the enrollment workflow. `cart_items`
/// names the cart documents to clear, `class_items` the listings whose seat counts
/// are decremented by one each.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProcessPaymentRequest {
    pub email: String,
    pub transaction_id: String,
    pub amount: f64,
    pub cart_items: Vec<Uuid>,
    pub class_items: Vec<Uuid>,
}

/// CreateEnrollmentRequest
///
/// Body of POST /enrollments/classes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEnrollmentRequest {
    pub student_email: String,
    pub class_id: Uuid,
    pub class_name: Option<String>,
}

// --- Output Schemas ---

/// PaymentOutcome
///
/// The three acknowledgements of the enrollment workflow, returned together:
/// the inserted payment, how many cart items were deleted, and how many class
/// listings had a seat decremented. The steps are sequential and independent —
/// a partial failure after the insert leaves the payment recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub removed_cart_items: u64,
    pub updated_classes: u64,
}

/// RoleCheckResponse
///
/// Output of the self-match role probes (GET /users/admin/{email} and friends).
/// Exactly one of the flags is populated per endpoint; a token/path email mismatch
/// yields a non-authoritative `false` without consulting the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoleCheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<bool>,
}

impl RoleCheckResponse {
    pub fn admin(value: bool) -> Self {
        Self {
            admin: Some(value),
            ..Default::default()
        }
    }

    pub fn student(value: bool) -> Self {
        Self {
            student: Some(value),
            ..Default::default()
        }
    }

    pub fn instructor(value: bool) -> Self {
        Self {
            instructor: Some(value),
            ..Default::default()
        }
    }
}

/// MessageResponse
///
/// Plain-text-style message envelope (e.g. duplicate registration).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
