use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use course_portal::{
    AppConfig, AppState, MemoryRepository, MockPaymentGateway,
    auth::{self, AuthUser, Claims},
    models::RegisterUserRequest,
    payments::PaymentState,
    repository::{Repository, RepositoryState},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::{sync::Arc, time::SystemTime};

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// Builds a token with an arbitrary expiry offset (negative = already expired).
fn create_token(email: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: email.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(repo: MemoryRepository, jwt_secret: &str) -> AppState {
    let mut config = AppConfig::default();
    config.jwt_secret = jwt_secret.to_string();

    AppState {
        repo: Arc::new(repo) as RepositoryState,
        payments: Arc::new(MockPaymentGateway::new()) as PaymentState,
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Token Service Tests ---

#[test]
fn test_issue_token_round_trips_claims() {
    let token = auth::issue_token("t@t.com", TEST_JWT_SECRET).unwrap();

    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .expect("freshly issued token must verify");

    assert_eq!(decoded.claims.sub, "t@t.com");
    // Fixed 6-hour lifetime.
    assert_eq!(
        decoded.claims.exp - decoded.claims.iat,
        auth::TOKEN_TTL_SECS as usize
    );
}

#[test]
fn test_issue_token_rejects_wrong_secret() {
    let token = auth::issue_token("t@t.com", TEST_JWT_SECRET).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"a-different-secret-entirely"),
        &Validation::default(),
    );
    assert!(result.is_err());
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_token() {
    let token = create_token("student@x.com", 3600);
    let app_state = create_app_state(MemoryRepository::new(), TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    assert_eq!(auth_user.unwrap().email, "student@x.com");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(MemoryRepository::new(), TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_without_bearer_prefix() {
    let token = create_token("student@x.com", 3600);
    let app_state = create_app_state(MemoryRepository::new(), TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&token).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    // Expired an hour ago, comfortably past the default validation leeway.
    let token = create_token("student@x.com", -3600);
    let app_state = create_app_state(MemoryRepository::new(), TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_bad_signature() {
    let token = create_token("student@x.com", 3600);
    // State verifies with a different secret than the token was signed with.
    let app_state = create_app_state(MemoryRepository::new(), "not-the-signing-secret");

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

// --- Role Guard Tests ---

#[tokio::test]
async fn test_require_admin_matches_persisted_role() {
    let repo = MemoryRepository::new();
    repo.create_user(RegisterUserRequest {
        email: "adm@x.com".to_string(),
        name: None,
        photo_url: None,
        role: Some("admin".to_string()),
    })
    .await;
    repo.create_user(RegisterUserRequest {
        email: "stu@x.com".to_string(),
        name: None,
        photo_url: None,
        role: Some("student".to_string()),
    })
    .await;
    let repo = Arc::new(repo) as RepositoryState;

    assert!(auth::require_admin(&repo, "adm@x.com").await.is_ok());
    assert_eq!(
        auth::require_admin(&repo, "stu@x.com").await.unwrap_err(),
        StatusCode::FORBIDDEN
    );
    // A token for an email with no user record is authenticated but unprivileged.
    assert_eq!(
        auth::require_admin(&repo, "ghost@x.com").await.unwrap_err(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_require_instructor_matches_persisted_role() {
    let repo = MemoryRepository::new();
    repo.create_user(RegisterUserRequest {
        email: "i@x.com".to_string(),
        name: None,
        photo_url: None,
        role: Some("instructor".to_string()),
    })
    .await;
    let repo = Arc::new(repo) as RepositoryState;

    assert!(auth::require_instructor(&repo, "i@x.com").await.is_ok());
    assert_eq!(
        auth::require_instructor(&repo, "nobody@x.com")
            .await
            .unwrap_err(),
        StatusCode::FORBIDDEN
    );
}
