use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, repository::RepositoryState};

/// Fixed lifetime of every issued access token. There is no refresh mechanism;
/// clients re-request a token from POST /jwt when theirs expires.
pub const TOKEN_TTL_SECS: u64 = 6 * 60 * 60;

/// Claims
///
/// The payload structure signed into every access token. These claims are signed
/// with the server secret and validated on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The caller's email. This is the only identity carried by the
    /// token — roles are never baked in, they are looked up per request so that a
    /// role change takes effect on the very next call.
    pub sub: String,
    /// Expiration Time (exp): Timestamp after which the token must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the token was issued.
    pub iat: usize,
}

/// issue_token
///
/// The issuing half of the token service: signs an email identity claim with the
/// server secret, valid for [`TOKEN_TTL_SECS`].
pub fn issue_token(email: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: email.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request: nothing more than the email
/// claim recovered from a valid token. Authorization (role matching) is a separate
/// step performed against the persisted user record, see [`require_role`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's email, taken from the validated token's `sub` claim.
    pub email: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. This cleanly separates authentication
/// (extractor) from business logic (the handler).
///
/// Rejection: Returns StatusCode::UNAUTHORIZED (401) when the Authorization header
/// is missing, not a Bearer credential, malformed, expired, or badly signed.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the token secret).
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Token Extraction
        // Retrieve the Authorization header and ensure it is prefixed with "Bearer ".
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // 2. Decoding Setup
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        // 3. Decode and Validate the Token
        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                match e.kind() {
                    // Token expired: the most common failure for a valid-but-old token.
                    ErrorKind::ExpiredSignature => return Err(StatusCode::UNAUTHORIZED),
                    // All other failure types (bad signature, malformed token, etc.).
                    _ => return Err(StatusCode::UNAUTHORIZED),
                }
            }
        };

        Ok(AuthUser {
            email: token_data.claims.sub,
        })
    }
}

/// require_role
///
/// The capability check invoked at request entry for role-gated handlers: fetches
/// the caller's persisted user record by email and compares its role. The lookup
/// happens on every invocation — no caching — so a promotion or demotion is
/// effective immediately on the next request.
///
/// Rejection: FORBIDDEN (403) when the record is absent or the role differs.
pub async fn require_role(
    repo: &RepositoryState,
    email: &str,
    role: &str,
) -> Result<(), StatusCode> {
    let user = repo
        .get_user_by_email(email)
        .await
        .ok_or(StatusCode::FORBIDDEN)?;
    if user.role != role {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(())
}

pub async fn require_admin(repo: &RepositoryState, email: &str) -> Result<(), StatusCode> {
    require_role(repo, email, "admin").await
}

pub async fn require_instructor(repo: &RepositoryState, email: &str) -> Result<(), StatusCode> {
    require_role(repo, email, "instructor").await
}
