/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Token enforcement is applied at the module level (via an Axum layer) for the
/// fully-protected group, and at the extractor level for the handful of paths
/// that mix an open method with a token-gated one.
///
/// Role checks (admin/instructor) are intentionally NOT a router concern here:
/// they run inside the handlers against the caller's *persisted* role, so a
/// promotion or demotion takes effect on the very next request instead of being
/// frozen into the token.

/// Routes reachable without the auth middleware layer: anonymous endpoints plus
/// mixed-method paths whose protected methods enforce auth in-handler.
pub mod public;

/// Routes protected wholesale by the `AuthUser` extractor middleware.
/// Requires a valid, unexpired bearer token on every method.
pub mod authenticated;
