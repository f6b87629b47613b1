/// Request authentication context
///
/// The API server's bearer-token middleware validates the access token on
/// protected routes and inserts an [`AuthContext`] into the request
/// extensions. Handlers that need the caller's identity extract it with
/// Axum's `Extension` extractor:
///
/// ```ignore
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};

/// Authentication context added to request extensions after a successful
/// token validation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,
}

impl AuthContext {
    /// Creates an auth context from a validated token subject
    pub fn from_claims(user_id: i64) -> Self {
        Self { user_id }
    }
}
