use async_trait::async_trait;

use crate::{
    entities::user::{AuthSession, AuthUser, SignUpOutcome, SignUpProfile},
    errors::AuthError,
};

/// The hosted authentication service.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// `Ok(None)` when the token is unknown or expired.
    async fn get_current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, AuthError>;

    /// Revokes the session server-side. Failures are logged, never returned.
    async fn sign_out(&self, access_token: &str);
}
