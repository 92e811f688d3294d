use validator::Validate;

use crate::{
    backend::AuthBackend,
    entities::{
        session::{SessionContext, SessionState},
        user::{AuthSession, SignInRequest, SignUpOutcome, SignUpProfile, SignUpRequest},
    },
    errors::AppError,
};

pub const CONFIRMATION_MESSAGE: &str = "Check your email for the confirmation link!";

pub struct AuthHandler {
    pub backend: AuthBackend,
}

impl AuthHandler {
    pub fn new(backend: AuthBackend) -> Self {
        AuthHandler { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_enabled()
    }

    /// Settles the session for one request. A missing token, a disabled
    /// backend and a failed check all end up anonymous; there is no retry.
    pub async fn resolve_session(&self, access_token: Option<&str>) -> SessionContext {
        let (AuthBackend::Client(client), Some(token)) = (&self.backend, access_token) else {
            return SessionContext::anonymous();
        };

        let user = client.get_current_user(token).await.unwrap_or_else(|e| {
            tracing::warn!("Session check failed, treating as signed out: {}", e);
            None
        });

        match SessionState::resolved(user) {
            SessionState::Authenticated(user) => SessionContext::authenticated(user, token.to_string()),
            _ => SessionContext::anonymous(),
        }
    }

    /// Signs in with email and password
    pub async fn sign_in(&self, mut request: SignInRequest) -> Result<AuthSession, AppError> {
        request.email = request.email.trim().to_string();
        request.validate()?;
        let AuthBackend::Client(client) = &self.backend else {
            return Err(AppError::SetupRequired);
        };

        let session = client
            .sign_in_with_password(&request.email, &request.password)
            .await?;

        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    /// Registers an account with the full name as profile metadata
    pub async fn sign_up(&self, mut request: SignUpRequest) -> Result<SignUpOutcome, AppError> {
        request.email = request.email.trim().to_string();
        request.validate()?;
        let AuthBackend::Client(client) = &self.backend else {
            return Err(AppError::SetupRequired);
        };

        let profile = SignUpProfile {
            full_name: request.full_name.trim().to_string(),
        };
        let outcome = client
            .sign_up(&request.email, &request.password, &profile)
            .await?;

        tracing::info!(
            confirmation_required = matches!(outcome, SignUpOutcome::ConfirmationRequired),
            "Account registered"
        );
        Ok(outcome)
    }

    pub async fn sign_out(&self, access_token: Option<&str>) {
        if let (AuthBackend::Client(client), Some(token)) = (&self.backend, access_token) {
            client.sign_out(token).await;
        }
    }
}
