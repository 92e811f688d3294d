use serde::{Serialize, Deserialize};
use validator::Validate;

/// The signed-in account as the auth service reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl AuthUser {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Admin")
    }
}

/// Tokens issued on sign-in. Refresh handling stays with the auth service.
#[derive(Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account exists but must be confirmed by email before sign-in.
    ConfirmationRequired,
    SignedIn(AuthSession),
}

#[derive(Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Must be at least 6 characters"))]
    pub password: String,
}

/// Profile metadata attached to a new account.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignUpProfile {
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user: AuthUser,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub message: String,
    pub confirmation_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_full_name() {
        let mut user = AuthUser { id: "u1".into(), email: Some("me@example.com".into()), full_name: None };
        assert_eq!(user.display_name(), "me@example.com");
        user.full_name = Some("Maud".into());
        assert_eq!(user.display_name(), "Maud");
    }

    #[test]
    fn short_passwords_are_rejected_on_sign_up() {
        let request = SignUpRequest {
            full_name: "Maud".into(),
            email: "me@example.com".into(),
            password: "12345".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn session_debug_hides_the_token() {
        let session = AuthSession {
            access_token: "secret-token".into(),
            expires_in: Some(3600),
            user: AuthUser { id: "u1".into(), email: None, full_name: None },
        };
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
