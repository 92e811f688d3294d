use serde::Serialize;

use crate::{
    constants::{ADMIN_ROUTE, LOGIN_ROUTE},
    entities::user::AuthUser,
};

/// Lifecycle of a visitor's session:
/// `Unknown` → `Authenticated` | `Anonymous`.
///
/// `Unknown` covers the window before the auth check settles. Nothing that
/// depends on being signed in may be shown in that state.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(AuthUser),
    Anonymous,
}

impl SessionState {
    /// Outcome of a session check. A failed check counts as anonymous.
    pub fn resolved(user: Option<AuthUser>) -> Self {
        match user {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Anonymous,
        }
    }

    pub fn signed_out(self) -> Self {
        SessionState::Anonymous
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Footer/admin link for this state; absent until the check settles.
    pub fn admin_link(&self) -> Option<AdminLink> {
        match self {
            SessionState::Unknown => None,
            SessionState::Authenticated(_) => Some(AdminLink {
                label: "Dashboard",
                href: ADMIN_ROUTE,
            }),
            SessionState::Anonymous => Some(AdminLink {
                label: "Admin",
                href: LOGIN_ROUTE,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AdminLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// Per-request session, placed in the request extensions by the session
/// middleware and read back through extractors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    pub state: SessionState,
    access_token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        SessionContext {
            state: SessionState::Anonymous,
            access_token: None,
        }
    }

    pub fn authenticated(user: AuthUser, access_token: String) -> Self {
        SessionContext {
            state: SessionState::Authenticated(user),
            access_token: Some(access_token),
        }
    }

    /// Token to forward to the backend on behalf of the signed-in user.
    pub fn access_token(&self) -> Option<&str> {
        match self.state {
            SessionState::Authenticated(_) => self.access_token.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session: SessionState,
    pub admin_link: Option<AdminLink>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        SessionView {
            session: state.clone(),
            admin_link: state.admin_link(),
        }
    }
}
