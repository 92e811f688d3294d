use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{
    entities::{
        session::{SessionContext, SessionState},
        user::AuthUser,
    },
    errors::AppError,
    AppState,
};

/// The request's session as settled by the session middleware.
/// `Unknown` when the middleware did not run for this request.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionContext);

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let context = req
            .extensions()
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default();
        ready(Ok(CurrentSession(context)))
    }
}

/// Extractor for the signed-in user and the token to act on their behalf.
/// Returns 503 while the site is not configured, 401 otherwise.
#[derive(Debug, Clone)]
pub struct SignedInUser {
    pub user: AuthUser,
    pub access_token: String,
}

impl FromRequest for SignedInUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let configured = req
            .app_data::<web::Data<AppState>>()
            .is_some_and(|state| state.auth_handler.is_configured());
        if !configured {
            return ready(Err(AppError::SetupRequired.into()));
        }

        let extensions = req.extensions();
        let signed_in = extensions.get::<SessionContext>().and_then(|context| {
            match (&context.state, context.access_token()) {
                (SessionState::Authenticated(user), Some(token)) => Some(SignedInUser {
                    user: user.clone(),
                    access_token: token.to_string(),
                }),
                _ => None,
            }
        });

        ready(signed_in.ok_or_else(|| AppError::UnauthorizedAccess.into()))
    }
}
