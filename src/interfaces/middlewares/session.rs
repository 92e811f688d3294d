use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::AppState;

/// Settles the visitor's session before any handler runs and stores it as a
/// `SessionContext` in the request extensions. Never rejects a request:
/// gating is left to the `SignedInUser` extractor.
pub struct SessionMiddleware;

impl<S> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in session middleware");
                return service.call(req).await;
            };

            let token = extract_token(&req, &state.session_cookie_name);
            let context = state.auth_handler.resolve_session(token.as_deref()).await;

            req.extensions_mut().insert(context);
            service.call(req).await
        })
    }
}

/// Bearer header first, then the session cookie.
fn extract_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        });

    bearer.or_else(|| {
        req.cookie(cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    })
}
