use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, HttpRequest, HttpResponse, Responder,
};
use tracing::instrument;

use crate::{
    constants::ADMIN_ROUTE,
    entities::{
        session::SessionView,
        user::{AuthSession, SignInRequest, SignInResponse, SignUpOutcome, SignUpRequest, SignUpResponse},
    },
    errors::AppError,
    use_cases::{auth::CONFIRMATION_MESSAGE, extractors::CurrentSession},
    utils::get_client_ip::get_client_ip,
    AppState,
};

fn throttle(req: &HttpRequest, state: &AppState) -> Result<(), AppError> {
    let client_ip = get_client_ip(req, state.trust_x_forwarded_for);
    state.login_limiter.check(&client_ip).map_err(|retry_after| {
        tracing::warn!(%client_ip, retry_after, "Sign-in attempts throttled");
        AppError::TooManyRequests(retry_after)
    })
}

fn session_cookie(state: &AppState, session: &AuthSession) -> Cookie<'static> {
    let mut cookie = Cookie::build(state.session_cookie_name.clone(), session.access_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .finish();
    if let Some(expires_in) = session.expires_in {
        cookie.set_max_age(Duration::seconds(i64::try_from(expires_in).unwrap_or(i64::MAX)));
    }
    cookie
}

#[post("/login")]
#[instrument(skip(req, state, request), fields(email = %request.email))]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    throttle(&req, &state)?;

    let session = state.auth_handler.sign_in(request.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state, &session))
        .json(SignInResponse {
            user: session.user,
            redirect: ADMIN_ROUTE.to_string(),
        }))
}

#[post("/signup")]
#[instrument(skip(req, state, request), fields(email = %request.email))]
pub async fn signup(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    throttle(&req, &state)?;

    let response = match state.auth_handler.sign_up(request.into_inner()).await? {
        SignUpOutcome::ConfirmationRequired => HttpResponse::Created().json(SignUpResponse {
            message: CONFIRMATION_MESSAGE.to_string(),
            confirmation_required: true,
        }),
        SignUpOutcome::SignedIn(session) => HttpResponse::Created()
            .cookie(session_cookie(&state, &session))
            .json(SignUpResponse {
                message: "Account created successfully".to_string(),
                confirmation_required: false,
            }),
    };

    Ok(response)
}

#[post("/logout")]
pub async fn logout(state: web::Data<AppState>, session: CurrentSession) -> impl Responder {
    state.auth_handler.sign_out(session.0.access_token()).await;

    let mut removal = Cookie::build(state.session_cookie_name.clone(), "")
        .path("/")
        .finish();
    removal.make_removal();

    HttpResponse::Ok()
        .cookie(removal)
        .json(SessionView::from(&session.0.state.signed_out()))
}

#[get("/session")]
pub async fn current_session(session: CurrentSession) -> impl Responder {
    HttpResponse::Ok().json(SessionView::from(&session.0.state))
}
