use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::{session::AdminLink, view::LandingView},
    use_cases::extractors::CurrentSession,
    AppState,
};

#[derive(Serialize)]
struct HomePage {
    #[serde(flatten)]
    landing: LandingView,
    admin_link: Option<AdminLink>,
}

#[get("/")]
#[instrument(skip_all)]
pub async fn home(state: web::Data<AppState>, session: CurrentSession) -> impl Responder {
    let landing = state.project_handler.landing_view().await;

    HttpResponse::Ok().json(HomePage {
        landing,
        admin_link: session.0.state.admin_link(),
    })
}

#[get("/setup")]
pub async fn setup_guide(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.project_handler.setup_guide())
}
