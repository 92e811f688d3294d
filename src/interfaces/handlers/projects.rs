use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::view::DetailView, AppState};

pub async fn static_project(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.project_handler.static_project_detail())
}

/// Not-found is a terminal view, not an error page.
#[instrument(skip(state))]
pub async fn project_detail(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> impl Responder {
    let view = state.project_handler.project_detail(&project_id).await;

    let mut response = match &view {
        DetailView::Found { .. } => HttpResponse::Ok(),
        DetailView::NotFound { .. } => HttpResponse::NotFound(),
        DetailView::SetupRequired { .. } => HttpResponse::ServiceUnavailable(),
    };
    response.json(view)
}
