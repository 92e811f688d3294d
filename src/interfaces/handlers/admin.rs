use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::project::{ProjectDraft, UpdateProjectRequest},
    errors::AppError,
    repositories::project::DataProjectRepo,
    use_cases::{
        extractors::SignedInUser,
        projects::{DraftFailure, ProjectHandler},
    },
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Project access on behalf of the signed-in user, so row-level security
/// applies to every call.
fn owner_projects(state: &AppState, signed_in: &SignedInUser) -> ProjectHandler<DataProjectRepo> {
    ProjectHandler::new(DataProjectRepo::new(
        state.data_client.authorized(&signed_in.access_token),
    ))
}

#[instrument(skip_all, fields(user_id = %signed_in.user.id))]
pub async fn dashboard(
    signed_in: SignedInUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let view = owner_projects(&state, &signed_in)
        .dashboard(&signed_in.user, None)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(signed_in, state), fields(user_id = %signed_in.user.id))]
pub async fn edit_project(
    signed_in: SignedInUser,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let view = owner_projects(&state, &signed_in)
        .load_draft(&signed_in.user, &project_id)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip_all, fields(user_id = %signed_in.user.id, editing = draft.is_editing()))]
pub async fn submit_project(
    signed_in: SignedInUser,
    state: web::Data<AppState>,
    draft: web::Json<ProjectDraft>,
) -> Result<impl Responder, DraftFailure> {
    let draft = draft.into_inner();
    let created = !draft.is_editing();

    let view = owner_projects(&state, &signed_in)
        .submit_draft(&signed_in.user, draft)
        .await?;

    let mut response = if created { HttpResponse::Created() } else { HttpResponse::Ok() };
    Ok(response.json(view))
}

#[instrument(skip(signed_in, state, changes), fields(user_id = %signed_in.user.id))]
pub async fn patch_project(
    signed_in: SignedInUser,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
    changes: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    let view = owner_projects(&state, &signed_in)
        .patch_project(&signed_in.user, &project_id, changes.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(signed_in, state), fields(user_id = %signed_in.user.id))]
pub async fn delete_project(
    signed_in: SignedInUser,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<impl Responder, AppError> {
    let view = owner_projects(&state, &signed_in)
        .delete_project(&signed_in.user, &project_id, query.confirm)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}
