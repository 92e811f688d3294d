use actix_web::web;

use crate::{constants::STATIC_PROJECT_ROUTE, handlers::projects};

/// The static project route must be registered ahead of `/project/{id}`.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(STATIC_PROJECT_ROUTE).route(web::get().to(projects::static_project)))
        .service(web::resource("/project/{id}").route(web::get().to(projects::project_detail)));
}
