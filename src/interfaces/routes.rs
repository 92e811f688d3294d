use actix_web::web;

use crate::handlers::{home, system};

mod admin;
mod auth;
mod json_error;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home)
        .service(home::setup_guide)
        .service(system::health_check);

    cfg.configure(projects::config_routes)
        .configure(auth::config_routes)
        .configure(admin::config_routes)
        .configure(json_error::config_routes);
}
