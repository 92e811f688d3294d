use actix_web::web;

use crate::handlers::admin;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("", web::get().to(admin::dashboard))
            .route("/projects", web::post().to(admin::submit_project))
            .route("/projects/{id}/edit", web::get().to(admin::edit_project))
            .service(
                web::resource("/projects/{id}")
                    .route(web::patch().to(admin::patch_project))
                    .route(web::delete().to(admin::delete_project))
            )
    );
}
