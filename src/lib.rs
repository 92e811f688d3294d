mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{backend, limiter, utils};

use backend::{AuthBackend, DataClient};
use limiter::rate_limiter::LoginLimiter;
use repositories::project::DataProjectRepo;
use use_cases::{auth::AuthHandler, projects::ProjectHandler};

pub struct AppState {
    pub service_name: String,
    pub session_cookie_name: String,
    pub secure_cookies: bool,
    pub trust_x_forwarded_for: bool,
    pub data_client: DataClient,
    pub auth_handler: AuthHandler,
    pub project_handler: AppProjectHandler,
    pub login_limiter: LoginLimiter,
}

/// Public reads run with the anonymous key; admin requests build their own
/// handler around the user's token.
pub type AppProjectHandler = ProjectHandler<DataProjectRepo>;

impl AppState {
    pub fn new(config: &settings::AppConfig, data_client: DataClient, auth_backend: AuthBackend) -> Self {
        let project_handler = ProjectHandler::new(DataProjectRepo::new(data_client.clone()));
        let auth_handler = AuthHandler::new(auth_backend);

        AppState {
            service_name: config.name.clone(),
            session_cookie_name: config.session_cookie_name.clone(),
            secure_cookies: config.is_production(),
            trust_x_forwarded_for: config.trust_x_forwarded_for,
            data_client,
            auth_handler,
            project_handler,
            login_limiter: LoginLimiter::new(config.login_attempts_per_minute),
        }
    }
}
