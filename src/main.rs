use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

use portfolio_site::{
    backend,
    background_task::start_limiter_sweep,
    graceful_shutdown::shutdown_signal,
    middlewares::session::SessionMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,portfolio_site=debug"));

    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    let (data_client, auth_backend) = backend::connect(&config)
        .map_err(|e| std::io::Error::other(format!("Failed to set up backend clients: {e}")))?;

    let app_state = web::Data::new(AppState::new(&config, data_client, auth_backend));
    let origins = config.cors_origins();

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let sweeper = tokio::spawn(start_limiter_sweep(app_state.login_limiter.clone()));

    let server = HttpServer::new({
        let app_state = app_state.clone();
        move || {
            App::new()
                .app_data(app_state.clone())
                .wrap(SessionMiddleware)
                .wrap(NormalizePath::trim())
                .wrap(cors(&origins))
                .wrap(TracingLogger::default())
                .configure(configure_routes)
        }
    })
    .workers(config.worker_count)
    .shutdown_timeout(10)
    .bind(server_addr)?
    .run();

    let handle = server.handle();

    let result = tokio::select! {
        res = server => res,
        _ = shutdown_signal() => {
            handle.stop(true).await;
            Ok(())
        }
    };

    sweeper.abort();
    tracing::info!("Server stopped");
    result
}
