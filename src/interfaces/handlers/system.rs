use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    service: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: &'static str,
    backend: &'static str,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let backend = if state.data_client.is_enabled() && state.auth_handler.is_configured() {
        "configured"
    } else {
        "setup required"
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        service: state.service_name.clone(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        backend,
    })
}
