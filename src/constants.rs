use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const PROJECTS_TABLE: &str = "projects";

/// Reserved id of the hard-coded project shown when the table is empty.
pub const PLACEHOLDER_PROJECT_ID: &str = "static-2b-green";
pub const STATIC_PROJECT_ROUTE: &str = "/project/static-2b-green";
pub const PROJECT_ROUTE_PREFIX: &str = "/project/";

pub const LOGIN_ROUTE: &str = "/auth/login";
pub const SETUP_ROUTE: &str = "/setup";
pub const ADMIN_ROUTE: &str = "/admin";

pub const FALLBACK_IMAGE: &str = "/images/2b-green.png";
pub const LIVE_URL_SENTINEL: &str = "#";
