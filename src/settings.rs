use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};
use url::Url;
use zeroize::Zeroizing;

/// Values shipped in the `.env` template; treated the same as a missing value.
const PLACEHOLDER_URLS: &[&str] = &["your_supabase_project_url", "https://your-project-id.supabase.co"];
const PLACEHOLDER_KEYS: &[&str] = &["your_supabase_anon_key", "your-anon-key-here"];

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub supabase_url: String,

    #[serde(default)]
    pub supabase_anon_key: String,

    #[serde(default = "default_session_cookie")]
    pub session_cookie_name: String,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_login_attempts")]
    pub login_attempts_per_minute: u32,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Site".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_session_cookie() -> String {
    "portfolio_session".to_string()
}
fn default_login_attempts() -> u32 {
    10
}

/// Connection values for the hosted backend, present only when both are usable.
#[derive(Clone)]
pub struct BackendCredentials {
    pub url: Url,
    pub anon_key: Zeroizing<String>,
}

impl fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    /// Missing backend credentials are not an error here: the
    /// site starts with its backend adapters disabled instead.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.session_cookie_name.trim().is_empty() {
            errors.push("SESSION_COOKIE_NAME cannot be empty");
        }
        if self.login_attempts_per_minute == 0 {
            errors.push("LOGIN_ATTEMPTS_PER_MINUTE must be greater than zero");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns `None` when the URL or key is missing, still holds a template
    /// placeholder, or the URL does not parse.
    pub fn backend_credentials(&self) -> Option<BackendCredentials> {
        let url = self.supabase_url.trim();
        let key = self.supabase_anon_key.trim();

        if url.is_empty() || key.is_empty() {
            return None;
        }
        if PLACEHOLDER_URLS.contains(&url) || PLACEHOLDER_KEYS.contains(&key) {
            return None;
        }

        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(BackendCredentials {
                url: parsed,
                anon_key: Zeroizing::new(key.to_string()),
            }),
            Ok(parsed) => {
                tracing::warn!(scheme = parsed.scheme(), "Backend URL must use http or https");
                None
            }
            Err(e) => {
                tracing::warn!("Backend URL is not a valid URL: {}", e);
                None
            }
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.trim().is_empty() {
            "[MISSING]"
        } else if PLACEHOLDER_KEYS.contains(&self.trim()) {
            "[PLACEHOLDER]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &self.supabase_anon_key.redact())
            .field("session_cookie_name", &self.session_cookie_name)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("login_attempts_per_minute", &self.login_attempts_per_minute)
            .finish()
    }
}
