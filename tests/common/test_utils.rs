use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use portfolio_site::{
    backend::{AuthBackend, DataClient},
    entities::user::{AuthSession, AuthUser, SignUpOutcome, SignUpProfile},
    errors::{AuthError, DataError},
    middlewares::session::SessionMiddleware,
    repositories::{
        auth_client::AuthClient,
        data_store::{DataStore, Filter, Order, Row},
    },
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use uuid::Uuid;

use super::test_user::TestUser;

// ───── In-memory data API ───────────────────────────────────────────

/// `DataStore` keeping rows in insertion order. Every call is counted.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    rows: Arc<Mutex<Vec<Row>>>,
    calls: Arc<AtomicUsize>,
    tokens_seen: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
    access_token: Option<String>,
}

impl InMemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.lock().clone()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().clone()
    }

    /// Makes every following call fail as if the service were down.
    pub fn fail_requests(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn seed(&self, owner_id: &str, title: &str, featured: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let now = timestamp();
        self.rows.lock().push(json!({
            "id": id,
            "title": title,
            "description": format!("About {title}"),
            "image_url": null,
            "project_url": null,
            "github_url": null,
            "technologies": ["Rust"],
            "featured": featured,
            "user_id": owner_id,
            "created_at": now,
            "updated_at": now,
        }));
        id
    }

    fn begin(&self) -> Result<(), DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.access_token {
            self.tokens_seen.lock().push(token.clone());
        }
        if *self.failing.lock() {
            return Err(DataError::Transient("connection reset".into()));
        }
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match row.get(filter.column) {
        Some(Value::String(value)) => *value == filter.value,
        Some(value) => value.to_string() == filter.value,
        None => false,
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn query(&self, _table: &str, filters: &[Filter], order: Option<Order>) -> Result<Vec<Row>, DataError> {
        self.begin()?;
        let mut rows: Vec<Row> = self
            .rows
            .lock()
            .iter()
            .filter(|row| filters.iter().all(|filter| matches(row, filter)))
            .cloned()
            .collect();
        if order.is_some_and(|order| !order.ascending) {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn get(&self, _table: &str, id: &str) -> Result<Option<Row>, DataError> {
        self.begin()?;
        Ok(self.rows.lock().iter().find(|row| row["id"] == id).cloned())
    }

    async fn insert(&self, _table: &str, row: &Row) -> Result<Row, DataError> {
        self.begin()?;
        let mut row = row.clone();
        let now = timestamp();
        row["id"] = json!(Uuid::new_v4().to_string());
        row["created_at"] = json!(now);
        row["updated_at"] = json!(now);
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn update(&self, _table: &str, id: &str, changes: &Row) -> Result<Row, DataError> {
        self.begin()?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row["id"] == id)
            .ok_or(DataError::NotFound)?;
        if let (Some(target), Some(changes)) = (row.as_object_mut(), changes.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
            target.insert("updated_at".into(), json!(timestamp()));
        }
        Ok(row.clone())
    }

    async fn remove(&self, _table: &str, id: &str) -> Result<(), DataError> {
        self.begin()?;
        self.rows.lock().retain(|row| row["id"] != id);
        Ok(())
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn DataStore> {
        Arc::new(InMemoryStore {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        })
    }
}

// ───── Fake auth service ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeAuth {
    users: Arc<Mutex<HashMap<String, TestUser>>>,
    sessions: Arc<Mutex<HashMap<String, AuthUser>>>,
    sign_outs: Arc<AtomicUsize>,
}

impl FakeAuth {
    pub fn register(&self, user: &TestUser) {
        self.users.lock().insert(user.email.clone(), user.clone());
    }

    /// Issues a session token without going through HTTP.
    pub fn issue_token(&self, user: &TestUser) -> String {
        self.register(user);
        let token = format!("token-{}", Uuid::new_v4());
        self.sessions.lock().insert(token.clone(), user.auth_user());
        token
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthClient for FakeAuth {
    async fn get_current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.sessions.lock().get(access_token).cloned())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let user = self
            .users
            .lock()
            .get(email)
            .filter(|user| user.password == password)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("Invalid login credentials".into()))?;

        let token = self.issue_token(&user);
        Ok(AuthSession {
            access_token: token,
            expires_in: Some(3600),
            user: user.auth_user(),
        })
    }

    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, AuthError> {
        if self.users.lock().contains_key(email) {
            return Err(AuthError::Rejected("User already registered".into()));
        }
        let mut user = TestUser::new(email);
        user.password = password.to_string();
        user.full_name = profile.full_name.clone();
        self.register(&user);
        Ok(SignUpOutcome::ConfirmationRequired)
    }

    async fn sign_out(&self, access_token: &str) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().remove(access_token);
    }
}

// ───── Spawned application ──────────────────────────────────────────

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub store: InMemoryStore,
    pub auth: FakeAuth,
}

impl TestApp {
    /// App wired to the in-memory backend.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), true).await
    }

    /// App started without backend credentials.
    pub async fn spawn_unconfigured() -> Self {
        Self::spawn_with(test_config(), false).await
    }

    pub async fn spawn_with(config: AppConfig, configured: bool) -> Self {
        let store = InMemoryStore::default();
        let auth = FakeAuth::default();

        let (data_client, auth_backend) = if configured {
            (
                DataClient::Client(Arc::new(store.clone())),
                AuthBackend::Client(Arc::new(auth.clone())),
            )
        } else {
            (DataClient::Disabled, AuthBackend::Disabled)
        };

        let state = web::Data::new(AppState::new(&config, data_client, auth_backend));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .wrap(SessionMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            address,
            client,
            config,
            store,
            auth,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// A registered user with a live session token.
    pub fn signed_in_user(&self) -> (TestUser, String) {
        let user = TestUser::random();
        let token = self.auth.issue_token(&user);
        (user, token)
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (reqwest::StatusCode, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.expect("Request failed");
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn submit_draft(&self, token: &str, draft: Value) -> reqwest::Response {
        self.client
            .post(self.url("/admin/projects"))
            .bearer_auth(token)
            .json(&draft)
            .send()
            .await
            .expect("Failed to submit draft")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Site Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        supabase_url: String::new(),
        supabase_anon_key: String::new(),
        session_cookie_name: "portfolio_session".to_string(),
        trust_x_forwarded_for: false,
        login_attempts_per_minute: 10,
    }
}

pub fn demo_draft() -> Value {
    json!({
        "title": "Demo",
        "description": "A demo project",
        "image_url": "",
        "project_url": "#",
        "github_url": "https://github.com/me/demo",
        "technologies": "Go, Rust,  ,TS",
        "featured": true
    })
}
