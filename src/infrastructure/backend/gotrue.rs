use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;
use zeroize::Zeroizing;

use super::postgrest::service_url;
use crate::{
    entities::user::{AuthSession, AuthUser, SignUpOutcome, SignUpProfile},
    errors::AuthError,
    repositories::auth_client::AuthClient,
    settings::BackendCredentials,
};

const AUTH_PATH: &str = "auth/v1/";

/// `AuthClient` backed by the hosted GoTrue auth API.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: Url,
    anon_key: Arc<Zeroizing<String>>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        AuthUser {
            id: user.id,
            email: user.email,
            full_name: user.user_metadata.full_name.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: GoTrueUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        AuthSession {
            access_token: token.access_token,
            expires_in: token.expires_in,
            user: token.user.into(),
        }
    }
}

/// Sign-up answers with a full session when email confirmation is off,
/// and with the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponseBody {
    Session(TokenResponse),
    User(GoTrueUser),
}

/// The auth API has used several error shapes over time.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, credentials: &BackendCredentials) -> Result<Self, url::ParseError> {
        Ok(GoTrueClient {
            http,
            auth_url: service_url(&credentials.url, AUTH_PATH)?,
            anon_key: Arc::new(credentials.anon_key.clone()),
        })
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> Result<RequestBuilder, AuthError> {
        let url = self
            .auth_url
            .join(path)
            .map_err(|e| AuthError::Transient(format!("invalid auth url: {e}")))?;
        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str())))
    }
}

/// Pulls a user-presentable message out of an error body.
pub(crate) fn rejection_message(status: StatusCode, body: &str) -> AuthError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return AuthError::Transient(status.to_string());
    }
    let parsed: GoTrueErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .unwrap_or_else(|| "Authentication failed".to_string());
    AuthError::Rejected(message)
}

async fn checked(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(rejection_message(status, &body))
}

#[async_trait]
impl AuthClient for GoTrueClient {
    #[instrument(skip_all, level = "debug", err)]
    async fn get_current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .request(Method::GET, "user", Some(access_token))?
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => {
                let user: GoTrueUser = checked(response).await?.json().await?;
                Ok(Some(user.into()))
            }
        }
    }

    #[instrument(skip(self, password), err)]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let token: TokenResponse = checked(
            self.request(Method::POST, "token?grant_type=password", None)?
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        Ok(token.into())
    }

    #[instrument(skip(self, password), err)]
    async fn sign_up(&self, email: &str, password: &str, profile: &SignUpProfile) -> Result<SignUpOutcome, AuthError> {
        let body: SignUpResponseBody = checked(
            self.request(Method::POST, "signup", None)?
                .json(&json!({ "email": email, "password": password, "data": profile }))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        Ok(match body {
            SignUpResponseBody::Session(token) => SignUpOutcome::SignedIn(token.into()),
            SignUpResponseBody::User(user) => {
                tracing::debug!(user_id = %user.id, "Sign-up awaiting email confirmation");
                SignUpOutcome::ConfirmationRequired
            }
        })
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) {
        let result = match self.request(Method::POST, "logout", Some(access_token)) {
            Ok(request) => match request.send().await {
                Ok(response) => checked(response).await.map(|_| ()),
                Err(e) => Err(AuthError::from(e)),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!("Sign-out request failed: {}", e);
        }
    }
}
