use std::{fmt, sync::Arc};

use crate::{
    repositories::{auth_client::AuthClient, data_store::DataStore},
    settings::AppConfig,
};

pub mod gotrue;
pub mod postgrest;

use gotrue::GoTrueClient;
use postgrest::PostgrestStore;

/// Data API handle. `Disabled` when the site has no backend credentials;
/// callers must render a setup state instead of issuing calls.
#[derive(Clone)]
pub enum DataClient {
    Disabled,
    Client(Arc<dyn DataStore>),
}

impl DataClient {
    pub fn is_enabled(&self) -> bool {
        matches!(self, DataClient::Client(_))
    }

    /// Handle that forwards the user's token to the data API.
    pub fn authorized(&self, access_token: &str) -> Self {
        match self {
            DataClient::Disabled => DataClient::Disabled,
            DataClient::Client(store) => DataClient::Client(store.with_access_token(access_token)),
        }
    }
}

impl fmt::Debug for DataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataClient::Disabled => write!(f, "DataClient::Disabled"),
            DataClient::Client(_) => write!(f, "DataClient::Client"),
        }
    }
}

/// Auth API handle, disabled under the same conditions as [`DataClient`].
#[derive(Clone)]
pub enum AuthBackend {
    Disabled,
    Client(Arc<dyn AuthClient>),
}

impl AuthBackend {
    pub fn is_enabled(&self) -> bool {
        matches!(self, AuthBackend::Client(_))
    }
}

impl fmt::Debug for AuthBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthBackend::Disabled => write!(f, "AuthBackend::Disabled"),
            AuthBackend::Client(_) => write!(f, "AuthBackend::Client"),
        }
    }
}

/// Builds both adapters from configuration. Missing or placeholder
/// credentials are not an error: both adapters come up disabled.
pub fn connect(config: &AppConfig) -> anyhow::Result<(DataClient, AuthBackend)> {
    let Some(credentials) = config.backend_credentials() else {
        tracing::warn!("Backend credentials missing or placeholder; running in setup mode");
        return Ok((DataClient::Disabled, AuthBackend::Disabled));
    };

    // One connection pool shared by both adapters. No timeout is set so the
    // transport defaults apply.
    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let store = PostgrestStore::new(http.clone(), &credentials)?;
    let auth = GoTrueClient::new(http, &credentials)?;

    tracing::info!(url = %credentials.url, "Backend adapters configured");
    Ok((
        DataClient::Client(Arc::new(store)),
        AuthBackend::Client(Arc::new(auth)),
    ))
}
