use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    errors::DataError,
    repositories::data_store::{DataStore, Filter, Order, Row},
    settings::BackendCredentials,
};

const REST_PATH: &str = "rest/v1/";

/// `DataStore` backed by the hosted PostgREST API.
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    rest_url: Url,
    anon_key: Arc<Zeroizing<String>>,
    access_token: Option<Arc<Zeroizing<String>>>,
}

impl PostgrestStore {
    pub fn new(http: reqwest::Client, credentials: &BackendCredentials) -> Result<Self, url::ParseError> {
        Ok(PostgrestStore {
            http,
            rest_url: service_url(&credentials.url, REST_PATH)?,
            anon_key: Arc::new(credentials.anon_key.clone()),
            access_token: None,
        })
    }

    fn table_url(&self, table: &str, query: String) -> Result<Url, DataError> {
        let mut url = self
            .rest_url
            .join(table)
            .map_err(|e| DataError::Transient(format!("invalid table url: {e}")))?;
        url.set_query(Some(&query));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        // Anonymous requests authenticate with the public key itself.
        let bearer = self
            .access_token
            .as_deref()
            .map(|token| token.as_str())
            .unwrap_or(self.anon_key.as_str());
        self.http
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Row>, DataError> {
        let response = checked(request.send().await?).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }
}

/// Joins a service path onto the configured base URL, which may or may not
/// carry a trailing slash.
pub(crate) fn service_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
}

/// PostgREST query string: `select=*`, `col=eq.value` filters, ordering and
/// an optional limit. Values are percent-encoded.
pub(crate) fn build_query(filters: &[Filter], order: Option<Order>, limit: Option<usize>) -> String {
    let mut parts = vec!["select=*".to_string()];

    for filter in filters {
        parts.push(format!("{}=eq.{}", filter.column, urlencoding::encode(&filter.value)));
    }
    if let Some(order) = order {
        let direction = if order.ascending { "asc" } else { "desc" };
        parts.push(format!("order={}.{}", order.column, direction));
    }
    if let Some(limit) = limit {
        parts.push(format!("limit={limit}"));
    }

    parts.join("&")
}

#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Maps a failed response to an error kind.
pub(crate) fn classify(status: StatusCode, body: &str) -> DataError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (parsed.code, parsed.message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message,
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        DataError::Transient(message)
    } else {
        DataError::Rejected { status: status.as_u16(), message }
    }
}

async fn checked(response: Response) -> Result<Response, DataError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &body))
}

fn id_filter(id: &str) -> [Filter; 1] {
    [Filter::eq("id", id)]
}

const RETURN_REPRESENTATION: &str = "return=representation";

#[async_trait]
impl DataStore for PostgrestStore {
    #[instrument(skip(self), level = "debug", err)]
    async fn query(&self, table: &str, filters: &[Filter], order: Option<Order>) -> Result<Vec<Row>, DataError> {
        let url = self.table_url(table, build_query(filters, order, None))?;
        self.rows(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self), level = "debug", err)]
    async fn get(&self, table: &str, id: &str) -> Result<Option<Row>, DataError> {
        let url = self.table_url(table, build_query(&id_filter(id), None, Some(1)))?;
        let rows = self.rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, row), level = "debug", err)]
    async fn insert(&self, table: &str, row: &Row) -> Result<Row, DataError> {
        let url = self.table_url(table, build_query(&[], None, None))?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row);

        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Decode("insert returned no rows".into()))
    }

    #[instrument(skip(self, changes), level = "debug", err)]
    async fn update(&self, table: &str, id: &str, changes: &Row) -> Result<Row, DataError> {
        let url = self.table_url(table, build_query(&id_filter(id), None, None))?;
        let request = self
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes);

        // Zero rows back means no match, or row-level security hid it.
        self.rows(request).await?.into_iter().next().ok_or(DataError::NotFound)
    }

    #[instrument(skip(self), level = "debug", err)]
    async fn remove(&self, table: &str, id: &str) -> Result<(), DataError> {
        let url = self.table_url(table, build_query(&id_filter(id), None, None))?;
        checked(self.request(Method::DELETE, url).send().await?).await?;
        Ok(())
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn DataStore> {
        Arc::new(PostgrestStore {
            access_token: Some(Arc::new(Zeroizing::new(access_token.to_string()))),
            ..self.clone()
        })
    }
}
