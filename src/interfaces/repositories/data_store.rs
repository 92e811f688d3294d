use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DataError;

/// A row as the data API returns it: one JSON object.
pub type Row = Value;

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Filter { column, value: value.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn desc(column: &'static str) -> Self {
        Order { column, ascending: false }
    }
}

/// Generic table access offered by the hosted data service.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn query(&self, table: &str, filters: &[Filter], order: Option<Order>) -> Result<Vec<Row>, DataError>;

    /// `Ok(None)` when no row has that id.
    async fn get(&self, table: &str, id: &str) -> Result<Option<Row>, DataError>;

    async fn insert(&self, table: &str, row: &Row) -> Result<Row, DataError>;

    /// Applies `changes` to one row. `DataError::NotFound` when nothing matched.
    async fn update(&self, table: &str, id: &str, changes: &Row) -> Result<Row, DataError>;

    /// Succeeds whether or not the row existed.
    async fn remove(&self, table: &str, id: &str) -> Result<(), DataError>;

    /// Same store, acting on behalf of a signed-in user so row-level
    /// security sees their identity.
    fn with_access_token(&self, access_token: &str) -> Arc<dyn DataStore>;
}
