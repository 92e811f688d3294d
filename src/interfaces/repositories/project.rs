use async_trait::async_trait;

use crate::{
    backend::DataClient,
    constants::PROJECTS_TABLE,
    entities::project::{NewProject, Project, ProjectChanges},
    errors::DataError,
    repositories::data_store::{Filter, Order, Row},
};

/// Typed access to the `projects` table.
///
/// Reads never fail towards the caller: errors are logged with their kind and
/// turned into an empty or absent result. Writes report a `DataError` so the
/// dashboard can keep the attempted draft.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// `false` when there is no backend to talk to.
    fn is_configured(&self) -> bool;
    async fn list_all(&self) -> Vec<Project>;
    async fn list_featured(&self) -> Vec<Project>;
    async fn get_by_id(&self, id: &str) -> Option<Project>;
    async fn list_by_owner(&self, user_id: &str) -> Vec<Project>;
    async fn create(&self, project: &NewProject) -> Result<Project, DataError>;
    async fn update(&self, id: &str, changes: &ProjectChanges) -> Result<Project, DataError>;
    async fn delete(&self, id: &str) -> bool;
}

#[derive(Clone, Debug)]
pub struct DataProjectRepo {
    client: DataClient,
}

impl DataProjectRepo {
    pub fn new(client: DataClient) -> Self {
        DataProjectRepo { client }
    }

    async fn list_where(&self, filters: &[Filter]) -> Result<Vec<Project>, DataError> {
        let DataClient::Client(store) = &self.client else {
            return Err(DataError::NotConfigured);
        };
        let rows = store
            .query(PROJECTS_TABLE, filters, Some(Order::desc("created_at")))
            .await?;
        decode_rows(rows)
    }

    /// Logs a failed read and hands back the neutral result.
    fn listed(&self, operation: &'static str, result: Result<Vec<Project>, DataError>) -> Vec<Project> {
        result.unwrap_or_else(|err| {
            log_failure(operation, &err);
            Vec::new()
        })
    }
}

fn decode_rows(rows: Vec<Row>) -> Result<Vec<Project>, DataError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DataError::from))
        .collect()
}

fn log_failure(operation: &'static str, err: &DataError) {
    match err {
        // Expected until the site is configured; not worth a warning per request.
        DataError::NotConfigured => tracing::debug!(operation, kind = err.kind(), "Project data unavailable"),
        DataError::NotFound => tracing::info!(operation, kind = err.kind(), "Project not found"),
        _ => tracing::warn!(operation, kind = err.kind(), error = %err, "Project data request failed"),
    }
}

#[async_trait]
impl ProjectRepository for DataProjectRepo {
    fn is_configured(&self) -> bool {
        self.client.is_enabled()
    }

    async fn list_all(&self) -> Vec<Project> {
        self.listed("list_all", self.list_where(&[]).await)
    }

    async fn list_featured(&self) -> Vec<Project> {
        let projects = self.listed("list_featured", self.list_where(&[Filter::eq("featured", true)]).await);
        projects.into_iter().filter(|project| project.featured).collect()
    }

    async fn get_by_id(&self, id: &str) -> Option<Project> {
        let DataClient::Client(store) = &self.client else {
            log_failure("get_by_id", &DataError::NotConfigured);
            return None;
        };

        let result = match store.get(PROJECTS_TABLE, id).await {
            Ok(Some(row)) => serde_json::from_value::<Project>(row).map_err(DataError::from),
            Ok(None) => Err(DataError::NotFound),
            Err(err) => Err(err),
        };

        result.map_err(|err| log_failure("get_by_id", &err)).ok()
    }

    async fn list_by_owner(&self, user_id: &str) -> Vec<Project> {
        self.listed("list_by_owner", self.list_where(&[Filter::eq("user_id", user_id)]).await)
    }

    async fn create(&self, project: &NewProject) -> Result<Project, DataError> {
        let DataClient::Client(store) = &self.client else {
            return Err(DataError::NotConfigured);
        };
        if project.user_id.trim().is_empty() {
            return Err(DataError::Rejected {
                status: 400,
                message: "user_id is required".into(),
            });
        }

        let row = serde_json::to_value(project)?;
        let created = store
            .insert(PROJECTS_TABLE, &row)
            .await
            .inspect_err(|err| log_failure("create", err))?;

        let project: Project = serde_json::from_value(created)?;
        tracing::info!(project_id = %project.id, "Project created");
        Ok(project)
    }

    async fn update(&self, id: &str, changes: &ProjectChanges) -> Result<Project, DataError> {
        let DataClient::Client(store) = &self.client else {
            return Err(DataError::NotConfigured);
        };

        let row = serde_json::to_value(changes)?;
        let updated = store
            .update(PROJECTS_TABLE, id, &row)
            .await
            .inspect_err(|err| log_failure("update", err))?;

        let project: Project = serde_json::from_value(updated)?;
        tracing::info!(project_id = %project.id, "Project updated");
        Ok(project)
    }

    async fn delete(&self, id: &str) -> bool {
        let DataClient::Client(store) = &self.client else {
            log_failure("delete", &DataError::NotConfigured);
            return false;
        };

        match store.remove(PROJECTS_TABLE, id).await {
            Ok(()) => {
                tracing::info!(project_id = %id, "Project deleted");
                true
            }
            Err(err) => {
                log_failure("delete", &err);
                false
            }
        }
    }
}
