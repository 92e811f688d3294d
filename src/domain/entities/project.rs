use std::borrow::Cow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    constants::{LIVE_URL_SENTINEL, PLACEHOLDER_PROJECT_ID, PROJECT_ROUTE_PREFIX, STATIC_PROJECT_ROUTE},
    entities::option_fields::OptionField,
};

// ───── Stored record ─────────────────────────────────────────────────

/// One row of the `projects` table as the data API returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Display route of this project.
    pub fn url(&self) -> String {
        project_url(&self.id)
    }

    /// Live demo link; `#` is the "no demo yet" marker.
    pub fn live_url(&self) -> Option<&str> {
        present(self.project_url.as_deref()).filter(|url| *url != LIVE_URL_SENTINEL)
    }

    pub fn github_link(&self) -> Option<&str> {
        present(self.github_url.as_deref())
    }

    pub fn image(&self) -> Option<&str> {
        present(self.image_url.as_deref())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pure and total: every id maps to exactly one route.
pub fn project_url(project_id: &str) -> String {
    if project_id == PLACEHOLDER_PROJECT_ID {
        STATIC_PROJECT_ROUTE.to_string()
    } else {
        format!("{PROJECT_ROUTE_PREFIX}{project_id}")
    }
}

/// In-page anchor for a project card.
pub fn project_anchor(title: &str) -> String {
    slug::slugify(title)
}

/// The single project shown on the landing page while the table is empty.
pub fn placeholder_project() -> Project {
    Project {
        id: PLACEHOLDER_PROJECT_ID.to_string(),
        title: "2B Green".to_string(),
        description: "A web project I built as part of my first internship. I learned a lot about React, teamwork, and building real-world features.".to_string(),
        image_url: Some("/images/2b-green.png".to_string()),
        project_url: Some(LIVE_URL_SENTINEL.to_string()),
        github_url: None,
        technologies: vec!["React".to_string(), "TypeScript".to_string(), "Tailwind".to_string()],
        featured: true,
        user_id: String::new(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

// ───── Technologies ──────────────────────────────────────────────────

/// Splits the comma-separated form value, trimming entries and dropping
/// empty ones. Order is preserved.
pub fn parse_technologies(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_technologies(technologies: &[String]) -> String {
    technologies.join(", ")
}

// ───── Writes ───────────────────────────────────────────────────────

/// Insert payload. Ids and timestamps are assigned by the backend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub user_id: String,
}

/// Update payload; only changed columns are serialized.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProjectChanges {
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub title: OptionField<String>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub description: OptionField<String>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub image_url: OptionField<String>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub project_url: OptionField<String>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub github_url: OptionField<String>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub technologies: OptionField<Vec<String>>,
    #[serde(skip_serializing_if = "OptionField::is_unchanged")]
    pub featured: OptionField<bool>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_unchanged()
            && self.description.is_unchanged()
            && self.image_url.is_unchanged()
            && self.project_url.is_unchanged()
            && self.github_url.is_unchanged()
            && self.technologies.is_unchanged()
            && self.featured.is_unchanged()
    }
}

// ───── Admin form ───────────────────────────────────────────────────

/// Dashboard form state. Mirrors a project, with `technologies` kept as the
/// comma-separated text the user edits. `editing_id` is set when the draft
/// was loaded from an existing record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ProjectDraft {
    pub editing_id: Option<String>,

    #[validate(
        custom(function = "validate_required_text", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,

    #[validate(custom(function = "validate_required_text", message = "Description is required"))]
    pub description: String,

    #[validate(custom(function = "validate_link"))]
    pub image_url: String,

    #[validate(custom(function = "validate_link"))]
    pub project_url: String,

    #[validate(custom(function = "validate_link"))]
    pub github_url: String,

    pub technologies: String,

    pub featured: bool,
}

impl ProjectDraft {
    pub fn from_project(project: &Project) -> Self {
        ProjectDraft {
            editing_id: Some(project.id.clone()),
            title: project.title.clone(),
            description: project.description.clone(),
            image_url: project.image_url.clone().unwrap_or_default(),
            project_url: project.project_url.clone().unwrap_or_default(),
            github_url: project.github_url.clone().unwrap_or_default(),
            technologies: join_technologies(&project.technologies),
            featured: project.featured,
        }
    }

    /// Id of the record being edited. A blank id means a new project.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id().is_some()
    }

    pub fn to_new_project(&self, owner_id: &str) -> NewProject {
        NewProject {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: optional_text(&self.image_url),
            project_url: optional_text(&self.project_url),
            github_url: optional_text(&self.github_url),
            technologies: parse_technologies(&self.technologies),
            featured: self.featured,
            user_id: owner_id.to_string(),
        }
    }

    /// The edit form always submits every field.
    pub fn to_changes(&self) -> ProjectChanges {
        ProjectChanges {
            title: OptionField::SetToValue(self.title.trim().to_string()),
            description: OptionField::SetToValue(self.description.trim().to_string()),
            image_url: optional_text(&self.image_url).into(),
            project_url: optional_text(&self.project_url).into(),
            github_url: optional_text(&self.github_url).into(),
            technologies: OptionField::SetToValue(parse_technologies(&self.technologies)),
            featured: OptionField::SetToValue(self.featured),
        }
    }
}

fn optional_text(value: &str) -> Option<String> {
    Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Partial update accepted by `PATCH /admin/projects/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(
        custom(function = "validate_required_field", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: OptionField<String>,

    #[validate(custom(function = "validate_required_field", message = "Description cannot be empty"))]
    pub description: OptionField<String>,

    #[validate(custom(function = "validate_link_field"))]
    pub image_url: OptionField<String>,

    #[validate(custom(function = "validate_link_field"))]
    pub project_url: OptionField<String>,

    #[validate(custom(function = "validate_link_field"))]
    pub github_url: OptionField<String>,

    pub technologies: OptionField<String>,

    pub featured: OptionField<bool>,
}

impl From<UpdateProjectRequest> for ProjectChanges {
    fn from(request: UpdateProjectRequest) -> Self {
        ProjectChanges {
            title: request.title.map_value(|t| t.trim().to_string()),
            description: request.description.map_value(|d| d.trim().to_string()),
            image_url: request.image_url.blank_as_null(),
            project_url: request.project_url.blank_as_null(),
            github_url: request.github_url.blank_as_null(),
            technologies: match request.technologies {
                OptionField::Unchanged => OptionField::Unchanged,
                OptionField::SetToNull => OptionField::SetToValue(Vec::new()),
                OptionField::SetToValue(raw) => OptionField::SetToValue(parse_technologies(&raw)),
            },
            // The column is NOT NULL; an explicit null means "not featured".
            featured: match request.featured {
                OptionField::SetToNull => OptionField::SetToValue(false),
                other => other,
            },
        }
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("required", "This field is required"));
    }
    Ok(())
}

/// Links may be blank, the `#` marker, a site-relative path or an http(s) URL.
pub fn validate_link(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value == LIVE_URL_SENTINEL || value.starts_with('/') {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://")),
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_required_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    match value {
        OptionField::Unchanged => Ok(()),
        OptionField::SetToNull => Err(new_validation_error("required", "This field is required")),
        OptionField::SetToValue(text) => validate_required_text(text),
    }
}

pub fn validate_link_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(link) = value {
        validate_link(link)?;
    }
    Ok(())
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}
