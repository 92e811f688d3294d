use serde::Serialize;

use crate::{
    constants::{FALLBACK_IMAGE, SETUP_ROUTE},
    entities::{
        project::{project_anchor, Project, ProjectDraft},
        user::AuthUser,
    },
    utils::markdown::safe_markdown_to_html,
};

// ───── Landing ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectCard {
    pub id: String,
    pub title: String,
    pub anchor: String,
    pub description: String,
    pub image_url: String,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub href: String,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub coming_soon: bool,
}

impl From<&Project> for ProjectCard {
    fn from(project: &Project) -> Self {
        let live_url = project.live_url().map(str::to_string);
        let github_url = project.github_link().map(str::to_string);

        ProjectCard {
            id: project.id.clone(),
            title: project.title.clone(),
            anchor: project_anchor(&project.title),
            description: project.description.clone(),
            image_url: project.image().unwrap_or(FALLBACK_IMAGE).to_string(),
            technologies: project.technologies.clone(),
            featured: project.featured,
            href: project.url(),
            coming_soon: live_url.is_none() && github_url.is_none(),
            live_url,
            github_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LandingView {
    pub setup_required: bool,
    pub projects: Vec<ProjectCard>,
}

// ───── Detail ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
}

impl From<&Project> for ProjectDetail {
    fn from(project: &Project) -> Self {
        ProjectDetail {
            id: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            description_html: safe_markdown_to_html(&project.description),
            image_url: project.image().map(normalize_image_path),
            technologies: project.technologies.clone(),
            featured: project.featured,
            live_url: project.live_url().map(str::to_string),
            github_url: project.github_link().map(str::to_string),
        }
    }
}

/// Stored image paths are sometimes Windows-style or missing the leading
/// slash. Absolute URLs pass through untouched.
pub fn normalize_image_path(path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailView {
    Found { project: ProjectDetail },
    NotFound { message: String },
    SetupRequired { setup_url: &'static str },
}

impl DetailView {
    pub fn not_found() -> Self {
        DetailView::NotFound {
            message: "The project you're looking for doesn't exist or has been removed.".to_string(),
        }
    }

    pub fn setup_required() -> Self {
        DetailView::SetupRequired { setup_url: SETUP_ROUTE }
    }
}

#[derive(Debug, Serialize)]
pub struct StaticProjectView {
    pub project: ProjectDetail,
    pub highlights: Vec<&'static str>,
    pub availability_note: &'static str,
}

// ───── Admin ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: AuthUser,
    pub greeting: String,
    pub projects: Vec<Project>,
    pub draft: ProjectDraft,
    pub message: Option<String>,
}

/// Returned when a mutation fails so the form can keep the attempted draft.
#[derive(Debug, Serialize)]
pub struct DraftRejection {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<crate::errors::FieldError>,
    pub draft: ProjectDraft,
}

// ───── Setup ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SetupStep {
    pub title: &'static str,
    pub instructions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SetupGuide {
    pub configured: bool,
    pub steps: Vec<SetupStep>,
    pub environment: Vec<&'static str>,
    pub schema_sql: &'static str,
}
