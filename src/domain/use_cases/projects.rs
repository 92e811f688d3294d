use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use validator::Validate;

use crate::{
    constants::PLACEHOLDER_PROJECT_ID,
    entities::{
        project::{placeholder_project, Project, ProjectChanges, ProjectDraft, UpdateProjectRequest},
        user::AuthUser,
        view::{
            DashboardView, DetailView, DraftRejection, LandingView, ProjectCard, ProjectDetail, SetupGuide,
            SetupStep, StaticProjectView,
        },
    },
    errors::{AppError, FieldError},
    repositories::project::ProjectRepository,
};

pub const SCHEMA_SQL: &str = include_str!("../../../migrations/0001_create_projects.sql");

const STATIC_PROJECT_SUMMARY: &str = "A web project I built as part of my first internship. I learned a lot about React, teamwork, and building real-world features. This project taught me valuable skills in frontend development, team collaboration, and working with real client requirements.";

const STATIC_PROJECT_HIGHLIGHTS: [&str; 5] = [
    "Collaborative development in a professional environment",
    "Working with TypeScript for better code quality",
    "Implementing responsive design with Tailwind CSS",
    "Understanding client requirements and delivering solutions",
    "Code review processes and team workflow",
];

const STATIC_PROJECT_AVAILABILITY: &str =
    "This project was developed during my internship. Live demo and source code are not publicly available.";

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R) -> Self {
        ProjectHandler { project_repo }
    }

    pub fn is_configured(&self) -> bool {
        self.project_repo.is_configured()
    }

    /// Featured projects as cards. Never empty: the placeholder project
    /// stands in when nothing could be loaded.
    pub async fn landing_view(&self) -> LandingView {
        if !self.is_configured() {
            return LandingView {
                setup_required: true,
                projects: vec![ProjectCard::from(&placeholder_project())],
            };
        }

        let projects = self.project_repo.list_featured().await;
        let projects = if projects.is_empty() {
            vec![ProjectCard::from(&placeholder_project())]
        } else {
            projects.iter().map(ProjectCard::from).collect()
        };

        LandingView {
            setup_required: false,
            projects,
        }
    }

    pub async fn project_detail(&self, id: &str) -> DetailView {
        if id == PLACEHOLDER_PROJECT_ID {
            return DetailView::Found {
                project: self.static_project_detail().project,
            };
        }
        if !self.is_configured() {
            return DetailView::setup_required();
        }

        match self.project_repo.get_by_id(id).await {
            Some(project) => DetailView::Found {
                project: ProjectDetail::from(&project),
            },
            None => DetailView::not_found(),
        }
    }

    pub fn static_project_detail(&self) -> StaticProjectView {
        let mut project = placeholder_project();
        project.description = STATIC_PROJECT_SUMMARY.to_string();

        StaticProjectView {
            project: ProjectDetail::from(&project),
            highlights: STATIC_PROJECT_HIGHLIGHTS.to_vec(),
            availability_note: STATIC_PROJECT_AVAILABILITY,
        }
    }

    pub fn setup_guide(&self) -> SetupGuide {
        SetupGuide {
            configured: self.is_configured(),
            steps: vec![
                SetupStep {
                    title: "Create a Supabase project",
                    instructions: vec![
                        "Sign up or log in to your account",
                        "Click \"New Project\"",
                        "Choose your organization and fill in project details",
                        "Wait for the project to be created",
                    ],
                },
                SetupStep {
                    title: "Copy your API credentials",
                    instructions: vec![
                        "In your Supabase dashboard, go to Settings → API",
                        "Copy the \"Project URL\"",
                        "Copy the \"anon public\" key",
                    ],
                },
                SetupStep {
                    title: "Configure the environment",
                    instructions: vec![
                        "Set the variables below in your environment or a .env file",
                        "Restart the server",
                    ],
                },
                SetupStep {
                    title: "Create the database schema",
                    instructions: vec![
                        "In your Supabase dashboard, go to the SQL Editor",
                        "Create a new query",
                        "Paste and run the schema below",
                        "This will create the necessary tables and security policies",
                    ],
                },
                SetupStep {
                    title: "Start adding projects",
                    instructions: vec![
                        "Sign in and access the admin dashboard",
                        "Add your first project!",
                    ],
                },
            ],
            environment: vec![
                "APP_SUPABASE_URL=https://your-project-id.supabase.co",
                "APP_SUPABASE_ANON_KEY=your-anon-key-here",
            ],
            schema_sql: SCHEMA_SQL,
        }
    }

    /// The signed-in user's projects with an empty draft.
    pub async fn dashboard(&self, user: &AuthUser, message: Option<String>) -> Result<DashboardView, AppError> {
        if !self.is_configured() {
            return Err(AppError::SetupRequired);
        }

        Ok(DashboardView {
            user: user.clone(),
            greeting: format!("Welcome back, {}", user.display_name()),
            projects: self.project_repo.list_by_owner(&user.id).await,
            draft: ProjectDraft::default(),
            message,
        })
    }

    /// Dashboard with the draft loaded from one of the user's projects.
    pub async fn load_draft(&self, user: &AuthUser, id: &str) -> Result<DashboardView, AppError> {
        let mut view = self.dashboard(user, None).await?;
        let project = self.owned_project(user, id).await?;

        view.draft = ProjectDraft::from_project(&project);
        Ok(view)
    }

    /// The project with this id, provided it belongs to the user. Someone
    /// else's project reads as missing.
    async fn owned_project(&self, user: &AuthUser, id: &str) -> Result<Project, AppError> {
        self.project_repo
            .get_by_id(id)
            .await
            .filter(|project| project.user_id == user.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    /// Creates or updates depending on whether the draft was loaded from an
    /// existing record. On failure the attempted draft is handed back.
    pub async fn submit_draft(&self, user: &AuthUser, draft: ProjectDraft) -> Result<DashboardView, DraftFailure> {
        if let Err(errors) = draft.validate() {
            return Err(DraftFailure::new(AppError::from(errors), draft));
        }
        if !self.is_configured() {
            return Err(DraftFailure::new(AppError::SetupRequired, draft));
        }

        let result = match draft.editing_id() {
            Some(id) => match self.owned_project(user, id).await {
                Ok(_) => self.project_repo.update(id, &draft.to_changes()).await,
                Err(err) => return Err(DraftFailure::new(err, draft)),
            },
            None => self.project_repo.create(&draft.to_new_project(&user.id)).await,
        };

        let message = match result {
            Ok(_) if draft.is_editing() => "Project updated successfully!",
            Ok(_) => "Project created successfully!",
            Err(err) => return Err(DraftFailure::new(AppError::from(err), draft)),
        };

        self.dashboard(user, Some(message.to_string()))
            .await
            .map_err(|err| DraftFailure::new(err, ProjectDraft::default()))
    }

    /// Partial update; only the fields present in the request change.
    pub async fn patch_project(
        &self,
        user: &AuthUser,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<DashboardView, AppError> {
        request.validate()?;
        if !self.is_configured() {
            return Err(AppError::SetupRequired);
        }

        let changes = ProjectChanges::from(request);
        if changes.is_empty() {
            return Err(AppError::ValidationError(vec![FieldError {
                field: "body".into(),
                message: "No changes provided".into(),
            }]));
        }

        self.owned_project(user, id).await?;
        let project: Project = self.project_repo.update(id, &changes).await?;
        tracing::debug!(project_id = %project.id, "Partial update applied");

        self.dashboard(user, Some("Project updated successfully!".into())).await
    }

    /// Deletes only once the user has confirmed; otherwise nothing is called.
    pub async fn delete_project(&self, user: &AuthUser, id: &str, confirmed: bool) -> Result<DashboardView, AppError> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired(
                "Are you sure you want to delete this project?".into(),
            ));
        }
        if !self.is_configured() {
            return Err(AppError::SetupRequired);
        }
        self.owned_project(user, id).await?;

        if !self.project_repo.delete(id).await {
            return Err(AppError::BackendFailure("The project could not be deleted, please try again".into()));
        }

        self.dashboard(user, Some("Project deleted successfully!".into())).await
    }
}

/// A rejected draft submission: why, plus the draft to put back in the form.
#[derive(Debug)]
pub struct DraftFailure {
    pub cause: AppError,
    pub rejection: DraftRejection,
}

impl DraftFailure {
    pub fn new(cause: AppError, draft: ProjectDraft) -> Self {
        let details = match &cause {
            AppError::ValidationError(details) => details.clone(),
            _ => Vec::new(),
        };
        let error = match &cause {
            AppError::ValidationError(_) => "Please fix the highlighted fields".to_string(),
            other => other.to_string(),
        };

        DraftFailure {
            rejection: DraftRejection { error, details, draft },
            cause,
        }
    }
}

impl fmt::Display for DraftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl ResponseError for DraftFailure {
    fn status_code(&self) -> StatusCode {
        self.cause.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.rejection)
    }
}
