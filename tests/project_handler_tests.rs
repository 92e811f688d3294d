use chrono::Utc;
use mockall::{mock, predicate::*};

use portfolio_site::{
    entities::{
        project::{NewProject, Project, ProjectChanges, ProjectDraft, UpdateProjectRequest},
        user::AuthUser,
        view::DetailView,
    },
    errors::{AppError, DataError},
    repositories::project::ProjectRepository,
    use_cases::projects::ProjectHandler,
};

mock! {
    pub ProjectRepo {}

    #[async_trait::async_trait]
    impl ProjectRepository for ProjectRepo {
        fn is_configured(&self) -> bool;
        async fn list_all(&self) -> Vec<Project>;
        async fn list_featured(&self) -> Vec<Project>;
        async fn get_by_id(&self, id: &str) -> Option<Project>;
        async fn list_by_owner(&self, user_id: &str) -> Vec<Project>;
        async fn create(&self, project: &NewProject) -> Result<Project, DataError>;
        async fn update(&self, id: &str, changes: &ProjectChanges) -> Result<Project, DataError>;
        async fn delete(&self, id: &str) -> bool;
    }
}

fn owner() -> AuthUser {
    AuthUser {
        id: "owner-1".into(),
        email: Some("me@example.com".into()),
        full_name: Some("Maud".into()),
    }
}

fn project(id: &str, user_id: &str) -> Project {
    Project {
        id: id.into(),
        title: "Demo".into(),
        description: "A demo".into(),
        image_url: None,
        project_url: None,
        github_url: None,
        technologies: vec!["Go".into(), "Rust".into(), "TS".into()],
        featured: true,
        user_id: user_id.into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Any data call on this repo fails the test.
fn disabled_repo() -> MockProjectRepo {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(false);
    repo.expect_list_all().never();
    repo.expect_list_featured().never();
    repo.expect_get_by_id().never();
    repo.expect_list_by_owner().never();
    repo.expect_create().never();
    repo.expect_update().never();
    repo.expect_delete().never();
    repo
}

#[actix_rt::test]
async fn disabled_backend_issues_zero_calls() {
    let handler = ProjectHandler::new(disabled_repo());
    let user = owner();

    let landing = handler.landing_view().await;
    assert!(landing.setup_required);
    assert_eq!(landing.projects.len(), 1);

    assert_eq!(handler.project_detail("abc").await, DetailView::setup_required());
    assert!(matches!(handler.dashboard(&user, None).await, Err(AppError::SetupRequired)));
    assert!(matches!(handler.load_draft(&user, "abc").await, Err(AppError::SetupRequired)));
    assert!(matches!(
        handler.delete_project(&user, "abc", true).await,
        Err(AppError::SetupRequired)
    ));

    let draft = ProjectDraft {
        title: "Demo".into(),
        description: "A demo".into(),
        ..Default::default()
    };
    let failure = handler.submit_draft(&user, draft).await.unwrap_err();
    assert!(matches!(failure.cause, AppError::SetupRequired));
    assert_eq!(failure.rejection.draft.title, "Demo");
}

#[actix_rt::test]
async fn empty_featured_list_yields_one_placeholder() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_list_featured().times(1).returning(Vec::new);

    let landing = ProjectHandler::new(repo).landing_view().await;

    assert!(!landing.setup_required);
    assert_eq!(landing.projects.len(), 1);
    assert_eq!(landing.projects[0].id, "static-2b-green");
}

#[actix_rt::test]
async fn landing_shows_every_featured_project() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_list_featured()
        .times(1)
        .returning(|| vec![project("a", "owner-1"), project("b", "owner-1")]);

    let landing = ProjectHandler::new(repo).landing_view().await;

    let ids: Vec<_> = landing.projects.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[actix_rt::test]
async fn missing_project_is_a_not_found_view() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id()
        .with(eq("missing"))
        .times(1)
        .returning(|_| None);

    let view = ProjectHandler::new(repo).project_detail("missing").await;

    assert_eq!(view, DetailView::not_found());
}

#[actix_rt::test]
async fn delete_without_confirmation_calls_nothing() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_delete().never();
    repo.expect_list_by_owner().never();

    let result = ProjectHandler::new(repo).delete_project(&owner(), "p1", false).await;

    assert!(matches!(result, Err(AppError::ConfirmationRequired(_))));
}

#[actix_rt::test]
async fn confirmed_delete_relists_afterwards() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id()
        .with(eq("p1"))
        .times(1)
        .returning(|id| Some(project(id, "owner-1")));
    repo.expect_delete().with(eq("p1")).times(1).returning(|_| true);
    repo.expect_list_by_owner()
        .with(eq("owner-1"))
        .times(1)
        .returning(|_| Vec::new());

    let view = ProjectHandler::new(repo)
        .delete_project(&owner(), "p1", true)
        .await
        .unwrap();

    assert!(view.projects.is_empty());
    assert_eq!(view.greeting, "Welcome back, Maud");
    assert_eq!(view.message.as_deref(), Some("Project deleted successfully!"));
}

#[actix_rt::test]
async fn failed_delete_is_reported_without_relisting() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id().returning(|id| Some(project(id, "owner-1")));
    repo.expect_delete().times(1).returning(|_| false);
    repo.expect_list_by_owner().never();

    let result = ProjectHandler::new(repo).delete_project(&owner(), "p1", true).await;

    assert!(matches!(result, Err(AppError::BackendFailure(_))));
}

#[actix_rt::test]
async fn someone_elses_project_is_never_deleted() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id()
        .with(eq("p1"))
        .times(1)
        .returning(|id| Some(project(id, "someone-else")));
    repo.expect_delete().never();
    repo.expect_list_by_owner().never();

    let result = ProjectHandler::new(repo).delete_project(&owner(), "p1", true).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn someone_elses_project_is_never_updated() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id().returning(|id| Some(project(id, "someone-else")));
    repo.expect_update().never();
    repo.expect_create().never();

    let draft = ProjectDraft::from_project(&project("p1", "someone-else"));
    let failure = ProjectHandler::new(repo).submit_draft(&owner(), draft).await.unwrap_err();
    assert!(matches!(failure.cause, AppError::NotFound(_)));
    assert_eq!(failure.rejection.draft.editing_id.as_deref(), Some("p1"));
}

#[actix_rt::test]
async fn new_draft_is_created_for_the_signed_in_user() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_create()
        .withf(|new| {
            new.title == "Demo"
                && new.user_id == "owner-1"
                && new.technologies == vec!["Go".to_string(), "Rust".to_string(), "TS".to_string()]
        })
        .times(1)
        .returning(|_| Ok(project("p1", "owner-1")));
    repo.expect_update().never();
    repo.expect_list_by_owner()
        .times(1)
        .returning(|_| vec![project("p1", "owner-1")]);

    let draft = ProjectDraft {
        title: "Demo".into(),
        description: "A demo".into(),
        technologies: "Go, Rust,  ,TS".into(),
        ..Default::default()
    };
    let view = ProjectHandler::new(repo).submit_draft(&owner(), draft).await.unwrap();

    assert_eq!(view.projects.len(), 1);
    assert_eq!(view.draft, ProjectDraft::default());
}

#[actix_rt::test]
async fn blank_editing_id_creates_a_new_project() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id().never();
    repo.expect_update().never();
    repo.expect_create().times(1).returning(|_| Ok(project("p2", "owner-1")));
    repo.expect_list_by_owner().returning(|_| vec![project("p2", "owner-1")]);

    let draft = ProjectDraft {
        editing_id: Some(String::new()),
        title: "Demo".into(),
        description: "A demo".into(),
        ..Default::default()
    };
    let view = ProjectHandler::new(repo).submit_draft(&owner(), draft).await.unwrap();

    assert_eq!(view.message.as_deref(), Some("Project created successfully!"));
}

#[actix_rt::test]
async fn loaded_draft_updates_instead_of_creating() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_create().never();
    repo.expect_get_by_id().returning(|id| Some(project(id, "owner-1")));
    repo.expect_update()
        .withf(|id, _| id == "p1")
        .times(1)
        .returning(|_, _| Ok(project("p1", "owner-1")));
    repo.expect_list_by_owner().times(1).returning(|_| Vec::new());

    let draft = ProjectDraft::from_project(&project("p1", "owner-1"));
    let view = ProjectHandler::new(repo).submit_draft(&owner(), draft).await.unwrap();

    assert_eq!(view.message.as_deref(), Some("Project updated successfully!"));
}

#[actix_rt::test]
async fn rejected_update_keeps_the_draft_and_skips_relisting() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_get_by_id().returning(|id| Some(project(id, "owner-1")));
    repo.expect_update()
        .times(1)
        .returning(|_, _| Err(DataError::Rejected { status: 403, message: "42501: rls".into() }));
    repo.expect_list_by_owner().never();

    let mut draft = ProjectDraft::from_project(&project("p1", "owner-1"));
    draft.title = "Edited".into();
    let failure = ProjectHandler::new(repo).submit_draft(&owner(), draft).await.unwrap_err();

    assert_eq!(failure.rejection.draft.title, "Edited");
    assert!(!failure.rejection.error.contains("42501"));
}

#[actix_rt::test]
async fn patch_without_changes_calls_nothing() {
    let mut repo = MockProjectRepo::new();
    repo.expect_is_configured().return_const(true);
    repo.expect_update().never();

    let result = ProjectHandler::new(repo)
        .patch_project(&owner(), "p1", UpdateProjectRequest::default())
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}
