//! Background course imports driven through a scripted catalog.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tokio::sync::Notify;

use campus::application::services::CourseImportService;
use campus::application::AppServices;
use campus::domain::course_import::{ExternalCourse, ExternalLesson, ImportProvider, ImportStatus};
use campus::domain::course::CourseStatus;
use campus::domain::{Actor, UserRole};
use campus::infrastructure::catalogs::{CatalogRegistry, CourseCatalog};
use campus::infrastructure::database::entities::{course, import_job};
use campus::shared::errors::{InfraError, InfraResult};
use campus::shared::RetryConfig;

use common::{create_test_services, create_user};

/// Fails with the given status `failures` times, then returns a two-lesson course.
struct ScriptedCatalog {
    failures: u32,
    status: u16,
    calls: AtomicU32,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedCatalog {
    fn new(failures: u32, status: u16) -> Self {
        Self {
            failures,
            status,
            calls: AtomicU32::new(0),
            gate: None,
        }
    }

    /// Signals `started` on the first call, then waits for `release`.
    fn gated(started: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            gate: Some((started, release)),
            ..Self::new(0, 200)
        }
    }
}

#[async_trait]
impl CourseCatalog for ScriptedCatalog {
    fn provider(&self) -> ImportProvider {
        ImportProvider::Youtube
    }

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }
        if call < self.failures {
            return Err(InfraError::Upstream {
                service: "scripted",
                status: self.status,
                body: "scripted failure".to_string(),
            });
        }
        Ok(ExternalCourse {
            provider: ImportProvider::Youtube,
            external_id: external_id.to_string(),
            title: "Imported Playlist".to_string(),
            description: Some("From a playlist".to_string()),
            category: Some("video".to_string()),
            thumbnail_url: None,
            lessons: vec![
                ExternalLesson {
                    title: "Part 1".to_string(),
                    content: None,
                    video_url: Some("https://youtu.be/one".to_string()),
                    duration_seconds: 120,
                },
                ExternalLesson {
                    title: "Part 2".to_string(),
                    content: None,
                    video_url: Some("https://youtu.be/two".to_string()),
                    duration_seconds: 240,
                },
            ],
        })
    }
}

fn import_service(app: &AppServices, catalog: Arc<ScriptedCatalog>) -> CourseImportService {
    let mut registry = CatalogRegistry::default();
    registry.register(catalog);
    CourseImportService::new(app.db.clone(), registry).with_retry(RetryConfig::immediate(3))
}

async fn wait_until_settled(imports: &CourseImportService, actor: &Actor, job_id: &str) -> import_job::Model {
    for _ in 0..200 {
        let job = imports.get(actor, job_id).await.unwrap();
        if job.status.is_terminal() && imports.running_count() == 0 {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("import job {} never settled", job_id);
}

#[tokio::test]
async fn transient_failures_are_retried_until_completion() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let catalog = Arc::new(ScriptedCatalog::new(2, 503));
    let imports = import_service(&app, catalog.clone());

    let job = imports
        .start_import(&teacher, ImportProvider::Youtube, "PL123")
        .await
        .unwrap();
    assert_eq!(job.status, ImportStatus::Pending);

    let done = wait_until_settled(&imports, &teacher, &job.id).await;
    assert_eq!(done.status, ImportStatus::Completed);
    assert_eq!(done.lessons_imported, 2);
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 3);

    let course_id = done.course_id.expect("imported course");
    let course = app.courses.get(&course_id).await.unwrap();
    assert_eq!(course.title, "Imported Playlist");
    assert_eq!(course.status, CourseStatus::Draft);
    assert_eq!(course.teacher_id, teacher.user_id);
    let modules = app.courses.list_modules(&course_id).await.unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].lessons.len(), 2);
}

#[tokio::test]
async fn permanent_failure_marks_the_job_failed() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let catalog = Arc::new(ScriptedCatalog::new(1, 404));
    let imports = import_service(&app, catalog.clone());

    let job = imports
        .start_import(&teacher, ImportProvider::Youtube, "missing")
        .await
        .unwrap();
    let done = wait_until_settled(&imports, &teacher, &job.id).await;

    assert_eq!(done.status, ImportStatus::Failed);
    assert!(done.error.as_deref().is_some_and(|e| e.contains("404")));
    assert!(done.course_id.is_none());
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_job_stays_cancelled() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let catalog = Arc::new(ScriptedCatalog::gated(started.clone(), release.clone()));
    let imports = import_service(&app, catalog);

    let job = imports
        .start_import(&teacher, ImportProvider::Youtube, "PL123")
        .await
        .unwrap();
    started.notified().await;

    let cancelled = imports.cancel(&teacher, &job.id).await.unwrap();
    assert_eq!(cancelled.status, ImportStatus::Cancelled);
    release.notify_one();

    let settled = wait_until_settled(&imports, &teacher, &job.id).await;
    assert_eq!(settled.status, ImportStatus::Cancelled);
    assert!(settled.course_id.is_none());

    // Terminal jobs cannot be cancelled again.
    assert!(imports.cancel(&teacher, &job.id).await.is_err());
}

#[tokio::test]
async fn unconfigured_provider_and_students_are_rejected() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let imports = import_service(&app, Arc::new(ScriptedCatalog::new(0, 200)));

    assert_eq!(imports.providers(), vec![ImportProvider::Youtube]);
    assert!(imports.start_import(&teacher, ImportProvider::Udemy, "42").await.is_err());
    assert!(imports.start_import(&student, ImportProvider::Youtube, "42").await.is_err());
}

#[tokio::test]
async fn jobs_left_processing_are_failed_on_recovery() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let first = import_service(
        &app,
        Arc::new(ScriptedCatalog::gated(started.clone(), release.clone())),
    );
    let job = first
        .start_import(&teacher, ImportProvider::Youtube, "PL123")
        .await
        .unwrap();
    started.notified().await;

    // A second service instance knows nothing of the running task, like a restarted process.
    let restarted = import_service(&app, Arc::new(ScriptedCatalog::new(0, 200)));
    assert_eq!(restarted.recover_interrupted().await.unwrap(), 1);
    let failed = restarted.get(&teacher, &job.id).await.unwrap();
    assert_eq!(failed.status, ImportStatus::Failed);

    release.notify_one();
    let settled = wait_until_settled(&first, &teacher, &job.id).await;
    assert_eq!(settled.status, ImportStatus::Failed);
    assert!(settled.course_id.is_none());

    // The stale task's course is rolled back with its rejected COMPLETED transition.
    let orphans = course::Entity::find()
        .filter(course::Column::ExternalId.eq("PL123"))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn jobs_left_pending_are_cancelled_on_recovery() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;

    let queued = import_job::ActiveModel {
        id: Set("job-left-pending".to_string()),
        requested_by: Set(teacher.user_id.clone()),
        provider: Set(ImportProvider::Youtube),
        external_id: Set("PL999".to_string()),
        status: Set(ImportStatus::Pending),
        error: Set(None),
        course_id: Set(None),
        lessons_imported: Set(0),
        created_at: Set(Utc::now()),
        started_at: Set(None),
        finished_at: Set(None),
    }
    .insert(&app.db)
    .await
    .unwrap();

    let imports = import_service(&app, Arc::new(ScriptedCatalog::new(0, 200)));
    assert_eq!(imports.recover_interrupted().await.unwrap(), 1);

    let settled = imports.get(&teacher, &queued.id).await.unwrap();
    assert_eq!(settled.status, ImportStatus::Cancelled);
    assert!(settled.started_at.is_none());
    assert!(settled.error.is_some());
}
