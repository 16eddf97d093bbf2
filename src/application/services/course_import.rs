//! Background imports of courses from third-party catalogs
//!
//! A job row is created PENDING and a tokio task drives it through
//! PROCESSING to a terminal state. Each running task has a cancellation flag
//! registered under its job id; `cancel` persists CANCELLED first and then
//! raises the flag so the task stops at its next checkpoint. The imported
//! course is committed in the same transaction as the COMPLETED transition,
//! so a job cancelled or recovered mid-flight never leaves a course behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{error, info, warn};

use super::courses::insert_external_course;
use super::{new_id, required};
use crate::domain::course_import::{ImportProvider, ImportStatus};
use crate::domain::Actor;
use crate::infrastructure::catalogs::{CatalogRegistry, CourseCatalog};
use crate::infrastructure::database::entities::import_job;
use crate::shared::errors::{DomainError, DomainResult, InfraError};
use crate::shared::{retry_with_backoff, RetryConfig};

const INTERRUPTED: &str = "interrupted by restart";

pub struct CourseImportService {
    db: DatabaseConnection,
    catalogs: CatalogRegistry,
    running: Arc<DashMap<String, Arc<AtomicBool>>>,
    retry: RetryConfig,
}

impl CourseImportService {
    pub fn new(db: DatabaseConnection, catalogs: CatalogRegistry) -> Self {
        Self {
            db,
            catalogs,
            running: Arc::new(DashMap::new()),
            retry: RetryConfig::default(),
        }
    }

    /// Override the catalog fetch retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn providers(&self) -> Vec<ImportProvider> {
        self.catalogs.providers()
    }

    /// Number of import tasks currently in flight.
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Persist a PENDING job and spawn the task that processes it.
    pub async fn start_import(
        &self,
        actor: &Actor,
        provider: ImportProvider,
        external_id: &str,
    ) -> DomainResult<import_job::Model> {
        actor.ensure_teacher()?;
        let external_id = required("external_id", external_id)?;
        let catalog = self
            .catalogs
            .get(provider)
            .ok_or_else(|| DomainError::validation(format!("Provider {} is not configured", provider)))?;

        let job = import_job::ActiveModel {
            id: Set(new_id()),
            requested_by: Set(actor.user_id.clone()),
            provider: Set(provider),
            external_id: Set(external_id),
            status: Set(ImportStatus::Pending),
            error: Set(None),
            course_id: Set(None),
            lessons_imported: Set(0),
            created_at: Set(Utc::now()),
            started_at: Set(None),
            finished_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        let cancelled = Arc::new(AtomicBool::new(false));
        self.running.insert(job.id.clone(), cancelled.clone());
        let task = ImportTask {
            db: self.db.clone(),
            running: self.running.clone(),
            retry: self.retry.clone(),
            catalog,
            cancelled,
        };
        let spawned = job.clone();
        tokio::spawn(async move { task.run(spawned).await });

        info!(job_id = %job.id, provider = %provider, external_id = %job.external_id, "Import job queued");
        Ok(job)
    }

    /// Requester or admin. Only PENDING and PROCESSING jobs can be cancelled.
    pub async fn cancel(&self, actor: &Actor, job_id: &str) -> DomainResult<import_job::Model> {
        let job = self.get(actor, job_id).await?;
        let cancelled = move_job(&self.db, job, ImportStatus::Cancelled, |a| {
            a.finished_at = Set(Some(Utc::now()));
        })
        .await?;
        if let Some((_, flag)) = self.running.remove(job_id) {
            flag.store(true, Ordering::SeqCst);
        }
        info!(job_id, "Import job cancelled");
        Ok(cancelled)
    }

    pub async fn get(&self, actor: &Actor, job_id: &str) -> DomainResult<import_job::Model> {
        let job = load_job(&self.db, job_id).await?;
        actor.ensure_owns(&job.requested_by, "import job")?;
        Ok(job)
    }

    /// Own jobs; admins see all.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<import_job::Model>> {
        let mut query = import_job::Entity::find();
        if !actor.is_admin() {
            query = query.filter(import_job::Column::RequestedBy.eq(&actor.user_id));
        }
        Ok(query
            .order_by_desc(import_job::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Settle jobs a previous process left behind: PROCESSING ones fail and
    /// PENDING ones, which never started, are cancelled. Run once at start-up.
    pub async fn recover_interrupted(&self) -> DomainResult<usize> {
        let orphaned = import_job::Entity::find()
            .filter(import_job::Column::Status.is_in([ImportStatus::Pending, ImportStatus::Processing]))
            .all(&self.db)
            .await?;
        let mut recovered = 0;
        for job in orphaned {
            if self.running.contains_key(&job.id) {
                continue;
            }
            let job_id = job.id.clone();
            let next = match job.status {
                ImportStatus::Pending => ImportStatus::Cancelled,
                _ => ImportStatus::Failed,
            };
            match move_job(&self.db, job, next, |a| {
                a.error = Set(Some(INTERRUPTED.to_string()));
                a.finished_at = Set(Some(Utc::now()));
            })
            .await
            {
                Ok(_) => recovered += 1,
                Err(e) => warn!(job_id, error = %e, "Could not settle interrupted import job"),
            }
        }
        if recovered > 0 {
            info!(recovered, "Interrupted import jobs settled");
        }
        Ok(recovered)
    }
}

struct ImportTask {
    db: DatabaseConnection,
    running: Arc<DashMap<String, Arc<AtomicBool>>>,
    retry: RetryConfig,
    catalog: Arc<dyn CourseCatalog>,
    cancelled: Arc<AtomicBool>,
}

impl ImportTask {
    async fn run(self, job: import_job::Model) {
        let job_id = job.id.clone();
        if let Err(e) = self.process(job).await {
            // Cancelled and recovered jobs reject the final transition.
            if self.is_cancelled() {
                info!(job_id, "Import job stopped after cancellation");
            } else {
                error!(job_id, error = %e, "Import job bookkeeping failed");
            }
        }
        self.running.remove(&job_id);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn process(&self, job: import_job::Model) -> DomainResult<()> {
        if self.is_cancelled() {
            return Ok(());
        }
        let job = move_job(&self.db, job, ImportStatus::Processing, |a| {
            a.started_at = Set(Some(Utc::now()));
        })
        .await?;

        let catalog = self.catalog.clone();
        let external_id = job.external_id.clone();
        let fetched = retry_with_backoff(
            self.retry.clone(),
            || {
                let catalog = catalog.clone();
                let external_id = external_id.clone();
                async move { catalog.fetch_course(&external_id).await }
            },
            |e: &InfraError| e.is_transient(),
            "catalog_fetch",
        )
        .await;
        if self.is_cancelled() {
            return Ok(());
        }

        let external = match fetched {
            Ok(external) => external,
            Err(e) => return self.fail(job, e.into()).await,
        };

        let txn = self.db.begin().await?;
        let (course, lessons) = match insert_external_course(&txn, &job.requested_by, &external).await {
            Ok(created) => created,
            Err(e) => {
                txn.rollback().await?;
                return self.fail(job, e).await;
            }
        };
        let job_id = job.id.clone();
        let completed = move_job(&txn, job, ImportStatus::Completed, |a| {
            a.course_id = Set(Some(course.id.clone()));
            a.lessons_imported = Set(lessons as i32);
            a.finished_at = Set(Some(Utc::now()));
        })
        .await;
        if let Err(e) = completed {
            txn.rollback().await?;
            return Err(e);
        }
        txn.commit().await?;
        info!(job_id, course_id = %course.id, lessons, "Import job completed");
        Ok(())
    }

    async fn fail(&self, job: import_job::Model, e: DomainError) -> DomainResult<()> {
        let job_id = job.id.clone();
        move_job(&self.db, job, ImportStatus::Failed, |a| {
            a.error = Set(Some(e.to_string()));
            a.finished_at = Set(Some(Utc::now()));
        })
        .await?;
        warn!(job_id, error = %e, "Import job failed");
        Ok(())
    }
}

async fn load_job<C: ConnectionTrait>(db: &C, job_id: &str) -> DomainResult<import_job::Model> {
    import_job::Entity::find_by_id(job_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Import job", job_id))
}

/// Apply a status transition only if the row still holds the status we read.
async fn move_job<C: ConnectionTrait>(
    db: &C,
    job: import_job::Model,
    next: ImportStatus,
    apply: impl FnOnce(&mut import_job::ActiveModel),
) -> DomainResult<import_job::Model> {
    job.status.ensure_transition(next)?;
    let mut changes = import_job::ActiveModel {
        status: Set(next),
        ..Default::default()
    };
    apply(&mut changes);
    let res = import_job::Entity::update_many()
        .set(changes)
        .filter(import_job::Column::Id.eq(job.id.as_str()))
        .filter(import_job::Column::Status.eq(job.status))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(DomainError::Conflict(format!(
            "Import job {} is no longer {}",
            job.id, job.status
        )));
    }
    load_job(db, &job.id).await
}
