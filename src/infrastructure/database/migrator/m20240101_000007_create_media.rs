//! Migration to create media assets, video features, import jobs and
//! persisted recommendations

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    import_job, media_asset, recommendation, video_bookmark, video_note, watch_progress,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, media_asset::Entity).await?;
        create_table(manager, video_bookmark::Entity).await?;
        create_table(manager, video_note::Entity).await?;
        create_table(manager, watch_progress::Entity).await?;
        create_table(manager, import_job::Entity).await?;
        create_table(manager, recommendation::Entity).await?;

        create_index(
            manager,
            "idx_watch_progress_student_lesson",
            watch_progress::Entity,
            &[watch_progress::Column::StudentId, watch_progress::Column::LessonId],
            true,
        )
        .await?;
        create_index(
            manager,
            "idx_import_jobs_status",
            import_job::Entity,
            &[import_job::Column::Status],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_recommendations_student",
            recommendation::Entity,
            &[recommendation::Column::StudentId, recommendation::Column::Score],
            false,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, recommendation::Entity).await?;
        drop_table(manager, import_job::Entity).await?;
        drop_table(manager, watch_progress::Entity).await?;
        drop_table(manager, video_note::Entity).await?;
        drop_table(manager, video_bookmark::Entity).await?;
        drop_table(manager, media_asset::Entity).await
    }
}
