//! Migration to track playback activity per day

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::watch_activity;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, watch_activity::Entity).await?;
        create_index(
            manager,
            "idx_watch_activity_student_lesson_day",
            watch_activity::Entity,
            &[
                watch_activity::Column::StudentId,
                watch_activity::Column::LessonId,
                watch_activity::Column::Day,
            ],
            true,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, watch_activity::Entity).await
    }
}
