//! Migration to create enrollments, progress tracking, learning paths,
//! certificates, wishlists and waitlists

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    certificate, enrollment, learning_path, learning_path_course, lesson_progress,
    waitlist_entry, wishlist_item,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, enrollment::Entity).await?;
        create_table(manager, lesson_progress::Entity).await?;
        create_table(manager, learning_path::Entity).await?;
        create_table(manager, learning_path_course::Entity).await?;
        create_table(manager, certificate::Entity).await?;
        create_table(manager, wishlist_item::Entity).await?;
        create_table(manager, waitlist_entry::Entity).await?;

        // One enrollment row per student and course
        create_index(
            manager,
            "idx_enrollments_student_course",
            enrollment::Entity,
            &[enrollment::Column::StudentId, enrollment::Column::CourseId],
            true,
        )
        .await?;
        create_index(
            manager,
            "idx_enrollments_course",
            enrollment::Entity,
            &[enrollment::Column::CourseId, enrollment::Column::Status],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_lesson_progress_student_lesson",
            lesson_progress::Entity,
            &[lesson_progress::Column::StudentId, lesson_progress::Column::LessonId],
            true,
        )
        .await?;
        create_index(
            manager,
            "idx_certificates_student_course",
            certificate::Entity,
            &[certificate::Column::StudentId, certificate::Column::CourseId],
            true,
        )
        .await?;
        create_index(
            manager,
            "idx_waitlist_course",
            waitlist_entry::Entity,
            &[waitlist_entry::Column::CourseId, waitlist_entry::Column::Position],
            false,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, waitlist_entry::Entity).await?;
        drop_table(manager, wishlist_item::Entity).await?;
        drop_table(manager, certificate::Entity).await?;
        drop_table(manager, learning_path_course::Entity).await?;
        drop_table(manager, learning_path::Entity).await?;
        drop_table(manager, lesson_progress::Entity).await?;
        drop_table(manager, enrollment::Entity).await
    }
}
