//! Migration to create the course catalog: courses, modules, lessons, tags
//! and prerequisite edges

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    course, course_module, course_prerequisite, course_tag, lesson, tag,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, course::Entity).await?;
        create_table(manager, course_module::Entity).await?;
        create_table(manager, lesson::Entity).await?;
        create_table(manager, tag::Entity).await?;
        create_table(manager, course_tag::Entity).await?;
        create_table(manager, course_prerequisite::Entity).await?;

        create_index(manager, "idx_courses_status", course::Entity, &[course::Column::Status], false).await?;
        create_index(manager, "idx_courses_teacher", course::Entity, &[course::Column::TeacherId], false).await?;
        create_index(
            manager,
            "idx_course_modules_course",
            course_module::Entity,
            &[course_module::Column::CourseId, course_module::Column::Position],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_lessons_module",
            lesson::Entity,
            &[lesson::Column::ModuleId, lesson::Column::Position],
            false,
        )
        .await?;
        create_index(manager, "idx_lessons_course", lesson::Entity, &[lesson::Column::CourseId], false).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, course_prerequisite::Entity).await?;
        drop_table(manager, course_tag::Entity).await?;
        drop_table(manager, tag::Entity).await?;
        drop_table(manager, lesson::Entity).await?;
        drop_table(manager, course_module::Entity).await?;
        drop_table(manager, course::Entity).await
    }
}
