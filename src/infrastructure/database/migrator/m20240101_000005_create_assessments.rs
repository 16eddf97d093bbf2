//! Migration to create quizzes and assignments

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    assignment, quiz, quiz_attempt, quiz_question, submission,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, quiz::Entity).await?;
        create_table(manager, quiz_question::Entity).await?;
        create_table(manager, quiz_attempt::Entity).await?;
        create_table(manager, assignment::Entity).await?;
        create_table(manager, submission::Entity).await?;

        create_index(
            manager,
            "idx_quiz_attempts_student",
            quiz_attempt::Entity,
            &[quiz_attempt::Column::QuizId, quiz_attempt::Column::StudentId],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_submissions_assignment_student",
            submission::Entity,
            &[submission::Column::AssignmentId, submission::Column::StudentId],
            true,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, submission::Entity).await?;
        drop_table(manager, assignment::Entity).await?;
        drop_table(manager, quiz_attempt::Entity).await?;
        drop_table(manager, quiz_question::Entity).await?;
        drop_table(manager, quiz::Entity).await
    }
}
