//! Migration to create forum, instructor Q&A, reviews, share links,
//! calendar events and whiteboards

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    calendar_event, forum_post, forum_reply, instructor_answer, instructor_question, review,
    share_link, whiteboard, whiteboard_action,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, forum_post::Entity).await?;
        create_table(manager, forum_reply::Entity).await?;
        create_table(manager, instructor_question::Entity).await?;
        create_table(manager, instructor_answer::Entity).await?;
        create_table(manager, review::Entity).await?;
        create_table(manager, share_link::Entity).await?;
        create_table(manager, calendar_event::Entity).await?;
        create_table(manager, whiteboard::Entity).await?;
        create_table(manager, whiteboard_action::Entity).await?;

        create_index(
            manager,
            "idx_forum_posts_course",
            forum_post::Entity,
            &[forum_post::Column::CourseId],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_reviews_course_student",
            review::Entity,
            &[review::Column::CourseId, review::Column::StudentId],
            true,
        )
        .await?;
        create_index(
            manager,
            "idx_calendar_events_start",
            calendar_event::Entity,
            &[calendar_event::Column::StartsAt],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_whiteboard_actions_seq",
            whiteboard_action::Entity,
            &[whiteboard_action::Column::WhiteboardId, whiteboard_action::Column::Seq],
            true,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, whiteboard_action::Entity).await?;
        drop_table(manager, whiteboard::Entity).await?;
        drop_table(manager, calendar_event::Entity).await?;
        drop_table(manager, share_link::Entity).await?;
        drop_table(manager, review::Entity).await?;
        drop_table(manager, instructor_answer::Entity).await?;
        drop_table(manager, instructor_question::Entity).await?;
        drop_table(manager, forum_reply::Entity).await?;
        drop_table(manager, forum_post::Entity).await
    }
}
