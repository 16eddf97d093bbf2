//! Migration to create users table

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::user;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, user::Entity).await?;
        create_index(manager, "idx_users_role", user::Entity, &[user::Column::Role], false).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, user::Entity).await
    }
}
