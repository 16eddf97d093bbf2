//! Database migrations module

pub use sea_orm_migration::prelude::*;

use sea_orm::{EntityTrait, Schema};

mod m20240101_000001_create_users;
mod m20240101_000002_create_courses;
mod m20240101_000003_create_commerce;
mod m20240101_000004_create_enrollments;
mod m20240101_000005_create_assessments;
mod m20240101_000006_create_community;
mod m20240101_000007_create_media;
mod m20240301_000008_create_watch_activity;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_courses::Migration),
            Box::new(m20240101_000003_create_commerce::Migration),
            Box::new(m20240101_000004_create_enrollments::Migration),
            Box::new(m20240101_000005_create_assessments::Migration),
            Box::new(m20240101_000006_create_community::Migration),
            Box::new(m20240101_000007_create_media::Migration),
            Box::new(m20240301_000008_create_watch_activity::Migration),
        ]
    }
}

/// Create a table from its entity definition (columns, unique columns and
/// foreign keys declared on the entity).
pub(crate) async fn create_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

pub(crate) async fn drop_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

pub(crate) async fn create_index<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    name: &str,
    entity: E,
    columns: &[E::Column],
    unique: bool,
) -> Result<(), DbErr> {
    let mut index = Index::create();
    index.name(name).table(entity).if_not_exists();
    for column in columns {
        index.col(*column);
    }
    if unique {
        index.unique();
    }
    manager.create_index(index.to_owned()).await
}
