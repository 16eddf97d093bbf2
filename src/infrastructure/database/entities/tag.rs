use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// Lower-cased name, unique
    #[sea_orm(unique)]
    pub name_key: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_tag::Entity")]
    CourseTags,
}

impl Related<super::course_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
