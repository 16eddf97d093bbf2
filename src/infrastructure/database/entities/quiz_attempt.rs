use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    /// Question id -> chosen option indices
    #[sea_orm(nullable)]
    pub answers: Option<Json>,
    #[sea_orm(nullable)]
    pub score_percent: Option<i32>,
    pub points: i32,
    pub passed: bool,
    pub started_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub submitted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz::Entity",
        from = "Column::QuizId",
        to = "super::quiz::Column::Id",
        on_delete = "Cascade"
    )]
    Quiz,
}

impl ActiveModelBehavior for ActiveModel {}
