use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::domain::quiz::QuestionKind;
use crate::domain::quiz::QuestionKey;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub quiz_id: String,
    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    pub kind: QuestionKind,
    /// JSON array of option labels
    pub options: Json,
    /// JSON array of correct option indices
    pub correct: Json,
    pub points: i32,
    pub position: i32,
}

impl Model {
    pub fn option_labels(&self) -> Vec<String> {
        serde_json::from_value(self.options.clone()).unwrap_or_default()
    }

    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            id: self.id.clone(),
            kind: self.kind,
            options: self.option_labels(),
            correct: serde_json::from_value(self.correct.clone()).unwrap_or_default(),
            points: self.points,
        }
    }
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

impl Related<super::quiz::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
