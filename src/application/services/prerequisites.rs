//! Course prerequisites

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::info;

use super::{load_course, load_owned_course};
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::prerequisite::{missing_prerequisites, validate_new_edge};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{course, course_prerequisite, enrollment};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct PrerequisiteCheck {
    pub satisfied: bool,
    pub missing: Vec<String>,
}

pub struct PrerequisiteService {
    db: DatabaseConnection,
}

impl PrerequisiteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn add(&self, actor: &Actor, course_id: &str, prerequisite_id: &str) -> DomainResult<course_prerequisite::Model> {
        load_owned_course(&self.db, actor, course_id).await?;
        load_course(&self.db, prerequisite_id).await?;

        let edges: Vec<(String, String)> = course_prerequisite::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| (e.course_id, e.prerequisite_id))
            .collect();
        validate_new_edge(&edges, course_id, prerequisite_id)?;

        let created = course_prerequisite::ActiveModel {
            course_id: Set(course_id.to_string()),
            prerequisite_id: Set(prerequisite_id.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(course_id, prerequisite_id, "Prerequisite added");
        Ok(created)
    }

    pub async fn remove(&self, actor: &Actor, course_id: &str, prerequisite_id: &str) -> DomainResult<()> {
        load_owned_course(&self.db, actor, course_id).await?;
        let res = course_prerequisite::Entity::delete_by_id((course_id.to_string(), prerequisite_id.to_string()))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Prerequisite", prerequisite_id));
        }
        Ok(())
    }

    pub async fn list(&self, course_id: &str) -> DomainResult<Vec<course::Model>> {
        let ids = required_ids(&self.db, course_id).await?;
        Ok(course::Entity::find()
            .filter(course::Column::Id.is_in(ids))
            .all(&self.db)
            .await?)
    }

    /// A prerequisite is met by a COMPLETED enrollment in it.
    pub async fn check(&self, student_id: &str, course_id: &str) -> DomainResult<PrerequisiteCheck> {
        check_prerequisites(&self.db, student_id, course_id).await
    }
}

/// Completed-course check, usable inside a purchase transaction.
pub(crate) async fn check_prerequisites<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course_id: &str,
) -> DomainResult<PrerequisiteCheck> {
    let required = required_ids(db, course_id).await?;
    if required.is_empty() {
        return Ok(PrerequisiteCheck {
            satisfied: true,
            missing: Vec::new(),
        });
    }
    let completed: HashSet<String> = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::Status.eq(EnrollmentStatus::Completed))
        .all(db)
        .await?
        .into_iter()
        .map(|e| e.course_id)
        .collect();
    let missing = missing_prerequisites(&required, &completed);
    Ok(PrerequisiteCheck {
        satisfied: missing.is_empty(),
        missing,
    })
}

async fn required_ids<C: ConnectionTrait>(db: &C, course_id: &str) -> DomainResult<Vec<String>> {
    Ok(course_prerequisite::Entity::find()
        .filter(course_prerequisite::Column::CourseId.eq(course_id))
        .all(db)
        .await?
        .into_iter()
        .map(|e| e.prerequisite_id)
        .collect())
}
