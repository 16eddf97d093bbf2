//! Side-by-side comparison of up to four courses

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;

use super::reviews::rating_summaries;
use crate::domain::comparison::{highlights, validate_selection, ComparisonHighlights, ComparisonRow};
use crate::domain::enrollment::EnrollmentStatus;
use crate::infrastructure::database::entities::{course, enrollment, lesson};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub courses: Vec<ComparisonRow>,
    pub highlights: ComparisonHighlights,
}

pub struct ComparisonService {
    db: DatabaseConnection,
}

impl ComparisonService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rows come back in selection order.
    pub async fn compare(&self, course_ids: &[String]) -> DomainResult<Comparison> {
        let ids = validate_selection(course_ids)?;
        let mut courses: HashMap<String, course::Model> = course::Entity::find()
            .filter(course::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        if let Some(missing) = ids.iter().find(|id| !courses.contains_key(*id)) {
            return Err(DomainError::not_found("Course", missing.clone()));
        }

        let lessons: Vec<(String, i32)> = lesson::Entity::find()
            .select_only()
            .column(lesson::Column::CourseId)
            .column(lesson::Column::DurationSeconds)
            .filter(lesson::Column::CourseId.is_in(ids.clone()))
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut lesson_stats: HashMap<&str, (u64, i64)> = HashMap::new();
        for (course_id, duration) in &lessons {
            let entry = lesson_stats.entry(course_id.as_str()).or_default();
            entry.0 += 1;
            entry.1 += *duration as i64;
        }

        let enrolled: Vec<String> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .filter(enrollment::Column::CourseId.is_in(ids.clone()))
            .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut enrollment_counts: HashMap<&str, u64> = HashMap::new();
        for course_id in &enrolled {
            *enrollment_counts.entry(course_id.as_str()).or_default() += 1;
        }

        let ratings = rating_summaries(&self.db, &ids).await?;

        let rows: Vec<ComparisonRow> = ids
            .iter()
            .filter_map(|id| courses.remove(id))
            .map(|c| {
                let (lesson_count, total_duration_seconds) =
                    lesson_stats.get(c.id.as_str()).copied().unwrap_or_default();
                ComparisonRow {
                    lesson_count,
                    total_duration_seconds,
                    enrollment_count: enrollment_counts.get(c.id.as_str()).copied().unwrap_or(0),
                    rating_average: ratings.get(&c.id).map(|r| r.average).unwrap_or(0.0),
                    price_cents: c.price_cents,
                    monetization_type: c.monetization_type.to_string(),
                    level: c.level.to_string(),
                    title: c.title,
                    course_id: c.id,
                }
            })
            .collect();
        Ok(Comparison {
            highlights: highlights(&rows),
            courses: rows,
        })
    }
}
