//! Personalised course recommendations

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::new_id;
use super::reviews::rating_summaries;
use crate::config::RecommendationConfig;
use crate::domain::course::CourseStatus;
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::recommendation::{peers, score, Candidate, Reason, Weights};
use crate::infrastructure::database::entities::{course, course_tag, enrollment, recommendation};
use crate::shared::errors::DomainResult;

#[derive(Debug, Clone, Serialize)]
pub struct Recommended {
    pub course: course::Model,
    pub score: f64,
    pub reason: String,
    pub explanation: &'static str,
}

pub struct RecommendationService {
    db: DatabaseConnection,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(db: DatabaseConnection, config: RecommendationConfig) -> Self {
        Self { db, config }
    }

    fn weights(&self) -> Weights {
        Weights {
            collaborative: self.config.collaborative_weight,
            content: self.config.content_weight,
            popularity: self.config.popularity_weight,
        }
    }

    /// Recompute, persist and return the student's recommendations.
    pub async fn recommend(&self, student_id: &str) -> DomainResult<Vec<Recommended>> {
        let live: Vec<(String, String)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .column(enrollment::Column::StudentId)
            .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut students_by_course: HashMap<String, HashSet<String>> = HashMap::new();
        for (course_id, student) in live {
            students_by_course.entry(course_id).or_default().insert(student);
        }
        let mine: HashSet<String> = students_by_course
            .iter()
            .filter(|(_, students)| students.contains(student_id))
            .map(|(course_id, _)| course_id.clone())
            .collect();

        let published = course::Entity::find()
            .filter(course::Column::Status.eq(CourseStatus::Published))
            .all(&self.db)
            .await?;
        let features = self.features().await?;
        let feature_set = |c: &course::Model| -> HashSet<String> {
            let mut set = features.get(&c.id).cloned().unwrap_or_default();
            if let Some(category) = &c.category {
                set.insert(format!("category:{}", category.to_lowercase()));
            }
            set
        };

        // Profile covers every enrolled course, published or not.
        let mut profile = HashSet::new();
        if !mine.is_empty() {
            let enrolled = course::Entity::find()
                .filter(course::Column::Id.is_in(mine.iter().cloned()))
                .all(&self.db)
                .await?;
            for c in &enrolled {
                profile.extend(feature_set(c));
            }
        }

        let candidate_courses: Vec<&course::Model> = published.iter().filter(|c| !mine.contains(&c.id)).collect();
        let candidate_ids: Vec<String> = candidate_courses.iter().map(|c| c.id.clone()).collect();
        let ratings = rating_summaries(&self.db, &candidate_ids).await?;
        let candidates: Vec<Candidate> = candidate_courses
            .iter()
            .map(|c| {
                let students = students_by_course.get(&c.id).cloned().unwrap_or_default();
                Candidate {
                    course_id: c.id.clone(),
                    features: feature_set(c),
                    enrollment_count: students.len() as u64,
                    rating_average: ratings.get(&c.id).map(|r| r.average).unwrap_or(0.0),
                    students,
                }
            })
            .collect();
        let peer_set = peers(&mine, &students_by_course, student_id);
        let mut scored = score(&candidates, &profile, &peer_set, self.weights());
        scored.truncate(self.config.limit);

        let now = Utc::now();
        let txn = self.db.begin().await?;
        recommendation::Entity::delete_many()
            .filter(recommendation::Column::StudentId.eq(student_id))
            .exec(&txn)
            .await?;
        for s in &scored {
            recommendation::ActiveModel {
                id: Set(new_id()),
                student_id: Set(student_id.to_string()),
                course_id: Set(s.course_id.clone()),
                score: Set(s.score),
                reason: Set(s.reason.as_str().to_string()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;
        info!(student_id, count = scored.len(), cold = profile.is_empty(), "Recommendations refreshed");

        self.stored(student_id).await
    }

    /// Last persisted recommendations, best first.
    pub async fn stored(&self, student_id: &str) -> DomainResult<Vec<Recommended>> {
        let rows = recommendation::Entity::find()
            .filter(recommendation::Column::StudentId.eq(student_id))
            .find_also_related(course::Entity)
            .order_by_desc(recommendation::Column::Score)
            .order_by_asc(recommendation::Column::CourseId)
            .limit(self.config.limit as u64)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(rec, course)| {
                let course = course?;
                let reason = Reason::parse(&rec.reason).unwrap_or(Reason::Popularity);
                Some(Recommended {
                    course,
                    score: rec.score,
                    reason: rec.reason,
                    explanation: reason.describe(),
                })
            })
            .collect())
    }

    /// `tag:{id}` features per course.
    async fn features(&self) -> DomainResult<HashMap<String, HashSet<String>>> {
        let mut out: HashMap<String, HashSet<String>> = HashMap::new();
        for link in course_tag::Entity::find().all(&self.db).await? {
            out.entry(link.course_id).or_default().insert(format!("tag:{}", link.tag_id));
        }
        Ok(out)
    }
}
