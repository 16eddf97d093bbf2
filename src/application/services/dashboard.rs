//! Role dashboards, cached for a short while per user

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};

use super::reviews::rating_summaries;
use super::taught_course_ids;
use crate::domain::assignment::SubmissionStatus;
use crate::domain::course::CourseStatus;
use crate::domain::earnings::EarningStatus;
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::payment::PaymentStatus;
use crate::domain::qa::QuestionStatus;
use crate::domain::Actor;
use crate::infrastructure::cache::{CacheService, CacheTtl};
use crate::infrastructure::database::entities::{
    assignment, calendar_event, certificate, course, enrollment, instructor_question, payment,
    quiz_attempt, submission, teacher_earning, user,
};
use crate::shared::best_effort;
use crate::shared::errors::DomainResult;

const UPCOMING_DAYS: i64 = 7;
const RECENT_ATTEMPTS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentSummary {
    pub enrollment_id: String,
    pub course_id: String,
    pub course_title: String,
    pub status: EnrollmentStatus,
    pub progress_percent: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub id: String,
    pub title: String,
    pub course_id: Option<String>,
    pub starts_at: chrono::DateTime<Utc>,
    pub ends_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub active: Vec<EnrollmentSummary>,
    pub completed: Vec<EnrollmentSummary>,
    pub certificates: u64,
    pub upcoming_events: Vec<UpcomingEvent>,
    /// Mean score of the most recent submitted quiz attempts
    pub recent_quiz_average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherDashboard {
    pub course_count: usize,
    pub published_count: usize,
    pub total_students: usize,
    pub revenue_cents: i64,
    pub average_rating: f64,
    pub pending_submissions: u64,
    pub open_questions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub users_by_role: BTreeMap<String, u64>,
    pub courses_by_status: BTreeMap<String, u64>,
    pub payments_count: u64,
    pub payments_total_cents: i64,
}

pub struct DashboardService {
    db: DatabaseConnection,
    cache: Arc<CacheService>,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection, cache: Arc<CacheService>) -> Self {
        Self { db, cache }
    }

    pub async fn student_dashboard(&self, actor: &Actor) -> DomainResult<StudentDashboard> {
        let key = format!("dashboard:student:{}", actor.user_id);
        if let Some(hit) = self.cache.get::<StudentDashboard>(&key) {
            return Ok(hit);
        }
        let student_id = actor.user_id.as_str();
        let rows = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
            .find_also_related(course::Entity)
            .order_by_desc(enrollment::Column::UpdatedAt)
            .all(&self.db)
            .await?;
        let course_ids: Vec<String> = rows.iter().map(|(e, _)| e.course_id.clone()).collect();
        let (completed, active): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .map(|(e, c)| EnrollmentSummary {
                enrollment_id: e.id,
                course_title: c.map(|c| c.title).unwrap_or_default(),
                course_id: e.course_id,
                status: e.status,
                progress_percent: e.progress_percent,
            })
            .partition(|s| s.status == EnrollmentStatus::Completed);

        let certificates = certificate::Entity::find()
            .filter(certificate::Column::StudentId.eq(student_id))
            .count(&self.db)
            .await?;

        let now = Utc::now();
        let upcoming_events = calendar_event::Entity::find()
            .filter(
                Condition::any()
                    .add(calendar_event::Column::OwnerId.eq(student_id))
                    .add(calendar_event::Column::CourseId.is_in(course_ids)),
            )
            .filter(calendar_event::Column::EndsAt.gt(now))
            .filter(calendar_event::Column::StartsAt.lt(now + Duration::days(UPCOMING_DAYS)))
            .order_by_asc(calendar_event::Column::StartsAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|ev| UpcomingEvent {
                id: ev.id,
                title: ev.title,
                course_id: ev.course_id,
                starts_at: ev.starts_at,
                ends_at: ev.ends_at,
            })
            .collect();

        let scores: Vec<Option<i32>> = quiz_attempt::Entity::find()
            .select_only()
            .column(quiz_attempt::Column::ScorePercent)
            .filter(quiz_attempt::Column::StudentId.eq(student_id))
            .filter(quiz_attempt::Column::SubmittedAt.is_not_null())
            .order_by_desc(quiz_attempt::Column::SubmittedAt)
            .limit(RECENT_ATTEMPTS)
            .into_tuple()
            .all(&self.db)
            .await?;
        let scores: Vec<i32> = scores.into_iter().flatten().collect();
        let recent_quiz_average = (!scores.is_empty())
            .then(|| scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64);

        let dashboard = StudentDashboard {
            active,
            completed,
            certificates,
            upcoming_events,
            recent_quiz_average,
        };
        best_effort("cache_dashboard", async { self.cache.set(&key, &dashboard, CacheTtl::Short) }).await;
        Ok(dashboard)
    }

    pub async fn teacher_dashboard(&self, actor: &Actor) -> DomainResult<TeacherDashboard> {
        actor.ensure_teacher()?;
        let key = format!("dashboard:teacher:{}", actor.user_id);
        if let Some(hit) = self.cache.get::<TeacherDashboard>(&key) {
            return Ok(hit);
        }
        let courses = course::Entity::find()
            .filter(course::Column::TeacherId.eq(&actor.user_id))
            .all(&self.db)
            .await?;
        let course_ids = taught_course_ids(&self.db, &actor.user_id).await?;
        let published_count = courses.iter().filter(|c| c.status == CourseStatus::Published).count();

        let students: Vec<String> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::StudentId)
            .filter(enrollment::Column::CourseId.is_in(course_ids.clone()))
            .filter(enrollment::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
            .into_tuple()
            .all(&self.db)
            .await?;
        let total_students = students.into_iter().collect::<HashSet<_>>().len();

        let revenue_cents: i64 = teacher_earning::Entity::find()
            .filter(teacher_earning::Column::TeacherId.eq(&actor.user_id))
            .filter(teacher_earning::Column::Status.ne(EarningStatus::Reversed))
            .all(&self.db)
            .await?
            .iter()
            .map(|e| e.share_cents)
            .sum();

        let summaries = rating_summaries(&self.db, &course_ids).await?;
        let (sum, count) = summaries
            .values()
            .fold((0.0, 0u64), |(s, n), r| (s + r.average * r.count as f64, n + r.count));
        let average_rating = if count > 0 {
            ((sum / count as f64) * 100.0).round() / 100.0
        } else {
            0.0
        };

        let assignment_ids: Vec<String> = assignment::Entity::find()
            .select_only()
            .column(assignment::Column::Id)
            .filter(assignment::Column::CourseId.is_in(course_ids.clone()))
            .into_tuple()
            .all(&self.db)
            .await?;
        let pending_submissions = submission::Entity::find()
            .filter(submission::Column::AssignmentId.is_in(assignment_ids))
            .filter(submission::Column::Status.eq(SubmissionStatus::Submitted))
            .count(&self.db)
            .await?;
        let open_questions = instructor_question::Entity::find()
            .filter(instructor_question::Column::CourseId.is_in(course_ids))
            .filter(instructor_question::Column::Status.eq(QuestionStatus::Open))
            .count(&self.db)
            .await?;

        let dashboard = TeacherDashboard {
            course_count: courses.len(),
            published_count,
            total_students,
            revenue_cents,
            average_rating,
            pending_submissions,
            open_questions,
        };
        best_effort("cache_dashboard", async { self.cache.set(&key, &dashboard, CacheTtl::Short) }).await;
        Ok(dashboard)
    }

    pub async fn admin_overview(&self, actor: &Actor) -> DomainResult<AdminOverview> {
        actor.ensure_admin()?;
        let key = format!("dashboard:admin:{}", actor.user_id);
        if let Some(hit) = self.cache.get::<AdminOverview>(&key) {
            return Ok(hit);
        }
        let roles: Vec<user::Model> = user::Entity::find().all(&self.db).await?;
        let mut users_by_role = BTreeMap::new();
        for u in &roles {
            *users_by_role.entry(u.role.as_str().to_string()).or_insert(0) += 1;
        }

        let statuses: Vec<CourseStatus> = course::Entity::find()
            .select_only()
            .column(course::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut courses_by_status = BTreeMap::new();
        for s in statuses {
            *courses_by_status.entry(s.as_str().to_string()).or_insert(0) += 1;
        }

        let paid: Vec<i64> = payment::Entity::find()
            .select_only()
            .column(payment::Column::FinalCents)
            .filter(payment::Column::Status.eq(PaymentStatus::Completed))
            .into_tuple()
            .all(&self.db)
            .await?;

        let overview = AdminOverview {
            users_by_role,
            courses_by_status,
            payments_count: paid.len() as u64,
            payments_total_cents: paid.iter().sum(),
        };
        best_effort("cache_dashboard", async { self.cache.set(&key, &overview, CacheTtl::Short) }).await;
        Ok(overview)
    }
}
