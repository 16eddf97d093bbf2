//! Teacher revenue shares and activity-gated payouts

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::{load_course, new_id, taught_course_ids};
use crate::config::EarningsConfig;
use crate::domain::earnings::{
    active_days, calculate_payout, share_cents, ActivityEvent, EarningLine, EarningSource,
    EarningStatus, Payout, Period,
};
use crate::domain::payment::PaymentStatus;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{
    assignment, bundle_course, course, enrollment, forum_post, forum_reply, lesson, lesson_progress,
    payment, quiz, quiz_attempt, submission, teacher_earning, watch_activity,
};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct EarningsSummary {
    pub teacher_id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub gross_cents: i64,
    pub share_cents: i64,
    pub pending_cents: i64,
    pub paid_cents: i64,
    pub reversed_cents: i64,
    pub by_source: HashMap<String, i64>,
    pub payout: Payout,
}

pub struct TeacherEarningsService {
    db: DatabaseConnection,
    config: EarningsConfig,
}

impl TeacherEarningsService {
    pub fn new(db: DatabaseConnection, config: EarningsConfig) -> Self {
        Self { db, config }
    }

    /// Record the teacher share for a COMPLETED payment. Recording the same
    /// payment twice is a no-op.
    pub async fn record_for_payment(&self, paid: &payment::Model) -> DomainResult<Vec<teacher_earning::Model>> {
        if paid.status != PaymentStatus::Completed {
            return Err(DomainError::validation("Only completed payments produce earnings"));
        }
        let existing = teacher_earning::Entity::find()
            .filter(teacher_earning::Column::PaymentId.eq(paid.id.as_str()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Ok(Vec::new());
        }

        // (course, gross) allocations
        let allocations: Vec<(course::Model, i64, EarningSource)> = if let Some(bundle_id) = &paid.bundle_id {
            let course_ids: Vec<String> = bundle_course::Entity::find()
                .filter(bundle_course::Column::BundleId.eq(bundle_id.as_str()))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|bc| bc.course_id)
                .collect();
            let courses = course::Entity::find()
                .filter(course::Column::Id.is_in(course_ids))
                .order_by_asc(course::Column::Id)
                .all(&self.db)
                .await?;
            split_proportionally(paid.final_cents, courses)
                .into_iter()
                .map(|(c, gross)| (c, gross, EarningSource::Bundle))
                .collect()
        } else if let Some(course_id) = &paid.course_id {
            let course = load_course(&self.db, course_id).await?;
            let source = if paid.lesson_id.is_some() {
                EarningSource::Lesson
            } else {
                EarningSource::Enrollment
            };
            vec![(course, paid.final_cents, source)]
        } else {
            Vec::new()
        };

        let txn = self.db.begin().await?;
        let mut recorded = Vec::with_capacity(allocations.len());
        for (course, gross, source) in allocations {
            let percent = match source {
                EarningSource::Lesson => self.config.lesson_share_percent,
                _ => self.config.revenue_share_percent,
            };
            let created = teacher_earning::ActiveModel {
                id: Set(new_id()),
                teacher_id: Set(course.teacher_id.clone()),
                course_id: Set(course.id.clone()),
                student_id: Set(Some(paid.user_id.clone())),
                source: Set(source),
                payment_id: Set(paid.id.clone()),
                gross_cents: Set(gross),
                share_cents: Set(share_cents(gross, percent)),
                status: Set(EarningStatus::Pending),
                created_at: Set(Utc::now()),
                paid_at: Set(None),
            }
            .insert(&txn)
            .await?;
            info!(
                teacher_id = %created.teacher_id,
                course_id = %created.course_id,
                payment_id = %paid.id,
                share_cents = created.share_cents,
                "Teacher earning recorded"
            );
            recorded.push(created);
        }
        txn.commit().await?;
        Ok(recorded)
    }

    pub async fn list(&self, actor: &Actor, teacher_id: &str) -> DomainResult<Vec<teacher_earning::Model>> {
        actor.ensure_owns(teacher_id, "earnings")?;
        Ok(teacher_earning::Entity::find()
            .filter(teacher_earning::Column::TeacherId.eq(teacher_id))
            .order_by_desc(teacher_earning::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn summary(&self, actor: &Actor, teacher_id: &str, period: Period) -> DomainResult<EarningsSummary> {
        actor.ensure_owns(teacher_id, "earnings")?;
        let earnings = self.earnings_in(teacher_id, &period).await?;
        let payout = self.payout_for(teacher_id, &period, &earnings).await?;

        let sum = |status: EarningStatus| -> i64 {
            earnings.iter().filter(|e| e.status == status).map(|e| e.share_cents).sum()
        };
        let reversed_cents = sum(EarningStatus::Reversed);
        let earned: Vec<&teacher_earning::Model> =
            earnings.iter().filter(|e| e.status != EarningStatus::Reversed).collect();
        let mut by_source: HashMap<String, i64> = HashMap::new();
        for e in &earned {
            *by_source.entry(e.source.to_string()).or_insert(0) += e.share_cents;
        }

        Ok(EarningsSummary {
            teacher_id: teacher_id.to_string(),
            period_start: period.start,
            period_end: period.end,
            gross_cents: earned.iter().map(|e| e.gross_cents).sum(),
            share_cents: earned.iter().map(|e| e.share_cents).sum(),
            pending_cents: sum(EarningStatus::Pending),
            paid_cents: sum(EarningStatus::Paid),
            reversed_cents,
            by_source,
            payout,
        })
    }

    pub async fn payout(&self, actor: &Actor, teacher_id: &str, period: Period) -> DomainResult<Payout> {
        actor.ensure_owns(teacher_id, "earnings")?;
        let earnings = self.earnings_in(teacher_id, &period).await?;
        self.payout_for(teacher_id, &period, &earnings).await
    }

    /// Mark the payable PENDING earnings of the period PAID. Withheld ones stay PENDING.
    pub async fn mark_period_paid(&self, actor: &Actor, teacher_id: &str, period: Period) -> DomainResult<Payout> {
        actor.ensure_admin()?;
        let earnings = self.earnings_in(teacher_id, &period).await?;
        let payout = self.payout_for(teacher_id, &period, &earnings).await?;

        let now = Utc::now();
        let txn = self.db.begin().await?;
        for e in earnings.into_iter().filter(|e| payout.payable_ids.contains(&e.id)) {
            let mut active: teacher_earning::ActiveModel = e.into();
            active.status = Set(EarningStatus::Paid);
            active.paid_at = Set(Some(now));
            active.update(&txn).await?;
        }
        txn.commit().await?;
        info!(teacher_id, payable_cents = payout.payable_cents, "Earnings period paid");
        Ok(payout)
    }

    /// Active days per student across the teacher's courses.
    pub async fn student_activity(&self, teacher_id: &str, period: &Period) -> DomainResult<HashMap<String, usize>> {
        let course_ids = taught_course_ids(&self.db, teacher_id).await?;
        let events = self.activity_events(&course_ids).await?;
        Ok(active_days(&events, period))
    }

    async fn earnings_in(&self, teacher_id: &str, period: &Period) -> DomainResult<Vec<teacher_earning::Model>> {
        Ok(teacher_earning::Entity::find()
            .filter(teacher_earning::Column::TeacherId.eq(teacher_id))
            .order_by_asc(teacher_earning::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|e| period.contains(e.created_at))
            .collect())
    }

    async fn payout_for(
        &self,
        teacher_id: &str,
        period: &Period,
        earnings: &[teacher_earning::Model],
    ) -> DomainResult<Payout> {
        let active = self.student_activity(teacher_id, period).await?;
        let lines: Vec<EarningLine> = earnings
            .iter()
            .filter(|e| e.status == EarningStatus::Pending)
            .map(|e| EarningLine {
                earning_id: e.id.clone(),
                student_id: e.student_id.clone(),
                share_cents: e.share_cents,
            })
            .collect();
        Ok(calculate_payout(&lines, &active, self.config.min_active_days))
    }

    /// Events from the six tracked sources, restricted to enrolled students.
    async fn activity_events(&self, course_ids: &[String]) -> DomainResult<Vec<ActivityEvent>> {
        let students: HashSet<String> = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.is_in(course_ids.to_vec()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.student_id)
            .collect();
        let mut events = Vec::new();

        for p in lesson_progress::Entity::find()
            .filter(lesson_progress::Column::CourseId.is_in(course_ids.to_vec()))
            .filter(lesson_progress::Column::Completed.eq(true))
            .all(&self.db)
            .await?
        {
            if let Some(at) = p.completed_at {
                events.push(ActivityEvent { student_id: p.student_id, at });
            }
        }

        let quiz_ids: Vec<String> = quiz::Entity::find()
            .filter(quiz::Column::CourseId.is_in(course_ids.to_vec()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();
        for a in quiz_attempt::Entity::find()
            .filter(quiz_attempt::Column::QuizId.is_in(quiz_ids))
            .all(&self.db)
            .await?
        {
            if let Some(at) = a.submitted_at {
                events.push(ActivityEvent { student_id: a.student_id, at });
            }
        }

        let assignment_ids: Vec<String> = assignment::Entity::find()
            .filter(assignment::Column::CourseId.is_in(course_ids.to_vec()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        for s in submission::Entity::find()
            .filter(submission::Column::AssignmentId.is_in(assignment_ids))
            .all(&self.db)
            .await?
        {
            events.push(ActivityEvent { student_id: s.student_id, at: s.submitted_at });
        }

        let posts = forum_post::Entity::find()
            .filter(forum_post::Column::CourseId.is_in(course_ids.to_vec()))
            .all(&self.db)
            .await?;
        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        for p in posts {
            events.push(ActivityEvent { student_id: p.author_id, at: p.created_at });
        }
        for r in forum_reply::Entity::find()
            .filter(forum_reply::Column::PostId.is_in(post_ids))
            .all(&self.db)
            .await?
        {
            events.push(ActivityEvent { student_id: r.author_id, at: r.created_at });
        }

        let lesson_ids: Vec<String> = lesson::Entity::find()
            .filter(lesson::Column::CourseId.is_in(course_ids.to_vec()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();
        for w in watch_activity::Entity::find()
            .filter(watch_activity::Column::LessonId.is_in(lesson_ids))
            .all(&self.db)
            .await?
        {
            events.push(ActivityEvent { student_id: w.student_id, at: w.first_seen_at });
        }

        events.retain(|e| students.contains(&e.student_id));
        Ok(events)
    }
}

/// Reverse the PENDING earnings of a refunded payment. PAID ones are left as
/// they are and reported back so the caller can log them.
pub(crate) async fn reverse_for_payment<C: ConnectionTrait>(db: &C, payment_id: &str) -> DomainResult<(u64, usize)> {
    let res = teacher_earning::Entity::update_many()
        .set(teacher_earning::ActiveModel {
            status: Set(EarningStatus::Reversed),
            ..Default::default()
        })
        .filter(teacher_earning::Column::PaymentId.eq(payment_id))
        .filter(teacher_earning::Column::Status.eq(EarningStatus::Pending))
        .exec(db)
        .await?;
    let already_paid = teacher_earning::Entity::find()
        .filter(teacher_earning::Column::PaymentId.eq(payment_id))
        .filter(teacher_earning::Column::Status.eq(EarningStatus::Paid))
        .count(db)
        .await?;
    Ok((res.rows_affected, already_paid as usize))
}

/// Split `total` across courses by list price; the last course takes the rounding remainder.
fn split_proportionally(total: i64, courses: Vec<course::Model>) -> Vec<(course::Model, i64)> {
    let list_total: i64 = courses.iter().map(|c| c.price_cents.max(0)).sum();
    let n = courses.len() as i64;
    let mut allocated = 0;
    let last = courses.len().saturating_sub(1);
    courses
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let gross = if i == last {
                total - allocated
            } else if list_total > 0 {
                total * c.price_cents.max(0) / list_total
            } else {
                total / n
            };
            allocated += gross;
            (c, gross)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::{CourseLevel, CourseStatus};
    use crate::domain::monetization::MonetizationType;

    fn course(id: &str, price: i64) -> course::Model {
        let now = Utc::now();
        course::Model {
            id: id.into(),
            title: id.into(),
            slug: id.into(),
            description: None,
            teacher_id: "t".into(),
            category: None,
            level: CourseLevel::Beginner,
            language: "en".into(),
            price_cents: price,
            currency: "USD".into(),
            monetization_type: MonetizationType::Premium,
            status: CourseStatus::Published,
            capacity: None,
            thumbnail_url: None,
            source_provider: None,
            external_id: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bundle_split_sums_to_total() {
        let parts = split_proportionally(1001, vec![course("a", 1000), course("b", 2000), course("c", 1000)]);
        let total: i64 = parts.iter().map(|(_, g)| g).sum();
        assert_eq!(total, 1001);
        assert_eq!(parts[0].1, 250);
        assert_eq!(parts[1].1, 500);
        assert_eq!(parts[2].1, 251);
    }

    #[test]
    fn free_courses_split_evenly() {
        let parts = split_proportionally(90, vec![course("a", 0), course("b", 0), course("c", 0)]);
        assert_eq!(parts.iter().map(|(_, g)| *g).collect::<Vec<_>>(), vec![30, 30, 30]);
    }
}
