//! Discounted course bundles

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::enrollment::{activate, ensure_eligible, ensure_open, find_enrollment};
use super::payments::{complete_in, insert_payment};
use super::teacher_earnings::TeacherEarningsService;
use super::{coupons, load_course, new_id, required};
use crate::domain::bundle::{validate_discount, BundlePricing, MIN_BUNDLE_COURSES};
use crate::domain::coupon::DiscountQuote;
use crate::domain::payment::PurchaseTarget;
use crate::domain::Actor;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::database::entities::{bundle, bundle_course, course, enrollment, payment};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct NewBundle {
    pub title: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub course_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleDetails {
    #[serde(flatten)]
    pub bundle: bundle::Model,
    pub courses: Vec<course::Model>,
    pub pricing: BundlePricing,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundlePurchase {
    pub payment: payment::Model,
    pub enrollments: Vec<enrollment::Model>,
}

pub struct BundleService {
    db: DatabaseConnection,
    earnings: Arc<TeacherEarningsService>,
    cache: Arc<CacheService>,
}

impl BundleService {
    pub fn new(db: DatabaseConnection, earnings: Arc<TeacherEarningsService>, cache: Arc<CacheService>) -> Self {
        Self { db, earnings, cache }
    }

    pub async fn create(&self, actor: &Actor, input: NewBundle) -> DomainResult<BundleDetails> {
        actor.ensure_teacher()?;
        let title = required("title", &input.title)?;
        validate_discount(input.discount_percent)?;
        let mut ids = input.course_ids.clone();
        ids.sort();
        ids.dedup();
        if ids.len() < MIN_BUNDLE_COURSES {
            return Err(DomainError::validation(format!(
                "A bundle needs at least {} different courses",
                MIN_BUNDLE_COURSES
            )));
        }
        for id in &ids {
            let course = load_course(&self.db, id).await?;
            actor.ensure_owns(&course.teacher_id, "course")?;
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let created = bundle::ActiveModel {
            id: Set(new_id()),
            title: Set(title),
            description: Set(input.description),
            discount_percent: Set(input.discount_percent),
            is_active: Set(true),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        for id in ids {
            bundle_course::ActiveModel {
                bundle_id: Set(created.id.clone()),
                course_id: Set(id),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;
        info!(bundle_id = %created.id, "Bundle created");
        self.details(created).await
    }

    pub async fn add_course(&self, actor: &Actor, bundle_id: &str, course_id: &str) -> DomainResult<BundleDetails> {
        let found = self.owned(actor, bundle_id).await?;
        let course = load_course(&self.db, course_id).await?;
        actor.ensure_owns(&course.teacher_id, "course")?;
        let linked = bundle_course::Entity::find_by_id((bundle_id.to_string(), course_id.to_string()))
            .one(&self.db)
            .await?;
        if linked.is_some() {
            return Err(DomainError::Conflict("Course is already in the bundle".into()));
        }
        bundle_course::ActiveModel {
            bundle_id: Set(bundle_id.to_string()),
            course_id: Set(course_id.to_string()),
        }
        .insert(&self.db)
        .await?;
        self.details(found).await
    }

    pub async fn remove_course(&self, actor: &Actor, bundle_id: &str, course_id: &str) -> DomainResult<BundleDetails> {
        let found = self.owned(actor, bundle_id).await?;
        let count = bundle_course::Entity::find()
            .filter(bundle_course::Column::BundleId.eq(bundle_id))
            .count(&self.db)
            .await?;
        if count as usize <= MIN_BUNDLE_COURSES {
            return Err(DomainError::validation(format!(
                "A bundle needs at least {} courses",
                MIN_BUNDLE_COURSES
            )));
        }
        let res = bundle_course::Entity::delete_by_id((bundle_id.to_string(), course_id.to_string()))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Bundle course", course_id));
        }
        self.details(found).await
    }

    pub async fn get(&self, bundle_id: &str) -> DomainResult<BundleDetails> {
        let found = load_bundle(&self.db, bundle_id).await?;
        self.details(found).await
    }

    pub async fn list(&self) -> DomainResult<Vec<BundleDetails>> {
        let bundles = bundle::Entity::find()
            .filter(bundle::Column::IsActive.eq(true))
            .order_by_desc(bundle::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let mut out = Vec::with_capacity(bundles.len());
        for b in bundles {
            out.push(self.details(b).await?);
        }
        Ok(out)
    }

    /// Pay for the bundle and enroll into every course not already held, atomically.
    /// A course that direct enrollment would refuse rejects the whole purchase.
    pub async fn purchase(&self, actor: &Actor, bundle_id: &str, coupon_code: Option<&str>) -> DomainResult<BundlePurchase> {
        let found = load_bundle(&self.db, bundle_id).await?;
        if !found.is_active {
            return Err(DomainError::validation("Bundle is not available"));
        }
        let details = self.details(found).await?;
        let amount = details.pricing.price_cents;

        let txn = self.db.begin().await?;
        let mut to_enroll = Vec::new();
        for course in &details.courses {
            let existing = find_enrollment(&txn, &actor.user_id, &course.id).await?;
            if existing.as_ref().is_some_and(|e| e.status.is_live()) {
                continue;
            }
            ensure_open(course)?;
            ensure_eligible(&txn, &actor.user_id, course).await?;
            to_enroll.push((course.id.clone(), existing));
        }
        if to_enroll.is_empty() {
            return Err(DomainError::Conflict("Already enrolled in every bundle course".into()));
        }

        let quote = match coupon_code {
            Some(code) => coupons::quote(&txn, code, None, amount).await?,
            None => DiscountQuote::none(amount),
        };
        let currency = details
            .courses
            .first()
            .map(|c| c.currency.clone())
            .unwrap_or_else(|| "USD".to_string());
        let pending = insert_payment(
            &txn,
            &actor.user_id,
            &PurchaseTarget::Bundle(bundle_id.to_string()),
            &quote,
            &currency,
            coupon_code,
        )
        .await?;
        let paid = complete_in(&txn, pending, None).await?;

        let mut enrollments = Vec::with_capacity(to_enroll.len());
        for (course_id, existing) in to_enroll {
            enrollments.push(activate(&txn, &actor.user_id, &course_id, existing, Some(paid.id.clone())).await?);
        }
        txn.commit().await?;

        info!(
            bundle_id,
            student_id = %actor.user_id,
            payment_id = %paid.id,
            enrolled = enrollments.len(),
            "Bundle purchased"
        );
        best_effort("record_earning", self.earnings.record_for_payment(&paid)).await;
        self.cache.delete_pattern(&format!("dashboard:*:{}", actor.user_id));

        Ok(BundlePurchase {
            payment: paid,
            enrollments,
        })
    }

    pub async fn delete(&self, actor: &Actor, bundle_id: &str) -> DomainResult<()> {
        self.owned(actor, bundle_id).await?;
        bundle::Entity::delete_by_id(bundle_id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    async fn owned(&self, actor: &Actor, bundle_id: &str) -> DomainResult<bundle::Model> {
        let found = load_bundle(&self.db, bundle_id).await?;
        actor.ensure_owns(&found.created_by, "bundle")?;
        Ok(found)
    }

    async fn details(&self, found: bundle::Model) -> DomainResult<BundleDetails> {
        let courses = bundle_courses(&self.db, &found.id).await?;
        let prices: Vec<i64> = courses.iter().map(|c| c.price_cents).collect();
        Ok(BundleDetails {
            pricing: BundlePricing::compute(&prices, found.discount_percent),
            bundle: found,
            courses,
        })
    }
}

async fn load_bundle<C: ConnectionTrait>(db: &C, bundle_id: &str) -> DomainResult<bundle::Model> {
    bundle::Entity::find_by_id(bundle_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Bundle", bundle_id))
}

async fn bundle_courses<C: ConnectionTrait>(db: &C, bundle_id: &str) -> DomainResult<Vec<course::Model>> {
    let ids: Vec<String> = bundle_course::Entity::find()
        .filter(bundle_course::Column::BundleId.eq(bundle_id))
        .all(db)
        .await?
        .into_iter()
        .map(|bc| bc.course_id)
        .collect();
    Ok(course::Entity::find()
        .filter(course::Column::Id.is_in(ids))
        .order_by_asc(course::Column::Title)
        .all(db)
        .await?)
}

pub(crate) async fn pricing<C: ConnectionTrait>(db: &C, found: &bundle::Model) -> DomainResult<BundlePricing> {
    let prices: Vec<i64> = bundle_courses(db, &found.id)
        .await?
        .iter()
        .map(|c| c.price_cents)
        .collect();
    Ok(BundlePricing::compute(&prices, found.discount_percent))
}
