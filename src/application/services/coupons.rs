//! Discount coupons

use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

use super::{load_course, new_id};
use crate::domain::coupon::{normalize_code, validate_definition, DiscountQuote, DiscountType};
use crate::domain::Actor;
use crate::infrastructure::database::entities::{coupon, coupon_redemption};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub min_purchase_cents: i64,
    pub course_id: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct CouponService {
    db: DatabaseConnection,
}

impl CouponService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, input: NewCoupon) -> DomainResult<coupon::Model> {
        actor.ensure_teacher()?;
        let code = normalize_code(&input.code);
        if code.is_empty() {
            return Err(DomainError::validation("Coupon code is required"));
        }
        validate_definition(input.discount_type, input.value)?;
        if matches!(input.max_uses, Some(n) if n < 1) {
            return Err(DomainError::validation("max_uses must be at least 1"));
        }
        if let (Some(from), Some(until)) = (input.valid_from, input.expires_at) {
            if until <= from {
                return Err(DomainError::validation("Coupon must expire after it becomes valid"));
            }
        }
        // Teachers may only scope coupons to their own courses; admins may issue global ones.
        match &input.course_id {
            Some(course_id) => {
                let course = load_course(&self.db, course_id).await?;
                actor.ensure_owns(&course.teacher_id, "course")?;
            }
            None => actor.ensure_admin()?,
        }
        if find_by_code(&self.db, &code).await?.is_some() {
            return Err(DomainError::Conflict(format!("Coupon {} already exists", code)));
        }

        let created = coupon::ActiveModel {
            id: Set(new_id()),
            code: Set(code),
            discount_type: Set(input.discount_type),
            value: Set(input.value),
            max_uses: Set(input.max_uses),
            used_count: Set(0),
            min_purchase_cents: Set(input.min_purchase_cents.max(0)),
            course_id: Set(input.course_id),
            valid_from: Set(input.valid_from),
            expires_at: Set(input.expires_at),
            is_active: Set(true),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        info!(coupon_id = %created.id, code = %created.code, "Coupon created");
        Ok(created)
    }

    /// Admins see every coupon, teachers their own.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<coupon::Model>> {
        actor.ensure_teacher()?;
        let mut query = coupon::Entity::find().order_by_desc(coupon::Column::CreatedAt);
        if !actor.is_admin() {
            query = query.filter(coupon::Column::CreatedBy.eq(actor.user_id.as_str()));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn deactivate(&self, actor: &Actor, coupon_id: &str) -> DomainResult<coupon::Model> {
        let existing = coupon::Entity::find_by_id(coupon_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Coupon", coupon_id))?;
        actor.ensure_owns(&existing.created_by, "coupon")?;
        let mut active: coupon::ActiveModel = existing.into();
        active.is_active = Set(false);
        Ok(active.update(&self.db).await?)
    }

    pub async fn validate(&self, code: &str, course_id: Option<&str>, amount_cents: i64) -> DomainResult<DiscountQuote> {
        quote(&self.db, code, course_id, amount_cents).await
    }
}

async fn find_by_code<C: ConnectionTrait>(db: &C, code: &str) -> DomainResult<Option<coupon::Model>> {
    Ok(coupon::Entity::find()
        .filter(coupon::Column::Code.eq(normalize_code(code)))
        .one(db)
        .await?)
}

pub(crate) async fn quote<C: ConnectionTrait>(
    db: &C,
    code: &str,
    course_id: Option<&str>,
    amount_cents: i64,
) -> DomainResult<DiscountQuote> {
    let found = find_by_code(db, code).await?.ok_or(DomainError::NotFound {
        entity: "Coupon",
        field: "code",
        value: normalize_code(code),
    })?;
    found.rules().quote(course_id, amount_cents, Utc::now())
}

/// Re-validate and consume one use of the coupon.
///
/// Must run inside the caller's transaction. The usage counter only moves
/// while `used_count < max_uses`, so concurrent redemptions cannot exceed the cap.
pub(crate) async fn redeem<C: ConnectionTrait>(
    db: &C,
    code: &str,
    user_id: &str,
    course_id: Option<&str>,
    amount_cents: i64,
    payment_id: Option<&str>,
) -> DomainResult<DiscountQuote> {
    let found = find_by_code(db, code).await?.ok_or(DomainError::NotFound {
        entity: "Coupon",
        field: "code",
        value: normalize_code(code),
    })?;
    let quote = found.rules().quote(course_id, amount_cents, Utc::now())?;

    let updated = coupon::Entity::update_many()
        .col_expr(coupon::Column::UsedCount, Expr::col(coupon::Column::UsedCount).add(1))
        .filter(coupon::Column::Id.eq(found.id.as_str()))
        .filter(
            Condition::any()
                .add(coupon::Column::MaxUses.is_null())
                .add(Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::MaxUses))),
        )
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        return Err(DomainError::validation("Coupon usage limit reached"));
    }

    coupon_redemption::ActiveModel {
        id: Set(new_id()),
        coupon_id: Set(found.id.clone()),
        user_id: Set(user_id.to_string()),
        payment_id: Set(payment_id.map(str::to_string)),
        discount_cents: Set(quote.discount_cents),
        redeemed_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(coupon = %found.code, user_id, discount_cents = quote.discount_cents, "Coupon redeemed");
    Ok(quote)
}
