//! Referral codes and conversions

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::info;

use super::{load_user, new_id};
use crate::domain::referral::{generate_code, ReferralStatus, REFERRAL_CODE_LEN};
use crate::infrastructure::database::entities::{referral, referral_code};
use crate::shared::errors::{DomainError, DomainResult};

const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ReferralStats {
    pub code: String,
    pub total: usize,
    pub pending: usize,
    pub converted: usize,
    pub reward_cents: i64,
    pub referrals: Vec<referral::Model>,
}

pub struct ReferralService {
    db: DatabaseConnection,
    reward_cents: i64,
}

impl ReferralService {
    pub fn new(db: DatabaseConnection, reward_cents: i64) -> Self {
        Self { db, reward_cents }
    }

    pub async fn get_or_create_code(&self, user_id: &str) -> DomainResult<referral_code::Model> {
        if let Some(existing) = referral_code::Entity::find_by_id(user_id.to_string()).one(&self.db).await? {
            return Ok(existing);
        }
        load_user(&self.db, user_id).await?;

        for _ in 0..CODE_ATTEMPTS {
            let code = generate_code(&mut rand::thread_rng(), REFERRAL_CODE_LEN);
            let clash = referral_code::Entity::find()
                .filter(referral_code::Column::Code.eq(code.as_str()))
                .one(&self.db)
                .await?;
            if clash.is_some() {
                continue;
            }
            let created = referral_code::ActiveModel {
                user_id: Set(user_id.to_string()),
                code: Set(code),
                created_at: Set(Utc::now()),
            }
            .insert(&self.db)
            .await?;
            info!(user_id, code = %created.code, "Referral code created");
            return Ok(created);
        }
        Err(DomainError::Conflict("Could not allocate a unique referral code".into()))
    }

    /// Link a newly registered user to the owner of `code`.
    pub async fn register_referral(&self, code: &str, referred_id: &str) -> DomainResult<referral::Model> {
        let code = code.trim().to_uppercase();
        let owner = referral_code::Entity::find()
            .filter(referral_code::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Referral code",
                field: "code",
                value: code.clone(),
            })?;
        if owner.user_id == referred_id {
            return Err(DomainError::validation("You cannot refer yourself"));
        }
        let already = referral::Entity::find()
            .filter(referral::Column::ReferredId.eq(referred_id))
            .one(&self.db)
            .await?;
        if already.is_some() {
            return Err(DomainError::Conflict("User was already referred".into()));
        }

        let created = referral::ActiveModel {
            id: Set(new_id()),
            referrer_id: Set(owner.user_id),
            referred_id: Set(referred_id.to_string()),
            code: Set(code),
            status: Set(ReferralStatus::Pending),
            reward_cents: Set(0),
            created_at: Set(Utc::now()),
            converted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(referral_id = %created.id, referrer_id = %created.referrer_id, referred_id, "Referral registered");
        Ok(created)
    }

    /// The first enrollment of a referred user converts the referral.
    pub async fn convert_on_enrollment(&self, student_id: &str) -> DomainResult<Option<referral::Model>> {
        let pending = referral::Entity::find()
            .filter(referral::Column::ReferredId.eq(student_id))
            .filter(referral::Column::Status.eq(ReferralStatus::Pending))
            .one(&self.db)
            .await?;
        let Some(pending) = pending else {
            return Ok(None);
        };
        let mut active: referral::ActiveModel = pending.into();
        active.status = Set(ReferralStatus::Converted);
        active.reward_cents = Set(self.reward_cents);
        active.converted_at = Set(Some(Utc::now()));
        let converted = active.update(&self.db).await?;
        info!(
            referral_id = %converted.id,
            referrer_id = %converted.referrer_id,
            reward_cents = converted.reward_cents,
            "Referral converted"
        );
        Ok(Some(converted))
    }

    pub async fn stats(&self, user_id: &str) -> DomainResult<ReferralStats> {
        let code = self.get_or_create_code(user_id).await?;
        let referrals = referral::Entity::find()
            .filter(referral::Column::ReferrerId.eq(user_id))
            .order_by_desc(referral::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let converted = referrals.iter().filter(|r| r.status == ReferralStatus::Converted).count();
        Ok(ReferralStats {
            code: code.code,
            total: referrals.len(),
            pending: referrals.len() - converted,
            converted,
            reward_cents: referrals.iter().map(|r| r.reward_cents).sum(),
            referrals,
        })
    }
}
