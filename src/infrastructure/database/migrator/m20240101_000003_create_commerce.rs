//! Migration to create subscriptions, payments, coupons, bundles, referrals
//! and teacher earnings

use sea_orm_migration::prelude::*;

use super::{create_index, create_table, drop_table};
use crate::infrastructure::database::entities::{
    bundle, bundle_course, coupon, coupon_redemption, payment, referral, referral_code,
    subscription, teacher_earning,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_table(manager, subscription::Entity).await?;
        create_table(manager, payment::Entity).await?;
        create_table(manager, coupon::Entity).await?;
        create_table(manager, coupon_redemption::Entity).await?;
        create_table(manager, bundle::Entity).await?;
        create_table(manager, bundle_course::Entity).await?;
        create_table(manager, referral_code::Entity).await?;
        create_table(manager, referral::Entity).await?;
        create_table(manager, teacher_earning::Entity).await?;

        create_index(
            manager,
            "idx_subscriptions_user",
            subscription::Entity,
            &[subscription::Column::UserId, subscription::Column::Status],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_payments_user",
            payment::Entity,
            &[payment::Column::UserId, payment::Column::Status],
            false,
        )
        .await?;
        create_index(
            manager,
            "idx_teacher_earnings_teacher",
            teacher_earning::Entity,
            &[teacher_earning::Column::TeacherId, teacher_earning::Column::CreatedAt],
            false,
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, teacher_earning::Entity).await?;
        drop_table(manager, referral::Entity).await?;
        drop_table(manager, referral_code::Entity).await?;
        drop_table(manager, bundle_course::Entity).await?;
        drop_table(manager, bundle::Entity).await?;
        drop_table(manager, coupon_redemption::Entity).await?;
        drop_table(manager, coupon::Entity).await?;
        drop_table(manager, payment::Entity).await?;
        drop_table(manager, subscription::Entity).await
    }
}
