//! Teacher earnings: activity-gated payouts, period settlement and refunds.

mod common;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use campus::domain::earnings::{EarningStatus, Period};
use campus::domain::monetization::MonetizationType;
use campus::domain::payment::{PaymentStatus, PurchaseTarget};
use campus::domain::{Actor, UserRole};
use campus::infrastructure::database::entities::{course, lesson, watch_activity};
use campus::shared::errors::DomainError;
use campus::AppServices;

use common::{create_test_services, create_user, draft_course, new_course};

fn admin() -> Actor {
    Actor::new("platform-admin", UserRole::Admin)
}

fn this_week() -> Period {
    let now = Utc::now();
    Period::new(now - Duration::days(7), now + Duration::days(1)).unwrap()
}

/// Premium course at 100.00 with one lesson.
async fn premium_course(app: &AppServices, teacher: &Actor) -> (course::Model, lesson::Model) {
    let mut input = new_course("Premium Rust", None);
    input.monetization_type = MonetizationType::Premium;
    input.price_cents = 10_000;
    let (created, first) = draft_course(app, teacher, input).await;
    let published = app.courses.publish(teacher, &created.id).await.unwrap();
    (published, first)
}

/// Buy the course and enroll; returns the completed payment id.
async fn buy_and_enroll(app: &AppServices, student: &Actor, course_id: &str) -> String {
    let pending = app
        .payments
        .create(student, PurchaseTarget::Course(course_id.to_string()), None)
        .await
        .unwrap();
    let paid = app.payments.complete(student, &pending.id, None).await.unwrap();
    assert_eq!(paid.status, PaymentStatus::Completed);
    app.enrollment.enroll(student, course_id).await.unwrap();
    paid.id
}

/// Shift today's playback row back by `days`, as if it was watched then.
async fn backdate_watch_day(app: &AppServices, student_id: &str, days: i64) {
    let today = Utc::now().date_naive();
    let row = watch_activity::Entity::find()
        .filter(watch_activity::Column::StudentId.eq(student_id))
        .filter(watch_activity::Column::Day.eq(today))
        .one(&app.db)
        .await
        .unwrap()
        .expect("watch row for today");
    let shifted = row.first_seen_at - Duration::days(days);
    let mut active: watch_activity::ActiveModel = row.into();
    active.day = Set(shifted.date_naive());
    active.first_seen_at = Set(shifted);
    active.update(&app.db).await.unwrap();
}

/// Watch the lesson on three distinct days ending today.
async fn watch_on_three_days(app: &AppServices, student: &Actor, lesson_id: &str) {
    for back in [2, 1] {
        app.video_features.save_progress(student, lesson_id, 30, 300).await.unwrap();
        backdate_watch_day(app, &student.user_id, back).await;
    }
    app.video_features.save_progress(student, lesson_id, 60, 300).await.unwrap();
}

#[tokio::test]
async fn each_watch_day_counts_once() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let (course, first) = premium_course(&app, &teacher).await;
    buy_and_enroll(&app, &student, &course.id).await;

    app.video_features.save_progress(&student, &first.id, 30, 300).await.unwrap();
    backdate_watch_day(&app, &student.user_id, 2).await;
    app.video_features.save_progress(&student, &first.id, 60, 300).await.unwrap();
    // A second save on the same day adds nothing.
    app.video_features.save_progress(&student, &first.id, 90, 300).await.unwrap();

    let activity = app.earnings.student_activity(&teacher.user_id, &this_week()).await.unwrap();
    assert_eq!(activity.get(&student.user_id), Some(&2));
}

#[tokio::test]
async fn inactive_students_earnings_are_withheld() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let (course, first) = premium_course(&app, &teacher).await;
    buy_and_enroll(&app, &student, &course.id).await;

    let summary = app.earnings.summary(&teacher, &teacher.user_id, this_week()).await.unwrap();
    assert_eq!(summary.gross_cents, 10_000);
    assert_eq!(summary.share_cents, 7_000);
    assert_eq!(summary.payout.payable_cents, 0);
    assert_eq!(summary.payout.withheld_cents, 7_000);
    assert_eq!(summary.payout.inactive_students, 1);

    watch_on_three_days(&app, &student, &first.id).await;

    let payout = app.earnings.payout(&teacher, &teacher.user_id, this_week()).await.unwrap();
    assert_eq!(payout.payable_cents, 7_000);
    assert_eq!(payout.withheld_cents, 0);
    assert_eq!(payout.active_students, 1);
}

#[tokio::test]
async fn only_admins_settle_a_period_and_withheld_stays_pending() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let busy = create_user(&app, "busy", UserRole::Student).await;
    let idle = create_user(&app, "idle", UserRole::Student).await;
    let (course, first) = premium_course(&app, &teacher).await;
    buy_and_enroll(&app, &busy, &course.id).await;
    buy_and_enroll(&app, &idle, &course.id).await;
    watch_on_three_days(&app, &busy, &first.id).await;

    let res = app.earnings.mark_period_paid(&teacher, &teacher.user_id, this_week()).await;
    assert!(matches!(res, Err(DomainError::Forbidden(_))));

    let settled = app
        .earnings
        .mark_period_paid(&admin(), &teacher.user_id, this_week())
        .await
        .unwrap();
    assert_eq!(settled.payable_cents, 7_000);
    assert_eq!(settled.withheld_cents, 7_000);

    let earnings = app.earnings.list(&teacher, &teacher.user_id).await.unwrap();
    let status_of = |student: &Actor| {
        earnings
            .iter()
            .find(|e| e.student_id.as_deref() == Some(student.user_id.as_str()))
            .map(|e| e.status)
    };
    assert_eq!(status_of(&busy), Some(EarningStatus::Paid));
    assert_eq!(status_of(&idle), Some(EarningStatus::Pending));

    // Settling again pays nothing twice.
    let again = app
        .earnings
        .mark_period_paid(&admin(), &teacher.user_id, this_week())
        .await
        .unwrap();
    assert_eq!(again.payable_cents, 0);
}

#[tokio::test]
async fn refund_reverses_pending_earnings_out_of_the_payout() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let (course, first) = premium_course(&app, &teacher).await;
    let payment_id = buy_and_enroll(&app, &student, &course.id).await;
    watch_on_three_days(&app, &student, &first.id).await;

    let denied = app.payments.refund(&student, &payment_id).await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));

    let refunded = app.payments.refund(&admin(), &payment_id).await.unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);

    let earnings = app.earnings.list(&teacher, &teacher.user_id).await.unwrap();
    assert_eq!(earnings.len(), 1);
    assert_eq!(earnings[0].status, EarningStatus::Reversed);

    let summary = app.earnings.summary(&teacher, &teacher.user_id, this_week()).await.unwrap();
    assert_eq!(summary.reversed_cents, 7_000);
    assert_eq!(summary.gross_cents, 0);
    assert_eq!(summary.pending_cents, 0);
    assert_eq!(summary.payout.payable_cents, 0);

    let settled = app
        .earnings
        .mark_period_paid(&admin(), &teacher.user_id, this_week())
        .await
        .unwrap();
    assert!(settled.payable_ids.is_empty());
}

#[tokio::test]
async fn refund_after_payout_leaves_paid_earnings_alone() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let (course, first) = premium_course(&app, &teacher).await;
    let payment_id = buy_and_enroll(&app, &student, &course.id).await;
    watch_on_three_days(&app, &student, &first.id).await;

    app.earnings
        .mark_period_paid(&admin(), &teacher.user_id, this_week())
        .await
        .unwrap();
    app.payments.refund(&admin(), &payment_id).await.unwrap();

    let earnings = app.earnings.list(&teacher, &teacher.user_id).await.unwrap();
    assert_eq!(earnings[0].status, EarningStatus::Paid);
    assert!(earnings[0].paid_at.is_some());
}
