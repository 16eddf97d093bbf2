//! Bundles, per-lesson sales, access gating, referrals and the waitlist.

mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use campus::application::services::bundles::NewBundle;
use campus::domain::enrollment::EnrollmentStatus;
use campus::domain::monetization::MonetizationType;
use campus::domain::payment::{PaymentStatus, PurchaseTarget};
use campus::domain::referral::ReferralStatus;
use campus::domain::waitlist::WaitlistStatus;
use campus::domain::{Actor, UserRole};
use campus::infrastructure::database::entities::{course, enrollment};
use campus::shared::errors::DomainError;
use campus::AppServices;

use common::{create_test_services, create_user, draft_course, new_course, new_lesson, published_course};

async fn priced_course(
    app: &AppServices,
    teacher: &Actor,
    title: &str,
    monetization: MonetizationType,
    price_cents: i64,
    capacity: Option<i32>,
) -> course::Model {
    let mut input = new_course(title, None);
    input.monetization_type = monetization;
    input.price_cents = price_cents;
    input.capacity = capacity;
    let (created, _) = draft_course(app, teacher, input).await;
    app.courses.publish(teacher, &created.id).await.unwrap()
}

async fn live_enrollments(app: &AppServices, course_id: &str) -> u64 {
    enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .filter(enrollment::Column::Status.eq(EnrollmentStatus::Active))
        .count(&app.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn bundle_purchase_enrolls_in_every_course_and_grants_access() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let rust = priced_course(&app, &teacher, "Rust", MonetizationType::Premium, 6_000, None).await;
    let tokio = priced_course(&app, &teacher, "Tokio", MonetizationType::Premium, 4_000, None).await;

    let bundle = app
        .bundles
        .create(
            &teacher,
            NewBundle {
                title: "Async Rust".to_string(),
                description: None,
                discount_percent: 20,
                course_ids: vec![rust.id.clone(), tokio.id.clone()],
            },
        )
        .await
        .unwrap();

    let denied = app.monetization.check_access(&student, &rust.id).await.unwrap();
    assert!(!denied.granted);

    let purchase = app.bundles.purchase(&student, &bundle.bundle.id, None).await.unwrap();
    assert_eq!(purchase.payment.status, PaymentStatus::Completed);
    assert_eq!(purchase.payment.final_cents, 8_000);
    assert_eq!(purchase.enrollments.len(), 2);
    assert!(purchase
        .enrollments
        .iter()
        .all(|e| e.payment_id.as_deref() == Some(purchase.payment.id.as_str())));

    let granted = app.monetization.check_access(&student, &rust.id).await.unwrap();
    assert!(granted.granted);

    let again = app.bundles.purchase(&student, &bundle.bundle.id, None).await;
    assert!(matches!(again, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn bundle_purchase_cannot_bypass_a_full_course() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let first = create_user(&app, "first", UserRole::Student).await;
    let second = create_user(&app, "second", UserRole::Student).await;
    let seminar = priced_course(&app, &teacher, "Seminar", MonetizationType::Free, 3_000, Some(1)).await;
    let lecture = priced_course(&app, &teacher, "Lecture", MonetizationType::Free, 2_000, None).await;

    let bundle = app
        .bundles
        .create(
            &teacher,
            NewBundle {
                title: "Term".to_string(),
                description: None,
                discount_percent: 10,
                course_ids: vec![seminar.id.clone(), lecture.id.clone()],
            },
        )
        .await
        .unwrap();

    app.enrollment.enroll(&first, &seminar.id).await.unwrap();

    let res = app.bundles.purchase(&second, &bundle.bundle.id, None).await;
    assert!(matches!(res, Err(DomainError::Conflict(_))));

    // Nothing of the purchase survives.
    assert_eq!(live_enrollments(&app, &seminar.id).await, 1);
    assert_eq!(live_enrollments(&app, &lecture.id).await, 0);
    assert!(app.payments.list_for_user(&second.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn bundle_purchase_rejects_a_draft_course() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let open = priced_course(&app, &teacher, "Open", MonetizationType::Premium, 3_000, None).await;
    let (draft, _) = draft_course(&app, &teacher, new_course("Unreleased", None)).await;

    let bundle = app
        .bundles
        .create(
            &teacher,
            NewBundle {
                title: "Preview pack".to_string(),
                description: None,
                discount_percent: 0,
                course_ids: vec![open.id.clone(), draft.id.clone()],
            },
        )
        .await
        .unwrap();

    let res = app.bundles.purchase(&student, &bundle.bundle.id, None).await;
    assert!(matches!(res, Err(DomainError::Validation(_))));
    assert!(app.enrollment.list_for_student(&student.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn premium_course_needs_a_completed_payment() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = priced_course(&app, &teacher, "Premium Rust", MonetizationType::Premium, 5_000, None).await;

    let res = app.enrollment.enroll(&student, &course.id).await;
    assert!(matches!(res, Err(DomainError::Forbidden(_))));

    let pending = app
        .payments
        .create(&student, PurchaseTarget::Course(course.id.clone()), None)
        .await
        .unwrap();
    let still = app.enrollment.enroll(&student, &course.id).await;
    assert!(matches!(still, Err(DomainError::Forbidden(_))));

    app.payments.complete(&student, &pending.id, None).await.unwrap();
    let enrolled = app.enrollment.enroll(&student, &course.id).await.unwrap();
    assert_eq!(enrolled.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn subscription_course_opens_with_an_active_plan() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = priced_course(&app, &teacher, "Members only", MonetizationType::Subscription, 0, None).await;

    let res = app.enrollment.enroll(&student, &course.id).await;
    assert!(matches!(res, Err(DomainError::Forbidden(_))));

    app.monetization.subscribe(&student.user_id, "monthly").await.unwrap();
    let enrolled = app.enrollment.enroll(&student, &course.id).await.unwrap();
    assert_eq!(enrolled.course_id, course.id);

    app.monetization.cancel_subscription(&student.user_id).await.unwrap();
    let decision = app.monetization.check_access(&student, &course.id).await.unwrap();
    assert!(!decision.granted);
}

#[tokio::test]
async fn lesson_purchase_unlocks_only_that_lesson() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;

    let mut input = new_course("Premium Rust", None);
    input.monetization_type = MonetizationType::Premium;
    input.price_cents = 9_000;
    let (course, free_lesson) = draft_course(&app, &teacher, input).await;
    let mut paid = new_lesson("Lifetimes");
    paid.price_cents = 1_500;
    let sold = app.courses.add_lesson(&teacher, &free_lesson.module_id, paid).await.unwrap();
    app.courses.publish(&teacher, &course.id).await.unwrap();

    assert!(!app.lesson_payment.has_access(&student, &sold.id).await.unwrap().decision.granted);

    let not_for_sale = app.lesson_payment.purchase_lesson(&student, &free_lesson.id, None).await;
    assert!(matches!(not_for_sale, Err(DomainError::Validation(_))));

    let payment = app.lesson_payment.purchase_lesson(&student, &sold.id, None).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.final_cents, 1_500);
    assert_eq!(payment.lesson_id.as_deref(), Some(sold.id.as_str()));

    assert!(app.lesson_payment.has_access(&student, &sold.id).await.unwrap().decision.granted);
    assert!(!app.lesson_payment.has_access(&student, &free_lesson.id).await.unwrap().decision.granted);
    // A lesson purchase is not a course purchase.
    assert!(!app.monetization.check_access(&student, &course.id).await.unwrap().granted);

    let twice = app.lesson_payment.purchase_lesson(&student, &sold.id, None).await;
    assert!(matches!(twice, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn referral_converts_on_first_enrollment() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let referrer = create_user(&app, "referrer", UserRole::Student).await;
    let friend = create_user(&app, "friend", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust Basics", None).await;

    let code = app.referral.get_or_create_code(&referrer.user_id).await.unwrap();
    let same = app.referral.get_or_create_code(&referrer.user_id).await.unwrap();
    assert_eq!(code.code, same.code);

    let own = app.referral.register_referral(&code.code, &referrer.user_id).await;
    assert!(matches!(own, Err(DomainError::Validation(_))));

    let registered = app
        .referral
        .register_referral(&code.code.to_lowercase(), &friend.user_id)
        .await
        .unwrap();
    assert_eq!(registered.status, ReferralStatus::Pending);

    app.enrollment.enroll(&friend, &course.id).await.unwrap();

    let stats = app.referral.stats(&referrer.user_id).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.converted, 1);
    assert_eq!(stats.referrals[0].status, ReferralStatus::Converted);
    assert!(stats.reward_cents > 0);
}

#[tokio::test]
async fn cancelled_seat_is_offered_to_the_waitlist() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let first = create_user(&app, "first", UserRole::Student).await;
    let second = create_user(&app, "second", UserRole::Student).await;
    let course = priced_course(&app, &teacher, "Seminar", MonetizationType::Free, 0, Some(1)).await;

    let early = app.waitlist.join(&second, &course.id).await;
    assert!(matches!(early, Err(DomainError::Validation(_))));

    let seat = app.enrollment.enroll(&first, &course.id).await.unwrap();
    let entry = app.waitlist.join(&second, &course.id).await.unwrap();
    assert_eq!(entry.position, 1);
    assert_eq!(entry.status, WaitlistStatus::Waiting);

    app.enrollment.cancel(&first, &seat.id).await.unwrap();

    let queue = app.waitlist.list(&teacher, &course.id).await.unwrap();
    assert_eq!(queue[0].status, WaitlistStatus::Notified);
    assert!(queue[0].notified_at.is_some());

    app.enrollment.enroll(&second, &course.id).await.unwrap();
    let queue = app.waitlist.list(&teacher, &course.id).await.unwrap();
    assert_eq!(queue[0].status, WaitlistStatus::Enrolled);
}

#[tokio::test]
async fn monetization_change_is_visible_through_the_course_cache() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let course = published_course(&app, &teacher, "Rust Basics", None).await;

    let cached = app.courses.get(&course.id).await.unwrap();
    assert_eq!(cached.monetization_type, MonetizationType::Free);

    app.monetization
        .set_course_monetization(&teacher, &course.id, MonetizationType::Premium, Some(4_900))
        .await
        .unwrap();

    let fresh = app.courses.get(&course.id).await.unwrap();
    assert_eq!(fresh.monetization_type, MonetizationType::Premium);
    assert_eq!(fresh.price_cents, 4_900);

    let count = course::Entity::find()
        .filter(course::Column::PriceCents.eq(4_900))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
