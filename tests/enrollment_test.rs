//! Enrollment, prerequisites, coupons and certificates against a real schema.

mod common;

use campus::application::services::coupons::NewCoupon;
use campus::domain::coupon::DiscountType;
use campus::domain::enrollment::EnrollmentStatus;
use campus::domain::monetization::MonetizationType;
use campus::domain::payment::{PaymentStatus, PurchaseTarget};
use campus::domain::UserRole;
use campus::shared::errors::DomainError;

use common::{create_test_services, create_user, draft_course, new_course, published_course};

#[tokio::test]
async fn second_enrollment_is_a_conflict() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust Basics", Some("programming")).await;

    let first = app.enrollment.enroll(&student, &course.id).await.unwrap();
    assert_eq!(first.status, EnrollmentStatus::Active);

    let again = app.enrollment.enroll(&student, &course.id).await;
    assert!(matches!(again, Err(DomainError::Conflict(_))));
    assert_eq!(app.enrollment.list_for_student(&student.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_enrollment_is_reactivated_in_place() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust Basics", None).await;

    let first = app.enrollment.enroll(&student, &course.id).await.unwrap();
    let cancelled = app.enrollment.cancel(&student, &first.id).await.unwrap();
    assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);

    let again = app.enrollment.enroll(&student, &course.id).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn draft_course_rejects_enrollment() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let (draft, _) = draft_course(&app, &teacher, new_course("Unreleased", None)).await;

    let res = app.enrollment.enroll(&student, &draft.id).await;
    assert!(matches!(res, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn full_course_rejects_further_students() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let first = create_user(&app, "first", UserRole::Student).await;
    let second = create_user(&app, "second", UserRole::Student).await;

    let mut input = new_course("Seminar", None);
    input.capacity = Some(1);
    let (course, _) = draft_course(&app, &teacher, input).await;
    app.courses.publish(&teacher, &course.id).await.unwrap();

    app.enrollment.enroll(&first, &course.id).await.unwrap();
    let res = app.enrollment.enroll(&second, &course.id).await;
    assert!(matches!(res, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn prerequisite_cycles_are_refused() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let a = published_course(&app, &teacher, "A", None).await;
    let b = published_course(&app, &teacher, "B", None).await;
    let c = published_course(&app, &teacher, "C", None).await;

    app.prerequisites.add(&teacher, &b.id, &a.id).await.unwrap();
    app.prerequisites.add(&teacher, &c.id, &b.id).await.unwrap();

    let cycle = app.prerequisites.add(&teacher, &a.id, &c.id).await;
    assert!(matches!(cycle, Err(DomainError::Validation(_))));
    let self_loop = app.prerequisites.add(&teacher, &a.id, &a.id).await;
    assert!(matches!(self_loop, Err(DomainError::Validation(_))));
    let duplicate = app.prerequisites.add(&teacher, &b.id, &a.id).await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn prerequisites_gate_enrollment_until_completed() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let intro = published_course(&app, &teacher, "Intro", None).await;
    let advanced = published_course(&app, &teacher, "Advanced", None).await;
    app.prerequisites.add(&teacher, &advanced.id, &intro.id).await.unwrap();

    let blocked = app.enrollment.enroll(&student, &advanced.id).await;
    assert!(matches!(blocked, Err(DomainError::Forbidden(_))));

    let intro_enrollment = app.enrollment.enroll(&student, &intro.id).await.unwrap();
    let done = app.enrollment.update_progress(&student, &intro_enrollment.id, 100).await.unwrap();
    assert_eq!(done.status, EnrollmentStatus::Completed);

    app.enrollment.enroll(&student, &advanced.id).await.unwrap();
}

#[tokio::test]
async fn certificate_requires_completion_and_is_issued_once() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let student = create_user(&app, "student", UserRole::Student).await;
    let course = published_course(&app, &teacher, "Rust Basics", None).await;
    let enrollment = app.enrollment.enroll(&student, &course.id).await.unwrap();

    let early = app.certificates.issue(&student, &course.id).await;
    assert!(matches!(early, Err(DomainError::Validation(_))));

    app.enrollment.complete(&student, &enrollment.id).await.unwrap();
    let first = app.certificates.issue(&student, &course.id).await.unwrap();
    assert!(!first.already_issued);

    let second = app.certificates.issue(&student, &course.id).await.unwrap();
    assert!(second.already_issued);
    assert_eq!(second.certificate.id, first.certificate.id);
    assert_eq!(second.certificate.verification_code, first.certificate.verification_code);

    let verified = app
        .certificates
        .verify(&first.certificate.verification_code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(verified.course_title, "Rust Basics");
    assert_eq!(verified.student_name, "student");
}

#[tokio::test]
async fn coupon_usage_cap_holds_across_pending_payments() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let alice = create_user(&app, "alice", UserRole::Student).await;
    let bob = create_user(&app, "bob", UserRole::Student).await;

    let mut input = new_course("Premium Rust", None);
    input.price_cents = 10_000;
    input.monetization_type = MonetizationType::Premium;
    let (course, _) = draft_course(&app, &teacher, input).await;
    app.courses.publish(&teacher, &course.id).await.unwrap();

    app.coupons
        .create(
            &teacher,
            NewCoupon {
                code: "launch25".to_string(),
                discount_type: DiscountType::Percent,
                value: 25,
                max_uses: Some(1),
                min_purchase_cents: 0,
                course_id: Some(course.id.clone()),
                valid_from: None,
                expires_at: None,
            },
        )
        .await
        .unwrap();

    // Both quotes succeed while the coupon is unused.
    let target = PurchaseTarget::Course(course.id.clone());
    let alice_payment = app.payments.create(&alice, target.clone(), Some("LAUNCH25")).await.unwrap();
    let bob_payment = app.payments.create(&bob, target, Some("LAUNCH25")).await.unwrap();
    assert_eq!(alice_payment.final_cents, 7_500);
    assert_eq!(bob_payment.final_cents, 7_500);

    let completed = app.payments.complete(&alice, &alice_payment.id, None).await.unwrap();
    assert_eq!(completed.status, PaymentStatus::Completed);

    let over_cap = app.payments.complete(&bob, &bob_payment.id, None).await;
    assert!(matches!(over_cap, Err(DomainError::Validation(_))));

    let quote = app.coupons.validate("launch25", Some(&course.id), 10_000).await;
    assert!(quote.is_err());
}
