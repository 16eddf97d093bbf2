//! One service per feature area.
//!
//! Services talk to the database through SeaORM directly and to each other
//! through `Arc` handles wired up in [`AppServices`].

pub mod assignments;
pub mod bundles;
pub mod calendar;
pub mod certificates;
pub mod comparison;
pub mod coupons;
pub mod course_import;
pub mod courses;
pub mod dashboard;
pub mod email;
pub mod enrollment;
pub mod forum;
pub mod instructor_qa;
pub mod learning;
pub mod lesson_payment;
pub mod media;
pub mod monetization;
pub mod payments;
pub mod prerequisites;
pub mod quizzes;
pub mod recommendation;
pub mod referral;
pub mod reviews;
pub mod share;
pub mod tags;
pub mod teacher_earnings;
pub mod users;
pub mod video_features;
pub mod waitlist;
pub mod whiteboard;
pub mod wishlist;

use std::sync::Arc;

use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::Actor;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::catalogs::CatalogRegistry;
use crate::infrastructure::cloudflare::{CloudflareStream, ObjectStore, R2ObjectStore, VideoProvider};
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::database::entities::{course, enrollment as enrollment_entity, lesson, user};
use crate::infrastructure::email::{build_sender, EmailSender};
use crate::shared::errors::{DomainError, DomainResult, InfraResult};
use crate::shared::validations::non_blank;

pub use assignments::AssignmentService;
pub use bundles::BundleService;
pub use calendar::CalendarService;
pub use certificates::CertificateService;
pub use comparison::ComparisonService;
pub use coupons::CouponService;
pub use course_import::CourseImportService;
pub use courses::CourseService;
pub use dashboard::DashboardService;
pub use email::EmailService;
pub use enrollment::EnrollmentService;
pub use forum::ForumService;
pub use instructor_qa::InstructorQaService;
pub use learning::LearningService;
pub use lesson_payment::LessonPaymentService;
pub use media::MediaService;
pub use monetization::MonetizationService;
pub use payments::PaymentService;
pub use prerequisites::PrerequisiteService;
pub use quizzes::QuizService;
pub use recommendation::RecommendationService;
pub use referral::ReferralService;
pub use reviews::ReviewService;
pub use share::ShareService;
pub use tags::TagService;
pub use teacher_earnings::TeacherEarningsService;
pub use users::UserService;
pub use video_features::VideoFeaturesService;
pub use waitlist::WaitlistService;
pub use whiteboard::WhiteboardService;
pub use wishlist::WishlistService;

/// External adapters handed to [`AppServices::new`].
#[derive(Clone)]
pub struct Adapters {
    pub cache: Arc<CacheService>,
    pub email: Arc<dyn EmailSender>,
    pub object_store: Option<Arc<dyn ObjectStore>>,
    pub video: Option<Arc<dyn VideoProvider>>,
    pub catalogs: CatalogRegistry,
}

impl Adapters {
    /// Build every adapter the configuration enables.
    pub fn from_config(config: &AppConfig) -> InfraResult<Self> {
        let object_store: Option<Arc<dyn ObjectStore>> = if config.storage.is_configured() {
            Some(Arc::new(R2ObjectStore::new(&config.storage)?))
        } else {
            None
        };
        let video: Option<Arc<dyn VideoProvider>> = if config.stream.is_configured() {
            Some(Arc::new(CloudflareStream::new(&config.stream)?))
        } else {
            None
        };
        Ok(Self {
            cache: Arc::new(CacheService::new(&config.cache)),
            email: build_sender(&config.email)?,
            object_store,
            video,
            catalogs: CatalogRegistry::from_config(&config.catalogs)?,
        })
    }
}

/// Every application service, wired together.
#[derive(Clone)]
pub struct AppServices {
    pub db: DatabaseConnection,
    pub cache: Arc<CacheService>,
    pub users: Arc<UserService>,
    pub courses: Arc<CourseService>,
    pub tags: Arc<TagService>,
    pub prerequisites: Arc<PrerequisiteService>,
    pub monetization: Arc<MonetizationService>,
    pub payments: Arc<PaymentService>,
    pub coupons: Arc<CouponService>,
    pub bundles: Arc<BundleService>,
    pub enrollment: Arc<EnrollmentService>,
    pub referral: Arc<ReferralService>,
    pub learning: Arc<LearningService>,
    pub quizzes: Arc<QuizService>,
    pub assignments: Arc<AssignmentService>,
    pub certificates: Arc<CertificateService>,
    pub forum: Arc<ForumService>,
    pub instructor_qa: Arc<InstructorQaService>,
    pub reviews: Arc<ReviewService>,
    pub wishlist: Arc<WishlistService>,
    pub waitlist: Arc<WaitlistService>,
    pub calendar: Arc<CalendarService>,
    pub share: Arc<ShareService>,
    pub comparison: Arc<ComparisonService>,
    pub video_features: Arc<VideoFeaturesService>,
    pub whiteboard: Arc<WhiteboardService>,
    pub media: Arc<MediaService>,
    pub lesson_payment: Arc<LessonPaymentService>,
    pub earnings: Arc<TeacherEarningsService>,
    pub course_import: Arc<CourseImportService>,
    pub email: Arc<EmailService>,
    pub dashboard: Arc<DashboardService>,
    pub recommendation: Arc<RecommendationService>,
}

impl AppServices {
    pub fn new(db: DatabaseConnection, config: &AppConfig, adapters: Adapters) -> Self {
        let Adapters {
            cache,
            email,
            object_store,
            video,
            catalogs,
        } = adapters;

        let email = Arc::new(EmailService::new(email));
        let users = Arc::new(UserService::new(
            db.clone(),
            JwtConfig::from(&config.security),
            config.security.bcrypt_cost,
        ));
        let courses = Arc::new(CourseService::new(db.clone(), cache.clone()));
        let tags = Arc::new(TagService::new(db.clone()));
        let prerequisites = Arc::new(PrerequisiteService::new(db.clone()));
        let monetization = Arc::new(MonetizationService::new(db.clone(), cache.clone()));

        let coupons = Arc::new(CouponService::new(db.clone()));
        let earnings = Arc::new(TeacherEarningsService::new(db.clone(), config.earnings.clone()));
        let referral = Arc::new(ReferralService::new(db.clone(), config.referral.reward_cents));
        let waitlist = Arc::new(WaitlistService::new(db.clone(), email.clone()));
        let enrollment = Arc::new(EnrollmentService::new(
            db.clone(),
            cache.clone(),
            monetization.clone(),
            referral.clone(),
            waitlist.clone(),
            email.clone(),
        ));
        let payments = Arc::new(PaymentService::new(db.clone(), earnings.clone()));
        let bundles = Arc::new(BundleService::new(db.clone(), earnings.clone(), cache.clone()));
        let learning = Arc::new(LearningService::new(db.clone(), cache.clone()));
        let lesson_payment = Arc::new(LessonPaymentService::new(
            db.clone(),
            coupons.clone(),
            monetization.clone(),
            earnings.clone(),
            email.clone(),
        ));

        Self {
            quizzes: Arc::new(QuizService::new(db.clone())),
            assignments: Arc::new(AssignmentService::new(db.clone())),
            certificates: Arc::new(CertificateService::new(db.clone(), email.clone())),
            forum: Arc::new(ForumService::new(db.clone())),
            instructor_qa: Arc::new(InstructorQaService::new(db.clone())),
            reviews: Arc::new(ReviewService::new(db.clone(), cache.clone())),
            wishlist: Arc::new(WishlistService::new(db.clone())),
            calendar: Arc::new(CalendarService::new(db.clone())),
            share: Arc::new(ShareService::new(db.clone())),
            comparison: Arc::new(ComparisonService::new(db.clone())),
            video_features: Arc::new(VideoFeaturesService::new(db.clone(), learning.clone())),
            whiteboard: Arc::new(WhiteboardService::new(db.clone())),
            media: Arc::new(MediaService::new(db.clone(), object_store, video)),
            course_import: Arc::new(CourseImportService::new(db.clone(), catalogs)),
            dashboard: Arc::new(DashboardService::new(db.clone(), cache.clone())),
            recommendation: Arc::new(RecommendationService::new(
                db.clone(),
                config.recommendation.clone(),
            )),
            db,
            cache,
            users,
            courses,
            tags,
            prerequisites,
            monetization,
            payments,
            coupons,
            bundles,
            enrollment,
            referral,
            learning,
            waitlist,
            lesson_payment,
            earnings,
            email,
        }
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn required(field: &str, value: &str) -> DomainResult<String> {
    non_blank(field, value).map_err(DomainError::Validation)
}

pub(crate) async fn load_course<C: ConnectionTrait>(db: &C, course_id: &str) -> DomainResult<course::Model> {
    course::Entity::find_by_id(course_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Course", course_id))
}

pub(crate) async fn load_lesson<C: ConnectionTrait>(db: &C, lesson_id: &str) -> DomainResult<lesson::Model> {
    lesson::Entity::find_by_id(lesson_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Lesson", lesson_id))
}

/// Course teacher or admin.
pub(crate) async fn load_owned_course<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    course_id: &str,
) -> DomainResult<course::Model> {
    let course = load_course(db, course_id).await?;
    actor.ensure_owns(&course.teacher_id, "course")?;
    Ok(course)
}

/// ACTIVE or COMPLETED enrollment.
pub(crate) async fn is_enrolled<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course_id: &str,
) -> DomainResult<bool> {
    let n = enrollment_entity::Entity::find()
        .filter(enrollment_entity::Column::StudentId.eq(student_id))
        .filter(enrollment_entity::Column::CourseId.eq(course_id))
        .filter(enrollment_entity::Column::Status.is_in([EnrollmentStatus::Active, EnrollmentStatus::Completed]))
        .count(db)
        .await?;
    Ok(n > 0)
}

pub(crate) async fn ensure_enrolled<C: ConnectionTrait>(
    db: &C,
    student_id: &str,
    course_id: &str,
) -> DomainResult<()> {
    if is_enrolled(db, student_id, course_id).await? {
        Ok(())
    } else {
        Err(DomainError::forbidden("You must be enrolled in this course"))
    }
}

/// Participants are enrolled students, the course teacher and admins.
pub(crate) async fn ensure_participant<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    course: &course::Model,
) -> DomainResult<()> {
    if actor.owns(&course.teacher_id) {
        return Ok(());
    }
    ensure_enrolled(db, &actor.user_id, &course.id).await
}

/// Course ids the user teaches.
pub(crate) async fn taught_course_ids<C: ConnectionTrait>(db: &C, teacher_id: &str) -> DomainResult<Vec<String>> {
    Ok(course::Entity::find()
        .filter(course::Column::TeacherId.eq(teacher_id))
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect())
}

pub(crate) async fn load_user<C: ConnectionTrait>(db: &C, user_id: &str) -> DomainResult<user::Model> {
    user::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))
}
