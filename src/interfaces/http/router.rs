//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::AppServices;
use crate::domain::media::MAX_UPLOAD_BYTES;
use crate::interfaces::http::common::{EmptyData, PaginationQuery};
use crate::interfaces::http::middleware::{auth_middleware, optional_auth_middleware, AuthState};

use super::modules::{
    assignments, auth, bundles, calendar, certificates, comparison, coupons, courses, dashboard, earnings,
    enrollments, forum, health, imports, learning, media, metrics, payments, prerequisites, qa, quizzes,
    recommendations, referrals, request_id, reviews, share, subscriptions, tags, users, video, whiteboard,
    wishlist,
};

/// State shared by every route. Handlers pick their slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    pub auth: AuthState,
    pub health: health::HealthState,
    pub metrics: metrics::MetricsState,
}

impl AppState {
    pub fn new(services: AppServices, metrics_handle: PrometheusHandle) -> Self {
        let auth = AuthState {
            jwt_config: services.users.jwt_config().clone(),
        };
        let health = health::HealthState {
            db: services.db.clone(),
            cache: Arc::clone(&services.cache),
            started_at: Arc::new(Instant::now()),
        };
        Self {
            services,
            auth,
            health,
            metrics: metrics::MetricsState { handle: metrics_handle },
        }
    }
}

impl FromRef<AppState> for AppServices {
    fn from_ref(s: &AppState) -> Self {
        s.services.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

impl FromRef<AppState> for metrics::MetricsState {
    fn from_ref(s: &AppState) -> Self {
        s.metrics.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::set_role,
        users::set_active,
        // Courses
        courses::list_courses,
        courses::get_course,
        courses::get_course_by_slug,
        courses::create_course,
        courses::update_course,
        courses::publish_course,
        courses::archive_course,
        courses::delete_course,
        courses::list_modules,
        courses::add_module,
        courses::add_lesson,
        courses::reorder_lessons,
        courses::update_lesson,
        courses::delete_lesson,
        courses::lesson_access,
        courses::set_monetization,
        courses::course_access,
        comparison::compare_courses,
        // Tags
        tags::list_tags,
        tags::popular_tags,
        tags::courses_by_tag,
        tags::create_tag,
        tags::delete_tag,
        tags::course_tags,
        tags::attach_tags,
        tags::detach_tag,
        // Prerequisites
        prerequisites::list_prerequisites,
        prerequisites::add_prerequisite,
        prerequisites::remove_prerequisite,
        prerequisites::check_prerequisites,
        // Enrollments and waitlist
        enrollments::enroll,
        enrollments::my_enrollments,
        enrollments::get_enrollment,
        enrollments::course_enrollments,
        enrollments::cancel_enrollment,
        enrollments::complete_enrollment,
        enrollments::update_progress,
        enrollments::join_waitlist,
        enrollments::leave_waitlist,
        enrollments::waitlist_position,
        enrollments::list_waitlist,
        // Learning
        learning::complete_lesson,
        learning::course_progress,
        learning::list_paths,
        learning::create_path,
        learning::get_path,
        learning::add_path_course,
        // Quizzes
        quizzes::create_quiz,
        quizzes::list_quizzes,
        quizzes::get_quiz,
        quizzes::add_question,
        quizzes::start_attempt,
        quizzes::list_attempts,
        quizzes::submit_attempt,
        // Assignments
        assignments::create_assignment,
        assignments::list_assignments,
        assignments::get_assignment,
        assignments::submit_work,
        assignments::list_submissions,
        assignments::grade_submission,
        // Certificates
        certificates::issue_certificate,
        certificates::my_certificates,
        certificates::verify_certificate,
        // Forum
        forum::list_posts,
        forum::create_post,
        forum::get_post,
        forum::delete_post,
        forum::reply,
        forum::upvote_post,
        forum::upvote_reply,
        forum::delete_reply,
        forum::mark_best_answer,
        forum::set_pinned,
        // Instructor Q&A
        qa::ask,
        qa::list_course_questions,
        qa::my_questions,
        qa::get_question,
        qa::answer,
        qa::close_question,
        // Reviews
        reviews::list_reviews,
        reviews::review_summary,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::reply_to_review,
        // Wishlist
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::wishlist_contains,
        wishlist::remove_from_wishlist,
        // Sharing
        share::create_share_link,
        share::resolve_share_link,
        share::share_stats,
        // Calendar
        calendar::list_events,
        calendar::upcoming_events,
        calendar::create_event,
        calendar::update_event,
        calendar::delete_event,
        // Video
        video::list_bookmarks,
        video::add_bookmark,
        video::delete_bookmark,
        video::list_notes,
        video::add_note,
        video::update_note,
        video::delete_note,
        video::save_watch_progress,
        video::get_watch_progress,
        // Whiteboards
        whiteboard::list_whiteboards,
        whiteboard::create_whiteboard,
        whiteboard::get_whiteboard,
        whiteboard::list_actions,
        whiteboard::append_action,
        whiteboard::clear_whiteboard,
        whiteboard::set_locked,
        // Media
        media::upload_file,
        media::request_video_upload,
        media::refresh_video_status,
        media::start_live_stream,
        media::get_playback,
        media::delete_asset,
        media::list_course_media,
        // Payments
        payments::create_payment,
        payments::my_payments,
        payments::get_payment,
        payments::complete_payment,
        payments::fail_payment,
        payments::refund_payment,
        payments::purchase_lesson,
        // Coupons
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::deactivate_coupon,
        coupons::validate_coupon,
        // Bundles
        bundles::list_bundles,
        bundles::get_bundle,
        bundles::create_bundle,
        bundles::add_bundle_course,
        bundles::remove_bundle_course,
        bundles::purchase_bundle,
        bundles::delete_bundle,
        // Subscriptions
        subscriptions::my_subscription,
        subscriptions::subscribe,
        subscriptions::cancel_subscription,
        // Earnings
        earnings::list_earnings,
        earnings::earnings_summary,
        earnings::preview_payout,
        earnings::mark_period_paid,
        // Referrals
        referrals::my_referral_code,
        referrals::referral_stats,
        // Imports
        imports::list_providers,
        imports::start_import,
        imports::list_imports,
        imports::get_import,
        imports::cancel_import,
        // Dashboard
        dashboard::student_dashboard,
        dashboard::teacher_dashboard,
        dashboard::admin_overview,
        // Recommendations
        recommendations::stored_recommendations,
        recommendations::refresh_recommendations,
    ),
    components(
        schemas(
            // Common
            EmptyData,
            PaginationQuery,
            health::HealthResponse,
            health::ComponentHealth,
            // Auth and users
            auth::UserDto,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            users::SetRoleRequest,
            users::SetActiveRequest,
            // Courses
            courses::CreateCourseRequest,
            courses::UpdateCourseRequest,
            courses::CreateModuleRequest,
            courses::CreateLessonRequest,
            courses::UpdateLessonRequest,
            courses::ReorderLessonsRequest,
            courses::SetMonetizationRequest,
            tags::CreateTagRequest,
            tags::AttachTagsRequest,
            prerequisites::AddPrerequisiteRequest,
            // Learning
            enrollments::UpdateProgressRequest,
            learning::CompleteLessonRequest,
            learning::CreatePathRequest,
            learning::AddPathCourseRequest,
            quizzes::CreateQuizRequest,
            quizzes::CreateQuestionRequest,
            quizzes::SubmitAttemptRequest,
            assignments::CreateAssignmentRequest,
            assignments::SubmitWorkRequest,
            assignments::GradeRequest,
            // Community
            forum::CreatePostRequest,
            forum::ReplyRequest,
            forum::PinRequest,
            qa::AskRequest,
            qa::AnswerRequest,
            reviews::CreateReviewRequest,
            reviews::UpdateReviewRequest,
            reviews::ReviewReplyRequest,
            wishlist::WishlistMembership,
            share::CreateShareRequest,
            calendar::CreateEventRequest,
            calendar::UpdateEventRequest,
            // Video, whiteboards and media
            video::BookmarkRequest,
            video::NoteRequest,
            video::UpdateNoteRequest,
            video::WatchProgressRequest,
            whiteboard::CreateWhiteboardRequest,
            whiteboard::AppendActionRequest,
            whiteboard::LockRequest,
            whiteboard::ClearedBoard,
            media::VideoUploadRequest,
            media::LiveStreamRequest,
            // Commerce
            payments::CreatePaymentRequest,
            payments::CompletePaymentRequest,
            payments::LessonPurchaseRequest,
            coupons::CreateCouponRequest,
            bundles::CreateBundleRequest,
            bundles::BundleCourseRequest,
            bundles::PurchaseBundleRequest,
            subscriptions::SubscribeRequest,
            imports::StartImportRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Registration, login (JWT) and the current user"),
        (name = "Users", description = "Account administration"),
        (name = "Courses", description = "Courses, modules, lessons, access and comparison"),
        (name = "Tags", description = "Course tagging and discovery"),
        (name = "Prerequisites", description = "Course prerequisite graph"),
        (name = "Enrollments", description = "Enrollment lifecycle and waitlists"),
        (name = "Learning", description = "Lesson completion, course progress and learning paths"),
        (name = "Quizzes", description = "Quizzes, questions and timed attempts"),
        (name = "Assignments", description = "Assignments, submissions and grading"),
        (name = "Certificates", description = "Completion certificates and public verification"),
        (name = "Forum", description = "Course discussion forum"),
        (name = "Instructor Q&A", description = "Private questions to the course teacher"),
        (name = "Reviews", description = "Course reviews and ratings"),
        (name = "Wishlist", description = "Saved courses"),
        (name = "Sharing", description = "Trackable share links"),
        (name = "Calendar", description = "Live sessions, deadlines and personal events"),
        (name = "Video", description = "Bookmarks, notes and resume positions"),
        (name = "Whiteboards", description = "Collaborative whiteboards"),
        (name = "Media", description = "File storage, hosted video and live streams"),
        (name = "Payments", description = "Course, bundle and lesson payments"),
        (name = "Coupons", description = "Discount codes"),
        (name = "Bundles", description = "Discounted course bundles"),
        (name = "Subscriptions", description = "Platform subscriptions"),
        (name = "Earnings", description = "Teacher revenue share and payouts"),
        (name = "Referrals", description = "Referral codes and rewards"),
        (name = "Imports", description = "Importing courses from external catalogs"),
        (name = "Dashboard", description = "Student, teacher and admin overviews"),
        (name = "Recommendations", description = "Personal course recommendations"),
    ),
    info(
        title = "Campus LMS API",
        version = "1.0.0",
        description = "REST API for courses, learning, community and commerce",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Routes that need no token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/courses/{id}", get(courses::get_course))
        .route("/api/v1/courses/by-slug/{slug}", get(courses::get_course_by_slug))
        .route("/api/v1/courses/by-tag/{slug}", get(tags::courses_by_tag))
        .route("/api/v1/courses/compare", get(comparison::compare_courses))
        .route("/api/v1/courses/{id}/modules", get(courses::list_modules))
        .route("/api/v1/courses/{id}/tags", get(tags::course_tags))
        .route("/api/v1/courses/{id}/prerequisites", get(prerequisites::list_prerequisites))
        .route("/api/v1/courses/{id}/reviews", get(reviews::list_reviews))
        .route("/api/v1/courses/{id}/reviews/summary", get(reviews::review_summary))
        .route("/api/v1/tags", get(tags::list_tags))
        .route("/api/v1/tags/popular", get(tags::popular_tags))
        .route("/api/v1/bundles", get(bundles::list_bundles))
        .route("/api/v1/bundles/{bundle_id}", get(bundles::get_bundle))
        .route("/api/v1/certificates/verify/{code}", get(certificates::verify_certificate))
        .route("/api/v1/share/{token}", get(share::resolve_share_link))
}

/// Public routes that behave differently for a signed-in caller.
fn optional_auth_routes(auth_state: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/courses", get(courses::list_courses))
        .layer(middleware::from_fn_with_state(auth_state, optional_auth_middleware))
}

fn protected_routes(auth_state: AuthState) -> Router<AppState> {
    Router::new()
        // Auth and users
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/{id}/role", put(users::set_role))
        .route("/api/v1/users/{id}/active", put(users::set_active))
        // Courses
        .route("/api/v1/courses", post(courses::create_course))
        .route(
            "/api/v1/courses/{id}",
            put(courses::update_course).delete(courses::delete_course),
        )
        .route("/api/v1/courses/{id}/publish", post(courses::publish_course))
        .route("/api/v1/courses/{id}/archive", post(courses::archive_course))
        .route("/api/v1/courses/{id}/modules", post(courses::add_module))
        .route("/api/v1/courses/{id}/monetization", put(courses::set_monetization))
        .route("/api/v1/courses/{id}/access", get(courses::course_access))
        .route("/api/v1/modules/{module_id}/lessons", post(courses::add_lesson))
        .route("/api/v1/modules/{module_id}/lessons/order", put(courses::reorder_lessons))
        .route(
            "/api/v1/lessons/{lesson_id}",
            put(courses::update_lesson).delete(courses::delete_lesson),
        )
        .route("/api/v1/lessons/{lesson_id}/access", get(courses::lesson_access))
        // Tags and prerequisites
        .route("/api/v1/tags", post(tags::create_tag))
        .route("/api/v1/tags/{id}", delete(tags::delete_tag))
        .route("/api/v1/courses/{id}/tags", post(tags::attach_tags))
        .route("/api/v1/courses/{id}/tags/{tag_id}", delete(tags::detach_tag))
        .route("/api/v1/courses/{id}/prerequisites", post(prerequisites::add_prerequisite))
        .route(
            "/api/v1/courses/{id}/prerequisites/{prerequisite_id}",
            delete(prerequisites::remove_prerequisite),
        )
        .route(
            "/api/v1/courses/{id}/prerequisites/check",
            get(prerequisites::check_prerequisites),
        )
        // Enrollments and waitlist
        .route("/api/v1/courses/{id}/enroll", post(enrollments::enroll))
        .route("/api/v1/courses/{id}/enrollments", get(enrollments::course_enrollments))
        .route("/api/v1/enrollments/me", get(enrollments::my_enrollments))
        .route("/api/v1/enrollments/{id}", get(enrollments::get_enrollment))
        .route("/api/v1/enrollments/{id}/cancel", post(enrollments::cancel_enrollment))
        .route("/api/v1/enrollments/{id}/complete", post(enrollments::complete_enrollment))
        .route("/api/v1/enrollments/{id}/progress", put(enrollments::update_progress))
        .route(
            "/api/v1/courses/{id}/waitlist",
            get(enrollments::list_waitlist)
                .post(enrollments::join_waitlist)
                .delete(enrollments::leave_waitlist),
        )
        .route("/api/v1/courses/{id}/waitlist/position", get(enrollments::waitlist_position))
        // Learning
        .route("/api/v1/lessons/{lesson_id}/complete", post(learning::complete_lesson))
        .route("/api/v1/courses/{id}/progress", get(learning::course_progress))
        .route(
            "/api/v1/learning-paths",
            get(learning::list_paths).post(learning::create_path),
        )
        .route("/api/v1/learning-paths/{path_id}", get(learning::get_path))
        .route("/api/v1/learning-paths/{path_id}/courses", post(learning::add_path_course))
        // Quizzes
        .route(
            "/api/v1/courses/{id}/quizzes",
            get(quizzes::list_quizzes).post(quizzes::create_quiz),
        )
        .route("/api/v1/quizzes/{quiz_id}", get(quizzes::get_quiz))
        .route("/api/v1/quizzes/{quiz_id}/questions", post(quizzes::add_question))
        .route(
            "/api/v1/quizzes/{quiz_id}/attempts",
            get(quizzes::list_attempts).post(quizzes::start_attempt),
        )
        .route("/api/v1/attempts/{attempt_id}/submit", post(quizzes::submit_attempt))
        // Assignments
        .route(
            "/api/v1/courses/{id}/assignments",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route("/api/v1/assignments/{assignment_id}", get(assignments::get_assignment))
        .route(
            "/api/v1/assignments/{assignment_id}/submissions",
            get(assignments::list_submissions).post(assignments::submit_work),
        )
        .route("/api/v1/submissions/{submission_id}/grade", post(assignments::grade_submission))
        // Certificates
        .route("/api/v1/courses/{id}/certificate", post(certificates::issue_certificate))
        .route("/api/v1/certificates/me", get(certificates::my_certificates))
        // Forum
        .route(
            "/api/v1/courses/{id}/forum",
            get(forum::list_posts).post(forum::create_post),
        )
        .route(
            "/api/v1/forum/posts/{post_id}",
            get(forum::get_post).delete(forum::delete_post),
        )
        .route("/api/v1/forum/posts/{post_id}/replies", post(forum::reply))
        .route("/api/v1/forum/posts/{post_id}/upvote", post(forum::upvote_post))
        .route("/api/v1/forum/posts/{post_id}/pin", put(forum::set_pinned))
        .route(
            "/api/v1/forum/posts/{post_id}/best-answer/{reply_id}",
            post(forum::mark_best_answer),
        )
        .route("/api/v1/forum/replies/{reply_id}", delete(forum::delete_reply))
        .route("/api/v1/forum/replies/{reply_id}/upvote", post(forum::upvote_reply))
        // Instructor Q&A
        .route(
            "/api/v1/courses/{id}/questions",
            get(qa::list_course_questions).post(qa::ask),
        )
        .route("/api/v1/questions/me", get(qa::my_questions))
        .route("/api/v1/questions/{question_id}", get(qa::get_question))
        .route("/api/v1/questions/{question_id}/answers", post(qa::answer))
        .route("/api/v1/questions/{question_id}/close", post(qa::close_question))
        // Reviews
        .route("/api/v1/courses/{id}/reviews", post(reviews::create_review))
        .route(
            "/api/v1/reviews/{review_id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/api/v1/reviews/{review_id}/reply", post(reviews::reply_to_review))
        // Wishlist and sharing
        .route("/api/v1/wishlist", get(wishlist::list_wishlist))
        .route(
            "/api/v1/wishlist/{course_id}",
            get(wishlist::wishlist_contains)
                .put(wishlist::add_to_wishlist)
                .delete(wishlist::remove_from_wishlist),
        )
        .route("/api/v1/courses/{id}/share", post(share::create_share_link))
        .route("/api/v1/courses/{id}/share/stats", get(share::share_stats))
        // Calendar
        .route(
            "/api/v1/calendar",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route("/api/v1/calendar/upcoming", get(calendar::upcoming_events))
        .route(
            "/api/v1/calendar/{event_id}",
            put(calendar::update_event).delete(calendar::delete_event),
        )
        // Video
        .route(
            "/api/v1/lessons/{lesson_id}/bookmarks",
            get(video::list_bookmarks).post(video::add_bookmark),
        )
        .route("/api/v1/bookmarks/{bookmark_id}", delete(video::delete_bookmark))
        .route(
            "/api/v1/lessons/{lesson_id}/notes",
            get(video::list_notes).post(video::add_note),
        )
        .route(
            "/api/v1/notes/{note_id}",
            put(video::update_note).delete(video::delete_note),
        )
        .route(
            "/api/v1/lessons/{lesson_id}/watch-progress",
            get(video::get_watch_progress).put(video::save_watch_progress),
        )
        // Whiteboards
        .route(
            "/api/v1/courses/{id}/whiteboards",
            get(whiteboard::list_whiteboards).post(whiteboard::create_whiteboard),
        )
        .route("/api/v1/whiteboards/{board_id}", get(whiteboard::get_whiteboard))
        .route(
            "/api/v1/whiteboards/{board_id}/actions",
            get(whiteboard::list_actions)
                .post(whiteboard::append_action)
                .delete(whiteboard::clear_whiteboard),
        )
        .route("/api/v1/whiteboards/{board_id}/lock", put(whiteboard::set_locked))
        // Media
        .route(
            "/api/v1/media/files",
            post(media::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1)),
        )
        .route("/api/v1/media/videos", post(media::request_video_upload))
        .route("/api/v1/media/{asset_id}", delete(media::delete_asset))
        .route("/api/v1/media/{asset_id}/refresh", post(media::refresh_video_status))
        .route("/api/v1/media/{asset_id}/playback", get(media::get_playback))
        .route("/api/v1/courses/{id}/media", get(media::list_course_media))
        .route("/api/v1/courses/{id}/live", post(media::start_live_stream))
        // Payments, coupons, bundles, subscriptions
        .route("/api/v1/payments", post(payments::create_payment))
        .route("/api/v1/payments/me", get(payments::my_payments))
        .route("/api/v1/payments/{payment_id}", get(payments::get_payment))
        .route("/api/v1/payments/{payment_id}/complete", post(payments::complete_payment))
        .route("/api/v1/payments/{payment_id}/fail", post(payments::fail_payment))
        .route("/api/v1/payments/{payment_id}/refund", post(payments::refund_payment))
        .route("/api/v1/lessons/{lesson_id}/purchase", post(payments::purchase_lesson))
        .route(
            "/api/v1/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route("/api/v1/coupons/validate", get(coupons::validate_coupon))
        .route("/api/v1/coupons/{coupon_id}/deactivate", post(coupons::deactivate_coupon))
        .route("/api/v1/bundles", post(bundles::create_bundle))
        .route("/api/v1/bundles/{bundle_id}", delete(bundles::delete_bundle))
        .route("/api/v1/bundles/{bundle_id}/courses", post(bundles::add_bundle_course))
        .route(
            "/api/v1/bundles/{bundle_id}/courses/{course_id}",
            delete(bundles::remove_bundle_course),
        )
        .route("/api/v1/bundles/{bundle_id}/purchase", post(bundles::purchase_bundle))
        .route("/api/v1/subscriptions", post(subscriptions::subscribe))
        .route(
            "/api/v1/subscriptions/me",
            get(subscriptions::my_subscription).delete(subscriptions::cancel_subscription),
        )
        // Earnings and referrals
        .route("/api/v1/teachers/{teacher_id}/earnings", get(earnings::list_earnings))
        .route(
            "/api/v1/teachers/{teacher_id}/earnings/summary",
            get(earnings::earnings_summary),
        )
        .route(
            "/api/v1/teachers/{teacher_id}/payout",
            get(earnings::preview_payout).post(earnings::mark_period_paid),
        )
        .route("/api/v1/referrals/code", get(referrals::my_referral_code))
        .route("/api/v1/referrals/stats", get(referrals::referral_stats))
        // Imports
        .route(
            "/api/v1/imports",
            get(imports::list_imports).post(imports::start_import),
        )
        .route("/api/v1/imports/providers", get(imports::list_providers))
        .route("/api/v1/imports/{job_id}", get(imports::get_import))
        .route("/api/v1/imports/{job_id}/cancel", post(imports::cancel_import))
        // Dashboards and recommendations
        .route("/api/v1/dashboard/student", get(dashboard::student_dashboard))
        .route("/api/v1/dashboard/teacher", get(dashboard::teacher_dashboard))
        .route("/api/v1/dashboard/admin", get(dashboard::admin_overview))
        .route("/api/v1/recommendations", get(recommendations::stored_recommendations))
        .route(
            "/api/v1/recommendations/refresh",
            post(recommendations::refresh_recommendations),
        )
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
}

/// Create the API router with all routes.
///
/// Rate limiting is applied by the server, since it keys on the peer address.
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .merge(public_routes())
        .merge(optional_auth_routes(state.auth.clone()))
        .merge(protected_routes(state.auth.clone()))
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
