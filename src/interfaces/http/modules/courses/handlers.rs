//! Courses, modules, lessons and course monetization

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{
    CreateCourseRequest, CreateLessonRequest, CreateModuleRequest, ListCoursesParams, ReorderLessonsRequest,
    SetMonetizationRequest, UpdateCourseRequest, UpdateLessonRequest,
};
use crate::application::services::courses::{CourseFilter, ModuleWithLessons};
use crate::application::services::lesson_payment::LessonAccess;
use crate::application::AppServices;
use crate::domain::course::{CourseLevel, CourseStatus};
use crate::domain::monetization::{AccessDecision, MonetizationType};
use crate::infrastructure::database::entities::{course, course_module, lesson};
use crate::interfaces::http::common::{
    created, ok, parse_enum, ApiResult, CreatedResult, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::errors::DomainError;
use crate::shared::pagination::PaginationParams;

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    params(ListCoursesParams),
    responses(
        (status = 200, description = "Course page; only published courses unless the caller owns the listing"),
        (status = 403, description = "Non-published listing of another teacher")
    )
)]
pub async fn list_courses(
    State(app): State<AppServices>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(params): Query<ListCoursesParams>,
) -> ApiResult<PaginatedResponse<course::Model>> {
    let status = match params.status.as_deref() {
        Some(raw) => parse_enum::<CourseStatus>(raw)?,
        None => CourseStatus::Published,
    };
    if status != CourseStatus::Published {
        let allowed = user.as_ref().is_some_and(|Extension(u)| {
            u.is_admin() || params.teacher_id.as_deref() == Some(u.user_id.as_str())
        });
        if !allowed {
            return Err(DomainError::forbidden("Only published courses are listed publicly").into());
        }
    }

    let filter = CourseFilter {
        status: Some(status),
        category: params.category,
        level: params.level.as_deref().map(parse_enum::<CourseLevel>).transpose()?,
        teacher_id: params.teacher_id,
        search: params.search,
    };
    let page = app
        .courses
        .list(filter, PaginationParams::new(params.page, params.limit))
        .await?;
    ok(page.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(State(app): State<AppServices>, Path(id): Path<String>) -> ApiResult<course::Model> {
    ok(app.courses.get(&id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/by-slug/{slug}",
    tag = "Courses",
    params(("slug" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Course"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_by_slug(
    State(app): State<AppServices>,
    Path(slug): Path<String>,
) -> ApiResult<course::Model> {
    ok(app.courses.get_by_slug(&slug).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Draft course created"),
        (status = 403, description = "Teacher role required")
    )
)]
pub async fn create_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<CreateCourseRequest>,
) -> CreatedResult<course::Model> {
    let input = req.into_new_course()?;
    created(app.courses.create_course(&user.actor(), input).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn update_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCourseRequest>,
) -> ApiResult<course::Model> {
    let changes = req.into_changes()?;
    ok(app.courses.update(&user.actor(), &id, changes).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/publish",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course published"),
        (status = 400, description = "Course has no lessons")
    )
)]
pub async fn publish_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<course::Model> {
    ok(app.courses.publish(&user.actor(), &id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/archive",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Course archived"))
)]
pub async fn archive_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<course::Model> {
    ok(app.courses.archive(&user.actor(), &id).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 409, description = "Course has enrollments")
    )
)]
pub async fn delete_course(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    app.courses.delete(&user.actor(), &id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/modules",
    tag = "Courses",
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Modules with their ordered lessons"))
)]
pub async fn list_modules(
    State(app): State<AppServices>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ModuleWithLessons>> {
    ok(app.courses.list_modules(&id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/modules",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateModuleRequest,
    responses((status = 201, description = "Module appended"))
)]
pub async fn add_module(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateModuleRequest>,
) -> CreatedResult<course_module::Model> {
    created(app.courses.add_module(&user.actor(), &id, &req.title).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/lessons",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("module_id" = String, Path, description = "Module ID")),
    request_body = CreateLessonRequest,
    responses((status = 201, description = "Lesson appended to the module"))
)]
pub async fn add_lesson(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(module_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateLessonRequest>,
) -> CreatedResult<lesson::Model> {
    created(app.courses.add_lesson(&user.actor(), &module_id, req.into()).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/modules/{module_id}/lessons/order",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("module_id" = String, Path, description = "Module ID")),
    request_body = ReorderLessonsRequest,
    responses(
        (status = 200, description = "Lessons in their new order"),
        (status = 400, description = "Ids do not match the module's lessons")
    )
)]
pub async fn reorder_lessons(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(module_id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReorderLessonsRequest>,
) -> ApiResult<Vec<lesson::Model>> {
    ok(app
        .courses
        .reorder_lessons(&user.actor(), &module_id, &req.lesson_ids)
        .await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{lesson_id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses((status = 200, description = "Lesson updated"))
)]
pub async fn update_lesson(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateLessonRequest>,
) -> ApiResult<lesson::Model> {
    ok(app.courses.update_lesson(&user.actor(), &lesson_id, req.into()).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{lesson_id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    responses((status = 200, description = "Lesson deleted"))
)]
pub async fn delete_lesson(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
) -> ApiResult<EmptyData> {
    app.courses.delete_lesson(&user.actor(), &lesson_id).await?;
    ok(EmptyData {})
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/access",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("lesson_id" = String, Path, description = "Lesson ID")),
    responses((status = 200, description = "Whether the caller may open the lesson, and why"))
)]
pub async fn lesson_access(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(lesson_id): Path<String>,
) -> ApiResult<LessonAccess> {
    ok(app.lesson_payment.has_access(&user.actor(), &lesson_id).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/monetization",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = SetMonetizationRequest,
    responses(
        (status = 200, description = "Monetization changed"),
        (status = 400, description = "Premium course without a price")
    )
)]
pub async fn set_monetization(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetMonetizationRequest>,
) -> ApiResult<course::Model> {
    let kind = parse_enum::<MonetizationType>(&req.monetization_type)?;
    ok(app
        .monetization
        .set_course_monetization(&user.actor(), &id, kind, req.price_cents)
        .await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/access",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Access decision for the caller"))
)]
pub async fn course_access(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<AccessDecision> {
    ok(app.monetization.check_access(&user.actor(), &id).await?)
}

