//! Private student questions answered by the course teacher

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::{AnswerRequest, AskRequest, QuestionFilter};
use crate::application::services::instructor_qa::QuestionThread;
use crate::application::AppServices;
use crate::domain::qa::QuestionStatus;
use crate::infrastructure::database::entities::instructor_question;
use crate::interfaces::http::common::{created, ok, parse_enum, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/questions",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = AskRequest,
    responses(
        (status = 201, description = "Question sent to the teacher"),
        (status = 403, description = "Not enrolled")
    )
)]
pub async fn ask(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AskRequest>,
) -> CreatedResult<instructor_question::Model> {
    created(app.instructor_qa.ask(&user.actor(), &id, req.lesson_id, &req.body).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/questions",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID"), QuestionFilter),
    responses((status = 200, description = "All questions for the teacher, own questions for a student"))
)]
pub async fn list_course_questions(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Query(filter): Query<QuestionFilter>,
) -> ApiResult<Vec<instructor_question::Model>> {
    let status = filter.status.as_deref().map(parse_enum::<QuestionStatus>).transpose()?;
    ok(app.instructor_qa.list_for_course(&user.actor(), &id, status).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/me",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Questions the caller asked"))
)]
pub async fn my_questions(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<instructor_question::Model>> {
    ok(app.instructor_qa.list_for_student(&user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{question_id}",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    params(("question_id" = String, Path, description = "Question ID")),
    responses((status = 200, description = "Question with answers"))
)]
pub async fn get_question(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(question_id): Path<String>,
) -> ApiResult<QuestionThread> {
    ok(app.instructor_qa.get(&user.actor(), &question_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{question_id}/answers",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    params(("question_id" = String, Path, description = "Question ID")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer stored; question is ANSWERED"),
        (status = 403, description = "Only the course teacher answers")
    )
)]
pub async fn answer(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(question_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AnswerRequest>,
) -> ApiResult<QuestionThread> {
    ok(app.instructor_qa.answer(&user.actor(), &question_id, &req.body).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{question_id}/close",
    tag = "Instructor Q&A",
    security(("bearer_auth" = [])),
    params(("question_id" = String, Path, description = "Question ID")),
    responses((status = 200, description = "Question closed"))
)]
pub async fn close_question(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(question_id): Path<String>,
) -> ApiResult<instructor_question::Model> {
    ok(app.instructor_qa.close(&user.actor(), &question_id).await?)
}
