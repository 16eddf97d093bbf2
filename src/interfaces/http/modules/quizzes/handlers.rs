//! Quizzes, questions and graded attempts

use axum::extract::{Path, State};
use axum::Extension;

use super::dto::{CreateQuestionRequest, CreateQuizRequest, SubmitAttemptRequest};
use crate::application::services::quizzes::{AttemptResult, QuizView};
use crate::application::AppServices;
use crate::infrastructure::database::entities::{quiz, quiz_attempt, quiz_question};
use crate::interfaces::http::common::{created, ok, ApiResult, CreatedResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/quizzes",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateQuizRequest,
    responses((status = 201, description = "Quiz created"))
)]
pub async fn create_quiz(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateQuizRequest>,
) -> CreatedResult<quiz::Model> {
    created(app.quizzes.create_quiz(&user.actor(), &id, req.into()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/quizzes",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Quizzes of the course"))
)]
pub async fn list_quizzes(State(app): State<AppServices>, Path(id): Path<String>) -> ApiResult<Vec<quiz::Model>> {
    ok(app.quizzes.list_for_course(&id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = String, Path, description = "Quiz ID")),
    responses((status = 200, description = "Quiz with questions; answers only for the owner"))
)]
pub async fn get_quiz(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<String>,
) -> ApiResult<QuizView> {
    ok(app.quizzes.get(&user.actor(), &quiz_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/questions",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = String, Path, description = "Quiz ID")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question appended"),
        (status = 400, description = "Answer key does not fit the question kind")
    )
)]
pub async fn add_question(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateQuestionRequest>,
) -> CreatedResult<quiz_question::Model> {
    let input = req.into_new_question()?;
    created(app.quizzes.add_question(&user.actor(), &quiz_id, input).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = String, Path, description = "Quiz ID")),
    responses(
        (status = 201, description = "Attempt started"),
        (status = 400, description = "Maximum number of attempts reached")
    )
)]
pub async fn start_attempt(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<String>,
) -> CreatedResult<quiz_attempt::Model> {
    created(app.quizzes.start_attempt(&user.actor(), &quiz_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("quiz_id" = String, Path, description = "Quiz ID")),
    responses((status = 200, description = "Own attempts, or every attempt for the owner"))
)]
pub async fn list_attempts(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<String>,
) -> ApiResult<Vec<quiz_attempt::Model>> {
    ok(app.quizzes.list_attempts(&user.actor(), &quiz_id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/attempts/{attempt_id}/submit",
    tag = "Quizzes",
    security(("bearer_auth" = [])),
    params(("attempt_id" = String, Path, description = "Attempt ID")),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 200, description = "Graded attempt; late submissions score zero"),
        (status = 409, description = "Attempt already submitted")
    )
)]
pub async fn submit_attempt(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(attempt_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubmitAttemptRequest>,
) -> ApiResult<AttemptResult> {
    ok(app
        .quizzes
        .submit_attempt(&user.actor(), &attempt_id, req.answers)
        .await?)
}
