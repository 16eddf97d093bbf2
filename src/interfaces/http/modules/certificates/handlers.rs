//! Certificate issuing and public verification

use axum::extract::{Path, State};
use axum::Extension;

use crate::application::services::certificates::{CertificateVerification, IssuedCertificate};
use crate::application::AppServices;
use crate::infrastructure::database::entities::certificate;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/certificate",
    tag = "Certificates",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Certificate; issuing twice returns the first one"),
        (status = 400, description = "Course not completed")
    )
)]
pub async fn issue_certificate(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<IssuedCertificate> {
    ok(app.certificates.issue(&user.actor(), &id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/me",
    tag = "Certificates",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's certificates"))
)]
pub async fn my_certificates(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<certificate::Model>> {
    ok(app.certificates.list_for_student(&user.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/verify/{code}",
    tag = "Certificates",
    params(("code" = String, Path, description = "Verification code, case-insensitive")),
    responses(
        (status = 200, description = "Certificate is genuine"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn verify_certificate(
    State(app): State<AppServices>,
    Path(code): Path<String>,
) -> ApiResult<CertificateVerification> {
    ok(app.certificates.verify(&code).await?)
}
