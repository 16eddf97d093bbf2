//! Course completion certificates

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::email::{certificate_issued, EmailService};
use super::enrollment::find_enrollment;
use super::{load_course, load_user, new_id};
use crate::domain::certificate::verification_code;
use crate::domain::enrollment::EnrollmentStatus;
use crate::domain::Actor;
use crate::infrastructure::database::entities::{certificate, course, user};
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
pub struct IssuedCertificate {
    #[serde(flatten)]
    pub certificate: certificate::Model,
    pub already_issued: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateVerification {
    pub certificate: certificate::Model,
    pub course_title: String,
    pub student_name: String,
}

pub struct CertificateService {
    db: DatabaseConnection,
    email: Arc<EmailService>,
}

impl CertificateService {
    pub fn new(db: DatabaseConnection, email: Arc<EmailService>) -> Self {
        Self { db, email }
    }

    /// Issue a certificate for a completed course. Repeated calls return the first one.
    pub async fn issue(&self, actor: &Actor, course_id: &str) -> DomainResult<IssuedCertificate> {
        if let Some(existing) = self.find(&actor.user_id, course_id).await? {
            return Ok(IssuedCertificate {
                certificate: existing,
                already_issued: true,
            });
        }
        let completed = find_enrollment(&self.db, &actor.user_id, course_id)
            .await?
            .is_some_and(|e| e.status == EnrollmentStatus::Completed);
        if !completed {
            return Err(DomainError::validation("Course must be completed before a certificate is issued"));
        }
        let course = load_course(&self.db, course_id).await?;

        let issued_at = Utc::now();
        let created = certificate::ActiveModel {
            id: Set(new_id()),
            student_id: Set(actor.user_id.clone()),
            course_id: Set(course_id.to_string()),
            verification_code: Set(verification_code(&actor.user_id, course_id, issued_at)),
            issued_at: Set(issued_at),
            pdf_url: Set(None),
        }
        .insert(&self.db)
        .await?;
        info!(certificate_id = %created.id, course_id, student_id = %actor.user_id, "Certificate issued");

        if let Some(student) = best_effort("load_student", load_user(&self.db, &actor.user_id)).await {
            best_effort(
                "certificate_email",
                self.email.send(certificate_issued(
                    &student.email,
                    &student.username,
                    &course.title,
                    &created.verification_code,
                )),
            )
            .await;
        }
        Ok(IssuedCertificate {
            certificate: created,
            already_issued: false,
        })
    }

    /// Public lookup by verification code.
    pub async fn verify(&self, code: &str) -> DomainResult<CertificateVerification> {
        let code = code.trim().to_uppercase();
        let found = certificate::Entity::find()
            .filter(certificate::Column::VerificationCode.eq(&code))
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Certificate",
                field: "verification_code",
                value: code.clone(),
            })?;
        let course_title = course::Entity::find_by_id(found.course_id.clone())
            .one(&self.db)
            .await?
            .map(|c| c.title)
            .unwrap_or_default();
        let student_name = user::Entity::find_by_id(found.student_id.clone())
            .one(&self.db)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();
        Ok(CertificateVerification {
            certificate: found,
            course_title,
            student_name,
        })
    }

    pub async fn list_for_student(&self, student_id: &str) -> DomainResult<Vec<certificate::Model>> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::StudentId.eq(student_id))
            .order_by_desc(certificate::Column::IssuedAt)
            .all(&self.db)
            .await?)
    }

    async fn find(&self, student_id: &str, course_id: &str) -> DomainResult<Option<certificate::Model>> {
        Ok(certificate::Entity::find()
            .filter(certificate::Column::StudentId.eq(student_id))
            .filter(certificate::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?)
    }
}
