use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::payment::PurchaseTarget;
use crate::interfaces::http::common::ApiError;

/// Exactly one of `course_id` or `bundle_id`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePaymentRequest {
    pub course_id: Option<String>,
    pub bundle_id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub coupon_code: Option<String>,
}

impl CreatePaymentRequest {
    pub fn target(&self) -> Result<PurchaseTarget, ApiError> {
        match (&self.course_id, &self.bundle_id) {
            (Some(course), None) => Ok(PurchaseTarget::Course(course.clone())),
            (None, Some(bundle)) => Ok(PurchaseTarget::Bundle(bundle.clone())),
            _ => Err(ApiError::bad_request("Provide exactly one of course_id or bundle_id")),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CompletePaymentRequest {
    /// Reference from the payment provider
    #[validate(length(max = 128))]
    pub provider_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct LessonPurchaseRequest {
    #[validate(length(min = 1, max = 64))]
    pub coupon_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(course: Option<&str>, bundle: Option<&str>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            course_id: course.map(String::from),
            bundle_id: bundle.map(String::from),
            coupon_code: None,
        }
    }

    #[test]
    fn picks_the_single_target() {
        assert_eq!(req(Some("c-1"), None).target().unwrap(), PurchaseTarget::Course("c-1".into()));
        assert_eq!(req(None, Some("b-1")).target().unwrap(), PurchaseTarget::Bundle("b-1".into()));
    }

    #[test]
    fn rejects_zero_or_two_targets() {
        assert!(req(None, None).target().is_err());
        assert!(req(Some("c-1"), Some("b-1")).target().is_err());
    }
}
