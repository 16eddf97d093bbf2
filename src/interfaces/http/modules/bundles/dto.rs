use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::bundles::NewBundle;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBundleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 90))]
    pub discount_percent: i32,
    #[validate(length(min = 2, message = "a bundle needs at least two courses"))]
    pub course_ids: Vec<String>,
}

impl From<CreateBundleRequest> for NewBundle {
    fn from(r: CreateBundleRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            discount_percent: r.discount_percent,
            course_ids: r.course_ids,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BundleCourseRequest {
    #[validate(length(min = 1))]
    pub course_id: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct PurchaseBundleRequest {
    #[validate(length(min = 1, max = 64))]
    pub coupon_code: Option<String>,
}
