//! Course catalog DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::courses::{CourseChanges, LessonChanges, NewCourse, NewLesson};
use crate::domain::course::CourseLevel;
use crate::domain::monetization::MonetizationType;
use crate::interfaces::http::common::{parse_enum, ApiError};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// BEGINNER (default), INTERMEDIATE or ADVANCED
    pub level: Option<String>,
    #[validate(length(min = 2, max = 10))]
    #[serde(default = "default_language")]
    pub language: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub price_cents: i64,
    #[validate(length(equal = 3))]
    #[serde(default = "default_currency")]
    pub currency: String,
    /// FREE, PREMIUM (default when priced) or SUBSCRIPTION
    pub monetization_type: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CreateCourseRequest {
    pub fn into_new_course(self) -> Result<NewCourse, ApiError> {
        let level = match self.level.as_deref() {
            Some(raw) => parse_enum::<CourseLevel>(raw)?,
            None => CourseLevel::Beginner,
        };
        let monetization_type = match self.monetization_type.as_deref() {
            Some(raw) => parse_enum::<MonetizationType>(raw)?,
            None if self.price_cents > 0 => MonetizationType::Premium,
            None => MonetizationType::Free,
        };
        Ok(NewCourse {
            title: self.title,
            description: self.description,
            category: self.category,
            level,
            language: self.language,
            price_cents: self.price_cents,
            currency: self.currency.to_uppercase(),
            monetization_type,
            capacity: self.capacity,
            thumbnail_url: self.thumbnail_url,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    /// Set to a positive number to cap enrollments
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    /// Remove the enrollment cap
    #[serde(default)]
    pub unlimited_capacity: bool,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
}

impl UpdateCourseRequest {
    pub fn into_changes(self) -> Result<CourseChanges, ApiError> {
        let capacity = if self.unlimited_capacity {
            Some(None)
        } else {
            self.capacity.map(Some)
        };
        Ok(CourseChanges {
            title: self.title,
            description: self.description,
            category: self.category,
            level: self.level.as_deref().map(parse_enum::<CourseLevel>).transpose()?,
            language: self.language,
            price_cents: self.price_cents,
            capacity,
            thumbnail_url: self.thumbnail_url,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCoursesParams {
    /// DRAFT, PUBLISHED (default) or ARCHIVED
    pub status: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<String>,
    /// Substring of the title
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub content: Option<String>,
    /// Stream video uid
    pub video_uid: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub duration_seconds: i32,
    #[serde(default)]
    pub is_preview: bool,
    /// Price when sold on its own; 0 means not sold separately
    #[validate(range(min = 0))]
    #[serde(default)]
    pub price_cents: i64,
}

impl From<CreateLessonRequest> for NewLesson {
    fn from(r: CreateLessonRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            video_uid: r.video_uid,
            video_url: r.video_url,
            duration_seconds: r.duration_seconds,
            is_preview: r.is_preview,
            price_cents: r.price_cents,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_uid: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[validate(range(min = 0))]
    pub duration_seconds: Option<i32>,
    pub is_preview: Option<bool>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
}

impl From<UpdateLessonRequest> for LessonChanges {
    fn from(r: UpdateLessonRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            video_uid: r.video_uid,
            video_url: r.video_url,
            duration_seconds: r.duration_seconds,
            is_preview: r.is_preview,
            price_cents: r.price_cents,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReorderLessonsRequest {
    /// Every lesson id of the module, in the new order
    #[validate(length(min = 1))]
    pub lesson_ids: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetMonetizationRequest {
    /// FREE, PREMIUM or SUBSCRIPTION
    #[validate(length(min = 1))]
    pub monetization_type: String,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
}
