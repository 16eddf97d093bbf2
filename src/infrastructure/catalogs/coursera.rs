//! Coursera catalog API (bearer API key)

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, CourseCatalog};
use crate::config::CatalogsConfig;
use crate::domain::course_import::{ExternalCourse, ExternalLesson, ImportProvider};
use crate::shared::errors::{InfraError, InfraResult};

pub struct CourseraCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Elements<T> {
    elements: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseraCourse {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    domain_types: Vec<DomainType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainType {
    domain_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialItem {
    name: String,
    /// Milliseconds
    #[serde(default)]
    time_commitment: Option<i64>,
}

impl CourseraCatalog {
    pub fn new(client: reqwest::Client, config: &CatalogsConfig) -> Self {
        Self {
            client,
            base_url: config.coursera_base_url.trim_end_matches('/').to_string(),
            api_key: config.coursera_api_key.clone(),
        }
    }
}

fn to_lessons(items: Vec<MaterialItem>) -> Vec<ExternalLesson> {
    items
        .into_iter()
        .map(|item| ExternalLesson {
            title: item.name,
            content: None,
            video_url: None,
            duration_seconds: item.time_commitment.map(|ms| (ms / 1000) as i32).unwrap_or(0),
        })
        .collect()
}

#[async_trait]
impl CourseCatalog for CourseraCatalog {
    fn provider(&self) -> ImportProvider {
        ImportProvider::Coursera
    }

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse> {
        let slug = urlencoding::encode(external_id);
        let courses: Elements<CourseraCourse> = fetch_json(
            "coursera",
            self.client
                .get(format!(
                    "{}/courses.v1?q=slug&slug={}&fields=name,description,photoUrl,domainTypes",
                    self.base_url, slug
                ))
                .bearer_auth(&self.api_key),
        )
        .await?;
        let course = courses
            .elements
            .into_iter()
            .next()
            .ok_or(InfraError::Upstream {
                service: "coursera",
                status: 404,
                body: format!("course {} not found", external_id),
            })?;

        let items: Elements<MaterialItem> = fetch_json(
            "coursera",
            self.client
                .get(format!(
                    "{}/onDemandCourseMaterialItems.v2?q=bySlug&slug={}&fields=name,timeCommitment",
                    self.base_url, slug
                ))
                .bearer_auth(&self.api_key),
        )
        .await?;

        Ok(ExternalCourse {
            provider: ImportProvider::Coursera,
            external_id: external_id.to_string(),
            title: course.name,
            description: course.description,
            category: course.domain_types.into_iter().next().map(|d| d.domain_id),
            thumbnail_url: course.photo_url,
            lessons: to_lessons(items.elements),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_time_commitment_to_seconds() {
        let raw = r#"{"elements":[{"name":"Week 1","timeCommitment":600000},{"name":"Reading"}]}"#;
        let items: Elements<MaterialItem> = serde_json::from_str(raw).unwrap();
        let lessons = to_lessons(items.elements);
        assert_eq!(lessons[0].duration_seconds, 600);
        assert_eq!(lessons[1].duration_seconds, 0);
    }
}
