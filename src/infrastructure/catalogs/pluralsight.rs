//! Pluralsight content API (bearer API key)

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, CourseCatalog};
use crate::config::CatalogsConfig;
use crate::domain::course_import::{ExternalCourse, ExternalLesson, ImportProvider};
use crate::shared::errors::InfraResult;

pub struct PluralsightCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PsCourse {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    modules: Vec<PsModule>,
}

#[derive(Debug, Deserialize)]
struct PsModule {
    title: String,
    #[serde(default)]
    clips: Vec<PsClip>,
}

#[derive(Debug, Deserialize)]
struct PsClip {
    title: String,
    /// Seconds
    #[serde(default)]
    duration: Option<i32>,
}

impl PluralsightCatalog {
    pub fn new(client: reqwest::Client, config: &CatalogsConfig) -> Self {
        Self {
            client,
            base_url: config.pluralsight_base_url.trim_end_matches('/').to_string(),
            api_key: config.pluralsight_api_key.clone(),
        }
    }
}

/// Clips flatten into lessons titled `module: clip`.
fn flatten(modules: Vec<PsModule>) -> Vec<ExternalLesson> {
    modules
        .into_iter()
        .flat_map(|m| {
            let module_title = m.title;
            m.clips.into_iter().map(move |clip| ExternalLesson {
                title: format!("{}: {}", module_title, clip.title),
                content: None,
                video_url: None,
                duration_seconds: clip.duration.unwrap_or(0),
            })
        })
        .collect()
}

#[async_trait]
impl CourseCatalog for PluralsightCatalog {
    fn provider(&self) -> ImportProvider {
        ImportProvider::Pluralsight
    }

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse> {
        let course: PsCourse = fetch_json(
            "pluralsight",
            self.client
                .get(format!(
                    "{}/courses/{}",
                    self.base_url,
                    urlencoding::encode(external_id)
                ))
                .bearer_auth(&self.api_key),
        )
        .await?;

        Ok(ExternalCourse {
            provider: ImportProvider::Pluralsight,
            external_id: external_id.to_string(),
            title: course.title,
            description: course.description,
            category: course.category,
            thumbnail_url: course.image_url,
            lessons: flatten(course.modules),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_modules() {
        let raw = r#"{"title":"Rust","modules":[
            {"title":"Basics","clips":[{"title":"Hello","duration":60},{"title":"Types"}]},
            {"title":"Async","clips":[{"title":"Tokio","duration":300}]}
        ]}"#;
        let course: PsCourse = serde_json::from_str(raw).unwrap();
        let lessons = flatten(course.modules);
        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons[0].title, "Basics: Hello");
        assert_eq!(lessons[2].duration_seconds, 300);
    }
}
