//! Udemy Affiliate API (HTTP basic auth with client id and secret)

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use super::{fetch_json, CourseCatalog};
use crate::config::CatalogsConfig;
use crate::domain::course_import::{ExternalCourse, ExternalLesson, ImportProvider};
use crate::shared::errors::InfraResult;

pub struct UdemyCatalog {
    client: reqwest::Client,
    base_url: String,
    authorization: String,
}

#[derive(Debug, Deserialize)]
struct UdemyCourse {
    title: String,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_480x270: Option<String>,
    #[serde(default)]
    primary_category: Option<UdemyCategory>,
}

#[derive(Debug, Deserialize)]
struct UdemyCategory {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CurriculumPage {
    results: Vec<CurriculumItem>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurriculumItem {
    #[serde(rename = "_class")]
    class: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    asset: Option<UdemyAsset>,
}

#[derive(Debug, Deserialize)]
struct UdemyAsset {
    #[serde(default)]
    time_estimation: Option<i32>,
}

impl UdemyCatalog {
    pub fn new(client: reqwest::Client, config: &CatalogsConfig) -> Self {
        let credentials = format!("{}:{}", config.udemy_client_id, config.udemy_client_secret);
        Self {
            client,
            base_url: config.udemy_base_url.trim_end_matches('/').to_string(),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
    }
}

fn lectures(items: Vec<CurriculumItem>) -> impl Iterator<Item = ExternalLesson> {
    items
        .into_iter()
        .filter(|item| item.class == "lecture")
        .map(|item| ExternalLesson {
            title: item.title,
            content: item.description,
            video_url: None,
            duration_seconds: item.asset.and_then(|a| a.time_estimation).unwrap_or(0),
        })
}

#[async_trait]
impl CourseCatalog for UdemyCatalog {
    fn provider(&self) -> ImportProvider {
        ImportProvider::Udemy
    }

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse> {
        let id = urlencoding::encode(external_id);
        let course: UdemyCourse = fetch_json(
            "udemy",
            self.get(&format!(
                "{}/courses/{}/?fields[course]=title,headline,description,image_480x270,primary_category",
                self.base_url, id
            )),
        )
        .await?;

        let mut lessons = Vec::new();
        let mut next = Some(format!(
            "{}/courses/{}/public-curriculum-items/?page_size=100",
            self.base_url, id
        ));
        while let Some(url) = next.take() {
            let page: CurriculumPage = fetch_json("udemy", self.get(&url)).await?;
            lessons.extend(lectures(page.results));
            next = page.next;
        }

        Ok(ExternalCourse {
            provider: ImportProvider::Udemy,
            external_id: external_id.to_string(),
            title: course.title,
            description: course.description.or(course.headline),
            category: course.primary_category.map(|c| c.title),
            thumbnail_url: course.image_480x270,
            lessons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_lectures() {
        let raw = r#"{"results":[
            {"_class":"chapter","title":"Intro"},
            {"_class":"lecture","title":"Welcome","asset":{"time_estimation":120}},
            {"_class":"quiz","title":"Check"}
        ],"next":null}"#;
        let page: CurriculumPage = serde_json::from_str(raw).unwrap();
        let lessons: Vec<ExternalLesson> = lectures(page.results).collect();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].title, "Welcome");
        assert_eq!(lessons[0].duration_seconds, 120);
    }

    #[test]
    fn basic_auth_header() {
        let mut cfg = CatalogsConfig::default();
        cfg.udemy_client_id = "id".into();
        cfg.udemy_client_secret = "secret".into();
        let c = UdemyCatalog::new(reqwest::Client::new(), &cfg);
        assert_eq!(c.authorization, "Basic aWQ6c2VjcmV0");
    }
}
