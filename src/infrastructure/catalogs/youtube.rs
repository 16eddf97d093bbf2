//! YouTube Data API v3: a playlist imports as a course, its videos as lessons

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, CourseCatalog};
use crate::config::CatalogsConfig;
use crate::domain::course_import::{parse_iso_duration, ExternalCourse, ExternalLesson, ImportProvider};
use crate::shared::errors::{InfraError, InfraResult};

const MAX_PAGE_SIZE: u32 = 50;

pub struct YoutubeCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
    #[serde(default)]
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

impl YoutubeCatalog {
    pub fn new(client: reqwest::Client, config: &CatalogsConfig) -> Self {
        Self {
            client,
            base_url: config.youtube_base_url.trim_end_matches('/').to_string(),
            api_key: config.youtube_api_key.clone(),
        }
    }

    fn get(&self, resource: &str, params: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/{}", self.base_url, resource))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
    }

    async fn durations(&self, video_ids: &[String]) -> InfraResult<HashMap<String, i32>> {
        let mut out = HashMap::new();
        for chunk in video_ids.chunks(MAX_PAGE_SIZE as usize) {
            let ids = chunk.join(",");
            let videos: ListResponse<Video> = fetch_json(
                "youtube",
                self.get("videos", &[("part", "contentDetails"), ("id", &ids)]),
            )
            .await?;
            for v in videos.items {
                out.insert(v.id, parse_iso_duration(&v.content_details.duration));
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl CourseCatalog for YoutubeCatalog {
    fn provider(&self) -> ImportProvider {
        ImportProvider::Youtube
    }

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse> {
        let playlists: ListResponse<Playlist> = fetch_json(
            "youtube",
            self.get("playlists", &[("part", "snippet"), ("id", external_id)]),
        )
        .await?;
        let playlist = playlists.items.into_iter().next().ok_or(InfraError::Upstream {
            service: "youtube",
            status: 404,
            body: format!("playlist {} not found", external_id),
        })?;

        let page_size = MAX_PAGE_SIZE.to_string();
        let mut entries: Vec<(String, Snippet)> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![
                ("part", "snippet"),
                ("playlistId", external_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let page: ListResponse<PlaylistItem> =
                fetch_json("youtube", self.get("playlistItems", &params)).await?;
            for item in page.items {
                if let Some(video_id) = item
                    .snippet
                    .resource_id
                    .as_ref()
                    .and_then(|r| r.video_id.clone())
                {
                    entries.push((video_id, item.snippet));
                }
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let ids: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();
        let durations = self.durations(&ids).await?;

        let lessons = entries
            .into_iter()
            .map(|(video_id, snippet)| ExternalLesson {
                title: snippet.title,
                content: snippet.description,
                duration_seconds: durations.get(&video_id).copied().unwrap_or(0),
                video_url: Some(format!("https://www.youtube.com/watch?v={}", video_id)),
            })
            .collect();

        Ok(ExternalCourse {
            provider: ImportProvider::Youtube,
            external_id: external_id.to_string(),
            title: playlist.snippet.title,
            description: playlist.snippet.description,
            category: None,
            thumbnail_url: playlist
                .snippet
                .thumbnails
                .and_then(|t| t.high)
                .map(|t| t.url),
            lessons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_playlist_items_page() {
        let raw = r#"{"items":[{"snippet":{"title":"Ep 1","resourceId":{"videoId":"abc"}}}],
            "nextPageToken":"CAUQAA"}"#;
        let page: ListResponse<PlaylistItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        let vid = page.items[0].snippet.resource_id.as_ref().unwrap().video_id.clone();
        assert_eq!(vid.as_deref(), Some("abc"));
    }

    #[test]
    fn page_without_items_is_empty() {
        let playlists: ListResponse<Playlist> = serde_json::from_str("{}").unwrap();
        assert!(playlists.items.is_empty());
        assert!(playlists.next_page_token.is_none());
    }
}
