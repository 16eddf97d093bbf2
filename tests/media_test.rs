//! Media assets against a recording video provider.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use campus::application::services::MediaService;
use campus::domain::media::{MediaKind, MediaStatus};
use campus::domain::UserRole;
use campus::infrastructure::cloudflare::{DirectUpload, LiveInput, VideoProvider, VideoStatus};
use campus::shared::errors::InfraResult;

use common::{create_test_services, create_user, published_course};

#[derive(Default)]
struct RecordingStream {
    deleted_videos: Mutex<Vec<String>>,
    deleted_live_inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl VideoProvider for RecordingStream {
    async fn create_direct_upload(&self, _max_duration_seconds: u32) -> InfraResult<DirectUpload> {
        Ok(DirectUpload {
            uid: "video-1".to_string(),
            upload_url: "https://upload.test/video-1".to_string(),
        })
    }

    async fn video_status(&self, uid: &str) -> InfraResult<VideoStatus> {
        Ok(VideoStatus {
            uid: uid.to_string(),
            state: "ready".to_string(),
            ready_to_stream: true,
            duration_seconds: Some(60.0),
            playback_hls: None,
        })
    }

    async fn delete_video(&self, uid: &str) -> InfraResult<()> {
        self.deleted_videos.lock().unwrap().push(uid.to_string());
        Ok(())
    }

    async fn create_live_input(&self, _name: &str) -> InfraResult<LiveInput> {
        Ok(LiveInput {
            uid: "live-1".to_string(),
            rtmps_url: "rtmps://live.test/".to_string(),
            stream_key: "secret-key".to_string(),
        })
    }

    async fn delete_live_input(&self, uid: &str) -> InfraResult<()> {
        self.deleted_live_inputs.lock().unwrap().push(uid.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn deleting_a_live_asset_removes_the_live_input() {
    let app = create_test_services().await;
    let teacher = create_user(&app, "teacher", UserRole::Teacher).await;
    let course = published_course(&app, &teacher, "Live Rust", None).await;

    let stream = Arc::new(RecordingStream::default());
    let provider: Arc<dyn VideoProvider> = stream.clone();
    let media = MediaService::new(app.db.clone(), None, Some(provider));

    let live = media.start_live_stream(&teacher, &course.id, "Office hours").await.unwrap();
    assert_eq!(live.asset.kind, MediaKind::Live);
    assert_eq!(live.stream_key, "secret-key");

    let deleted = media.delete_asset(&teacher, &live.asset.id).await.unwrap();
    assert_eq!(deleted.status, MediaStatus::Deleted);
    assert_eq!(*stream.deleted_live_inputs.lock().unwrap(), vec!["live-1".to_string()]);
    assert!(stream.deleted_videos.lock().unwrap().is_empty());
}
