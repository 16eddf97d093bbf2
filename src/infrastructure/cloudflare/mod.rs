//! Cloudflare adapters: R2 object storage and Stream video

pub mod r2;
pub mod sigv4;
pub mod stream;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::errors::InfraResult;

pub use r2::R2ObjectStore;
pub use stream::CloudflareStream;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> InfraResult<()>;

    async fn delete_object(&self, key: &str) -> InfraResult<()>;

    /// Time-limited GET url for a private object.
    fn presigned_get_url(&self, key: &str, expires_in: Duration) -> String;

    /// CDN url when the bucket is fronted by a public domain.
    fn public_url(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectUpload {
    pub uid: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStatus {
    pub uid: String,
    /// Provider processing state, e.g. "pendingupload", "inprogress", "ready", "error"
    pub state: String,
    pub ready_to_stream: bool,
    pub duration_seconds: Option<f64>,
    pub playback_hls: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveInput {
    pub uid: String,
    pub rtmps_url: String,
    pub stream_key: String,
}

#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn create_direct_upload(&self, max_duration_seconds: u32) -> InfraResult<DirectUpload>;

    async fn video_status(&self, uid: &str) -> InfraResult<VideoStatus>;

    async fn delete_video(&self, uid: &str) -> InfraResult<()>;

    async fn create_live_input(&self, name: &str) -> InfraResult<LiveInput>;

    async fn delete_live_input(&self, uid: &str) -> InfraResult<()>;
}
