//! Cloudflare Stream: direct creator uploads, video status and live inputs

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DirectUpload, LiveInput, VideoProvider, VideoStatus};
use crate::config::StreamConfig;
use crate::shared::errors::{InfraError, InfraResult};

pub struct CloudflareStream {
    client: reqwest::Client,
    base: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DirectUploadResult {
    uid: String,
    #[serde(rename = "uploadURL")]
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct VideoResult {
    uid: String,
    #[serde(rename = "readyToStream", default)]
    ready_to_stream: bool,
    #[serde(default)]
    status: Option<VideoState>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    playback: Option<Playback>,
}

#[derive(Debug, Deserialize)]
struct VideoState {
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Playback {
    hls: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LiveInputResult {
    uid: String,
    rtmps: Rtmps,
}

#[derive(Debug, Deserialize)]
struct Rtmps {
    url: String,
    #[serde(rename = "streamKey")]
    stream_key: String,
}

fn unwrap_envelope<T>(status: u16, raw: &str) -> InfraResult<T>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_str(raw)?;
    match envelope.result {
        Some(result) if envelope.success => Ok(result),
        _ => Err(InfraError::Upstream {
            service: "stream",
            status,
            body: envelope
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        }),
    }
}

impl From<VideoResult> for VideoStatus {
    fn from(v: VideoResult) -> Self {
        Self {
            uid: v.uid,
            state: v.status.map(|s| s.state).unwrap_or_default(),
            ready_to_stream: v.ready_to_stream,
            // Stream reports -1 until the duration is known
            duration_seconds: v.duration.filter(|d| *d >= 0.0),
            playback_hls: v.playback.and_then(|p| p.hls),
        }
    }
}

impl CloudflareStream {
    pub fn new(config: &StreamConfig) -> InfraResult<Self> {
        if !config.is_configured() {
            return Err(InfraError::NotConfigured("stream"));
        }
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            base: format!(
                "{}/accounts/{}/stream",
                config.api_base.trim_end_matches('/'),
                config.account_id
            ),
            api_token: config.api_token.clone(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> InfraResult<T> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status().as_u16();
        let raw = response.text().await?;
        unwrap_envelope(status, &raw)
    }

    /// DELETE where an already missing resource counts as deleted.
    async fn delete(&self, url: String) -> InfraResult<()> {
        let response = self.client.delete(url).bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        if status.is_success() || status.as_u16() == 404 {
            Ok(())
        } else {
            Err(InfraError::Upstream {
                service: "stream",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl VideoProvider for CloudflareStream {
    async fn create_direct_upload(&self, max_duration_seconds: u32) -> InfraResult<DirectUpload> {
        let result: DirectUploadResult = self
            .send(
                self.client
                    .post(format!("{}/direct_upload", self.base))
                    .json(&json!({ "maxDurationSeconds": max_duration_seconds })),
            )
            .await?;
        debug!(uid = %result.uid, "Created Stream direct upload");
        Ok(DirectUpload {
            uid: result.uid,
            upload_url: result.upload_url,
        })
    }

    async fn video_status(&self, uid: &str) -> InfraResult<VideoStatus> {
        let result: VideoResult = self
            .send(self.client.get(format!("{}/{}", self.base, uid)))
            .await?;
        Ok(result.into())
    }

    async fn delete_video(&self, uid: &str) -> InfraResult<()> {
        self.delete(format!("{}/{}", self.base, uid)).await
    }

    async fn create_live_input(&self, name: &str) -> InfraResult<LiveInput> {
        let result: LiveInputResult = self
            .send(self.client.post(format!("{}/live_inputs", self.base)).json(&json!({
                "meta": { "name": name },
                "recording": { "mode": "automatic" }
            })))
            .await?;
        Ok(LiveInput {
            uid: result.uid,
            rtmps_url: result.rtmps.url,
            stream_key: result.rtmps.stream_key,
        })
    }

    async fn delete_live_input(&self, uid: &str) -> InfraResult<()> {
        self.delete(format!("{}/live_inputs/{}", self.base, uid)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_video_status() {
        let raw = r#"{"success":true,"errors":[],"result":{"uid":"v1","readyToStream":true,
            "status":{"state":"ready"},"duration":12.5,"playback":{"hls":"https://x/v1.m3u8"}}}"#;
        let v: VideoResult = unwrap_envelope(200, raw).unwrap();
        let status = VideoStatus::from(v);
        assert_eq!(status.state, "ready");
        assert!(status.ready_to_stream);
        assert_eq!(status.duration_seconds, Some(12.5));
        assert_eq!(status.playback_hls.as_deref(), Some("https://x/v1.m3u8"));
    }

    #[test]
    fn unknown_duration_is_none() {
        let raw = r#"{"success":true,"result":{"uid":"v1","duration":-1}}"#;
        let v: VideoResult = unwrap_envelope(200, raw).unwrap();
        assert_eq!(VideoStatus::from(v).duration_seconds, None);
    }

    #[test]
    fn api_errors_become_upstream() {
        let raw = r#"{"success":false,"errors":[{"code":10000,"message":"Authentication error"}],"result":null}"#;
        let err = unwrap_envelope::<DirectUploadResult>(403, raw).unwrap_err();
        assert!(err.to_string().contains("10000: Authentication error"));
    }

    #[test]
    fn parses_live_input() {
        let raw = r#"{"success":true,"result":{"uid":"li1","rtmps":{"url":"rtmps://live.cloudflare.com:443/live/","streamKey":"abc"}}}"#;
        let r: LiveInputResult = unwrap_envelope(200, raw).unwrap();
        assert_eq!(r.rtmps.stream_key, "abc");
    }
}
