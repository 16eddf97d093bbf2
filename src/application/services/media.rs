//! Uploaded files, Stream videos and live inputs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use super::{load_owned_course, new_id, required};
use crate::domain::media::{object_key, validate_upload, MediaKind, MediaStatus};
use crate::domain::Actor;
use crate::infrastructure::cloudflare::{DirectUpload, LiveInput, ObjectStore, VideoProvider};
use crate::infrastructure::database::entities::media_asset;
use crate::shared::best_effort;
use crate::shared::errors::{DomainError, DomainResult};

const PLAYBACK_URL_TTL: Duration = Duration::from_secs(3600);
const MAX_VIDEO_DURATION_SECONDS: u32 = 6 * 3600;

#[derive(Debug, Clone, Serialize)]
pub struct VideoUploadTicket {
    pub asset: media_asset::Model,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveStream {
    pub asset: media_asset::Model,
    pub rtmps_url: String,
    pub stream_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Playback {
    pub asset_id: String,
    pub kind: MediaKind,
    pub url: Option<String>,
}

pub struct MediaService {
    db: DatabaseConnection,
    object_store: Option<Arc<dyn ObjectStore>>,
    video: Option<Arc<dyn VideoProvider>>,
}

impl MediaService {
    pub fn new(
        db: DatabaseConnection,
        object_store: Option<Arc<dyn ObjectStore>>,
        video: Option<Arc<dyn VideoProvider>>,
    ) -> Self {
        Self {
            db,
            object_store,
            video,
        }
    }

    fn store(&self) -> DomainResult<&Arc<dyn ObjectStore>> {
        self.object_store
            .as_ref()
            .ok_or_else(|| DomainError::External("Object storage is not configured".into()))
    }

    fn stream(&self) -> DomainResult<&Arc<dyn VideoProvider>> {
        self.video
            .as_ref()
            .ok_or_else(|| DomainError::External("Video provider is not configured".into()))
    }

    /// Store a file in object storage. A failed upload leaves the asset FAILED.
    pub async fn upload_file(
        &self,
        actor: &Actor,
        course_id: Option<String>,
        file_name: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> DomainResult<media_asset::Model> {
        validate_upload(body.len())?;
        let file_name = required("file_name", file_name)?;
        if let Some(course_id) = &course_id {
            load_owned_course(&self.db, actor, course_id).await?;
        }
        let store = self.store()?.clone();

        let id = new_id();
        let key = object_key(&actor.user_id, &id, &file_name);
        let size = body.len() as i64;
        let asset = self
            .insert(actor, course_id, MediaKind::File, Some(key.clone()), None, Some(file_name), Some(content_type.to_string()), size, id)
            .await?;

        match store.put_object(&key, body, content_type).await {
            Ok(()) => {
                info!(asset_id = %asset.id, key, size, "File uploaded");
                self.set_status(asset, MediaStatus::Ready).await
            }
            Err(e) => {
                self.set_status(asset, MediaStatus::Failed).await?;
                Err(e.into())
            }
        }
    }

    /// Reserve a direct creator upload on the video provider.
    pub async fn request_video_upload(&self, actor: &Actor, course_id: Option<String>) -> DomainResult<VideoUploadTicket> {
        if let Some(course_id) = &course_id {
            load_owned_course(&self.db, actor, course_id).await?;
        } else {
            actor.ensure_teacher()?;
        }
        let DirectUpload { uid, upload_url } = self.stream()?.create_direct_upload(MAX_VIDEO_DURATION_SECONDS).await?;
        let asset = self
            .insert(actor, course_id, MediaKind::Video, None, Some(uid), None, None, 0, new_id())
            .await?;
        info!(asset_id = %asset.id, "Video upload reserved");
        Ok(VideoUploadTicket { asset, upload_url })
    }

    pub async fn refresh_video_status(&self, actor: &Actor, asset_id: &str) -> DomainResult<media_asset::Model> {
        let asset = self.owned(actor, asset_id).await?;
        let uid = match (&asset.kind, &asset.stream_uid) {
            (MediaKind::Video, Some(uid)) => uid.clone(),
            _ => return Err(DomainError::validation("Asset is not a video")),
        };
        let status = self.stream()?.video_status(&uid).await?;
        let next = MediaStatus::from_stream_state(&status.state);
        if next == asset.status {
            return Ok(asset);
        }
        self.set_status(asset, next).await
    }

    /// Create a live input; the RTMPS url and key are only returned here.
    pub async fn start_live_stream(&self, actor: &Actor, course_id: &str, name: &str) -> DomainResult<LiveStream> {
        load_owned_course(&self.db, actor, course_id).await?;
        let name = required("name", name)?;
        let LiveInput {
            uid,
            rtmps_url,
            stream_key,
        } = self.stream()?.create_live_input(&name).await?;
        let asset = self
            .insert(actor, Some(course_id.to_string()), MediaKind::Live, None, Some(uid), Some(name), None, 0, new_id())
            .await?;
        let asset = self.set_status(asset, MediaStatus::Ready).await?;
        info!(asset_id = %asset.id, course_id, "Live input created");
        Ok(LiveStream {
            asset,
            rtmps_url,
            stream_key,
        })
    }

    /// Signed URL for files, HLS manifest for videos.
    pub async fn get_playback(&self, asset_id: &str) -> DomainResult<Playback> {
        let asset = self.load(asset_id).await?;
        if asset.status != MediaStatus::Ready {
            return Err(DomainError::validation(format!("Asset is {}", asset.status)));
        }
        let url = match asset.kind {
            MediaKind::File => {
                let store = self.store()?;
                asset.object_key.as_deref().map(|key| {
                    store
                        .public_url(key)
                        .unwrap_or_else(|| store.presigned_get_url(key, PLAYBACK_URL_TTL))
                })
            }
            MediaKind::Video => match &asset.stream_uid {
                Some(uid) => self.stream()?.video_status(uid).await?.playback_hls,
                None => None,
            },
            MediaKind::Live => None,
        };
        Ok(Playback {
            asset_id: asset.id,
            kind: asset.kind,
            url,
        })
    }

    /// Remote deletion is best-effort; the row is always marked DELETED.
    pub async fn delete_asset(&self, actor: &Actor, asset_id: &str) -> DomainResult<media_asset::Model> {
        let asset = self.owned(actor, asset_id).await?;
        match (asset.kind, &asset.object_key, &asset.stream_uid) {
            (MediaKind::File, Some(key), _) => {
                if let Some(store) = &self.object_store {
                    best_effort("r2_delete", store.delete_object(key)).await;
                }
            }
            (MediaKind::Video, _, Some(uid)) => {
                if let Some(video) = &self.video {
                    best_effort("stream_delete", video.delete_video(uid)).await;
                }
            }
            (MediaKind::Live, _, Some(uid)) => {
                if let Some(video) = &self.video {
                    best_effort("live_input_delete", video.delete_live_input(uid)).await;
                }
            }
            _ => {}
        }
        info!(asset_id, "Media asset deleted");
        self.set_status(asset, MediaStatus::Deleted).await
    }

    pub async fn list_for_course(&self, course_id: &str) -> DomainResult<Vec<media_asset::Model>> {
        Ok(media_asset::Entity::find()
            .filter(media_asset::Column::CourseId.eq(course_id))
            .filter(media_asset::Column::Status.ne(MediaStatus::Deleted))
            .order_by_desc(media_asset::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        actor: &Actor,
        course_id: Option<String>,
        kind: MediaKind,
        object_key: Option<String>,
        stream_uid: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        size_bytes: i64,
        id: String,
    ) -> DomainResult<media_asset::Model> {
        let now = Utc::now();
        Ok(media_asset::ActiveModel {
            id: Set(id),
            owner_id: Set(actor.user_id.clone()),
            course_id: Set(course_id),
            kind: Set(kind),
            object_key: Set(object_key),
            stream_uid: Set(stream_uid),
            file_name: Set(file_name),
            content_type: Set(content_type),
            size_bytes: Set(size_bytes),
            status: Set(MediaStatus::Uploading),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?)
    }

    async fn set_status(&self, asset: media_asset::Model, status: MediaStatus) -> DomainResult<media_asset::Model> {
        let mut active: media_asset::ActiveModel = asset.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    async fn owned(&self, actor: &Actor, asset_id: &str) -> DomainResult<media_asset::Model> {
        let asset = self.load(asset_id).await?;
        actor.ensure_owns(&asset.owner_id, "media asset")?;
        Ok(asset)
    }

    async fn load(&self, asset_id: &str) -> DomainResult<media_asset::Model> {
        media_asset::Entity::find_by_id(asset_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Media asset", asset_id))
    }
}
