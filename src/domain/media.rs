use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    #[sea_orm(string_value = "FILE")]
    File,
    #[sea_orm(string_value = "VIDEO")]
    Video,
    #[sea_orm(string_value = "LIVE")]
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    #[sea_orm(string_value = "UPLOADING")]
    Uploading,
    #[sea_orm(string_value = "READY")]
    Ready,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "DELETED")]
    Deleted,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::File => "FILE",
            Self::Video => "VIDEO",
            Self::Live => "LIVE",
        })
    }
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Uploading => "UPLOADING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
            Self::Deleted => "DELETED",
        })
    }
}

impl MediaStatus {
    /// Map a Cloudflare Stream processing state onto an asset status.
    pub fn from_stream_state(state: &str) -> Self {
        match state {
            "ready" => Self::Ready,
            "error" => Self::Failed,
            _ => Self::Uploading,
        }
    }
}

pub fn validate_upload(size_bytes: usize) -> DomainResult<()> {
    if size_bytes == 0 {
        return Err(DomainError::validation("File is empty"));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(DomainError::validation("File exceeds the 100 MiB upload limit"));
    }
    Ok(())
}

/// Object key `{owner}/{asset}/{sanitised file name}`.
pub fn object_key(owner_id: &str, asset_id: &str, file_name: &str) -> String {
    let clean: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = if clean.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        clean
    };
    format!("{}/{}/{}", owner_id, asset_id, clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limits() {
        assert!(validate_upload(0).is_err());
        assert!(validate_upload(MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_upload(MAX_UPLOAD_BYTES + 1).is_err());
    }

    #[test]
    fn keys_are_sanitised() {
        assert_eq!(object_key("u", "a", "my notes (v2).pdf"), "u/a/my_notes__v2_.pdf");
        assert_eq!(object_key("u", "a", "///"), "u/a/file");
    }

    #[test]
    fn stream_states() {
        assert_eq!(MediaStatus::from_stream_state("ready"), MediaStatus::Ready);
        assert_eq!(MediaStatus::from_stream_state("inprogress"), MediaStatus::Uploading);
        assert_eq!(MediaStatus::from_stream_state("error"), MediaStatus::Failed);
    }
}
