//! Cloudflare R2 through its S3-compatible API

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use tracing::debug;

use super::sigv4::{self, Credentials};
use super::ObjectStore;
use crate::config::StorageConfig;
use crate::shared::errors::{InfraError, InfraResult};

pub struct R2ObjectStore {
    client: reqwest::Client,
    credentials: Credentials,
    /// `https://host[:port]`
    origin: String,
    host: String,
    bucket: String,
    public_base_url: Option<String>,
}

impl R2ObjectStore {
    pub fn new(config: &StorageConfig) -> InfraResult<Self> {
        if !config.is_configured() {
            return Err(InfraError::NotConfigured("storage"));
        }
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.r2.cloudflarestorage.com", config.account_id));
        let url = Url::parse(&endpoint)
            .map_err(|e| InfraError::InvalidConfig(format!("Invalid storage endpoint {}: {}", endpoint, e)))?;
        let host_name = url.host_str().unwrap_or_default().to_string();
        let host = match url.port() {
            Some(port) => format!("{}:{}", host_name, port),
            None => host_name,
        };
        let origin = format!("{}://{}", url.scheme(), host);

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            credentials: Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
                region: "auto".to_string(),
                service: "s3".to_string(),
            },
            origin,
            host,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        })
    }

    fn object_path(&self, key: &str) -> String {
        format!("/{}/{}", self.bucket, key.trim_start_matches('/'))
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}{}", self.origin, sigv4::canonical_uri(&self.object_path(key)))
    }

    async fn check(response: reqwest::Response) -> InfraResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(InfraError::Upstream {
            service: "r2",
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ObjectStore for R2ObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> InfraResult<()> {
        let payload_hash = sigv4::sha256_hex(&body);
        let headers = sigv4::sign_request(
            &self.credentials,
            "PUT",
            &self.host,
            &self.object_path(key),
            &payload_hash,
            Utc::now(),
        );
        let mut request = self
            .client
            .put(self.object_url(key))
            .header("content-type", content_type);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        debug!(key, bytes = body.len(), "Uploading object");
        Self::check(request.body(body).send().await?).await
    }

    async fn delete_object(&self, key: &str) -> InfraResult<()> {
        let headers = sigv4::sign_request(
            &self.credentials,
            "DELETE",
            &self.host,
            &self.object_path(key),
            &sigv4::sha256_hex(b""),
            Utc::now(),
        );
        let mut request = self.client.delete(self.object_url(key));
        for (name, value) in headers {
            request = request.header(name, value);
        }
        Self::check(request.send().await?).await
    }

    fn presigned_get_url(&self, key: &str, expires_in: Duration) -> String {
        sigv4::presign_url(
            &self.credentials,
            "GET",
            &self.origin,
            &self.host,
            &self.object_path(key),
            expires_in.as_secs().clamp(1, 604_800),
            Utc::now(),
        )
    }

    fn public_url(&self, key: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            account_id: "acct".into(),
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            bucket: "media".into(),
            public_base_url: Some("https://cdn.example.com/".into()),
            endpoint: None,
        }
    }

    #[test]
    fn requires_credentials() {
        assert!(R2ObjectStore::new(&StorageConfig::default()).is_err());
    }

    #[test]
    fn builds_path_style_urls() {
        let store = R2ObjectStore::new(&config()).unwrap();
        assert_eq!(
            store.object_url("u/a/file name.pdf"),
            "https://acct.r2.cloudflarestorage.com/media/u/a/file%20name.pdf"
        );
        assert_eq!(
            store.public_url("u/a/x.pdf").as_deref(),
            Some("https://cdn.example.com/u/a/x.pdf")
        );
    }

    #[test]
    fn presigned_url_has_signature() {
        let store = R2ObjectStore::new(&config()).unwrap();
        let url = store.presigned_get_url("u/a/x.pdf", Duration::from_secs(900));
        assert!(url.starts_with("https://acct.r2.cloudflarestorage.com/media/u/a/x.pdf?"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn custom_endpoint_keeps_port() {
        let mut cfg = config();
        cfg.endpoint = Some("http://localhost:9000".into());
        let store = R2ObjectStore::new(&cfg).unwrap();
        assert_eq!(store.object_url("k"), "http://localhost:9000/media/k");
    }
}
