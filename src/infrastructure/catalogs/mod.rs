//! Third-party course catalogs used by course import
//!
//! Each client turns a provider's REST payloads into an [`ExternalCourse`].

pub mod coursera;
pub mod pluralsight;
pub mod udemy;
pub mod youtube;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::CatalogsConfig;
use crate::domain::course_import::{ExternalCourse, ImportProvider};
use crate::shared::errors::{InfraError, InfraResult};

pub use coursera::CourseraCatalog;
pub use pluralsight::PluralsightCatalog;
pub use udemy::UdemyCatalog;
pub use youtube::YoutubeCatalog;

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    fn provider(&self) -> ImportProvider;

    async fn fetch_course(&self, external_id: &str) -> InfraResult<ExternalCourse>;
}

/// Configured catalogs keyed by provider.
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    catalogs: HashMap<ImportProvider, Arc<dyn CourseCatalog>>,
}

impl CatalogRegistry {
    /// Register every provider that has credentials in `config`.
    pub fn from_config(config: &CatalogsConfig) -> InfraResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        let mut registry = Self::default();
        if !config.udemy_client_id.is_empty() {
            registry.register(Arc::new(UdemyCatalog::new(client.clone(), config)));
        }
        if !config.coursera_api_key.is_empty() {
            registry.register(Arc::new(CourseraCatalog::new(client.clone(), config)));
        }
        if !config.pluralsight_api_key.is_empty() {
            registry.register(Arc::new(PluralsightCatalog::new(client.clone(), config)));
        }
        if !config.youtube_api_key.is_empty() {
            registry.register(Arc::new(YoutubeCatalog::new(client, config)));
        }
        Ok(registry)
    }

    pub fn register(&mut self, catalog: Arc<dyn CourseCatalog>) {
        self.catalogs.insert(catalog.provider(), catalog);
    }

    pub fn get(&self, provider: ImportProvider) -> Option<Arc<dyn CourseCatalog>> {
        self.catalogs.get(&provider).cloned()
    }

    pub fn providers(&self) -> Vec<ImportProvider> {
        let mut list: Vec<ImportProvider> = self.catalogs.keys().copied().collect();
        list.sort_by_key(|p| p.as_str());
        list
    }
}

/// Send a request and decode a JSON body, mapping non-2xx replies to
/// [`InfraError::Upstream`].
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> InfraResult<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InfraError::Upstream {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configured_providers_are_registered() {
        let mut cfg = CatalogsConfig::default();
        cfg.youtube_api_key = "k".into();
        let registry = CatalogRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.providers(), vec![ImportProvider::Youtube]);
        assert!(registry.get(ImportProvider::Udemy).is_none());
    }
}
