//! Backend abstraction traits
//!
//! Widgets talk to the backend through these traits rather than to
//! [`crate::ApiClient`] directly, so the gallery and editors can run against
//! any implementation (HTTP, or an in-memory fake in tests).

use async_trait::async_trait;
use mediadesk_core::{ClientError, Detail, MediaList, SourceFile};
use serde_json::Value;

/// Saves the content of an editable page element.
#[async_trait]
pub trait ElementBackend: Send + Sync {
    /// PUT `payload` to the element's URL and return the response body.
    async fn save_element(&self, url: &str, payload: Value) -> Result<Value, ClientError>;
}

/// Media collection endpoint.
#[async_trait]
pub trait MediaBackend: ElementBackend {
    /// GET the asset collection, optionally filtered by a free-text query.
    async fn list_media(&self, filter: Option<&str>) -> Result<MediaList, ClientError>;

    /// PUT the full replacement tag set of the asset at `location`.
    async fn tag_media(&self, location: &str, tags: &[String]) -> Result<MediaList, ClientError>;

    /// DELETE the asset at `location`.
    async fn delete_media(&self, location: &str) -> Result<Detail, ClientError>;
}

/// Source file endpoint used by the template editors.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    async fn load_source(&self, path: &str) -> Result<SourceFile, ClientError>;

    async fn save_source(&self, path: &str, text: &str) -> Result<Value, ClientError>;

    async fn create_source(&self, path: &str, text: &str) -> Result<Value, ClientError>;

    /// Fully-qualified URL of the sources endpoint.
    fn sources_url(&self) -> String;
}
