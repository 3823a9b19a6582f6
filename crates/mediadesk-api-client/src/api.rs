//! Domain calls on top of the HTTP façade.
//!
//! [`MediaEndpoint`] and [`SourceEndpoint`] bind an [`ApiClient`] to a
//! configured endpoint and implement the backend traits the widgets use.

use async_trait::async_trait;
use mediadesk_core::{ClientError, Detail, MediaList, SourceFile, TagUpdate};
use serde_json::{json, Value};

use crate::backend::{ElementBackend, MediaBackend, SourceBackend};
use crate::messages::MessageStyle;
use crate::{ApiClient, RequestOptions};

#[async_trait]
impl ElementBackend for ApiClient {
    async fn save_element(&self, url: &str, payload: Value) -> Result<Value, ClientError> {
        self.put(RequestOptions::new(url).body(payload)).await
    }
}

impl ApiClient {
    /// POST to `<url><id>/` to trigger a test notification and show the
    /// returned detail as an info message.
    pub async fn notification_test(&self, url: &str, id: &str) -> Result<Detail, ClientError> {
        let path = format!("{}{}/", url, id);
        match self.post(RequestOptions::new(path)).await {
            Ok(body) => {
                let detail: Detail = if body.is_null() {
                    Detail::default()
                } else {
                    serde_json::from_value(body)?
                };
                if let Some(message) = &detail.detail {
                    self.messages().show_one(message.clone(), MessageStyle::Info);
                }
                Ok(detail)
            }
            Err(err) => {
                self.messages().show_error(&err);
                Err(err)
            }
        }
    }
}

/// The media collection endpoint (`GET/PUT/DELETE <media_url>`).
#[derive(Clone, Debug)]
pub struct MediaEndpoint {
    client: ApiClient,
    media_url: String,
}

impl MediaEndpoint {
    pub fn new(client: ApiClient, media_url: impl Into<String>) -> Self {
        Self {
            client,
            media_url: media_url.into(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }
}

#[async_trait]
impl ElementBackend for MediaEndpoint {
    async fn save_element(&self, url: &str, payload: Value) -> Result<Value, ClientError> {
        self.client.save_element(url, payload).await
    }
}

#[async_trait]
impl MediaBackend for MediaEndpoint {
    async fn list_media(&self, filter: Option<&str>) -> Result<MediaList, ClientError> {
        let mut options = RequestOptions::new(self.media_url.clone());
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            options = options.query("q", filter);
        }
        let body = self.client.get(options).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn tag_media(&self, location: &str, tags: &[String]) -> Result<MediaList, ClientError> {
        let update = TagUpdate::single(location, tags.to_vec());
        let body = self
            .client
            .put(RequestOptions::new(self.media_url.clone()).body(serde_json::to_value(update)?))
            .await?;
        if body.is_null() {
            return Ok(MediaList::default());
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn delete_media(&self, location: &str) -> Result<Detail, ClientError> {
        let body = self
            .client
            .delete(RequestOptions::new(self.media_url.clone()).query("location", location))
            .await?;
        if body.is_null() {
            return Ok(Detail::default());
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// The source file endpoint (`GET/PUT/POST <sources_url><path>`).
#[derive(Clone, Debug)]
pub struct SourceEndpoint {
    client: ApiClient,
    sources_url: String,
}

impl SourceEndpoint {
    pub fn new(client: ApiClient, sources_url: impl Into<String>) -> Self {
        Self {
            client,
            sources_url: sources_url.into(),
        }
    }

    fn path_for(&self, path: &str) -> String {
        format!("{}{}", self.sources_url, path)
    }
}

#[async_trait]
impl SourceBackend for SourceEndpoint {
    async fn load_source(&self, path: &str) -> Result<SourceFile, ClientError> {
        let body = self.client.get(RequestOptions::new(self.path_for(path))).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn save_source(&self, path: &str, text: &str) -> Result<Value, ClientError> {
        self.client
            .put(RequestOptions::new(self.path_for(path)).body(json!({"path": path, "text": text})))
            .await
    }

    async fn create_source(&self, path: &str, text: &str) -> Result<Value, ClientError> {
        self.client
            .post(RequestOptions::new(self.path_for(path)).body(json!({"path": path, "text": text})))
            .await
    }

    fn sources_url(&self) -> String {
        self.client.build_url(&self.sources_url)
    }
}
