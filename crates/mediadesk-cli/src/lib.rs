use std::sync::Arc;

use anyhow::Context;
use mediadesk_api_client::{ApiClient, MediaEndpoint, MessageSurface, SourceEndpoint};
use mediadesk_core::{ClientConfig, ElementContext, PageContext};
use mediadesk_gallery::{Gallery, GalleryItem, GalleryOptions, ItemVariant};
use mediadesk_upload::{UploadOptions, Uploader};
use reqwest::Url;
use serde_json::{json, Value};

/// Everything a command needs: configuration, the page the widgets are
/// attached to and the shared API client.
pub struct Session {
    pub config: ClientConfig,
    pub client: ApiClient,
}

impl Session {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let document: Url = config.site()?;
        let page = PageContext::new(document);
        let messages = match &config.provider_notified_hint {
            Some(hint) => MessageSurface::new().with_provider_notified(hint.clone()),
            None => MessageSurface::new(),
        };
        let client = ApiClient::from_config(&config, page, messages)
            .context("Failed to create API client")?;
        Ok(Self { config, client })
    }

    pub fn messages(&self) -> &MessageSurface {
        self.client.messages()
    }

    pub fn media(&self) -> MediaEndpoint {
        MediaEndpoint::new(self.client.clone(), self.config.media_url.clone())
    }

    pub fn sources(&self) -> SourceEndpoint {
        SourceEndpoint::new(self.client.clone(), self.config.sources_url.clone())
    }

    pub fn gallery(&self) -> Gallery {
        Gallery::new(
            Arc::new(self.media()),
            self.client.page().url().clone(),
            self.messages().clone(),
            GalleryOptions::from_config(&self.config),
        )
    }

    pub async fn uploader(&self) -> anyhow::Result<Uploader> {
        let options = UploadOptions::from_config(&self.config, ElementContext::new("div"));
        Uploader::connect(self.client.clone(), options)
            .await
            .context("Failed to prepare upload")
    }
}

/// Select the listed item at `location`.
pub fn select_location(gallery: &mut Gallery, location: &str) -> anyhow::Result<String> {
    let position = gallery
        .items()
        .iter()
        .position(|item| item.location == location || item.src == location)
        .with_context(|| format!("No media at {}", location))?;
    Ok(gallery.select_at(position)?)
}

pub fn item_json(item: &GalleryItem) -> Value {
    let kind = match item.variant {
        ItemVariant::Image => "image",
        ItemVariant::Video => "video",
        ItemVariant::Document => "document",
    };
    json!({
        "id": item.id,
        "location": item.location,
        "kind": kind,
        "tags": item.tags,
        "selected": item.selected,
    })
}

/// Banners of the message surface, one line per message.
pub fn message_lines(messages: &MessageSurface) -> Vec<String> {
    messages
        .banners()
        .into_iter()
        .flat_map(|banner| {
            let class = banner.style.css_class();
            banner
                .messages
                .into_iter()
                .map(move |message| format!("[{}] {}", class, message))
        })
        .collect()
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediadesk_api_client::MessageStyle;

    fn config_for(server: &mockito::Server) -> ClientConfig {
        ClientConfig {
            site_url: server.url(),
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn list_then_select_by_location() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/assets/")
            .with_body(r#"{"results": [{"location": "/media/a.png", "tags": []}, {"location": "/media/b.pdf"}]}"#)
            .create_async()
            .await;

        let session = Session::new(config_for(&server)).unwrap();
        let mut gallery = session.gallery();
        gallery.list().await.unwrap();

        assert_eq!(select_location(&mut gallery, "/media/a.png").unwrap(), "/media/a.png");
        assert!(select_location(&mut gallery, "/media/missing.png").is_err());

        let listed: Vec<Value> = gallery.items().iter().map(item_json).collect();
        assert_eq!(listed[0]["kind"], "document");
        assert_eq!(listed[1]["selected"], true);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ClientConfig {
            site_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn message_lines_carry_style() {
        let messages = MessageSurface::new();
        messages.show_one("saved", MessageStyle::Success);
        messages.show_one("failed", MessageStyle::Error);
        assert_eq!(
            message_lines(&messages),
            vec!["[alert-success] saved", "[alert-danger] failed"]
        );
    }
}
