use mediadesk_core::{AcceptedExtensions, Acl, ClientConfig};
use serde_json::Value;

/// Icon shown for assets that are neither an accepted image nor video.
pub const DOCUMENT_ICON: &str = "/static/img/generic-document.png";

#[derive(Clone, Debug)]
pub struct GalleryOptions {
    pub accepted: AcceptedExtensions,
    /// With `public-read`, item locations are normalized when rendered.
    pub acl: Option<Acl>,
    /// Base URL an asset dropped on a placeholder is saved under.
    pub save_dropped_media_url: Option<String>,
    /// Extra `hints` sent along with dropped media.
    pub hints: Option<Value>,
    pub document_icon: String,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            accepted: AcceptedExtensions::default(),
            acl: None,
            save_dropped_media_url: None,
            hints: None,
            document_icon: DOCUMENT_ICON.to_string(),
        }
    }
}

impl GalleryOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        let public = config
            .upload_url
            .as_deref()
            .map(|url| config.is_direct_upload() && url.contains("?public=1"))
            .unwrap_or(false);
        Self {
            accepted: config.accepted_extensions(),
            acl: if public { Some(Acl::PublicRead) } else { config.acl },
            ..Self::default()
        }
    }
}
