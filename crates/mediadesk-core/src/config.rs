//! Configuration module
//!
//! Client-side settings for the mediadesk widgets: where the site and its API
//! live, which endpoints serve media and sources, how uploads are routed and
//! which file extensions the gallery recognizes.

use std::env;

use reqwest::Url;

use crate::models::{AcceptedExtensions, Acl};

// Common constants
const API_BASE: &str = "/api";
const MEDIA_URL: &str = "/assets/";
const SOURCES_URL: &str = "/sources/";
const MAX_UPLOAD_SIZE_MB: u64 = 250;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client configuration shared by every widget of a page.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Document URL the widgets run under; locations are normalized against it.
    pub site_url: String,
    /// API prefix prepended to relative request paths.
    pub api_base: String,
    /// Media collection endpoint (list, tag, delete, same-origin upload).
    pub media_url: String,
    /// Source file endpoint used by the template editors.
    pub sources_url: String,
    /// Upload endpoint. When it contains `/api/auth/` it is a credential
    /// endpoint and uploads go directly to storage.
    pub upload_url: Option<String>,
    pub media_prefix: String,
    pub acl: Option<Acl>,
    /// CSRF token used when the page provides none.
    pub csrf_token: Option<String>,
    /// Bearer token seeded into session storage at startup.
    pub auth_token: Option<String>,
    pub accepted_images: Vec<String>,
    pub accepted_videos: Vec<String>,
    pub max_upload_size_mb: u64,
    pub request_timeout_secs: u64,
    /// Appended to 5xx error banners (e.g. "The operator has been notified.").
    pub provider_notified_hint: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let accepted = AcceptedExtensions::default();
        Self {
            site_url: "http://localhost:8000".to_string(),
            api_base: API_BASE.to_string(),
            media_url: MEDIA_URL.to_string(),
            sources_url: SOURCES_URL.to_string(),
            upload_url: None,
            media_prefix: String::new(),
            acl: None,
            csrf_token: None,
            auth_token: None,
            accepted_images: accepted.images,
            accepted_videos: accepted.videos,
            max_upload_size_mb: MAX_UPLOAD_SIZE_MB,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            provider_notified_hint: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();
        let config = Self {
            site_url: env::var("MEDIADESK_SITE_URL")
                .or_else(|_| env::var("SITE_URL"))
                .unwrap_or(defaults.site_url),
            api_base: env::var("MEDIADESK_API_BASE").unwrap_or(defaults.api_base),
            media_url: env::var("MEDIADESK_MEDIA_URL").unwrap_or(defaults.media_url),
            sources_url: env::var("MEDIADESK_SOURCES_URL").unwrap_or(defaults.sources_url),
            upload_url: env::var("MEDIADESK_UPLOAD_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            media_prefix: env::var("MEDIADESK_MEDIA_PREFIX").unwrap_or_default(),
            acl: match env::var("MEDIADESK_ACL").ok().filter(|s| !s.is_empty()) {
                Some(acl) => Some(acl.parse()?),
                None => None,
            },
            csrf_token: env::var("MEDIADESK_CSRF_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            auth_token: env::var("MEDIADESK_AUTH_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            accepted_images: env::var("MEDIADESK_ACCEPTED_IMAGES")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.accepted_images),
            accepted_videos: env::var("MEDIADESK_ACCEPTED_VIDEOS")
                .map(|s| split_list(&s))
                .unwrap_or(defaults.accepted_videos),
            max_upload_size_mb: env::var("MEDIADESK_MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
                .parse()
                .unwrap_or(MAX_UPLOAD_SIZE_MB),
            request_timeout_secs: env::var("MEDIADESK_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            provider_notified_hint: env::var("MEDIADESK_PROVIDER_NOTIFIED")
                .ok()
                .filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let site = Url::parse(&self.site_url)
            .map_err(|e| anyhow::anyhow!("MEDIADESK_SITE_URL is not a valid URL: {}", e))?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "MEDIADESK_SITE_URL must use http or https"
            ));
        }

        if !self.api_base.is_empty() && !self.api_base.starts_with('/') {
            return Err(anyhow::anyhow!("MEDIADESK_API_BASE must start with '/'"));
        }

        if self.media_url.is_empty() {
            return Err(anyhow::anyhow!("MEDIADESK_MEDIA_URL must not be empty"));
        }

        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!(
                "MEDIADESK_MAX_UPLOAD_SIZE_MB must be greater than 0"
            ));
        }

        for ext in self.accepted_images.iter().chain(&self.accepted_videos) {
            if !ext.starts_with('.') {
                return Err(anyhow::anyhow!(
                    "Accepted extensions must start with '.', got {}",
                    ext
                ));
            }
        }

        Ok(())
    }

    pub fn site(&self) -> Result<Url, anyhow::Error> {
        Url::parse(&self.site_url).map_err(|e| anyhow::anyhow!("Invalid site URL: {}", e))
    }

    pub fn accepted_extensions(&self) -> AcceptedExtensions {
        AcceptedExtensions {
            images: self.accepted_images.clone(),
            videos: self.accepted_videos.clone(),
        }
    }

    /// True when uploads go through a credential endpoint straight to storage.
    pub fn is_direct_upload(&self) -> bool {
        self.upload_url
            .as_deref()
            .map(|url| url.contains("/api/auth/"))
            .unwrap_or(false)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
