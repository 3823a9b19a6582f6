use mediadesk_core::{Acl, ClientConfig, ElementContext};

/// Upload settings for one host element (the drop/click zone).
#[derive(Clone, Debug)]
pub struct UploadOptions {
    /// Application upload endpoint, or a credential endpoint (`/api/auth/`)
    /// for direct-to-storage uploads.
    pub upload_url: Option<String>,
    /// Key prefix under which files are stored (direct uploads).
    pub media_prefix: String,
    pub acl: Option<Acl>,
    /// Multipart field name of the file.
    pub param_name: String,
    pub max_file_size_mb: u64,
    /// Host element; its `data-*` attributes travel with every upload and
    /// `data-complete-url` names the completion endpoint.
    pub host: ElementContext,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upload_url: None,
            media_prefix: String::new(),
            acl: None,
            param_name: "file".to_string(),
            max_file_size_mb: 250,
            host: ElementContext::new("div"),
        }
    }
}

impl UploadOptions {
    pub fn from_config(config: &ClientConfig, host: ElementContext) -> Self {
        let upload_url = config
            .upload_url
            .clone()
            .or_else(|| Some(config.media_url.clone()));
        let acl = match (&config.acl, &upload_url) {
            (Some(acl), _) => Some(*acl),
            (None, Some(url)) if url.contains("public=1") => Some(Acl::PublicRead),
            _ => None,
        };
        Self {
            upload_url,
            media_prefix: config.media_prefix.clone(),
            acl,
            max_file_size_mb: config.max_upload_size_mb,
            host,
            ..Self::default()
        }
    }

    pub fn complete_url(&self) -> Option<&str> {
        self.host.data("complete-url").filter(|url| !url.is_empty())
    }

    pub fn is_direct(&self) -> bool {
        self.upload_url
            .as_deref()
            .map(|url| url.contains("/api/auth/"))
            .unwrap_or(false)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Normalize a storage key prefix: no leading `/`, trailing `/` when non-empty.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
