use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::location::location_extension;

/// Media kind, inferred from the file extension of an asset location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Unknown,
}

/// A stored file (image, video or other) keyed by its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MediaAsset {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self, accepted: &AcceptedExtensions) -> AssetKind {
        accepted.classify(&self.location)
    }
}

/// GET/PUT media collection response: `{"results": [{location, tags}], ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaList {
    #[serde(default)]
    pub results: Vec<MediaAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Reference to an asset inside a tag update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub location: String,
}

/// PUT body replacing the tag set of one or more assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagUpdate {
    pub items: Vec<AssetRef>,
    pub tags: Vec<String>,
}

impl TagUpdate {
    pub fn single(location: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            items: vec![AssetRef {
                location: location.into(),
            }],
            tags,
        }
    }
}

/// `{"detail": "..."}` acknowledgement returned by mutating calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detail {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Final payload of an upload: the asset location plus whatever else the
/// completion endpoint chose to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadResponse {
    pub fn from_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn asset(&self) -> Option<MediaAsset> {
        self.location.as_ref().map(|location| MediaAsset {
            location: location.clone(),
            tags: self.tags.clone().unwrap_or_default(),
        })
    }
}

/// Accepted extension lists used to pick the image/video/unknown variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedExtensions {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl Default for AcceptedExtensions {
    fn default() -> Self {
        Self {
            images: vec![".jpg".into(), ".png".into(), ".gif".into()],
            videos: vec![".mp4".into()],
        }
    }
}

impl AcceptedExtensions {
    /// Videos win over images when a location matches both lists.
    pub fn classify(&self, location: &str) -> AssetKind {
        match location_extension(location) {
            Some(ext) if Self::matches(&self.videos, &ext) => AssetKind::Video,
            Some(ext) if Self::matches(&self.images, &ext) => AssetKind::Image,
            _ => AssetKind::Unknown,
        }
    }

    pub fn is_image(&self, location: &str) -> bool {
        self.classify(location) == AssetKind::Image
    }

    pub fn is_video(&self, location: &str) -> bool {
        self.classify(location) == AssetKind::Video
    }

    fn matches(list: &[String], ext: &str) -> bool {
        list.iter().any(|accepted| accepted.eq_ignore_ascii_case(ext))
    }
}

/// Split a user-entered tag string on commas, trimming each entry.
///
/// Order is preserved; empty entries are dropped.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
