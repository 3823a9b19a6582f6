use std::path::Path;

use bytes::Bytes;
use mediadesk_core::ClientError;

/// A file handed to the uploader (dropped, pasted or picked).
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        if path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(ClientError::InvalidInput(format!(
                "Invalid path: {}",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::InvalidInput(format!("Invalid file name: {}", path.display())))?
            .to_string();
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Content type storage should serve the object with.
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "mp4" => "video/mp4",
            _ => "binary/octet-stream",
        }
    }
}
