//! Direct-to-storage target derived from a credential bundle.

use mediadesk_core::{Acl, ClientError, CredentialBundle};
use reqwest::Url;

use crate::file::UploadFile;
use crate::options::normalize_prefix;

const AMZ_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Where and how files are POSTed when uploading straight to storage.
#[derive(Clone, Debug)]
pub struct DirectTarget {
    /// Bucket endpoint, `scheme://host[:port]/`.
    pub storage_url: String,
    /// Key prefix, no leading `/`, trailing `/` when non-empty.
    pub media_prefix: String,
    pub credentials: CredentialBundle,
    pub acl: Option<Acl>,
}

impl DirectTarget {
    /// The bundle's location, resolved against the page `document`, names
    /// the bucket endpoint (its origin) and the key prefix (its path). The
    /// configured prefix applies when the location has no path of its own.
    pub fn from_bundle(
        document: &Url,
        credentials: CredentialBundle,
        configured_prefix: &str,
        acl: Option<Acl>,
    ) -> Result<Self, ClientError> {
        let location = document.join(&credentials.location).map_err(|e| {
            ClientError::Config(format!(
                "Invalid storage location {}: {}",
                credentials.location, e
            ))
        })?;
        let storage_url = format!("{}/", location.origin().ascii_serialization());
        let derived = normalize_prefix(location.path());
        let media_prefix = if derived.is_empty() {
            normalize_prefix(configured_prefix)
        } else {
            derived
        };
        let acl = acl.or(credentials.acl);
        Ok(Self {
            storage_url,
            media_prefix,
            credentials,
            acl,
        })
    }

    pub fn key_for(&self, file_name: &str) -> String {
        format!("{}{}", self.media_prefix, file_name)
    }

    /// Location the object is reachable at once stored.
    pub fn location_for(&self, file_name: &str) -> String {
        format!("{}{}", self.storage_url, self.key_for(file_name))
    }

    /// Form fields sent ahead of the file part, in order.
    pub fn form_fields(&self, file: &UploadFile) -> Vec<(&'static str, String)> {
        let creds = &self.credentials;
        let mut fields = vec![
            ("key", self.key_for(&file.name)),
            ("policy", creds.policy.clone()),
            ("x-amz-algorithm", AMZ_ALGORITHM.to_string()),
        ];
        if let Some(credential) = &creds.x_amz_credential {
            fields.push(("x-amz-credential", credential.clone()));
        }
        if let Some(date) = &creds.x_amz_date {
            fields.push(("x-amz-date", date.clone()));
        }
        if let Some(token) = &creds.security_token {
            fields.push(("x-amz-security-token", token.clone()));
        }
        fields.push(("x-amz-signature", creds.signature.clone()));

        let acl = self.acl.unwrap_or_default();
        fields.push(("acl", acl.as_str().to_string()));
        match &creds.x_amz_server_side_encryption {
            Some(sse) => fields.push(("x-amz-server-side-encryption", sse.clone())),
            None if acl != Acl::PublicRead => {
                fields.push(("x-amz-server-side-encryption", "AES256".to_string()))
            }
            None => {}
        }
        fields.push(("Content-Type", file.content_type().to_string()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Url {
        Url::parse("https://www.example.com/pages/about/").unwrap()
    }

    fn bundle(location: &str) -> CredentialBundle {
        serde_json::from_value(json!({
            "location": location,
            "access_key": "AKIA",
            "policy": "cG9saWN5",
            "signature": "sig",
            "x_amz_credential": "AKIA/20240101/us-east-1/s3/aws4_request",
            "x_amz_date": "20240101T000000Z"
        }))
        .unwrap()
    }

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn private_upload_gets_aes256() {
        let target = DirectTarget::from_bundle(
            &page(),
            bundle("https://bucket.s3.amazonaws.com/"),
            "uploads/",
            None,
        )
        .unwrap();
        let fields = target.form_fields(&UploadFile::new("photo.jpg", vec![0u8; 4]));

        assert_eq!(field(&fields, "key"), Some("uploads/photo.jpg"));
        assert_eq!(field(&fields, "x-amz-server-side-encryption"), Some("AES256"));
        assert_eq!(field(&fields, "acl"), Some("private"));
        assert_eq!(field(&fields, "Content-Type"), Some("image/jpeg"));
        assert_eq!(field(&fields, "x-amz-algorithm"), Some("AWS4-HMAC-SHA256"));
        assert_eq!(
            target.location_for("photo.jpg"),
            "https://bucket.s3.amazonaws.com/uploads/photo.jpg"
        );
    }

    #[test]
    fn public_read_skips_encryption() {
        let target = DirectTarget::from_bundle(
            &page(),
            bundle("https://bucket.s3.amazonaws.com/"),
            "",
            Some(Acl::PublicRead),
        )
        .unwrap();
        let fields = target.form_fields(&UploadFile::new("clip.mp4", vec![0u8; 4]));
        assert_eq!(field(&fields, "acl"), Some("public-read"));
        assert_eq!(field(&fields, "x-amz-server-side-encryption"), None);
        assert_eq!(field(&fields, "Content-Type"), Some("video/mp4"));
    }

    #[test]
    fn bundle_encryption_is_forwarded() {
        let mut creds = bundle("https://bucket.s3.amazonaws.com/");
        creds.x_amz_server_side_encryption = Some("aws:kms".to_string());
        let target = DirectTarget::from_bundle(&page(), creds, "", Some(Acl::PublicRead)).unwrap();
        let fields = target.form_fields(&UploadFile::new("a.bin", vec![1]));
        assert_eq!(field(&fields, "x-amz-server-side-encryption"), Some("aws:kms"));
        assert_eq!(field(&fields, "Content-Type"), Some("binary/octet-stream"));
    }

    #[test]
    fn location_path_becomes_prefix() {
        let target = DirectTarget::from_bundle(
            &page(),
            bundle("https://bucket.s3.amazonaws.com/media/site"),
            "ignored/",
            None,
        )
        .unwrap();
        assert_eq!(target.storage_url, "https://bucket.s3.amazonaws.com/");
        assert_eq!(target.media_prefix, "media/site/");
    }

    #[test]
    fn relative_location_resolves_against_page() {
        let target = DirectTarget::from_bundle(&page(), bundle("/uploads/"), "", None).unwrap();
        assert_eq!(target.storage_url, "https://www.example.com/");
        assert_eq!(target.media_prefix, "uploads/");
        assert_eq!(
            target.location_for("photo.jpg"),
            "https://www.example.com/uploads/photo.jpg"
        );
    }

    #[test]
    fn unparsable_location_is_a_config_error() {
        let err = DirectTarget::from_bundle(&page(), bundle("http://[::1"), "", None).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
