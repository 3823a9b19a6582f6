//! Domain models for the media gallery, uploader and source editors.

pub mod asset;
pub mod credentials;
pub mod source;

pub use asset::{
    parse_tags, AcceptedExtensions, AssetKind, AssetRef, Detail, MediaAsset, MediaList,
    TagUpdate, UploadResponse,
};
pub use credentials::{Acl, CredentialBundle};
pub use source::SourceFile;
