//! Mediadesk Core Library
//!
//! This crate provides the domain models, error types, configuration and page
//! context shared by the mediadesk widgets (API client, uploader, gallery and
//! editors).

pub mod config;
pub mod context;
pub mod error;
pub mod location;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use context::{ElementContext, PageContext, SessionStorage};
pub use error::{ClientError, ErrorMetadata, FailureKind, LogLevel};
pub use location::{join_path, location_extension, media_location};
pub use models::{
    parse_tags, AcceptedExtensions, Acl, AssetKind, AssetRef, CredentialBundle, Detail,
    MediaAsset, MediaList, SourceFile, TagUpdate, UploadResponse,
};
