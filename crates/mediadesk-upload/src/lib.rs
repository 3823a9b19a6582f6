//! Mediadesk Upload Library
//!
//! Delivers files picked or dropped by the user to their destination and
//! reports per-file progress plus exactly one terminal outcome per file.
//!
//! Two routes exist:
//!
//! - **same-origin**: multipart POST of the file, the CSRF token and the host
//!   element's `data-*` attributes to the application's upload endpoint;
//! - **direct-to-storage**: a credential bundle is fetched once from an
//!   `/api/auth/` endpoint, then each file is POSTed straight to the storage
//!   bucket with those credentials. Storage does not answer with application
//!   metadata, so the location is synthesized and optionally reported to a
//!   completion URL whose response becomes the final payload.
//!
//! Nothing is retried automatically.

pub mod coordinator;
pub mod direct;
pub mod file;
pub mod options;
pub mod progress;

pub use coordinator::{UploadMode, UploadObserver, UploadOutcome, Uploader};
pub use direct::DirectTarget;
pub use file::UploadFile;
pub use options::UploadOptions;
pub use progress::ProgressTracker;
