//! Mediadesk Gallery Library
//!
//! Headless model of the sidebar media gallery: the ordered item list, the
//! exclusive selection and its contextual panel, and the operations that
//! mutate them (list, tag, delete, preview, drop on a placeholder, upload
//! completion). Other widgets follow the gallery through a typed broadcast
//! channel of [`GalleryEvent`]s.
//!
//! The backend is the source of truth: a successful list fully replaces the
//! items, and cached tags only change from a tag call's response.

pub mod events;
pub mod gallery;
pub mod item;
pub mod options;
pub mod panel;

pub use events::{GalleryEvent, GalleryEvents, PreviewKind};
pub use gallery::{Gallery, ListTicket};
pub use item::{GalleryItem, ItemVariant, SelectionPanel};
pub use options::GalleryOptions;
pub use panel::{PanelAction, PanelToggle};
