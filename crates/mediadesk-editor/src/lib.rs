//! Mediadesk Editor Library
//!
//! - [`SourceEditor`]: one code panel bound to a backend source file, loaded
//!   on demand and saved 250ms after the last edit.
//! - [`TemplateTabs`]: a tab container holding one source editor per
//!   template, plus the "new file" flow.
//! - [`InlineEditor`]: in-page editable elements (text, currency, date,
//!   range, media) persisted on blur.

pub mod debounce;
pub mod inline;
pub mod kinds;
pub mod source;
pub mod tabs;

pub use debounce::Debouncer;
pub use inline::{EditorOptions, InlineEditor};
pub use kinds::{CurrencyFormat, CurrencyPosition, EditorKind, RangeSpec};
pub use source::{SourceEditor, SourceEvent, SyntaxMode};
pub use tabs::{Navigation, TabPanel, TemplateTabs};
