use mediadesk_core::AssetKind;

/// Rendered form of an item, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemVariant {
    Image,
    Video,
    /// Any other file, shown with the document icon.
    Document,
}

impl From<AssetKind> for ItemVariant {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Image => ItemVariant::Image,
            AssetKind::Video => ItemVariant::Video,
            AssetKind::Unknown => ItemVariant::Document,
        }
    }
}

/// One item node of the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: String,
    pub location: String,
    /// Thumbnail source: the location itself, or the document icon.
    pub src: String,
    pub tags: Vec<String>,
    pub variant: ItemVariant,
    pub selected: bool,
}

/// Contextual panel filled on selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPanel {
    pub preview_src: String,
    pub location: String,
    /// Tags as shown in the tag input, comma separated.
    pub tags: String,
}
