use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Video,
}

/// Events published by a gallery instance.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// A list response replaced the items.
    Loaded { count: usize },
    /// An item became the selection; `location` is its canonical location.
    Selected { location: String },
    Preview { src: String, kind: PreviewKind },
    Tagged { location: String, tags: Vec<String> },
    Deleted { location: String },
    UploadProgress { file_name: String, percent: u8 },
    Uploaded { location: String },
    /// An asset was dropped on a placeholder and saved.
    Dropped { slug: String, location: String },
    Opened,
    Closed,
}

/// Typed publish/subscribe channel for [`GalleryEvent`]s.
///
/// Publishing never blocks; events are dropped when nobody subscribes.
#[derive(Clone, Debug)]
pub struct GalleryEvents {
    tx: broadcast::Sender<GalleryEvent>,
}

impl Default for GalleryEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl GalleryEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: GalleryEvent) {
        tracing::debug!(event = ?event, "gallery event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }
}
