//! Gallery state machine.

use std::sync::Arc;

use mediadesk_api_client::{MediaBackend, MessageStyle, MessageSurface};
use mediadesk_core::{
    join_path, media_location, parse_tags, Acl, AssetKind, ClientError, ElementContext,
    MediaAsset, MediaList,
};
use mediadesk_upload::{UploadFile, UploadObserver, UploadOutcome, Uploader};
use reqwest::Url;
use serde_json::{json, Value};

use crate::events::{GalleryEvent, GalleryEvents, PreviewKind};
use crate::item::{GalleryItem, ItemVariant, SelectionPanel};
use crate::options::GalleryOptions;

/// Handle on one in-flight list request. Only the ticket of the most recent
/// request may replace the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    generation: u64,
    filter: Option<String>,
}

impl ListTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn fetch(&self, backend: &dyn MediaBackend) -> Result<MediaList, ClientError> {
        backend.list_media(self.filter.as_deref()).await
    }
}

pub struct Gallery {
    backend: Arc<dyn MediaBackend>,
    options: GalleryOptions,
    document: Url,
    messages: MessageSurface,
    events: GalleryEvents,
    /// Index 0 is the top of the list.
    items: Vec<GalleryItem>,
    selected: Option<String>,
    panel: Option<SelectionPanel>,
    filter: String,
    list_generation: u64,
    next_index: usize,
    open: bool,
}

impl Gallery {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        document: Url,
        messages: MessageSurface,
        options: GalleryOptions,
    ) -> Self {
        Self {
            backend,
            options,
            document,
            messages,
            events: GalleryEvents::default(),
            items: Vec::new(),
            selected: None,
            panel: None,
            filter: String::new(),
            list_generation: 0,
            next_index: 0,
            open: false,
        }
    }

    pub fn backend(&self) -> Arc<dyn MediaBackend> {
        self.backend.clone()
    }

    pub fn events(&self) -> &GalleryEvents {
        &self.events
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub fn messages(&self) -> &MessageSurface {
        &self.messages
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn panel(&self) -> Option<&SelectionPanel> {
        self.panel.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn selected(&self) -> Option<&GalleryItem> {
        let id = self.selected.as_deref()?;
        self.items.iter().find(|item| item.id == id)
    }

    /// Canonical location of the selected asset.
    pub fn selected_location(&self) -> Option<String> {
        self.selected().map(|item| self.location_of(item))
    }

    fn location_of(&self, item: &GalleryItem) -> String {
        media_location(&item.location, &self.document)
    }

    /// Start a list request with the current filter, superseding any
    /// request still in flight.
    pub fn begin_list(&mut self) -> ListTicket {
        self.list_generation += 1;
        let filter = Some(self.filter.trim().to_string()).filter(|f| !f.is_empty());
        ListTicket {
            generation: self.list_generation,
            filter,
        }
    }

    /// Apply the response of a list request. Returns `Ok(None)` when the
    /// request was superseded and its response discarded.
    pub fn finish_list(
        &mut self,
        ticket: ListTicket,
        result: Result<MediaList, ClientError>,
    ) -> Result<Option<usize>, ClientError> {
        let current = ticket.generation == self.list_generation;
        match result {
            Ok(list) if current => {
                self.items.clear();
                self.selected = None;
                self.panel = None;
                self.next_index = 0;
                for asset in list.results {
                    self.add_item(asset, true);
                }
                let count = self.items.len();
                tracing::info!(count, filter = ?ticket.filter, "Media list loaded");
                self.events.publish(GalleryEvent::Loaded { count });
                Ok(Some(count))
            }
            Ok(_) => {
                tracing::debug!(
                    generation = ticket.generation,
                    current = self.list_generation,
                    "Discarding stale media list"
                );
                Ok(None)
            }
            Err(err) => {
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }

    /// GET the asset collection and replace the items with it.
    pub async fn list(&mut self) -> Result<Option<usize>, ClientError> {
        let ticket = self.begin_list();
        let result = ticket.fetch(self.backend.as_ref()).await;
        self.finish_list(ticket, result)
    }

    /// Prepend one asset. Items not added by the initial load are selected.
    /// Returns the new item's id, unique until the next list.
    pub fn add_item(&mut self, asset: MediaAsset, initial: bool) -> String {
        let location = if self.options.acl == Some(Acl::PublicRead) {
            media_location(&asset.location, &self.document)
        } else {
            asset.location.clone()
        };
        let variant = ItemVariant::from(self.options.accepted.classify(&asset.location));
        let src = match variant {
            ItemVariant::Document => self.options.document_icon.clone(),
            _ => location.clone(),
        };
        let id = format!("image_{}", self.next_index);
        self.next_index += 1;
        self.items.insert(
            0,
            GalleryItem {
                id: id.clone(),
                location,
                src,
                tags: asset.tags,
                variant,
                selected: false,
            },
        );
        if !initial {
            if let Err(err) = self.select_at(0) {
                tracing::warn!(id = %id, error = %err, "Failed to select new media item");
            }
        }
        id
    }

    /// Exclusively select the item `id`, fill the panel and announce the
    /// selection. Returns the item's canonical location.
    pub fn select(&mut self, id: &str) -> Result<String, ClientError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ClientError::InvalidInput(format!("No media item {}", id)))?;
        self.select_at(position)
    }

    /// Select the item rendered at `position` (0 is the top).
    pub fn select_at(&mut self, position: usize) -> Result<String, ClientError> {
        let item = self
            .items
            .get(position)
            .ok_or_else(|| ClientError::InvalidInput(format!("No media item at {}", position)))?;
        let id = item.id.clone();
        let location = self.location_of(item);
        let panel = SelectionPanel {
            preview_src: item.src.clone(),
            location: location.clone(),
            tags: item.tags.join(","),
        };
        for item in &mut self.items {
            item.selected = item.id == id;
        }
        self.selected = Some(id);
        self.panel = Some(panel);
        self.events.publish(GalleryEvent::Selected {
            location: location.clone(),
        });
        Ok(location)
    }

    fn require_selection(&self) -> Result<(String, String), ClientError> {
        match self.selected() {
            Some(item) => Ok((item.id.clone(), self.location_of(item))),
            None => {
                let err = ClientError::NoSelection;
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }

    /// Replace the tags of the selected asset with the comma separated
    /// `input`. Cached tags change only once the backend accepted them.
    pub async fn tag_media(&mut self, input: &str) -> Result<Vec<String>, ClientError> {
        let (id, location) = self.require_selection()?;
        let tags = parse_tags(input);
        let list = match self.backend.tag_media(&location, &tags).await {
            Ok(list) => list,
            Err(err) => {
                self.messages.show_error(&err);
                return Err(err);
            }
        };

        let mut selected_updated = false;
        for result in &list.results {
            let target = media_location(&result.location, &self.document);
            for item in &mut self.items {
                if media_location(&item.location, &self.document) == target {
                    item.tags = result.tags.clone();
                    selected_updated |= item.id == id;
                }
            }
        }
        if !selected_updated {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                item.tags = tags.clone();
            }
        }

        let cached = self.selected().map(|item| item.tags.clone()).unwrap_or_default();
        if let Some(panel) = &mut self.panel {
            panel.tags = cached.join(",");
        }
        if let Some(detail) = list.detail {
            self.messages.show_one(detail, MessageStyle::Success);
        }
        tracing::info!(location = %location, tags = ?cached, "Media tagged");
        self.events.publish(GalleryEvent::Tagged {
            location,
            tags: cached.clone(),
        });
        Ok(cached)
    }

    /// DELETE the selected asset. On failure items and selection are left
    /// untouched.
    pub async fn delete_media(&mut self) -> Result<String, ClientError> {
        let (id, location) = self.require_selection()?;
        match self.backend.delete_media(&location).await {
            Ok(detail) => {
                self.items.retain(|item| item.id != id);
                self.selected = None;
                self.panel = None;
                if let Some(detail) = detail.detail {
                    self.messages.show_one(detail, MessageStyle::Success);
                }
                tracing::info!(location = %location, "Media deleted");
                self.events.publish(GalleryEvent::Deleted {
                    location: location.clone(),
                });
                Ok(location)
            }
            Err(err) => {
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }

    /// Announce a preview of the selected asset.
    pub fn preview_media(&self) -> Result<PreviewKind, ClientError> {
        let item = match self.selected() {
            Some(item) => item,
            None => {
                let err = ClientError::NoSelection;
                self.messages.show_error(&err);
                return Err(err);
            }
        };
        let kind = if self.options.accepted.is_video(&item.src) {
            PreviewKind::Video
        } else {
            PreviewKind::Image
        };
        self.events.publish(GalleryEvent::Preview {
            src: item.src.clone(),
            kind,
        });
        Ok(kind)
    }

    /// Drop the asset at `src` on an `<img>` or `<video>` placeholder: the
    /// placeholder takes the new source, which is saved under the
    /// configured dropped-media URL.
    pub async fn drop_on_placeholder(
        &self,
        placeholder: &mut ElementContext,
        src: &str,
    ) -> Result<Value, ClientError> {
        let location = media_location(src, &self.document);
        let (accepted, kind) = match placeholder.tag() {
            "img" => (&self.options.accepted.images, AssetKind::Image),
            "video" => (&self.options.accepted.videos, AssetKind::Video),
            other => {
                return Err(ClientError::InvalidInput(format!(
                    "<{}> is not a media placeholder",
                    other
                )))
            }
        };
        if self.options.accepted.classify(&location) != kind {
            let message = format!("This placeholder accepts only: {} files.", accepted.join(", "));
            self.messages.show_one(message.clone(), MessageStyle::Error);
            return Err(ClientError::InvalidInput(message));
        }

        placeholder.set_attr("src", location.clone());
        let base = self
            .options
            .save_dropped_media_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("no url to save dropped media".to_string()))?;
        let slug = placeholder.attr("id").unwrap_or("undefined").to_string();
        let mut payload = json!({"slug": slug, "text": location});
        if let Some(hints) = &self.options.hints {
            payload["hints"] = hints.clone();
        }
        match self
            .backend
            .save_element(&join_path(base, &slug), payload)
            .await
        {
            Ok(response) => {
                self.events.publish(GalleryEvent::Dropped { slug, location });
                Ok(response)
            }
            Err(err) => {
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }

    /// React to the terminal outcome of an upload: 201/204 add and select
    /// the new asset, 200 only reports it already existed.
    pub fn handle_upload(&mut self, result: &Result<UploadOutcome, ClientError>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.messages.show_error(err);
                return;
            }
        };
        let location = outcome.response.location.clone().unwrap_or_default();
        if outcome.is_new() {
            if let Some(asset) = outcome.response.asset() {
                self.add_item(asset, false);
            }
            self.messages.show_one(
                format!(
                    "\"{}\" uploaded successfully to \"{}\"",
                    outcome.file_name, location
                ),
                MessageStyle::Success,
            );
            self.events.publish(GalleryEvent::Uploaded { location });
        } else if outcome.status == 200 {
            self.messages.show_one(
                format!(
                    "\"{}\" has previously been uploaded to \"{}\"",
                    outcome.file_name, location
                ),
                MessageStyle::Success,
            );
        }
    }

    /// Upload a file through `uploader` and apply the outcome.
    pub async fn upload(&mut self, uploader: &Uploader, file: UploadFile) -> Result<UploadOutcome, ClientError> {
        let observer = ProgressRelay {
            events: self.events.clone(),
        };
        let result = uploader.upload(file, &observer).await;
        self.handle_upload(&result);
        result
    }

    /// Open the gallery and reload its items.
    pub async fn open(&mut self) -> Result<Option<usize>, ClientError> {
        self.open = true;
        self.events.publish(GalleryEvent::Opened);
        self.list().await
    }

    pub fn close(&mut self) {
        self.open = false;
        self.selected = None;
        self.panel = None;
        for item in &mut self.items {
            item.selected = false;
        }
        self.events.publish(GalleryEvent::Closed);
    }
}

/// Forwards upload progress onto the gallery's event channel.
struct ProgressRelay {
    events: GalleryEvents,
}

impl UploadObserver for ProgressRelay {
    fn on_progress(&self, file_name: &str, percent: u8) {
        self.events.publish(GalleryEvent::UploadProgress {
            file_name: file_name.to_string(),
            percent,
        });
    }
}
