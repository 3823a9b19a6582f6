//! Inline content editors.

use std::sync::Arc;

use mediadesk_api_client::{ElementBackend, MessageSurface};
use mediadesk_core::{join_path, AcceptedExtensions, ClientError, ElementContext};
use mediadesk_gallery::GalleryEvent;
use serde_json::{json, Value};

use crate::kinds::{parse_date, EditorKind, DATE_FORMAT};

#[derive(Clone, Debug)]
pub struct EditorOptions {
    /// Base URL of elements without a `data-url` of their own.
    pub base_url: String,
    /// Attribute naming an element, sent as `slug`.
    pub unique_identifier: String,
    /// Placeholder shown while editing.
    pub empty_input_text: String,
    pub hints: Option<Value>,
    pub accepted: AcceptedExtensions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            unique_identifier: "id".to_string(),
            empty_input_text: "placeholder text".to_string(),
            hints: None,
            accepted: AcceptedExtensions::default(),
        }
    }
}

/// One editable element of the page, saved with a PUT when it loses focus.
pub struct InlineEditor {
    backend: Arc<dyn ElementBackend>,
    element: ElementContext,
    kind: EditorKind,
    options: EditorOptions,
    messages: MessageSurface,
    content: String,
    editing: bool,
    /// Value of the date/range input overlay while it is open.
    overlay: Option<String>,
}

impl InlineEditor {
    pub fn new(
        backend: Arc<dyn ElementBackend>,
        element: ElementContext,
        content: impl Into<String>,
        options: EditorOptions,
        messages: MessageSurface,
    ) -> Self {
        let kind = EditorKind::detect(&element);
        Self {
            backend,
            element,
            kind,
            options,
            messages,
            content: content.into(),
            editing: false,
            overlay: None,
        }
    }

    pub fn kind(&self) -> &EditorKind {
        &self.kind
    }

    pub fn element(&self) -> &ElementContext {
        &self.element
    }

    /// Displayed content of the element.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Click on the element. Enters edit mode; a click while a date or range
    /// overlay is open commits the overlay like a blur. Text stays in edit
    /// mode until it loses focus. Media elements are edited through the
    /// gallery and never enter edit mode. Returns whether the element is
    /// still being edited.
    pub async fn toggle_edit(&mut self) -> Result<bool, ClientError> {
        if matches!(self.kind, EditorKind::Media(_)) {
            return Ok(false);
        }
        if self.editing {
            if self.overlay.is_some() && self.blur().await?.is_none() {
                self.leave_edit();
            }
            return Ok(self.editing);
        }
        self.enter_edit();
        Ok(true)
    }

    fn enter_edit(&mut self) {
        self.editing = true;
        match &self.kind {
            EditorKind::Range(spec) => {
                let initial = self
                    .element
                    .data("range-value")
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .or(spec.min)
                    .unwrap_or_default();
                self.overlay = Some(initial.to_string());
            }
            EditorKind::Date => self.overlay = Some(self.content.trim().to_string()),
            _ => {
                self.element
                    .set_attr("placeholder", self.options.empty_input_text.clone());
                self.element.set_attr("contenteditable", "true");
            }
        }
    }

    fn leave_edit(&mut self) {
        self.editing = false;
        self.overlay = None;
        self.element.remove_attr("contenteditable");
    }

    /// Text typed by the user, into the overlay when one is open.
    pub fn input(&mut self, text: impl Into<String>) {
        match &mut self.overlay {
            Some(overlay) => *overlay = text.into(),
            None => self.content = text.into(),
        }
    }

    /// Value that would be persisted, `None` when the input is empty or
    /// does not parse.
    pub fn value(&self) -> Option<Value> {
        match &self.kind {
            EditorKind::Text => {
                let text = self.content.trim();
                (!text.is_empty()).then(|| Value::from(text))
            }
            EditorKind::Currency(format) => format.parse_cents(&self.content).map(Value::from),
            EditorKind::Date => {
                let text = self.overlay.as_deref().unwrap_or(&self.content);
                parse_date(text).map(|date| Value::from(date.format(DATE_FORMAT).to_string()))
            }
            EditorKind::Range(spec) => self.range_position().map(|pos| spec.stored(pos)),
            EditorKind::Media(_) => self
                .element
                .attr("src")
                .filter(|src| !src.is_empty())
                .map(Value::from),
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        match &self.kind {
            EditorKind::Media(_) => self.element.set_attr("src", value),
            EditorKind::Range(_) | EditorKind::Date if self.overlay.is_some() => {
                self.overlay = Some(value)
            }
            _ => self.content = value,
        }
    }

    fn range_position(&self) -> Option<i64> {
        let EditorKind::Range(spec) = &self.kind else {
            return None;
        };
        let raw = self.overlay.as_deref()?;
        raw.trim().parse::<i64>().ok().map(|pos| spec.clamp(pos))
    }

    /// Rewrite the displayed content from the saved value.
    pub fn format_display(&mut self) {
        match &self.kind {
            EditorKind::Currency(format) => {
                if let Some(cents) = format.parse_cents(&self.content) {
                    self.content = format.format_cents(cents);
                }
            }
            EditorKind::Range(spec) => {
                if let Some(position) = self.range_position() {
                    self.content = spec.label(position);
                    self.element
                        .set_attr("data-range-value", position.to_string());
                }
            }
            EditorKind::Date => {
                if let Some(date) = self.overlay.as_deref().and_then(parse_date) {
                    self.content = date.format(DATE_FORMAT).to_string();
                }
            }
            EditorKind::Text | EditorKind::Media(_) => {}
        }
    }

    /// `unique_identifier` attribute of the element or its closest ancestor.
    pub fn id(&self) -> String {
        self.element
            .closest_attr(&self.options.unique_identifier)
            .filter(|id| !id.is_empty())
            .unwrap_or("undefined")
            .to_string()
    }

    pub fn element_url(&self) -> String {
        match self.element.closest_attr("data-url").filter(|url| !url.is_empty()) {
            Some(url) => url.to_string(),
            None => join_path(&self.options.base_url, &self.id()),
        }
    }

    fn payload(&self, value: Value) -> Value {
        let mut payload = match self.element.attr("data-key").filter(|k| !k.is_empty()) {
            Some(key) => json!({ key: value }),
            None => json!({"slug": self.id(), "text": value}),
        };
        if let Some(hints) = &self.options.hints {
            payload["hints"] = hints.clone();
        }
        payload
    }

    /// Focus left the element: save when the value is non-empty. Returns
    /// the response body, or `None` when nothing was saved.
    pub async fn blur(&mut self) -> Result<Option<Value>, ClientError> {
        let Some(value) = self.value() else {
            tracing::debug!(id = %self.id(), "Empty value, not saving");
            return Ok(None);
        };
        let url = self.element_url();
        let payload = self.payload(value);
        match self.backend.save_element(&url, payload).await {
            Ok(response) => {
                self.format_display();
                self.leave_edit();
                tracing::info!(url = %url, "Element saved");
                Ok(Some(response))
            }
            Err(err) => {
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }

    /// Point a media element at `location` and save it, provided the
    /// location's extension fits the element.
    pub async fn update_media_source(&mut self, location: &str) -> Result<Option<Value>, ClientError> {
        let EditorKind::Media(kind) = &self.kind else {
            return Ok(None);
        };
        if self.options.accepted.classify(location) != *kind {
            tracing::debug!(location = %location, "Location does not fit media element");
            return Ok(None);
        }
        self.element.set_attr("src", location);
        self.blur().await
    }

    /// Follow the gallery: a selection becomes the new media source.
    pub async fn apply_gallery_event(&mut self, event: &GalleryEvent) -> Result<Option<Value>, ClientError> {
        match event {
            GalleryEvent::Selected { location } => self.update_media_source(location).await,
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediadesk_api_client::MessageStyle;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        saves: Mutex<Vec<(String, Value)>>,
        fail: bool,
    }

    #[async_trait]
    impl ElementBackend for Recorder {
        async fn save_element(&self, url: &str, payload: Value) -> Result<Value, ClientError> {
            if self.fail {
                return Err(ClientError::status(
                    400,
                    "Bad Request",
                    Some(json!({"text": ["Too long."]})),
                ));
            }
            self.saves.lock().unwrap().push((url.to_string(), payload.clone()));
            Ok(payload)
        }
    }

    fn options() -> EditorOptions {
        EditorOptions {
            base_url: "/api/pages/".to_string(),
            ..EditorOptions::default()
        }
    }

    fn editor(backend: Arc<Recorder>, element: ElementContext, content: &str) -> InlineEditor {
        InlineEditor::new(backend, element, content, options(), MessageSurface::new())
    }

    #[tokio::test]
    async fn currency_persists_cents_and_redisplays() {
        let backend = Arc::new(Recorder::default());
        let element = ElementContext::new("span")
            .with_attr("class", "edit-currency")
            .with_attr("id", "plan-price")
            .with_attr("data-key", "price");
        let mut editor = editor(backend.clone(), element, "$0.00");

        assert!(editor.toggle_edit().await.unwrap());
        assert_eq!(editor.element().attr("contenteditable"), Some("true"));
        editor.input("$12.34");
        editor.blur().await.unwrap();

        let saves = backend.saves.lock().unwrap();
        assert_eq!(saves[0].0, "/api/pages/plan-price");
        assert_eq!(saves[0].1, json!({"price": 1234}));
        assert_eq!(editor.content(), "$12.34");
        assert!(!editor.is_editing());
        assert_eq!(editor.element().attr("contenteditable"), None);
    }

    #[tokio::test]
    async fn empty_value_is_not_saved() {
        let backend = Arc::new(Recorder::default());
        let mut editor = editor(backend.clone(), ElementContext::new("p"), "Hello");
        editor.toggle_edit().await.unwrap();
        editor.input("   ");
        assert_eq!(editor.blur().await.unwrap(), None);
        assert!(backend.saves.lock().unwrap().is_empty());
        assert!(editor.is_editing());
    }

    #[tokio::test]
    async fn text_uses_ancestor_url_slug_and_hints() {
        let backend = Arc::new(Recorder::default());
        let parent = ElementContext::new("section")
            .with_attr("data-url", "/api/content/landing")
            .with_attr("id", "hero");
        let element = ElementContext::new("h1").with_parent(parent);
        let mut editor = InlineEditor::new(
            backend.clone(),
            element,
            "Title",
            EditorOptions {
                hints: Some(json!({"theme": "dark"})),
                ..options()
            },
            MessageSurface::new(),
        );
        editor.toggle_edit().await.unwrap();
        editor.input(" New title ");
        editor.blur().await.unwrap();

        let saves = backend.saves.lock().unwrap();
        assert_eq!(saves[0].0, "/api/content/landing");
        assert_eq!(
            saves[0].1,
            json!({"slug": "hero", "text": "New title", "hints": {"theme": "dark"}})
        );
    }

    #[test]
    fn missing_id_falls_back_to_undefined() {
        let editor = editor(Arc::new(Recorder::default()), ElementContext::new("p"), "");
        assert_eq!(editor.id(), "undefined");
        assert_eq!(editor.element_url(), "/api/pages/undefined");
    }

    #[tokio::test]
    async fn range_saves_stored_value_and_shows_label() {
        let backend = Arc::new(Recorder::default());
        let element = ElementContext::new("span")
            .with_attr("class", "edit-range")
            .with_attr("id", "size")
            .with_data("range-min", "1")
            .with_data("range-max", "3")
            .with_data(
                "range-values",
                json!([["s", "Small"], ["m", "Medium"], ["l", "Large"]]).to_string(),
            );
        let mut editor = editor(backend.clone(), element, "Small");
        editor.toggle_edit().await.unwrap();
        editor.input("2");
        editor.blur().await.unwrap();

        assert_eq!(backend.saves.lock().unwrap()[0].1, json!({"slug": "size", "text": "m"}));
        assert_eq!(editor.content(), "Medium");
        assert_eq!(editor.element().data("range-value"), Some("2"));
    }

    #[tokio::test]
    async fn second_click_commits_range_overlay() {
        let backend = Arc::new(Recorder::default());
        let element = ElementContext::new("span")
            .with_attr("class", "edit-range")
            .with_attr("id", "size")
            .with_data("range-min", "1")
            .with_data("range-max", "3")
            .with_data(
                "range-values",
                json!([["s", "Small"], ["m", "Medium"], ["l", "Large"]]).to_string(),
            );
        let mut editor = editor(backend.clone(), element, "Small");
        assert!(editor.toggle_edit().await.unwrap());
        editor.input("2");
        assert!(!editor.toggle_edit().await.unwrap());

        let saves = backend.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "/api/pages/size");
        assert_eq!(saves[0].1, json!({"slug": "size", "text": "m"}));
        drop(saves);
        assert_eq!(editor.content(), "Medium");
        assert!(!editor.is_editing());
    }

    #[tokio::test]
    async fn second_click_keeps_text_in_edit_mode() {
        let backend = Arc::new(Recorder::default());
        let mut editor = editor(backend.clone(), ElementContext::new("p"), "Hello");
        assert!(editor.toggle_edit().await.unwrap());
        editor.input("Hello there");
        assert!(editor.toggle_edit().await.unwrap());
        assert!(editor.is_editing());
        assert_eq!(editor.content(), "Hello there");
        assert!(backend.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn date_overlay_saves_iso_date() {
        let backend = Arc::new(Recorder::default());
        let element = ElementContext::new("span")
            .with_attr("class", "edit-date")
            .with_attr("id", "launch");
        let mut editor = editor(backend.clone(), element, "2024-01-01");
        editor.toggle_edit().await.unwrap();
        editor.input("2024-03-01");
        editor.blur().await.unwrap();
        assert_eq!(
            backend.saves.lock().unwrap()[0].1,
            json!({"slug": "launch", "text": "2024-03-01"})
        );
        assert_eq!(editor.content(), "2024-03-01");
    }

    #[tokio::test]
    async fn media_follows_gallery_selection() {
        let backend = Arc::new(Recorder::default());
        let element = ElementContext::new("img")
            .with_attr("class", "edit-media")
            .with_attr("id", "logo")
            .with_attr("src", "/media/old.png");
        let mut editor = editor(backend.clone(), element, "");
        assert!(!editor.toggle_edit().await.unwrap());

        let ignored = editor
            .apply_gallery_event(&GalleryEvent::Selected {
                location: "/media/clip.mp4".into(),
            })
            .await
            .unwrap();
        assert_eq!(ignored, None);
        assert_eq!(editor.element().attr("src"), Some("/media/old.png"));

        editor
            .apply_gallery_event(&GalleryEvent::Selected {
                location: "/media/new.png".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            backend.saves.lock().unwrap()[0].1,
            json!({"slug": "logo", "text": "/media/new.png"})
        );
    }

    #[tokio::test]
    async fn failed_save_keeps_edit_mode_and_reports() {
        let backend = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let messages = MessageSurface::new();
        let mut editor = InlineEditor::new(
            backend,
            ElementContext::new("p").with_attr("id", "intro"),
            "Intro",
            options(),
            messages.clone(),
        );
        editor.toggle_edit().await.unwrap();
        editor.input("A much longer intro");
        assert!(editor.blur().await.is_err());
        assert!(editor.is_editing());
        assert_eq!(messages.messages(MessageStyle::Error), vec!["text: Too long."]);
    }
}
