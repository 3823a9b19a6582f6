//! Source file editor with debounced saves.

use std::sync::{Arc, Mutex};

use mediadesk_api_client::{MessageSurface, SourceBackend};
use mediadesk_core::{ClientError, SourceFile};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::debounce::Debouncer;

/// Highlighting mode picked from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxMode {
    Html,
    Django,
    Css,
    Scss,
    JavaScript,
    Json,
    Markdown,
    Python,
    Xml,
    Yaml,
    Text,
}

impl SyntaxMode {
    /// `.eml` templates are edited as HTML.
    pub fn for_path(path: &str) -> Self {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "html" | "htm" | "eml" => SyntaxMode::Html,
            "djhtml" => SyntaxMode::Django,
            "css" => SyntaxMode::Css,
            "scss" => SyntaxMode::Scss,
            "js" | "mjs" => SyntaxMode::JavaScript,
            "json" => SyntaxMode::Json,
            "md" | "markdown" => SyntaxMode::Markdown,
            "py" => SyntaxMode::Python,
            "xml" | "svg" => SyntaxMode::Xml,
            "yml" | "yaml" => SyntaxMode::Yaml,
            _ => SyntaxMode::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxMode::Html => "html",
            SyntaxMode::Django => "django",
            SyntaxMode::Css => "css",
            SyntaxMode::Scss => "scss",
            SyntaxMode::JavaScript => "javascript",
            SyntaxMode::Json => "json",
            SyntaxMode::Markdown => "markdown",
            SyntaxMode::Python => "python",
            SyntaxMode::Xml => "xml",
            SyntaxMode::Yaml => "yaml",
            SyntaxMode::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Loaded { path: String, mode: SyntaxMode },
    /// A save is about to be sent.
    Saving { path: String },
    /// The backend accepted a save; previews of the page should reload.
    Saved { path: String },
}

/// Everything a save needs, detached from the editor so a debounced save
/// can run on its own task.
#[derive(Clone)]
struct SaveTask {
    backend: Arc<dyn SourceBackend>,
    path: String,
    buffer: Arc<Mutex<String>>,
    messages: MessageSurface,
    events: broadcast::Sender<SourceEvent>,
}

impl SaveTask {
    async fn run(self) -> Result<Value, ClientError> {
        let text = self
            .buffer
            .lock()
            .map(|buffer| buffer.clone())
            .map_err(|_| ClientError::InvalidInput("editor buffer is poisoned".to_string()))?;
        let _ = self.events.send(SourceEvent::Saving {
            path: self.path.clone(),
        });
        match self.backend.save_source(&self.path, &text).await {
            Ok(response) => {
                tracing::info!(path = %self.path, bytes = text.len(), "Source saved");
                let _ = self.events.send(SourceEvent::Saved { path: self.path });
                Ok(response)
            }
            Err(err) => {
                self.messages.show_error(&err);
                Err(err)
            }
        }
    }
}

/// Code panel bound to one backend source file (`data-content`).
pub struct SourceEditor {
    task: SaveTask,
    mode: Option<SyntaxMode>,
    debouncer: Debouncer,
}

impl SourceEditor {
    pub fn new(
        backend: Arc<dyn SourceBackend>,
        path: impl Into<String>,
        messages: MessageSurface,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            task: SaveTask {
                backend,
                path: path.into(),
                buffer: Arc::new(Mutex::new(String::new())),
                messages,
                events,
            },
            mode: None,
            debouncer: Debouncer::default(),
        }
    }

    pub fn with_debouncer(mut self, debouncer: Debouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn path(&self) -> &str {
        &self.task.path
    }

    pub fn mode(&self) -> Option<SyntaxMode> {
        self.mode
    }

    pub fn text(&self) -> String {
        self.task
            .buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.task.events.subscribe()
    }

    /// Load-resources trigger: fetch the file into the buffer.
    pub async fn load(&mut self) -> Result<SourceFile, ClientError> {
        let file = match self.task.backend.load_source(&self.task.path).await {
            Ok(file) => file,
            Err(err) => {
                self.task.messages.show_error(&err);
                return Err(err);
            }
        };
        if let Ok(mut buffer) = self.task.buffer.lock() {
            *buffer = file.text.clone();
        }
        let mode = SyntaxMode::for_path(&file.path);
        self.mode = Some(mode);
        tracing::debug!(path = %file.path, mode = mode.as_str(), "Source loaded");
        let _ = self.task.events.send(SourceEvent::Loaded {
            path: file.path.clone(),
            mode,
        });
        Ok(file)
    }

    /// Replace the buffer without saving.
    pub fn set_text(&self, text: impl Into<String>) {
        if let Ok(mut buffer) = self.task.buffer.lock() {
            *buffer = text.into();
        }
    }

    /// Replace the buffer and schedule a save of whatever the buffer holds
    /// once edits pause.
    pub fn edit(&self, text: impl Into<String>) {
        self.set_text(text);
        let task = self.task.clone();
        self.debouncer.schedule(async move {
            let _ = task.run().await;
        });
    }

    /// Save immediately.
    pub async fn save(&self) -> Result<Value, ClientError> {
        self.task.clone().run().await
    }

    /// Wait for a scheduled save to finish.
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediadesk_api_client::MessageStyle;
    use std::time::Duration;

    #[derive(Default)]
    struct MemorySources {
        files: Mutex<Vec<SourceFile>>,
        saves: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SourceBackend for MemorySources {
        async fn load_source(&self, path: &str) -> Result<SourceFile, ClientError> {
            self.files
                .lock()
                .unwrap()
                .iter()
                .find(|f| f.path == path)
                .cloned()
                .ok_or_else(|| ClientError::status(404, "Not Found", None))
        }

        async fn save_source(&self, path: &str, text: &str) -> Result<Value, ClientError> {
            self.saves.lock().unwrap().push((path.to_string(), text.to_string()));
            Ok(Value::Null)
        }

        async fn create_source(&self, _path: &str, _text: &str) -> Result<Value, ClientError> {
            Ok(Value::Null)
        }

        fn sources_url(&self) -> String {
            "http://localhost:8000/api/themes/sources/".to_string()
        }
    }

    #[test]
    fn eml_is_edited_as_html() {
        assert_eq!(SyntaxMode::for_path("notification/welcome.eml"), SyntaxMode::Html);
        assert_eq!(SyntaxMode::for_path("static/site.CSS"), SyntaxMode::Css);
        assert_eq!(SyntaxMode::for_path("Makefile"), SyntaxMode::Text);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_produce_one_save_with_final_content() {
        let backend = Arc::new(MemorySources::default());
        let editor = SourceEditor::new(backend.clone(), "index.html", MessageSurface::new());
        let mut events = editor.subscribe();

        editor.edit("<h1>");
        tokio::time::advance(Duration::from_millis(100)).await;
        editor.edit("<h1>Hi");
        tokio::time::advance(Duration::from_millis(100)).await;
        editor.edit("<h1>Hi</h1>");
        editor.settle().await;

        assert_eq!(
            *backend.saves.lock().unwrap(),
            vec![("index.html".to_string(), "<h1>Hi</h1>".to_string())]
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SourceEvent::Saving {
                path: "index.html".into()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SourceEvent::Saved {
                path: "index.html".into()
            }
        );
    }

    #[tokio::test]
    async fn load_fills_buffer_and_mode() {
        let backend = Arc::new(MemorySources::default());
        backend
            .files
            .lock()
            .unwrap()
            .push(SourceFile::new("notification/welcome.eml", "<p>Welcome</p>"));
        let mut editor =
            SourceEditor::new(backend.clone(), "notification/welcome.eml", MessageSurface::new());
        editor.load().await.unwrap();
        assert_eq!(editor.text(), "<p>Welcome</p>");
        assert_eq!(editor.mode(), Some(SyntaxMode::Html));
    }

    #[tokio::test]
    async fn missing_source_is_reported() {
        let messages = MessageSurface::new();
        let mut editor = SourceEditor::new(
            Arc::new(MemorySources::default()),
            "missing.html",
            messages.clone(),
        );
        assert!(editor.load().await.is_err());
        assert_eq!(messages.messages(MessageStyle::Error), vec!["Err 404: Not Found"]);
    }
}
