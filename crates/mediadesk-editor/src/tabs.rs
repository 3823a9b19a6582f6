//! Tab container with one source editor per template.

use std::sync::Arc;

use mediadesk_api_client::{MessageSurface, SourceBackend};
use mediadesk_core::ClientError;

use crate::source::SourceEditor;

/// Content new templates are created with.
pub const NEW_TEMPLATE_SEED: &str = "{% extends \"base.html\" %}\n";

pub struct TabPanel {
    pub name: String,
    pub active: bool,
    pub editor: SourceEditor,
}

/// Where the browser should go after a template was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
}

pub struct TemplateTabs {
    backend: Arc<dyn SourceBackend>,
    messages: MessageSurface,
    panels: Vec<TabPanel>,
}

impl TemplateTabs {
    pub fn new(backend: Arc<dyn SourceBackend>, messages: MessageSurface) -> Self {
        Self {
            backend,
            messages,
            panels: Vec::new(),
        }
    }

    pub fn with_templates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_panel(name);
        }
        self
    }

    /// Provision a panel editing `name`. The first panel starts active.
    pub fn add_panel(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        let index = self.panels.len();
        let editor = SourceEditor::new(self.backend.clone(), name.clone(), self.messages.clone());
        self.panels.push(TabPanel {
            name,
            active: index == 0,
            editor,
        });
        index
    }

    pub fn panels(&self) -> &[TabPanel] {
        &self.panels
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut TabPanel> {
        self.panels.get_mut(index)
    }

    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.panels.len() {
            return false;
        }
        for (idx, panel) in self.panels.iter_mut().enumerate() {
            panel.active = idx == index;
        }
        true
    }

    /// Load every panel's source. Failures are reported per panel and do
    /// not stop the others.
    pub async fn load_all(&mut self) -> usize {
        let mut loaded = 0;
        for panel in &mut self.panels {
            if panel.editor.load().await.is_ok() {
                loaded += 1;
            }
        }
        loaded
    }

    /// Create a template from the name typed in the "new file" dialog and
    /// return where to navigate. A name ending in `/` creates its
    /// `index.html`, any other name gets `.html` appended.
    pub async fn new_source(&self, name: &str) -> Result<Navigation, ClientError> {
        let name = name.trim().trim_start_matches('/');
        if name.is_empty() {
            let err = ClientError::InvalidInput("a template name is required".to_string());
            self.messages.show_error(&err);
            return Err(err);
        }
        let path = if name.ends_with('/') {
            format!("{}index.html", name)
        } else {
            format!("{}.html", name)
        };

        if let Err(err) = self.backend.create_source(&path, NEW_TEMPLATE_SEED).await {
            self.messages.show_error(&err);
            return Err(err);
        }
        tracing::info!(path = %path, "Template created");

        let sources_url = self.backend.sources_url();
        let prefix = sources_url
            .find("/api/")
            .map(|idx| &sources_url[..idx])
            .unwrap_or_default();
        Ok(Navigation {
            url: format!("{}/{}", prefix, name),
        })
    }
}
