//! Message/notification surface.
//!
//! Every widget funnels user-visible outcomes here: success banners from API
//! responses and error banners built from failures. Failures from a 4xx
//! response are matched against form fields first (see [`FormState`]) and
//! only fall back to the global banner when no field can display them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use mediadesk_core::{ClientError, FailureKind};
use serde_json::Value;

/// Messages kept per banner; older ones are dropped first.
pub const MAX_BANNER_MESSAGES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageStyle {
    Success,
    Info,
    Warning,
    Error,
}

impl MessageStyle {
    /// Alert class the banner is rendered with.
    pub fn css_class(&self) -> &'static str {
        match self {
            MessageStyle::Success => "alert-success",
            MessageStyle::Info => "alert-info",
            MessageStyle::Warning => "alert-warning",
            MessageStyle::Error => "alert-danger",
        }
    }
}

/// One dismissible banner holding every message of a style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub style: MessageStyle,
    pub messages: Vec<String>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    banners: Vec<Banner>,
}

/// Shared, cloneable handle on the page's message area.
#[derive(Clone, Debug, Default)]
pub struct MessageSurface {
    state: Arc<Mutex<SurfaceState>>,
    provider_notified: Option<String>,
}

impl MessageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hint appended to 5xx banners, e.g. "We have been notified."
    pub fn with_provider_notified(mut self, hint: impl Into<String>) -> Self {
        self.provider_notified = Some(hint.into());
        self
    }

    pub fn show<I, S>(&self, messages: I, style: MessageStyle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
        if messages.is_empty() {
            return;
        }
        for message in &messages {
            match style {
                MessageStyle::Error => tracing::warn!(message = %message, "error message shown"),
                _ => tracing::info!(style = ?style, message = %message, "message shown"),
            }
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let banner = match state.banners.iter().position(|banner| banner.style == style) {
            Some(position) => &mut state.banners[position],
            None => {
                state.banners.push(Banner {
                    style,
                    messages: Vec::new(),
                });
                let last = state.banners.len() - 1;
                &mut state.banners[last]
            }
        };
        banner.messages.extend(messages);
        let overflow = banner.messages.len().saturating_sub(MAX_BANNER_MESSAGES);
        banner.messages.drain(..overflow);
    }

    pub fn show_one(&self, message: impl Into<String>, style: MessageStyle) {
        self.show([message.into()], style);
    }

    /// Render a failure as a global error banner.
    pub fn show_error(&self, err: &ClientError) {
        let mut no_form = FormState::default();
        self.show_error_with_form(err, &mut no_form);
    }

    /// Render a failure, decorating matching fields of `form` when possible.
    pub fn show_error_with_form(&self, err: &ClientError, form: &mut FormState) {
        let messages = self.error_messages(err, form);
        self.show(messages, MessageStyle::Error);
    }

    /// Messages an error produces once field-level messages were placed on
    /// `form`.
    pub fn error_messages(&self, err: &ClientError, form: &mut FormState) -> Vec<String> {
        match err {
            ClientError::Status {
                status,
                status_text,
                body,
            } => {
                let fallback = format!("Err {}: {}", status, status_text);
                if err.kind() == FailureKind::Server {
                    let message = match &self.provider_notified {
                        Some(hint) => format!("{}\n{}", fallback, hint),
                        None => fallback,
                    };
                    return vec![message];
                }
                let messages = body
                    .as_ref()
                    .map(|body| extract_messages(body, form))
                    .unwrap_or_default();
                if messages.is_empty() {
                    vec![fallback]
                } else {
                    messages
                }
            }
            other => vec![other.to_string()],
        }
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.banners.clear();
        }
    }

    pub fn banners(&self) -> Vec<Banner> {
        self.state
            .lock()
            .map(|state| state.banners.clone())
            .unwrap_or_default()
    }

    /// Messages currently shown with `style`.
    pub fn messages(&self, style: MessageStyle) -> Vec<String> {
        self.banners()
            .into_iter()
            .filter(|banner| banner.style == style)
            .flat_map(|banner| banner.messages)
            .collect()
    }
}

/// Display state of one form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub invalid: bool,
    /// Whether the input has an inline help slot (`.invalid-feedback`).
    pub has_help: bool,
    pub help_text: Option<String>,
}

/// The inputs of the form an API call was issued from, keyed by `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: BTreeMap<String, FieldState>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, has_help: bool) -> Self {
        self.fields.insert(
            name.into(),
            FieldState {
                has_help,
                ..FieldState::default()
            },
        );
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    /// Marks the field invalid. Returns true when the message was placed in
    /// the field's help slot.
    fn decorate(&mut self, name: &str, message: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.invalid = true;
                if field.has_help {
                    field.help_text = Some(message.to_string());
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}

fn extract_messages(body: &Value, form: &mut FormState) -> Vec<String> {
    match body {
        Value::String(message) => vec![message.clone()],
        Value::Array(items) => items
            .iter()
            .flat_map(|item| extract_messages(item, form))
            .collect(),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                return vec![detail.to_string()];
            }
            let mut messages = Vec::new();
            for (key, value) in map {
                let message = field_message(value);
                if !form.decorate(key, &message) {
                    messages.push(format!("{}: {}", key, message));
                }
            }
            messages
        }
        _ => Vec::new(),
    }
}

fn field_message(value: &Value) -> String {
    match value {
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            _ => value.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
