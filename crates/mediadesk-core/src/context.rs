//! Page context handed to widgets at construction time.
//!
//! Widgets never look anything up globally. The facts they need from the
//! hosting page (document URL, `<meta>` tags, session storage, the attributes
//! and hidden fields of the element they are attached to) are captured here
//! and passed explicitly.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use reqwest::Url;

/// Session storage key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Name of the `<meta>` tag carrying the CSRF token.
pub const CSRF_META_NAME: &str = "csrf-token";
/// Name of the hidden form field carrying the CSRF token.
pub const CSRF_FIELD_NAME: &str = "csrfmiddlewaretoken";

/// Tab-scoped key/value storage shared by every widget of a page.
#[derive(Clone, Debug, Default)]
pub struct SessionStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.into(), value.into());
        }
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.inner.write().ok().and_then(|mut map| map.remove(key))
    }

    pub fn auth_token(&self) -> Option<String> {
        self.get(AUTH_TOKEN_KEY).filter(|token| !token.is_empty())
    }
}

/// Document-level context: URL, meta tags and session storage.
#[derive(Clone, Debug)]
pub struct PageContext {
    url: Url,
    meta: HashMap<String, String>,
    session: SessionStorage,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            meta: HashMap::new(),
            session: SessionStorage::new(),
        }
    }

    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    pub fn with_session(mut self, session: SessionStorage) -> Self {
        self.session = session;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta.get(name).map(String::as_str)
    }

    pub fn csrf_meta_token(&self) -> Option<&str> {
        self.meta(CSRF_META_NAME).filter(|token| !token.is_empty())
    }

    pub fn session(&self) -> &SessionStorage {
        &self.session
    }
}

/// The element a widget is attached to: tag name, attributes (including
/// `data-*`), the named form fields it contains and its ancestor chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementContext {
    tag: String,
    attributes: BTreeMap<String, String>,
    fields: BTreeMap<String, String>,
    parent: Option<Box<ElementContext>>,
}

impl ElementContext {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Shorthand for `with_attr("data-<name>", value)`.
    pub fn with_data(self, name: &str, value: impl Into<String>) -> Self {
        self.with_attr(format!("data-{}", name), value)
    }

    /// Adds a named input (e.g. a hidden `csrfmiddlewaretoken`) inside the element.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_parent(mut self, parent: ElementContext) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn data(&self, name: &str) -> Option<&str> {
        self.attr(&format!("data-{}", name))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn parent(&self) -> Option<&ElementContext> {
        self.parent.as_deref()
    }

    /// First value of `name` on this element or its closest ancestor.
    pub fn closest_attr(&self, name: &str) -> Option<&str> {
        let mut current = Some(self);
        while let Some(element) = current {
            if let Some(value) = element.attr(name) {
                return Some(value);
            }
            current = element.parent();
        }
        None
    }

    /// CSRF token from a hidden `csrfmiddlewaretoken` field inside the element.
    pub fn csrf_field(&self) -> Option<&str> {
        self.field(CSRF_FIELD_NAME).filter(|token| !token.is_empty())
    }

    /// All `data-*` attributes keyed by their camel-cased name
    /// (`data-complete-url` becomes `completeUrl`).
    pub fn data_attributes(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|rest| (camel_case(rest), value.clone()))
            })
            .collect()
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_attributes_are_camel_cased() {
        let element = ElementContext::new("div")
            .with_data("complete-url", "/api/complete/")
            .with_data("theme", "dark")
            .with_attr("id", "gallery");
        let data = element.data_attributes();
        assert_eq!(data.get("completeUrl").map(String::as_str), Some("/api/complete/"));
        assert_eq!(data.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn closest_attr_walks_ancestors() {
        let element = ElementContext::new("span")
            .with_parent(ElementContext::new("section").with_data("url", "/api/x"));
        assert_eq!(element.closest_attr("data-url"), Some("/api/x"));
        assert_eq!(element.closest_attr("id"), None);
    }

    #[test]
    fn session_storage_is_shared_between_clones() {
        let session = SessionStorage::new();
        let other = session.clone();
        session.set(AUTH_TOKEN_KEY, "abc");
        assert_eq!(other.auth_token().as_deref(), Some("abc"));
        other.remove(AUTH_TOKEN_KEY);
        assert_eq!(session.auth_token(), None);
    }

    #[test]
    fn classes_are_whitespace_separated() {
        let element = ElementContext::new("P").with_attr("class", "lead edit-currency");
        assert!(element.has_class("edit-currency"));
        assert!(!element.has_class("edit"));
        assert_eq!(element.tag(), "p");
    }
}
