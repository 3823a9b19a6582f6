//! Asset location helpers.
//!
//! Locations handed out by the backend may be root-relative (`/media/a.jpg`)
//! or absolute URLs pointing at a storage host. Both the UI and the backend
//! address an asset by the same canonical form: a root-relative path when the
//! asset lives on the document's own host, otherwise `scheme://host/path`.

use reqwest::Url;

/// Canonical location of `url` as seen from a document served at `document`.
///
/// Unparseable input is returned unchanged.
pub fn media_location(url: &str, document: &Url) -> String {
    let parsed = match document.join(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    let path = parsed.path().to_string();
    if same_authority(&parsed, document) {
        path
    } else {
        match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}{}", parsed.scheme(), host, port, path),
            (Some(host), None) => format!("{}://{}{}", parsed.scheme(), host, path),
            (None, _) => path,
        }
    }
}

fn same_authority(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Lower-cased path component of a location, without query or fragment.
pub fn location_path(location: &str) -> String {
    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    path.to_lowercase()
}

/// Lower-cased file extension (with its leading dot) of a location.
///
/// A dot in first position of the path does not start an extension.
pub fn location_extension(location: &str) -> Option<String> {
    let path = location_path(location);
    match path.rfind('.') {
        Some(idx) if idx > 0 && !path[idx..].contains('/') => Some(path[idx..].to_string()),
        _ => None,
    }
}

/// Join a base URL and a path so the result never contains `//` at the seam.
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
