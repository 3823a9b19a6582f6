//! HTTP client façade for the mediadesk widgets.
//!
//! Wraps GET/POST/PUT/PATCH/DELETE with credential handling (cookies, CSRF
//! token or bearer token) and uniform success/failure dispatch. Requests are
//! described by a [`RequestOptions`] value with named optional fields instead
//! of positional argument permutations.
//!
//! Auth resolution, in order:
//! - a bearer token stored under `authToken` in session storage; when present
//!   no CSRF header is sent,
//! - otherwise a CSRF token from a hidden `csrfmiddlewaretoken` field inside
//!   the originating element, else the `csrf-token` meta tag, else the
//!   configured default.

pub mod api;
pub mod backend;
pub mod messages;

use std::time::Duration;

use mediadesk_core::{ClientConfig, ClientError, ElementContext, PageContext};
use reqwest::header::{HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use api::{MediaEndpoint, SourceEndpoint};
pub use backend::{ElementBackend, MediaBackend, SourceBackend};
pub use messages::{Banner, FieldState, FormState, MessageStyle, MessageSurface};

/// Header carrying the CSRF token on cookie-authenticated requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Authentication attached to a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-CSRFToken: {token}` plus session cookies
    Csrf(String),
    /// Cookies only
    Anonymous,
}

/// Status and parsed JSON body of a successful response.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` when the response had no body.
    pub body: Value,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.body)?)
    }
}

/// Named-field description of one API call.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions<'a> {
    /// Element the request originates from, used for CSRF lookup.
    pub element: Option<&'a ElementContext>,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl<'a> RequestOptions<'a> {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn element(mut self, element: &'a ElementContext) -> Self {
        self.element = Some(element);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client shared by every widget of a page.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    site_url: String,
    api_base: String,
    page: PageContext,
    default_csrf: Option<String>,
    messages: MessageSurface,
}

impl ApiClient {
    pub fn new(page: PageContext, messages: MessageSurface) -> Result<Self, ClientError> {
        Self::with_timeout(page, messages, Duration::from_secs(60))
    }

    pub fn with_timeout(
        page: PageContext,
        messages: MessageSurface,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let site_url = page.url().origin().ascii_serialization();

        Ok(Self {
            client,
            site_url,
            api_base: "/api".to_string(),
            page,
            default_csrf: None,
            messages,
        })
    }

    /// Build a client from configuration. The configured bearer token, if
    /// any, is seeded into the page's session storage.
    pub fn from_config(
        config: &ClientConfig,
        page: PageContext,
        messages: MessageSurface,
    ) -> Result<Self, ClientError> {
        if let Some(token) = &config.auth_token {
            page.session()
                .set(mediadesk_core::context::AUTH_TOKEN_KEY, token.clone());
        }
        let mut client = Self::with_timeout(
            page,
            messages,
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_api_base(&config.api_base);
        client.default_csrf = config.csrf_token.clone();
        Ok(client)
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_csrf(mut self, token: impl Into<String>) -> Self {
        self.default_csrf = Some(token.into());
        self
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn messages(&self) -> &MessageSurface {
        &self.messages
    }

    /// Raw client for requests that must not carry app credentials
    /// (e.g. direct-to-storage uploads).
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Absolute URLs are used as is; paths already under the API base are
    /// resolved against the site; anything else is prefixed with the API base.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let under_api = !self.api_base.is_empty()
            && (path == self.api_base || path.starts_with(&format!("{}/", self.api_base)));
        if under_api {
            format!("{}{}", self.site_url, path)
        } else {
            format!("{}{}{}", self.site_url, self.api_base, path)
        }
    }

    pub fn csrf_token(&self, element: Option<&ElementContext>) -> Option<String> {
        element
            .and_then(ElementContext::csrf_field)
            .or_else(|| self.page.csrf_meta_token())
            .map(str::to_string)
            .or_else(|| self.default_csrf.clone())
    }

    pub fn resolve_auth(&self, element: Option<&ElementContext>) -> Auth {
        if let Some(token) = self.page.session().auth_token() {
            return Auth::Bearer(token);
        }
        match self.csrf_token(element) {
            Some(token) => Auth::Csrf(token),
            None => Auth::Anonymous,
        }
    }

    fn apply_auth(&self, request: RequestBuilder, element: Option<&ElementContext>) -> RequestBuilder {
        match self.resolve_auth(element) {
            Auth::Bearer(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            Auth::Csrf(token) => request.header(CSRF_HEADER, token),
            Auth::Anonymous => request,
        }
    }

    fn prepare(&self, method: Method, options: &RequestOptions<'_>) -> Result<RequestBuilder, ClientError> {
        if options.path.is_empty() {
            return Err(ClientError::Config(format!(
                "Attempting {} request but no url was set.",
                method
            )));
        }
        let url = self.build_url(&options.path);
        tracing::debug!(method = %method, url = %url, "Sending API request");

        let mut request = self.client.request(method.clone(), &url);
        if method == Method::GET {
            request = request
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        request = self.apply_auth(request, options.element);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        Ok(request)
    }

    /// Send a JSON request and return status plus parsed body.
    pub async fn execute(
        &self,
        method: Method,
        options: RequestOptions<'_>,
    ) -> Result<ApiResponse, ClientError> {
        let mut request = self
            .prepare(method, &options)?
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }
        Self::send(request).await
    }

    /// POST a multipart form (file uploads). The content type, boundary
    /// included, is set by the form.
    pub async fn post_multipart(
        &self,
        options: RequestOptions<'_>,
        form: reqwest::multipart::Form,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.prepare(Method::POST, &options)?.multipart(form);
        Self::send(request).await
    }

    async fn send(request: RequestBuilder) -> Result<ApiResponse, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        read_response(response).await
    }

    pub async fn get(&self, options: RequestOptions<'_>) -> Result<Value, ClientError> {
        Ok(self.execute(Method::GET, options).await?.body)
    }

    pub async fn post(&self, options: RequestOptions<'_>) -> Result<Value, ClientError> {
        Ok(self.execute(Method::POST, options).await?.body)
    }

    pub async fn put(&self, options: RequestOptions<'_>) -> Result<Value, ClientError> {
        Ok(self.execute(Method::PUT, options).await?.body)
    }

    pub async fn patch(&self, options: RequestOptions<'_>) -> Result<Value, ClientError> {
        Ok(self.execute(Method::PATCH, options).await?.body)
    }

    pub async fn delete(&self, options: RequestOptions<'_>) -> Result<Value, ClientError> {
        Ok(self.execute(Method::DELETE, options).await?.body)
    }

    /// Callback-style call: `on_success` receives the parsed body; failures
    /// go to the message surface. Returns whether the call succeeded.
    pub async fn dispatch<S>(&self, method: Method, options: RequestOptions<'_>, on_success: S) -> bool
    where
        S: FnOnce(Value),
    {
        let messages = self.messages.clone();
        self.dispatch_with(method, options, on_success, move |err| {
            messages.show_error(&err)
        })
        .await
    }

    /// Like [`ApiClient::dispatch`] with a caller-provided failure handler
    /// receiving the raw failure.
    pub async fn dispatch_with<S, F>(
        &self,
        method: Method,
        options: RequestOptions<'_>,
        on_success: S,
        on_failure: F,
    ) -> bool
    where
        S: FnOnce(Value),
        F: FnOnce(ClientError),
    {
        match self.execute(method, options).await {
            Ok(response) => {
                on_success(response.body);
                true
            }
            Err(err) => {
                on_failure(err);
                false
            }
        }
    }
}

async fn read_response(response: Response) -> Result<ApiResponse, ClientError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    let is_empty = bytes.iter().all(u8::is_ascii_whitespace);

    if !status.is_success() {
        let body = if is_empty {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };
        tracing::warn!(status = status.as_u16(), "API request failed");
        return Err(ClientError::status(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ));
    }

    let body = if is_empty {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(ApiResponse {
        status: status.as_u16(),
        body,
    })
}
