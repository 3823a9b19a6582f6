//! Upload coordinator.
//!
//! [`Uploader::connect`] settles the route once (fetching storage credentials
//! when the upload URL is a credential endpoint); [`Uploader::upload`] then
//! delivers files one at a time and reports to an [`UploadObserver`].

use std::future::Future;

use bytes::Bytes;
use mediadesk_api_client::{ApiClient, MessageStyle, MessageSurface, RequestOptions};
use mediadesk_core::context::CSRF_FIELD_NAME;
use mediadesk_core::{Acl, ClientError, CredentialBundle, UploadResponse};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::direct::DirectTarget;
use crate::file::UploadFile;
use crate::options::UploadOptions;
use crate::progress::ProgressTracker;

const CHUNK_SIZE: usize = 64 * 1024;

/// Route files take to their destination.
#[derive(Clone, Debug)]
pub enum UploadMode {
    /// Multipart POST to the application.
    SameOrigin { endpoint: String },
    /// POST straight to the storage bucket.
    Direct(DirectTarget),
}

/// Terminal success of one file.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadOutcome {
    pub file_name: String,
    /// Status of the response that produced the final payload.
    pub status: u16,
    pub response: UploadResponse,
}

impl UploadOutcome {
    /// 201 and 204 mean the asset was created; 200 that it already existed.
    pub fn is_new(&self) -> bool {
        matches!(self.status, 201 | 204)
    }
}

/// Receives per-file progress and exactly one terminal callback per file.
pub trait UploadObserver: Send + Sync {
    fn on_progress(&self, _file_name: &str, _percent: u8) {}

    fn on_success(&self, _file_name: &str, _outcome: &UploadOutcome) {}

    fn on_error(&self, _file_name: &str, _err: &ClientError) {}
}

/// Default reporting: outcomes go to the page's message area.
impl UploadObserver for MessageSurface {
    fn on_success(&self, file_name: &str, outcome: &UploadOutcome) {
        let message = match (&outcome.response.detail, &outcome.response.location) {
            (Some(detail), _) => detail.clone(),
            (None, Some(location)) => {
                format!("\"{}\" uploaded successfully to {}", file_name, location)
            }
            (None, None) => format!("\"{}\" uploaded successfully", file_name),
        };
        self.show_one(message, MessageStyle::Success);
    }

    fn on_error(&self, _file_name: &str, err: &ClientError) {
        self.show_error(err);
    }
}

pub struct Uploader {
    client: ApiClient,
    options: UploadOptions,
    mode: UploadMode,
}

impl Uploader {
    /// Resolve the upload route. Direct uploads fetch their credential bundle
    /// here, once, before any file is transferred.
    pub async fn connect(client: ApiClient, options: UploadOptions) -> Result<Self, ClientError> {
        let mode = if options.is_direct() {
            let url = options.upload_url.clone().unwrap_or_default();
            let credentials = match fetch_credentials(&client, &url, options.acl).await {
                Ok(credentials) => credentials,
                Err(err) => {
                    client.messages().show_error(&err);
                    return Err(err);
                }
            };
            let target = match DirectTarget::from_bundle(
                client.page().url(),
                credentials,
                &options.media_prefix,
                options.acl,
            ) {
                Ok(target) => target,
                Err(err) => {
                    client.messages().show_error(&err);
                    return Err(err);
                }
            };
            tracing::info!(
                storage_url = %target.storage_url,
                prefix = %target.media_prefix,
                "Direct-to-storage upload configured"
            );
            UploadMode::Direct(target)
        } else {
            let endpoint = options
                .complete_url()
                .map(str::to_string)
                .or_else(|| options.upload_url.clone())
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    ClientError::Config(
                        "instantiating upload without an upload url or complete url".to_string(),
                    )
                })?;
            UploadMode::SameOrigin { endpoint }
        };
        Ok(Self {
            client,
            options,
            mode,
        })
    }

    pub fn mode(&self) -> &UploadMode {
        &self.mode
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Upload one file. The observer receives progress followed by exactly
    /// one of `on_success` / `on_error`; the same outcome is returned.
    pub async fn upload(
        &self,
        file: UploadFile,
        observer: &dyn UploadObserver,
    ) -> Result<UploadOutcome, ClientError> {
        let result = self.transfer(&file, observer).await;
        match &result {
            Ok(outcome) => {
                tracing::info!(file = %file.name, status = outcome.status, "Upload completed");
                observer.on_success(&file.name, outcome);
            }
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "Upload failed");
                observer.on_error(&file.name, err);
            }
        }
        result
    }

    /// Upload files in order; one failure does not stop the others.
    pub async fn upload_all(
        &self,
        files: Vec<UploadFile>,
        observer: &dyn UploadObserver,
    ) -> Vec<Result<UploadOutcome, ClientError>> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.upload(file, observer).await);
        }
        results
    }

    async fn transfer(
        &self,
        file: &UploadFile,
        observer: &dyn UploadObserver,
    ) -> Result<UploadOutcome, ClientError> {
        let max = self.options.max_file_size_bytes();
        if file.len() > max {
            return Err(ClientError::InvalidInput(format!(
                "File is too big ({} bytes). Max filesize: {}MB.",
                file.len(),
                self.options.max_file_size_mb
            )));
        }

        match &self.mode {
            UploadMode::SameOrigin { endpoint } => self.same_origin(endpoint, file, observer).await,
            UploadMode::Direct(target) => self.direct(target, file, observer).await,
        }
    }

    async fn same_origin(
        &self,
        endpoint: &str,
        file: &UploadFile,
        observer: &dyn UploadObserver,
    ) -> Result<UploadOutcome, ClientError> {
        let host = &self.options.host;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut form = Form::new();
        if let Some(token) = self.client.csrf_token(Some(host)) {
            form = form.text(CSRF_FIELD_NAME, token);
        }
        for (key, value) in host.data_attributes() {
            form = form.text(key, value);
        }
        form = form.part(self.options.param_name.clone(), file_part(file, tx)?);

        let send = self
            .client
            .post_multipart(RequestOptions::new(endpoint).element(host), form);
        let response = drive(send, rx, file, observer).await?;
        let payload = if response.body.is_null() {
            UploadResponse::default()
        } else {
            serde_json::from_value(response.body)?
        };
        Ok(UploadOutcome {
            file_name: file.name.clone(),
            status: response.status,
            response: payload,
        })
    }

    async fn direct(
        &self,
        target: &DirectTarget,
        file: &UploadFile,
        observer: &dyn UploadObserver,
    ) -> Result<UploadOutcome, ClientError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut form = Form::new();
        for (name, value) in target.form_fields(file) {
            form = form.text(name, value);
        }
        // Storage ignores fields after the file part.
        form = form.part(self.options.param_name.clone(), file_part(file, tx)?);

        tracing::debug!(url = %target.storage_url, key = %target.key_for(&file.name), "Uploading to storage");
        let send = self
            .client
            .http()
            .post(&target.storage_url)
            .multipart(form)
            .send();
        let response = drive(send, rx, file, observer)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = Some(text)
                .filter(|t| !t.trim().is_empty())
                .map(|t| serde_json::from_str(&t).unwrap_or(Value::String(t)));
            return Err(ClientError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body,
            ));
        }

        let location = target.location_for(&file.name);
        match self.options.complete_url() {
            Some(complete_url) => self.complete(complete_url, location, file).await,
            None => Ok(UploadOutcome {
                file_name: file.name.clone(),
                status: status.as_u16(),
                response: UploadResponse::from_location(location),
            }),
        }
    }

    /// Report a stored object to the completion endpoint; its response is
    /// the final payload of the upload.
    async fn complete(
        &self,
        complete_url: &str,
        location: String,
        file: &UploadFile,
    ) -> Result<UploadOutcome, ClientError> {
        let host = &self.options.host;
        let mut payload = Map::new();
        payload.insert("location".to_string(), Value::String(location.clone()));
        for (key, value) in host.data_attributes() {
            payload.entry(key).or_insert(Value::String(value));
        }
        let response = self
            .client
            .execute(
                Method::POST,
                RequestOptions::new(complete_url)
                    .element(host)
                    .body(Value::Object(payload)),
            )
            .await?;
        let mut final_payload: UploadResponse = if response.body.is_null() {
            UploadResponse::default()
        } else {
            serde_json::from_value(response.body)?
        };
        if final_payload.location.is_none() {
            final_payload.location = Some(location);
        }
        Ok(UploadOutcome {
            file_name: file.name.clone(),
            status: response.status,
            response: final_payload,
        })
    }
}

async fn fetch_credentials(
    client: &ApiClient,
    url: &str,
    acl: Option<Acl>,
) -> Result<CredentialBundle, ClientError> {
    let mut options = RequestOptions::new(url);
    if acl == Some(Acl::PublicRead) && !url.contains("public=1") {
        options = options.query("public", "1");
    }
    let body = client.get(options).await?;
    Ok(serde_json::from_value(body)?)
}

/// File part whose body reports cumulative bytes sent on `tx`.
fn file_part(file: &UploadFile, tx: mpsc::UnboundedSender<u64>) -> Result<Part, ClientError> {
    let data = file.data.clone();
    let total = data.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(total)))
        .collect();
    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        let _ = tx.send(sent);
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    Part::stream_with_length(reqwest::Body::wrap_stream(stream), file.len())
        .file_name(file.name.clone())
        .mime_str(file.content_type())
        .map_err(|e| ClientError::InvalidInput(format!("Invalid content type: {}", e)))
}

/// Await `send` while forwarding byte counts from `rx` to the observer as
/// monotonic percentages.
async fn drive<F, T>(
    send: F,
    mut rx: mpsc::UnboundedReceiver<u64>,
    file: &UploadFile,
    observer: &dyn UploadObserver,
) -> T
where
    F: Future<Output = T>,
{
    let total = file.len();
    let mut tracker = ProgressTracker::new();
    tokio::pin!(send);
    loop {
        tokio::select! {
            result = &mut send => {
                while let Ok(sent) = rx.try_recv() {
                    if let Some(percent) = tracker.record_bytes(sent, total) {
                        observer.on_progress(&file.name, percent);
                    }
                }
                return result;
            }
            Some(sent) = rx.recv() => {
                if let Some(percent) = tracker.record_bytes(sent, total) {
                    observer.on_progress(&file.name, percent);
                }
            }
        }
    }
}
