//! Mediadesk CLI: drive the media gallery, uploads and template sources
//! against a live site.
//!
//! Configuration comes from `MEDIADESK_*` environment variables (a `.env`
//! file is honored); see `ClientConfig::from_env`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediadesk_api_client::SourceBackend;
use mediadesk_cli::{init_tracing, item_json, message_lines, select_location, Session};
use mediadesk_core::ClientConfig;
use mediadesk_editor::{SourceEditor, TemplateTabs};
use mediadesk_upload::UploadFile;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "mediadesk", about = "Media gallery and template sources CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List media assets, most recent first
    List {
        /// Free-text filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Replace the tags of a media asset
    Tag {
        /// Asset location as listed
        location: String,
        /// Comma separated tags
        tags: String,
    },
    /// Delete a media asset
    Delete {
        /// Asset location as listed
        location: String,
    },
    /// Upload a file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
    },
    /// Template source operations
    Source {
        #[command(subcommand)]
        sub: SourceCommands,
    },
    /// Send a test notification
    NotifyTest {
        /// Notification identifier
        id: String,
        /// Notifications endpoint
        #[arg(long, default_value = "/notifications/")]
        url: String,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// Print a source file
    Get { path: String },
    /// Replace a source file with the content of a local file
    Save { path: String, file: PathBuf },
    /// Create a new template
    New { name: String },
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { filter } => {
            let mut gallery = session.gallery();
            gallery.set_filter(filter.unwrap_or_default());
            gallery.list().await?;
            let items: Vec<Value> = gallery.items().iter().map(item_json).collect();
            print_json(&Value::Array(items))?;
        }
        Commands::Tag { location, tags } => {
            let mut gallery = session.gallery();
            gallery.list().await?;
            select_location(&mut gallery, &location)?;
            let tags = gallery.tag_media(&tags).await?;
            print_json(&json!({"location": location, "tags": tags}))?;
        }
        Commands::Delete { location } => {
            let mut gallery = session.gallery();
            gallery.list().await?;
            select_location(&mut gallery, &location)?;
            let deleted = gallery.delete_media().await?;
            print_json(&json!({"deleted": deleted}))?;
        }
        Commands::Upload { file } => {
            let uploader = session.uploader().await?;
            let file = UploadFile::from_path(&file).await?;
            let mut gallery = session.gallery();
            let outcome = gallery.upload(&uploader, file).await?;
            print_json(&json!({
                "file": outcome.file_name,
                "status": outcome.status,
                "response": serde_json::to_value(&outcome.response)?,
            }))?;
        }
        Commands::Source { sub } => {
            let sources: Arc<dyn SourceBackend> = Arc::new(session.sources());
            match sub {
                SourceCommands::Get { path } => {
                    let mut editor = SourceEditor::new(sources, path, session.messages().clone());
                    let file = editor.load().await?;
                    let mode = editor.mode().map(|m| m.as_str()).unwrap_or("text");
                    print_json(&json!({"path": file.path, "mode": mode, "text": file.text}))?;
                }
                SourceCommands::Save { path, file } => {
                    let text = tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let editor = SourceEditor::new(sources, path.clone(), session.messages().clone());
                    editor.set_text(text);
                    editor.save().await?;
                    print_json(&json!({"saved": path}))?;
                }
                SourceCommands::New { name } => {
                    let tabs = TemplateTabs::new(sources, session.messages().clone());
                    let navigation = tabs.new_source(&name).await?;
                    print_json(&json!({"url": navigation.url}))?;
                }
            }
        }
        Commands::NotifyTest { id, url } => {
            let detail = session.client.notification_test(&url, &id).await?;
            print_json(&json!({"detail": detail.detail}))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env()
        .context("Invalid configuration. Check MEDIADESK_SITE_URL and related variables")?;
    let session = Session::new(config)?;
    tracing::debug!(site = %session.config.site_url, "Session ready");

    let cli = Cli::parse();
    let result = run(&session, cli.command).await;

    for line in message_lines(session.messages()) {
        eprintln!("{}", line);
    }
    result
}
