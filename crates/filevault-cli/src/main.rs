//! Filevault CLI — command-line client for the filevault storage backend.
//!
//! Set FILEVAULT_API_URL (or API_URL) and FILEVAULT_TOKEN. Uses bearer auth.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use filevault_api_client::{ApiClient, SessionContext};
use filevault_cli::{format_file_size, init_tracing};
use filevault_client::{
    BatchUploadExecutor, EventBus, ExecutorConfig, ResultListController, StorageStatsReader,
    UploadQueue, ViewContext,
};
use filevault_core::models::{FileHandle, SearchFilters};
use filevault_core::validation::{validate_batch, UploadLimits};
use filevault_core::ClientConfig;

#[derive(Parser)]
#[command(name = "filevault", about = "Filevault storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session token
    Login {
        username: String,
        password: String,
    },
    /// Create a new account
    Register {
        username: String,
        password: String,
    },
    /// Upload one or more files as a single batch
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List stored files with pagination
    List {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
        /// Files per page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Search stored files; unset filters are not sent
    Search {
        /// Substring of the filename
        #[arg(long)]
        filename: Option<String>,
        /// Content type, exact or prefix (e.g. "image/")
        #[arg(long)]
        mime_type: Option<String>,
        /// Minimum size in bytes
        #[arg(long)]
        min_size: Option<u64>,
        /// Maximum size in bytes
        #[arg(long)]
        max_size: Option<u64>,
        /// Earliest upload date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Latest upload date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
        /// Results per page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Delete one or more files by id
    Delete {
        /// File ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Download a file's content
    Download {
        /// File id
        id: i64,
        /// Output path (defaults to file-<id>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show aggregate storage statistics
    Stats,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn client_for(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    let token = std::env::var("FILEVAULT_TOKEN").ok();
    let session = Arc::new(SessionContext::new(token));
    let client = ApiClient::with_timeout(
        config.api_url.clone(),
        session,
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("Failed to create API client. Set FILEVAULT_API_URL (or API_URL)")?;
    Ok(client)
}

async fn load_file(path: &PathBuf) -> anyhow::Result<FileHandle> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {}", path.display()))?;

    let mut handle = FileHandle::new(name, bytes);
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        handle = handle.with_content_type(mime);
    }
    Ok(handle)
}

async fn upload(config: &ClientConfig, client: ApiClient, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut batch = Vec::with_capacity(paths.len());
    for path in &paths {
        batch.push(load_file(path).await?);
    }

    let limits = UploadLimits {
        max_files: config.max_files,
        max_size_bytes: config.max_file_size_bytes,
        allowed_content_types: config.allowed_content_types.clone(),
    };
    let outcome = validate_batch(batch, 0, &limits);
    for rejected in &outcome.rejected {
        eprintln!(
            "skipping {} ({}): {}",
            rejected.file.name,
            format_file_size(rejected.file.size_bytes()),
            rejected.reason
        );
    }
    if outcome.accepted.is_empty() {
        anyhow::bail!("No files left to upload");
    }

    let queue = UploadQueue::new();
    queue.enqueue(outcome.accepted);
    let executor = BatchUploadExecutor::new(
        client,
        queue.clone(),
        EventBus::new(),
        ExecutorConfig::from(config),
    );

    let summary = executor
        .submit()
        .await?
        .context("Another upload is already in flight")?;

    let items: Vec<serde_json::Value> = queue
        .items()
        .iter()
        .map(|item| {
            serde_json::json!({
                "filename": item.file.name,
                "status": format!("{:?}", item.status),
                "deduplicated": item.result.as_ref().map(|r| r.deduplicated),
            })
        })
        .collect();
    print_json(&serde_json::json!({ "files": items, "summary": summary.to_string() }))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env();
    let client = client_for(&config)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { username, password } => {
            let response = client.login(&username, &password).await?;
            print_json(&response)?;
            eprintln!("export FILEVAULT_TOKEN={} to reuse this session", response.token);
        }
        Commands::Register { username, password } => {
            client.register(&username, &password).await?;
            print_json(&serde_json::json!({ "success": true, "username": username }))?;
        }
        Commands::Upload { files } => {
            upload(&config, client, files).await?;
        }
        Commands::List { page, page_size } => {
            let page_size = page_size.unwrap_or(config.page_size);
            let controller = ResultListController::new(client, ViewContext::list(page, page_size));
            let response = controller.set_view(ViewContext::list(page, page_size)).await?;
            print_json(&response)?;
        }
        Commands::Search {
            filename,
            mime_type,
            min_size,
            max_size,
            start_date,
            end_date,
            page,
            page_size,
        } => {
            let filters = SearchFilters {
                filename,
                mime_type,
                min_size_bytes: min_size,
                max_size_bytes: max_size,
                start_date,
                end_date,
                page: Some(page),
                page_size: Some(page_size.unwrap_or(config.page_size)),
            };
            let controller =
                ResultListController::new(client, ViewContext::search(filters.clone()));
            let response = controller.set_view(ViewContext::search(filters)).await?;
            print_json(&response)?;
        }
        Commands::Delete { ids } => {
            let deleted = filevault_client::delete_files(&client, &EventBus::new(), &ids).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("{} file(s) deleted", deleted) }),
            )?;
        }
        Commands::Download { id, output } => {
            let bytes = client.download_file(id).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("file-{}", id)));
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Write {}", path.display()))?;
            print_json(&serde_json::json!({
                "path": path.display().to_string(),
                "size": format_file_size(bytes.len() as u64),
            }))?;
        }
        Commands::Stats => {
            let stats = StorageStatsReader::new(client).fetch().await?;
            print_json(&stats)?;
        }
    }

    Ok(())
}
