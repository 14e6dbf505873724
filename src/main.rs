//! drive CLI - Manage files in Google Drive.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drive_cli::client::{DRIVE_API_BASE, UPLOAD_API_BASE};
use drive_cli::commands::{
    self, DownloadOptions, ListOptions, UploadOptions, UploadOutcome, UploadSource,
};
use drive_cli::{extract_id, format, Authenticator, DriveClient, DriveError, FileService};

/// CLI tool for managing files in Google Drive.
#[derive(Parser)]
#[command(name = "drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to service account JSON credentials file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// OAuth access token, used instead of service account credentials.
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Drive API endpoint.
    #[arg(long, env = "DRIVE_API_URL", default_value = DRIVE_API_BASE)]
    api_url: String,

    /// Drive upload endpoint.
    #[arg(long, env = "DRIVE_UPLOAD_URL", default_value = UPLOAD_API_BASE)]
    upload_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files.
    List {
        /// Raw Drive query, e.g. "mimeType = 'image/png'". Overrides --filter.
        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Only files whose title contains this text.
        #[arg(long, short = 't')]
        filter: Option<String>,

        /// Maximum number of files to fetch.
        #[arg(long, short = 'm')]
        max: Option<u32>,

        /// Show whether each file is shared publicly.
        #[arg(long, short = 's')]
        shared: bool,

        /// Do not print the header row.
        #[arg(long, short = 'n')]
        no_header: bool,
    },

    /// Show file metadata.
    Info {
        /// File URL or ID.
        id: String,
    },

    /// Create a folder.
    Mkdir {
        /// Folder title.
        title: String,

        /// Parent folder URL or ID.
        #[arg(long, short = 'p')]
        parent: Option<String>,

        /// Make the folder readable by anyone.
        #[arg(long)]
        share: bool,
    },

    /// Upload a file, a directory, or standard input ("-").
    Upload {
        /// Local path, or "-" for standard input.
        path: String,

        /// Remote title (defaults to the file name).
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Parent folder URL or ID.
        #[arg(long, short = 'p')]
        parent: Option<String>,

        /// Make the upload readable by anyone.
        #[arg(long)]
        share: bool,

        /// MIME type (defaults to a guess from the title).
        #[arg(long)]
        mime: Option<String>,

        /// Convert to the native Google Docs format.
        #[arg(long)]
        convert: bool,

        /// Directory levels to upload; 1 uploads only the immediate files.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        depth: u32,
    },

    /// Download a file.
    Download {
        /// File URL or ID.
        id: String,

        /// Write the content to standard output.
        #[arg(long)]
        stdout: bool,

        /// Delete the remote file after downloading.
        #[arg(long)]
        delete: bool,

        /// Local directory to save into.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Download the first listed file, then delete it remotely.
    DownloadLatest {
        /// Write the content to standard output.
        #[arg(long)]
        stdout: bool,

        /// Keep the remote file.
        #[arg(long)]
        keep: bool,

        /// Local directory to save into.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Delete a file.
    Delete {
        /// File URL or ID.
        id: String,
    },

    /// Make a file readable by anyone.
    Share {
        /// File URL or ID.
        id: String,
    },

    /// Revoke public access to a file.
    Unshare {
        /// File URL or ID.
        id: String,
    },
}

fn authenticator(cli: &Cli) -> Result<Authenticator> {
    if let Some(token) = &cli.access_token {
        return Ok(Authenticator::from_token(token.clone()));
    }
    let path = cli.credentials.as_ref().ok_or(DriveError::MissingCredentials)?;
    Authenticator::from_file(path)
        .with_context(|| format!("Failed to load credentials from {:?}", path))
}

fn parse_id(arg: &str) -> Result<String> {
    extract_id(arg).with_context(|| format!("Invalid file URL or ID: {}", arg))
}

fn parse_optional_id(arg: Option<&str>) -> Result<Option<String>> {
    arg.map(parse_id).transpose()
}

// Single threaded so the local UTC offset can be read soundly.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    format::init_local_offset();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let auth = authenticator(&cli)?;
    let client: Arc<dyn FileService> =
        Arc::new(DriveClient::with_endpoints(auth, &cli.api_url, &cli.upload_url));
    let service = client.as_ref();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::List {
            query,
            filter,
            max,
            shared,
            no_header,
        } => {
            let opts = ListOptions {
                title_filter: filter,
                query,
                max_results: max,
                shared_status: shared,
                no_header,
            };
            commands::list(Arc::clone(&client), &opts, &mut out)
                .await
                .context("Failed to list files")?;
        }

        Commands::Info { id } => {
            let id = parse_id(&id)?;
            commands::info(service, &id, &mut out)
                .await
                .with_context(|| format!("Failed to show file: {}", id))?;
        }

        Commands::Mkdir {
            title,
            parent,
            share,
        } => {
            let parent = parse_optional_id(parent.as_deref())?;
            commands::mkdir(service, &title, parent.as_deref(), share, &mut out)
                .await
                .with_context(|| format!("Failed to create folder: {}", title))?;
        }

        Commands::Upload {
            path,
            title,
            parent,
            share,
            mime,
            convert,
            depth,
        } => {
            let opts = UploadOptions {
                title,
                parent_id: parse_optional_id(parent.as_deref())?,
                share,
                mime_type: mime,
                convert,
                max_depth: depth as usize,
            };
            let outcome = commands::upload(service, UploadSource::from_arg(&path), &opts, &mut out)
                .await
                .with_context(|| format!("Failed to upload: {}", path))?;

            if let UploadOutcome::Directory(report) = outcome {
                writeln!(
                    out,
                    "Uploaded {} file(s) into {} folder(s), {} failed, {} sub-directories skipped",
                    report.uploaded.len(),
                    report.folders.len(),
                    report.failed.len(),
                    report.skipped.len()
                )?;
            }
        }

        Commands::Download {
            id,
            stdout,
            delete,
            dir,
        } => {
            let id = parse_id(&id)?;
            let opts = DownloadOptions {
                stdout,
                delete_after: delete,
                dest_dir: dir,
            };
            commands::download(service, &id, &opts, &mut out)
                .await
                .with_context(|| format!("Failed to download file: {}", id))?;
        }

        Commands::DownloadLatest { stdout, keep, dir } => {
            let opts = DownloadOptions {
                stdout,
                delete_after: !keep,
                dest_dir: dir,
            };
            commands::download_latest(service, &opts, &mut out)
                .await
                .context("Failed to download latest file")?;
        }

        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            commands::delete(service, &id, &mut out)
                .await
                .with_context(|| format!("Failed to delete file: {}", id))?;
        }

        Commands::Share { id } => {
            let id = parse_id(&id)?;
            commands::share(service, &id, &mut out)
                .await
                .with_context(|| format!("Failed to share file: {}", id))?;
        }

        Commands::Unshare { id } => {
            let id = parse_id(&id)?;
            commands::unshare(service, &id, &mut out)
                .await
                .with_context(|| format!("Failed to unshare file: {}", id))?;
        }
    }

    Ok(())
}
