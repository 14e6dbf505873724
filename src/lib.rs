//! drive_cli - A command-line client for Google Drive.
//!
//! This library provides functionality to:
//! - List files, optionally with their public sharing status
//! - Upload files, standard input, or whole directories
//! - Download files to disk or standard output
//! - Create folders, delete files, and toggle public sharing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use drive_cli::commands::{list, ListOptions};
//! use drive_cli::{Authenticator, DriveClient, FileService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_file("service-account.json")?;
//!     let client: Arc<dyn FileService> = Arc::new(DriveClient::new(auth));
//!
//!     let opts = ListOptions {
//!         shared_status: true,
//!         ..Default::default()
//!     };
//!     list(client, &opts, &mut std::io::stdout()).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod commands;
pub mod enrich;
pub mod error;
pub mod format;
pub mod models;
pub mod service;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::DriveClient;
pub use enrich::{enrich_shared_status, SHARED_STATUS_CONCURRENCY};
pub use error::{DriveError, Result};
pub use models::{FileRecord, Permission};
pub use service::FileService;
pub use url_parser::extract_id;
