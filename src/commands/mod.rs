//! The user-facing operations.
//!
//! Each command talks to a [`FileService`](crate::service::FileService) and
//! writes its human readable report to the given sink.

pub mod delete;
pub mod download;
pub mod folder;
pub mod info;
pub mod list;
pub mod share;
pub mod upload;

pub use delete::delete;
pub use download::{download, download_latest, DownloadOptions, DownloadSummary};
pub use folder::{create_folder, mkdir};
pub use info::{info, print_info};
pub use list::{list, ListOptions};
pub use share::{share, unshare};
pub use upload::{upload, DirectoryUpload, UploadOptions, UploadOutcome, UploadSource};
