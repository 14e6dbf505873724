use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tracing::{debug, info, warn};

use crate::commands::folder::create_folder;
use crate::commands::info::print_info;
use crate::commands::share::share;
use crate::error::{DriveError, RemoteContext, Result};
use crate::format::{format_size, TransferTimer};
use crate::models::{FileRecord, NewFile};
use crate::service::{FileService, UploadContent};

/// Title used when nothing better is known, e.g. for standard input.
pub const UNTITLED: &str = "untitled";

/// Where upload content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Stdin,
    Path(PathBuf),
}

impl UploadSource {
    /// `-` means standard input, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            UploadSource::Stdin
        } else {
            UploadSource::Path(PathBuf::from(arg))
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub title: Option<String>,
    pub parent_id: Option<String>,
    pub share: bool,
    pub mime_type: Option<String>,
    /// Convert to the native document format on the remote side.
    pub convert: bool,
    /// How many directory levels a directory upload descends. `1` uploads
    /// only the immediate files of the directory.
    pub max_depth: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            title: None,
            parent_id: None,
            share: false,
            mime_type: None,
            convert: false,
            max_depth: 1,
        }
    }
}

#[derive(Debug)]
pub enum UploadOutcome {
    File(FileRecord),
    Directory(DirectoryUpload),
}

/// What a directory upload did. A child that fails does not stop the rest.
#[derive(Debug, Default)]
pub struct DirectoryUpload {
    /// Created folders, the top-level one first.
    pub folders: Vec<FileRecord>,
    pub uploaded: Vec<FileRecord>,
    pub failed: Vec<(PathBuf, DriveError)>,
    /// Sub-directories beyond the depth limit.
    pub skipped: Vec<PathBuf>,
}

impl DirectoryUpload {
    pub fn folder(&self) -> Option<&FileRecord> {
        self.folders.first()
    }
}

/// Explicit MIME type, else a guess from the title's extension, else empty.
pub fn resolve_mime_type(explicit: Option<&str>, title: &str) -> String {
    match explicit.filter(|m| !m.is_empty()) {
        Some(mime_type) => mime_type.to_string(),
        None => mime_guess::from_path(title)
            .first_raw()
            .unwrap_or_default()
            .to_string(),
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            let absolute = std::fs::canonicalize(path).ok()?;
            absolute.file_name().map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Uploads standard input, a file, or a directory.
pub async fn upload(
    service: &dyn FileService,
    source: UploadSource,
    opts: &UploadOptions,
    out: &mut dyn Write,
) -> Result<UploadOutcome> {
    let path = match source {
        UploadSource::Stdin => {
            let title = opts.title.clone().unwrap_or_else(|| UNTITLED.to_string());
            let content: UploadContent = Box::new(tokio::io::stdin());
            let record =
                upload_content(service, content, &title, opts.parent_id.as_deref(), opts, out).await?;
            return Ok(UploadOutcome::File(record));
        }
        UploadSource::Path(path) => path,
    };

    let title = opts.title.clone().unwrap_or_else(|| base_name(&path));

    if tokio::fs::metadata(&path).await?.is_dir() {
        let report = upload_directory(service, &path, &title, opts, out).await?;
        return Ok(UploadOutcome::Directory(report));
    }

    let record = upload_path(service, &path, &title, opts.parent_id.as_deref(), opts, out).await?;
    Ok(UploadOutcome::File(record))
}

async fn upload_path(
    service: &dyn FileService,
    path: &Path,
    title: &str,
    parent_id: Option<&str>,
    opts: &UploadOptions,
    out: &mut dyn Write,
) -> Result<FileRecord> {
    let file = File::open(path).await?;
    upload_content(service, Box::new(file), title, parent_id, opts, out).await
}

async fn upload_content(
    service: &dyn FileService,
    content: UploadContent,
    title: &str,
    parent_id: Option<&str>,
    opts: &UploadOptions,
    out: &mut dyn Write,
) -> Result<FileRecord> {
    let mime_type = resolve_mime_type(opts.mime_type.as_deref(), title);
    let file = NewFile::new(title)
        .with_mime_type(mime_type.clone())
        .with_parent(parent_id);

    if opts.convert {
        writeln!(out, "Converting to native document format enabled")?;
    }

    let timer = TransferTimer::start();
    let record = service
        .insert_file(file, Some(content), opts.convert)
        .await
        .remote_context(|| format!("Failed to upload '{}'", title))?;

    let bytes = record.file_size.unwrap_or(0);
    let rate = timer.rate(bytes);
    info!(title = %record.title, id = %record.id, bytes, elapsed = ?timer.elapsed(), "upload complete");

    if opts.share {
        share(service, &record.id, out).await?;
    }

    print_info(service, &record, out).await?;
    writeln!(out, "MIME Type: {}", mime_type)?;
    writeln!(
        out,
        "Uploaded '{}' at {}, total {}",
        record.title,
        rate,
        format_size(bytes)
    )?;

    Ok(record)
}

/// Mirrors `dir` as a remote folder, uploading its files.
///
/// Traversal is breadth first and stops descending at `opts.max_depth`.
/// Failing children are reported and skipped; only failing to create the
/// top-level folder is an error.
async fn upload_directory(
    service: &dyn FileService,
    dir: &Path,
    title: &str,
    opts: &UploadOptions,
    out: &mut dyn Write,
) -> Result<DirectoryUpload> {
    let max_depth = opts.max_depth.max(1);
    let mut report = DirectoryUpload::default();

    let root = create_folder(service, title, opts.parent_id.as_deref(), opts.share, out).await?;
    let mut pending = VecDeque::from([(dir.to_path_buf(), root.id.clone(), 1usize)]);
    report.folders.push(root);

    while let Some((dir, folder_id, depth)) = pending.pop_front() {
        let children = match sorted_children(&dir).await {
            Ok(children) => children,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "cannot read directory");
                report.failed.push((dir, err));
                continue;
            }
        };

        for child in children {
            let is_dir = match tokio::fs::metadata(&child).await {
                Ok(metadata) => metadata.is_dir(),
                Err(err) => {
                    report.failed.push((child, err.into()));
                    continue;
                }
            };

            if is_dir {
                if depth >= max_depth {
                    debug!(dir = %child.display(), depth, "skipping sub-directory");
                    report.skipped.push(child);
                    continue;
                }
                match create_folder(service, &base_name(&child), Some(folder_id.as_str()), opts.share, out).await {
                    Ok(folder) => {
                        pending.push_back((child, folder.id.clone(), depth + 1));
                        report.folders.push(folder);
                    }
                    Err(err) => {
                        warn!(dir = %child.display(), error = %err, "folder creation failed");
                        report.failed.push((child, err));
                    }
                }
                continue;
            }

            let title = base_name(&child);
            match upload_path(service, &child, &title, Some(folder_id.as_str()), opts, out).await {
                Ok(record) => report.uploaded.push(record),
                Err(err) => {
                    warn!(file = %child.display(), error = %err, "upload failed, continuing");
                    writeln!(out, "Failed to upload '{}': {}", child.display(), err)?;
                    report.failed.push((child, err));
                }
            }
        }
    }

    Ok(report)
}

async fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}
