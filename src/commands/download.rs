use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::commands::delete::delete;
use crate::error::{DriveError, RemoteContext, Result};
use crate::format::{format_size, TransferTimer};
use crate::models::FileRecord;
use crate::service::{ContentStream, FileService};

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Write the content to the output sink instead of a local file.
    pub stdout: bool,
    /// Remove the remote file once the download succeeded.
    pub delete_after: bool,
    /// Directory the local file is created in.
    pub dest_dir: PathBuf,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            stdout: false,
            delete_after: false,
            dest_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub record: FileRecord,
    pub bytes: u64,
    /// Local file written, `None` when streamed to the sink.
    pub path: Option<PathBuf>,
}

/// Local file name for a remote title. Path separators are not allowed to
/// escape the destination directory.
pub fn local_file_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => format!("{}_", name),
        _ => name,
    }
}

/// Downloads `file_id` into `opts.dest_dir`, or into `out` with `opts.stdout`.
///
/// Refuses to overwrite an existing local file.
pub async fn download(
    service: &dyn FileService,
    file_id: &str,
    opts: &DownloadOptions,
    out: &mut dyn Write,
) -> Result<DownloadSummary> {
    let record = service
        .get_file(file_id)
        .await
        .remote_context(|| format!("Failed to get file {}", file_id))?;

    let url = match record.download_url.as_deref() {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Err(DriveError::NotDownloadable(record.title.clone())),
    };

    let target = if opts.stdout {
        None
    } else {
        let path = opts.dest_dir.join(local_file_name(&record.title));
        if tokio::fs::try_exists(&path).await? {
            return Err(DriveError::LocalConflict(path));
        }
        Some(path)
    };

    let timer = TransferTimer::start();
    let stream = service
        .http_get(&url)
        .await
        .remote_context(|| format!("Failed to download '{}'", record.title))?;

    let bytes = match &target {
        None => copy_to_sink(stream, out).await?,
        Some(path) => copy_to_file(stream, path).await?,
    };

    info!(title = %record.title, bytes, elapsed = ?timer.elapsed(), "download complete");

    // Keep streamed content clean of status lines.
    let mut quiet = std::io::sink();
    let messages: &mut dyn Write = if opts.stdout { &mut quiet } else { out };

    writeln!(
        messages,
        "Downloaded '{}' at {}, total {}",
        record.title,
        timer.rate(bytes),
        format_size(bytes)
    )?;

    if opts.delete_after {
        delete(service, &record.id, messages).await?;
    }

    Ok(DownloadSummary {
        record,
        bytes,
        path: target,
    })
}

/// Downloads whatever the listing returns first.
pub async fn download_latest(
    service: &dyn FileService,
    opts: &DownloadOptions,
    out: &mut dyn Write,
) -> Result<DownloadSummary> {
    let files = service
        .list_files(None, None)
        .await
        .remote_context(|| "Failed to list files")?;
    let latest = files.first().ok_or(DriveError::EmptyResult)?;
    download(service, &latest.id, opts, out).await
}

async fn copy_to_sink(mut stream: ContentStream, out: &mut dyn Write) -> Result<u64> {
    let mut bytes = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk)?;
        bytes += chunk.len() as u64;
    }
    out.flush()?;
    Ok(bytes)
}

async fn copy_to_file(stream: ContentStream, path: &Path) -> Result<u64> {
    // Checked above already; create_new only narrows the race.
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => DriveError::LocalConflict(path.to_path_buf()),
            _ => DriveError::Io(e),
        })?;

    match write_stream(stream, file).await {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            if let Err(cleanup) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), error = %cleanup, "cannot remove partial download");
            }
            Err(err)
        }
    }
}

async fn write_stream(mut stream: ContentStream, mut file: tokio::fs::File) -> Result<u64> {
    let mut bytes = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(bytes)
}
