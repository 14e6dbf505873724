use std::io::Write;

use tracing::debug;

use crate::commands::info::print_info;
use crate::commands::share::share;
use crate::error::{RemoteContext, Result};
use crate::models::{FileRecord, NewFile};
use crate::service::FileService;

/// Creates a folder under `parent_id` (or the root), optionally sharing it.
pub async fn create_folder(
    service: &dyn FileService,
    title: &str,
    parent_id: Option<&str>,
    share_folder: bool,
    out: &mut dyn Write,
) -> Result<FileRecord> {
    debug!(title, ?parent_id, "creating folder");
    let folder = service
        .insert_file(NewFile::folder(title).with_parent(parent_id), None, false)
        .await
        .remote_context(|| format!("Failed to create folder '{}'", title))?;

    if share_folder {
        share(service, &folder.id, out).await?;
    }
    Ok(folder)
}

/// Creates a folder and prints its metadata.
pub async fn mkdir(
    service: &dyn FileService,
    title: &str,
    parent_id: Option<&str>,
    share_folder: bool,
    out: &mut dyn Write,
) -> Result<FileRecord> {
    let folder = create_folder(service, title, parent_id, share_folder, out).await?;
    print_info(service, &folder, out).await?;
    writeln!(out, "Folder '{}' created", folder.title)?;
    Ok(folder)
}
