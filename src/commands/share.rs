use std::io::Write;

use crate::error::{RemoteContext, Result};
use crate::format::preview_url;
use crate::models::{Permission, ANYONE};
use crate::service::FileService;

/// Makes `file_id` readable by anyone, no sign-in required.
pub async fn share(service: &dyn FileService, file_id: &str, out: &mut dyn Write) -> Result<()> {
    let record = service
        .get_file(file_id)
        .await
        .remote_context(|| format!("Failed to get file {}", file_id))?;

    service
        .insert_permission(file_id, &Permission::anyone_reader())
        .await
        .remote_context(|| format!("Failed to share '{}'", record.title))?;

    writeln!(
        out,
        "File '{}' is now readable by everyone @ {}",
        record.title,
        preview_url(file_id)
    )?;
    Ok(())
}

/// Removes the `anyone` permission from `file_id`.
pub async fn unshare(service: &dyn FileService, file_id: &str, out: &mut dyn Write) -> Result<()> {
    let record = service
        .get_file(file_id)
        .await
        .remote_context(|| format!("Failed to get file {}", file_id))?;

    service
        .delete_permission(file_id, ANYONE)
        .await
        .remote_context(|| format!("Failed to unshare '{}'", record.title))?;

    writeln!(out, "File '{}' is no longer shared to 'anyone'", record.title)?;
    Ok(())
}
