use std::io::Write;

use crate::error::{RemoteContext, Result};
use crate::models::FileRecord;
use crate::service::FileService;

/// Deletes `file_id`, returning the record as it was before removal.
pub async fn delete(service: &dyn FileService, file_id: &str, out: &mut dyn Write) -> Result<FileRecord> {
    let record = service
        .get_file(file_id)
        .await
        .remote_context(|| format!("Failed to get file {}", file_id))?;

    service
        .delete_file(file_id)
        .await
        .remote_context(|| format!("Failed to delete '{}'", record.title))?;

    writeln!(out, "Removed file '{}'", record.title)?;
    Ok(record)
}
