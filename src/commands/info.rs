use std::io::Write;

use crate::error::{RemoteContext, Result};
use crate::format::{
    format_bool, format_optional_size, optional_date, parent_list, render_fields, DisplayRow,
};
use crate::models::FileRecord;
use crate::service::FileService;

/// Field order of the metadata table.
pub const INFO_ORDER: [&str; 10] = [
    "Id",
    "Title",
    "Description",
    "Size",
    "Created",
    "Modified",
    "Owner",
    "Md5sum",
    "Shared",
    "Parents",
];

pub fn info_fields(record: &FileRecord, shared: bool) -> DisplayRow {
    let fields = [
        ("Id", record.id.clone()),
        ("Title", record.title.clone()),
        ("Description", record.description.clone().unwrap_or_default()),
        ("Size", format_optional_size(record.file_size)),
        ("Created", optional_date(record.created_date.as_deref())),
        ("Modified", optional_date(record.modified_date.as_deref())),
        ("Owner", record.owner_names.join(", ")),
        ("Md5sum", record.md5_checksum.clone().unwrap_or_default()),
        ("Shared", format_bool(shared)),
        (
            "Parents",
            parent_list(record.parents.iter().map(|p| p.id.as_str())),
        ),
    ];
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Writes the metadata table for `record`, looking up its sharing status
/// unless it is already known.
pub async fn print_info(service: &dyn FileService, record: &FileRecord, out: &mut dyn Write) -> Result<()> {
    let shared = match record.shared {
        Some(shared) => shared,
        None => service
            .is_shared(&record.id)
            .await
            .remote_context(|| format!("Failed to list permissions of {}", record.id))?,
    };
    write!(out, "{}", render_fields(&info_fields(record, shared), &INFO_ORDER))?;
    Ok(())
}

pub async fn info(service: &dyn FileService, file_id: &str, out: &mut dyn Write) -> Result<FileRecord> {
    let record = service
        .get_file(file_id)
        .await
        .remote_context(|| format!("Failed to get file {}", file_id))?;
    print_info(service, &record, out).await?;
    Ok(record)
}
