use std::io::Write;
use std::sync::Arc;

use crate::enrich::{enrich_shared_status, SHARED_STATUS_CONCURRENCY};
use crate::error::{RemoteContext, Result};
use crate::format::{
    format_bool, format_optional_size, optional_date, render_columns, truncate_string, DisplayRow,
};
use crate::models::FileRecord;
use crate::service::FileService;

/// Titles longer than this are truncated in listings.
pub const TITLE_WIDTH: usize = 40;

const COLUMN_SPACING: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only titles containing this text.
    pub title_filter: Option<String>,
    /// Raw Drive query; replaces `title_filter` when both are set.
    pub query: Option<String>,
    pub max_results: Option<u32>,
    /// Add a `Shared` column.
    pub shared_status: bool,
    pub no_header: bool,
}

/// The single query sent to the service. An explicit query wins over the
/// title filter.
pub fn build_query(title_filter: Option<&str>, query: Option<&str>) -> Option<String> {
    let explicit = query.filter(|q| !q.is_empty()).map(str::to_string);
    let by_title = title_filter
        .filter(|t| !t.is_empty())
        .map(|t| format!("title contains '{}'", t.replace('\'', "\\'")));
    explicit.or(by_title)
}

fn list_row(record: &FileRecord) -> DisplayRow {
    let mut row = DisplayRow::new();
    row.insert("Id".to_string(), record.id.clone());
    row.insert("Title".to_string(), truncate_string(&record.title, TITLE_WIDTH));
    row.insert("Size".to_string(), format_optional_size(record.file_size));
    row.insert(
        "Created".to_string(),
        optional_date(record.created_date.as_deref()),
    );
    if let Some(shared) = record.shared {
        row.insert("Shared".to_string(), format_bool(shared));
    }
    row
}

/// Lists one page of records as a table and returns the listed records.
pub async fn list(service: Arc<dyn FileService>, opts: &ListOptions, out: &mut dyn Write) -> Result<Vec<FileRecord>> {
    let query = build_query(opts.title_filter.as_deref(), opts.query.as_deref());

    let mut records: Vec<FileRecord> = service
        .list_files(query.as_deref(), opts.max_results)
        .await
        .remote_context(|| "Failed to list files")?
        .into_iter()
        .filter(FileRecord::is_listable)
        .collect();

    let mut columns = vec!["Id", "Title", "Size", "Created"];
    if opts.shared_status {
        enrich_shared_status(Arc::clone(&service), &mut records, SHARED_STATUS_CONCURRENCY).await?;
        columns.push("Shared");
    }

    let rows: Vec<DisplayRow> = records.iter().map(list_row).collect();
    write!(out, "{}", render_columns(&rows, &columns, COLUMN_SPACING, opts.no_header))?;

    Ok(records)
}
