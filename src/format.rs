//! Output helpers: sizes, dates, tables and transfer rates.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Column name to formatted cell.
pub type DisplayRow = HashMap<String, String>;

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Captures the local UTC offset.
///
/// Must run while the process is still single threaded, otherwise the
/// offset cannot be determined soundly and UTC is used instead.
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Like [`format_size`], rendering `-` for records without a size (folders).
pub fn format_optional_size(bytes: Option<u64>) -> String {
    bytes.map(format_size).unwrap_or_else(|| "-".to_string())
}

/// Shortens `s` to at most `max` characters, marking the cut with `...`.
pub fn truncate_string(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Converts an RFC 3339 timestamp to local time.
pub fn iso_date_to_local(date: &str) -> String {
    let offset = LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC);
    iso_date_to_offset(date, offset)
}

/// Converts an RFC 3339 timestamp to `offset`. Unparsable input is returned as is.
pub fn iso_date_to_offset(date: &str, offset: UtcOffset) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::parse(date, &Rfc3339)
        .ok()
        .and_then(|dt| dt.to_offset(offset).format(&format).ok())
        .unwrap_or_else(|| date.to_string())
}

/// Formats an optional timestamp, empty when absent.
pub fn optional_date(date: Option<&str>) -> String {
    date.map(iso_date_to_local).unwrap_or_default()
}

pub fn format_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

pub fn parent_list<'a, I>(parent_ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parent_ids.into_iter().collect::<Vec<_>>().join(", ")
}

/// Link that previews a publicly shared file.
pub fn preview_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={}&export=preview", file_id)
}

/// Renders rows as left-aligned columns.
///
/// Each column is as wide as its widest cell (header included unless
/// `no_header`) plus `spacing`. Missing cells render empty.
pub fn render_columns(rows: &[DisplayRow], columns: &[&str], spacing: usize, no_header: bool) -> String {
    let header: DisplayRow = columns
        .iter()
        .map(|c| (c.to_string(), c.to_string()))
        .collect();

    let mut all: Vec<&DisplayRow> = Vec::with_capacity(rows.len() + 1);
    if !no_header {
        all.push(&header);
    }
    all.extend(rows.iter());

    let widths: Vec<usize> = columns
        .iter()
        .map(|col| {
            all.iter()
                .map(|row| row.get(*col).map(|v| v.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in all {
        let mut line = String::new();
        for (col, width) in columns.iter().zip(&widths) {
            let cell = row.get(*col).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{:<w$}", cell, w = width + spacing));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Renders `Key: value` lines in the given order.
pub fn render_fields(fields: &DisplayRow, order: &[&str]) -> String {
    order
        .iter()
        .map(|key| format!("{}: {}\n", key, fields.get(*key).map(String::as_str).unwrap_or("")))
        .collect()
}

/// Measures the average rate of a transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferTimer {
    started: Instant,
}

impl TransferTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Average rate for `bytes` moved since the timer started.
    pub fn rate(&self, bytes: u64) -> String {
        transfer_rate(bytes, self.elapsed())
    }
}

/// Bytes per whole second; anything under a second counts as one.
pub fn transfer_rate(bytes: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs().max(1);
    format!("{}/s", format_size(bytes / seconds))
}
