//! Error types for the drive_cli crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when interacting with Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("File is not downloadable: {0}")]
    NotDownloadable(String),

    #[error("'{}' already exists", .0.display())]
    LocalConflict(PathBuf),

    #[error("No files found")]
    EmptyResult,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("No credentials configured: pass --credentials or --access-token")]
    MissingCredentials,

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl DriveError {
    /// The innermost error, skipping any `Remote` context wrappers.
    pub fn root(&self) -> &DriveError {
        match self {
            DriveError::Remote { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;

/// Attaches a human readable context to failed facade calls.
pub trait RemoteContext<T> {
    fn remote_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> RemoteContext<T> for Result<T> {
    fn remote_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| DriveError::Remote {
            context: context().into(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_context_wraps_and_unwraps() {
        let res: Result<()> = Err(DriveError::ApiError {
            status: 404,
            message: "File not found: abc".to_string(),
        });
        let err = res.remote_context(|| "Failed to get file abc").unwrap_err();

        let display = err.to_string();
        assert!(display.starts_with("Failed to get file abc"));
        assert!(display.contains("404"));
        assert!(matches!(err.root(), DriveError::ApiError { status: 404, .. }));
    }

    #[test]
    fn test_local_conflict_display() {
        let err = DriveError::LocalConflict(PathBuf::from("report.pdf"));
        assert_eq!(err.to_string(), "'report.pdf' already exists");
    }
}
