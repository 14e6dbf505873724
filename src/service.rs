//! The remote file service the commands talk to.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::models::{FileRecord, NewFile, Permission};

/// Readable content handed to an upload.
pub type UploadContent = Box<dyn AsyncRead + Send + Unpin>;

/// Raw file content as it arrives from the service.
pub type ContentStream = BoxStream<'static, Result<Bytes>>;

/// Operations on remote files and their permissions.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Fetches one page of records matching `query`.
    async fn list_files(&self, query: Option<&str>, max_results: Option<u32>) -> Result<Vec<FileRecord>>;

    async fn get_file(&self, file_id: &str) -> Result<FileRecord>;

    /// Creates a record, uploading `content` when given. With `convert`
    /// the service turns the content into its native document format.
    async fn insert_file(
        &self,
        file: NewFile,
        content: Option<UploadContent>,
        convert: bool,
    ) -> Result<FileRecord>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>>;

    async fn insert_permission(&self, file_id: &str, permission: &Permission) -> Result<Permission>;

    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()>;

    /// Authenticated GET of a download reference.
    async fn http_get(&self, url: &str) -> Result<ContentStream>;

    /// Whether anyone may read `file_id` without signing in.
    async fn is_shared(&self, file_id: &str) -> Result<bool> {
        let permissions = self.list_permissions(file_id).await?;
        Ok(permissions.iter().any(Permission::is_anyone))
    }
}
