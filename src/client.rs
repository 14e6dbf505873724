//! Google Drive v2 API client.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileList, FileRecord, NewFile, Permission, PermissionList};
use crate::service::{ContentStream, FileService, UploadContent};

/// Base URL for Google Drive API v2.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v2";

/// Upload URL for Google Drive API v2.
pub const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v2";

/// Client for the Google Drive REST API.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    /// Create a client against the public Drive endpoints.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_endpoints(auth, DRIVE_API_BASE, UPLOAD_API_BASE)
    }

    /// Create a client against custom endpoints.
    pub fn with_endpoints(auth: Authenticator, api_base: &str, upload_base: &str) -> Self {
        Self {
            auth,
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base, file_id)
    }

    fn permissions_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/permissions", self.api_base, file_id)
    }
}

/// Turns a non-success response into an [`DriveError::ApiError`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

#[async_trait]
impl FileService for DriveClient {
    async fn list_files(&self, query: Option<&str>, max_results: Option<u32>) -> Result<Vec<FileRecord>> {
        let token = self.auth.get_access_token().await?;
        debug!(?query, ?max_results, "listing files");

        let mut request = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&token);

        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        if let Some(max) = max_results {
            request = request.query(&[("maxResults", max)]);
        }

        let response = check_status(request.send().await?).await?;
        let list: FileList = response.json().await?;
        Ok(list.items)
    }

    async fn get_file(&self, file_id: &str) -> Result<FileRecord> {
        let token = self.auth.get_access_token().await?;
        debug!(file_id, "fetching file metadata");

        let response = self
            .http
            .get(self.file_url(file_id))
            .bearer_auth(&token)
            .send()
            .await?;

        let record: FileRecord = check_status(response).await?.json().await?;
        Ok(record)
    }

    async fn insert_file(
        &self,
        file: NewFile,
        content: Option<UploadContent>,
        convert: bool,
    ) -> Result<FileRecord> {
        let token = self.auth.get_access_token().await?;
        let convert = if convert { "true" } else { "false" };

        let request = match content {
            None => {
                debug!(title = %file.title, "creating metadata-only file");
                self.http
                    .post(format!("{}/files", self.api_base))
                    .bearer_auth(&token)
                    .query(&[("convert", convert)])
                    .json(&file)
            }
            Some(reader) => {
                debug!(title = %file.title, mime_type = ?file.mime_type, "uploading file");
                let metadata_part =
                    Part::text(serde_json::to_string(&file)?).mime_str("application/json")?;

                let body = Body::wrap_stream(ReaderStream::new(reader));
                let mut file_part = Part::stream(body).file_name(file.title.clone());
                if let Some(mime_type) = &file.mime_type {
                    file_part = file_part.mime_str(mime_type)?;
                }

                let form = Form::new()
                    .part("metadata", metadata_part)
                    .part("file", file_part);

                self.http
                    .post(format!("{}/files", self.upload_base))
                    .bearer_auth(&token)
                    .query(&[("uploadType", "multipart"), ("convert", convert)])
                    .multipart(form)
            }
        };

        let record: FileRecord = check_status(request.send().await?).await?.json().await?;
        Ok(record)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let token = self.auth.get_access_token().await?;
        debug!(file_id, "deleting file");

        let response = self
            .http
            .delete(self.file_url(file_id))
            .bearer_auth(&token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>> {
        let token = self.auth.get_access_token().await?;
        debug!(file_id, "listing permissions");

        let response = self
            .http
            .get(self.permissions_url(file_id))
            .bearer_auth(&token)
            .send()
            .await?;

        let list: PermissionList = check_status(response).await?.json().await?;
        Ok(list.items)
    }

    async fn insert_permission(&self, file_id: &str, permission: &Permission) -> Result<Permission> {
        let token = self.auth.get_access_token().await?;
        debug!(file_id, kind = %permission.kind, role = %permission.role, "inserting permission");

        let response = self
            .http
            .post(self.permissions_url(file_id))
            .bearer_auth(&token)
            .json(permission)
            .send()
            .await?;

        let created: Permission = check_status(response).await?.json().await?;
        Ok(created)
    }

    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()> {
        let token = self.auth.get_access_token().await?;
        debug!(file_id, permission_id, "deleting permission");

        let response = self
            .http
            .delete(format!("{}/{}", self.permissions_url(file_id), permission_id))
            .bearer_auth(&token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn http_get(&self, url: &str) -> Result<ContentStream> {
        let token = self.auth.get_access_token().await?;
        debug!(url, "downloading content");

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;

        Ok(response.bytes_stream().map_err(DriveError::from).boxed())
    }
}
