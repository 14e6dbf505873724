//! In-memory Drive used by the command tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncReadExt;

use drive_cli::error::{DriveError, Result};
use drive_cli::models::{FileRecord, NewFile, Permission, FOLDER_MIME_TYPE};
use drive_cli::service::{ContentStream, FileService, UploadContent};

const DOWNLOAD_SCHEME: &str = "fake://";

#[derive(Default)]
struct State {
    files: Vec<FileRecord>,
    content: HashMap<String, Vec<u8>>,
    permissions: HashMap<String, Vec<Permission>>,
    queries: Vec<Option<String>>,
    calls: Vec<&'static str>,
    next_id: usize,
}

/// Records every call and tracks overlapping permission lookups.
#[derive(Default)]
pub struct FakeDrive {
    state: Mutex<State>,
    failing_titles: HashSet<String>,
    permission_delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

fn not_found(file_id: &str) -> DriveError {
    DriveError::ApiError {
        status: 404,
        message: format!("File not found: {}", file_id),
    }
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every permission lookup takes at least `delay`.
    pub fn with_permission_delay(delay: Duration) -> Self {
        Self {
            permission_delay: delay,
            ..Default::default()
        }
    }

    /// Uploads with these titles fail.
    pub fn failing_uploads(titles: &[&str]) -> Self {
        Self {
            failing_titles: titles.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn next_id(state: &mut State) -> String {
        state.next_id += 1;
        format!("id{}", state.next_id)
    }

    /// Stores a downloadable file and returns its id.
    pub fn add_file(&self, title: &str, content: &[u8]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.files.push(FileRecord {
            id: id.clone(),
            title: title.to_string(),
            file_size: Some(content.len() as u64),
            download_url: Some(format!("{}{}", DOWNLOAD_SCHEME, id)),
            ..Default::default()
        });
        state.content.insert(id.clone(), content.to_vec());
        id
    }

    pub fn add_record(&self, record: FileRecord) {
        self.state.lock().unwrap().files.push(record);
    }

    pub fn share_directly(&self, file_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .permissions
            .entry(file_id.to_string())
            .or_default()
            .push(Permission::anyone_reader());
    }

    pub fn file(&self, file_id: &str) -> Option<FileRecord> {
        let state = self.state.lock().unwrap();
        state.files.iter().find(|f| f.id == file_id).cloned()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn content(&self, file_id: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().content.get(file_id).cloned()
    }

    pub fn queries(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|c| **c == name).count()
    }

    pub fn peak_permission_lookups(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn record_call(&self, name: &'static str) {
        self.state.lock().unwrap().calls.push(name);
    }
}

#[async_trait]
impl FileService for FakeDrive {
    async fn list_files(&self, query: Option<&str>, max_results: Option<u32>) -> Result<Vec<FileRecord>> {
        self.record_call("list_files");
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.map(str::to_string));
        let limit = max_results.map(|m| m as usize).unwrap_or(usize::MAX);
        Ok(state.files.iter().take(limit).cloned().collect())
    }

    async fn get_file(&self, file_id: &str) -> Result<FileRecord> {
        self.record_call("get_file");
        self.file(file_id).ok_or_else(|| not_found(file_id))
    }

    async fn insert_file(
        &self,
        file: NewFile,
        content: Option<UploadContent>,
        _convert: bool,
    ) -> Result<FileRecord> {
        self.record_call("insert_file");
        if self.failing_titles.contains(&file.title) {
            return Err(DriveError::ApiError {
                status: 500,
                message: format!("cannot store {}", file.title),
            });
        }

        let data = match content {
            Some(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Some(buf)
            }
            None => None,
        };

        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let is_folder = file.mime_type.as_deref() == Some(FOLDER_MIME_TYPE);
        let record = FileRecord {
            id: id.clone(),
            title: file.title,
            mime_type: file.mime_type.unwrap_or_default(),
            parents: file.parents,
            file_size: data.as_ref().map(|d| d.len() as u64),
            download_url: (!is_folder && data.is_some()).then(|| format!("{}{}", DOWNLOAD_SCHEME, id)),
            ..Default::default()
        };
        if let Some(data) = data {
            state.content.insert(id.clone(), data);
        }
        state.files.push(record.clone());
        Ok(record)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.record_call("delete_file");
        let mut state = self.state.lock().unwrap();
        let before = state.files.len();
        state.files.retain(|f| f.id != file_id);
        if state.files.len() == before {
            return Err(not_found(file_id));
        }
        state.content.remove(file_id);
        Ok(())
    }

    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>> {
        self.record_call("list_permissions");
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.permission_delay.is_zero() {
            tokio::time::sleep(self.permission_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let state = self.state.lock().unwrap();
        if !state.files.iter().any(|f| f.id == file_id) {
            return Err(not_found(file_id));
        }
        Ok(state.permissions.get(file_id).cloned().unwrap_or_default())
    }

    async fn insert_permission(&self, file_id: &str, permission: &Permission) -> Result<Permission> {
        self.record_call("insert_permission");
        let mut state = self.state.lock().unwrap();
        if !state.files.iter().any(|f| f.id == file_id) {
            return Err(not_found(file_id));
        }
        let created = Permission {
            id: Some(permission.kind.clone()),
            ..permission.clone()
        };
        state
            .permissions
            .entry(file_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()> {
        self.record_call("delete_permission");
        let mut state = self.state.lock().unwrap();
        let permissions = state.permissions.entry(file_id.to_string()).or_default();
        let before = permissions.len();
        permissions.retain(|p| p.id.as_deref() != Some(permission_id) && p.kind != permission_id);
        if permissions.len() == before {
            return Err(DriveError::ApiError {
                status: 404,
                message: format!("Permission not found: {}", permission_id),
            });
        }
        Ok(())
    }

    async fn http_get(&self, url: &str) -> Result<ContentStream> {
        self.record_call("http_get");
        let file_id = url.strip_prefix(DOWNLOAD_SCHEME).unwrap_or(url);
        let data = self.content(file_id).ok_or_else(|| not_found(file_id))?;
        let chunks: Vec<Result<Bytes>> = data
            .chunks(3)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}
